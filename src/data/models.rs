//! Data models
//!
//! Rust structs representing database rows.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user
///
/// Carries at least one authentication method: a local password hash
/// (with its username) or a Google subject id.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    /// Local sign-in name, unique when present
    pub username: Option<String>,
    /// Argon2id PHC string, only for local users
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Google `sub` claim, unique when present
    pub google_id: Option<String>,
    /// Profile name reported by the identity provider
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown in the page header.
    ///
    /// Prefers the local username, then the provider profile name.
    pub fn shown_name(&self) -> Option<&str> {
        self.username
            .as_deref()
            .or(self.display_name.as_deref())
    }
}

/// Identity asserted by Google after a completed OAuth exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    /// Stable subject identifier
    pub subject: String,
    /// Profile display name, if the provider returned one
    pub display_name: Option<String>,
}

// =============================================================================
// Post
// =============================================================================

/// A blog post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    /// Display title, also the public lookup key (unique)
    pub title: String,
    pub content: String,
    /// Owning user
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Session
// =============================================================================

/// Server-side session row
///
/// Only the HMAC of the cookie token is stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRecord {
    pub token_hash: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
