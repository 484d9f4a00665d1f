//! Account service
//!
//! Local registration and sign-in, plus find-or-create for Google
//! identities.

use std::sync::Arc;

use crate::auth::password;
use crate::data::{Database, EntityId, FederatedIdentity, User};
use crate::error::AppError;

fn normalize_required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::Validation(format!("{field} cannot be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Account service
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    /// Create new account service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Register a local user
    ///
    /// # Errors
    /// `DuplicateIdentifier` if the username is taken, `Validation` for
    /// empty input. The existing account is never touched.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        let username = normalize_required(username, "username")?;
        if password.is_empty() {
            return Err(AppError::Validation("password cannot be empty".to_string()));
        }

        let password_hash = password::hash_password(password.to_string()).await?;
        let user = User {
            id: EntityId::new().0,
            username: Some(username),
            password_hash: Some(password_hash),
            google_id: None,
            display_name: None,
            created_at: chrono::Utc::now(),
        };

        // The unique index decides; no pre-read.
        self.db.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, "Local user registered");
        Ok(user)
    }

    /// Verify a username/password pair
    ///
    /// # Errors
    /// `NotAuthenticated` for an unknown user, a user without a local
    /// password, or a wrong password. The caller cannot tell these apart.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self.db.get_user_by_username(username.trim()).await?;
        let Some((user, password_hash)) =
            user.and_then(|user| user.password_hash.clone().map(|hash| (user, hash)))
        else {
            password::verify_dummy(password.to_string()).await?;
            return Err(AppError::NotAuthenticated);
        };

        if password::verify_password(password.to_string(), password_hash).await? {
            Ok(user)
        } else {
            Err(AppError::NotAuthenticated)
        }
    }

    /// Map a Google identity to a local user, creating one on first login
    ///
    /// Concurrent first logins race on the `google_id` unique index; the
    /// loser reads back the winner's row.
    pub async fn find_or_create_federated(
        &self,
        identity: &FederatedIdentity,
    ) -> Result<User, AppError> {
        let subject = normalize_required(&identity.subject, "federated subject")?;

        if let Some(user) = self.db.get_user_by_google_id(&subject).await? {
            return Ok(user);
        }

        let user = User {
            id: EntityId::new().0,
            username: None,
            password_hash: None,
            google_id: Some(subject.clone()),
            display_name: identity
                .display_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(ToOwned::to_owned),
            created_at: chrono::Utc::now(),
        };

        match self.db.insert_user(&user).await {
            Ok(()) => {
                crate::metrics::FEDERATED_USERS_CREATED_TOTAL.inc();
                tracing::info!(user_id = %user.id, "Federated user created");
                Ok(user)
            }
            Err(AppError::DuplicateIdentifier) => {
                tracing::debug!("Concurrent federated sign-up detected; re-reading user");
                self.db
                    .get_user_by_google_id(&subject)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(anyhow::anyhow!(
                            "federated user vanished after unique violation"
                        ))
                    })
            }
            Err(error) => Err(error),
        }
    }
}
