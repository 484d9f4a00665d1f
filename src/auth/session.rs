//! Session management
//!
//! The browser holds a random opaque token in the `session` cookie. The
//! database stores only `HMAC-SHA256(session_secret, token)` next to the
//! user id, so a leaked table cannot be replayed as cookies.
//!
//! Resolution re-reads the user on every request. Unknown, expired or
//! orphaned tokens resolve to [`Principal::Anonymous`] instead of failing.

use std::sync::Arc;

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::config::AppConfig;
use crate::data::{Database, SessionRecord, User};
use crate::error::AppError;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

const SESSION_TOKEN_BYTES: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Authentication state of a request
#[derive(Debug, Clone, Default)]
pub enum Principal {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Principal::Authenticated(user) => Some(user),
            Principal::Anonymous => None,
        }
    }

    /// Name to show in the header, if any
    pub fn display_name(&self) -> Option<&str> {
        self.user().and_then(User::shown_name)
    }
}

/// Issues and resolves server-side sessions
pub struct SessionManager {
    db: Arc<Database>,
    secret: String,
    max_age: Duration,
    secure_cookies: bool,
}

impl SessionManager {
    pub fn new(db: Arc<Database>, config: &AppConfig) -> Self {
        Self {
            db,
            secret: config.auth.session_secret.clone(),
            max_age: Duration::seconds(config.auth.session_max_age),
            secure_cookies: config.should_use_secure_cookies(),
        }
    }

    /// Start a session for `user` and attach its cookie to `jar`
    ///
    /// Any session the request already carried is destroyed first, so a
    /// pre-login token never becomes authenticated.
    pub async fn establish(&self, jar: CookieJar, user: &User) -> Result<CookieJar, AppError> {
        if let Some(previous) = jar.get(SESSION_COOKIE) {
            self.db
                .delete_session(&self.hash_token(previous.value())?)
                .await?;
        }

        let now = Utc::now();
        let pruned = self.db.delete_expired_sessions(now).await?;
        if pruned > 0 {
            tracing::debug!(pruned, "Removed expired sessions");
        }

        let token = generate_token();
        let record = SessionRecord {
            token_hash: self.hash_token(&token)?,
            user_id: user.id.clone(),
            created_at: now,
            expires_at: now + self.max_age,
        };
        self.db.insert_session(&record).await?;

        crate::metrics::SESSIONS_CREATED_TOTAL.inc();
        tracing::info!(user_id = %user.id, "Session established");

        Ok(jar.add(self.session_cookie(token)))
    }

    /// Resolve the principal carried by the request cookies
    ///
    /// # Errors
    /// Only store failures; stale or forged tokens yield `Anonymous`.
    pub async fn resolve(&self, jar: &CookieJar) -> Result<Principal, AppError> {
        match jar.get(SESSION_COOKIE) {
            Some(cookie) => self.resolve_token(cookie.value()).await,
            None => Ok(Principal::Anonymous),
        }
    }

    /// Resolve a raw session token
    pub async fn resolve_token(&self, token: &str) -> Result<Principal, AppError> {
        let token_hash = self.hash_token(token)?;
        let Some(record) = self.db.get_session(&token_hash).await? else {
            return Ok(Principal::Anonymous);
        };

        if record.is_expired() {
            tracing::debug!(user_id = %record.user_id, "Dropping expired session");
            self.db.delete_session(&token_hash).await?;
            return Ok(Principal::Anonymous);
        }

        match self.db.get_user(&record.user_id).await? {
            Some(user) => Ok(Principal::Authenticated(user)),
            None => {
                tracing::warn!(user_id = %record.user_id, "Session refers to missing user");
                self.db.delete_session(&token_hash).await?;
                Ok(Principal::Anonymous)
            }
        }
    }

    /// End the session carried by `jar` and clear the cookie
    pub async fn terminate(&self, jar: CookieJar) -> Result<CookieJar, AppError> {
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            let removed = self.db.delete_session(&self.hash_token(cookie.value())?).await?;
            tracing::info!(removed, "Session terminated");
        }

        Ok(jar.add(clear_session_cookie()))
    }

    fn hash_token(&self, token: &str) -> Result<String, AppError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid session secret: {e}")))?;
        mac.update(token.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .build()
    }
}

fn generate_token() -> String {
    let mut bytes = [0_u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build();
    cookie.make_removal();
    cookie
}
