//! Authentication
//!
//! Handles:
//! - Username/password registration and sign-in
//! - Google OAuth flow
//! - Session management
//! - Authentication extractors

mod local;
mod middleware;
mod oauth;
pub mod password;
pub mod session;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub use middleware::{CurrentPrincipal, CurrentUser, require_session};
pub use oauth::{GoogleClient, OAUTH_STATE_COOKIE};
pub use session::{Principal, SESSION_COOKIE, SessionManager};

/// Create authentication router
///
/// Routes:
/// - GET/POST /login - Login page and credential check
/// - GET/POST /register - Registration page and account creation
/// - POST /logout - Logout
/// - GET /auth/google - Redirect to Google
/// - GET /auth/google/secrets - OAuth callback
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(local::login_page).post(local::login))
        .route("/register", get(local::register_page).post(local::register))
        .route("/logout", post(local::logout))
        .route("/auth/google", get(oauth::google_redirect))
        .route("/auth/google/secrets", get(oauth::google_callback))
}
