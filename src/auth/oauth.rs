//! Google OAuth flow
//!
//! Implements the OAuth 2.0 authorization code flow with Google, asking
//! only for the `profile` scope. The resulting subject id is mapped to a
//! local user through find-or-create.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use serde::Deserialize;
use url::Url;

use crate::AppState;
use crate::config::{AppConfig, GoogleOAuthConfig};
use crate::data::{FederatedIdentity, User};
use crate::error::AppError;
use crate::metrics::observe_login;

/// Cookie carrying the CSRF state between redirect and callback
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
const OAUTH_STATE_COOKIE_PATH: &str = "/auth/google";
const OAUTH_STATE_TTL_MINUTES: i64 = 10;
const GOOGLE_SCOPE: &str = "profile";

/// Google token response
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// Google userinfo document
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    name: Option<String>,
}

/// Client for Google's authorization, token and userinfo endpoints
pub struct GoogleClient {
    config: GoogleOAuthConfig,
    callback_url: String,
    http: reqwest::Client,
}

impl GoogleClient {
    pub fn new(config: &AppConfig, http: reqwest::Client) -> Self {
        Self {
            config: config.auth.google.clone(),
            callback_url: config.google_callback_url(),
            http,
        }
    }

    /// Whether Google sign-in is available
    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    /// Build the URL the browser is sent to
    pub fn authorization_url(&self, csrf_state: &str) -> Result<Url, AppError> {
        Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", GOOGLE_SCOPE),
                ("state", csrf_state),
            ],
        )
        .map_err(|e| AppError::Config(format!("invalid Google authorize URL: {e}")))
    }

    /// Exchange an authorization code for the user's Google identity
    ///
    /// # Steps
    /// 1. POST the code to the token endpoint
    /// 2. GET the userinfo document with the access token
    pub async fn exchange_code(&self, code: &str) -> Result<FederatedIdentity, AppError> {
        let token: GoogleTokenResponse = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let info: GoogleUserInfo = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if info.sub.trim().is_empty() {
            return Err(AppError::OAuth("userinfo response has empty sub".to_string()));
        }

        Ok(FederatedIdentity {
            subject: info.sub,
            display_name: info.name,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /auth/google
///
/// # Steps
/// 1. Generate CSRF state token
/// 2. Store state in cookie
/// 3. Redirect to Google with client_id, redirect_uri, scope, state
pub(super) async fn google_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if !state.google.is_enabled() {
        tracing::warn!("Google sign-in requested but not configured");
        return Ok(Redirect::to("/login").into_response());
    }

    let csrf_state = generate_csrf_state();
    let location = state.google.authorization_url(&csrf_state)?;
    let jar = jar.add(build_oauth_state_cookie(
        csrf_state,
        state.config.should_use_secure_cookies(),
    ));

    Ok((jar, Redirect::to(location.as_str())).into_response())
}

/// Query parameters from Google callback
#[derive(Debug, Deserialize)]
pub(super) struct GoogleCallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// GET /auth/google/secrets
///
/// # Steps
/// 1. Verify CSRF state
/// 2. Exchange code for the Google identity
/// 3. Find or create the local user
/// 4. Create session and set cookie
/// 5. Redirect to home
///
/// Provider and CSRF failures redirect to `/login`; store failures are
/// reported as errors.
pub(super) async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let expected_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_owned());
    let jar = jar.add(clear_oauth_state_cookie());

    match complete_sign_in(&state, &query, expected_state.as_deref()).await {
        Ok(user) => {
            observe_login("google", true);
            let jar = state.sessions.establish(jar, &user).await?;
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(error @ AppError::StoreUnavailable(_)) => Err(error),
        Err(error) => {
            observe_login("google", false);
            tracing::warn!(%error, "Google sign-in failed");
            Ok((jar, Redirect::to("/login")).into_response())
        }
    }
}

async fn complete_sign_in(
    state: &AppState,
    query: &GoogleCallbackQuery,
    expected_state: Option<&str>,
) -> Result<User, AppError> {
    if let Some(error) = &query.error {
        return Err(AppError::OAuth(format!("provider returned error: {error}")));
    }
    if !state.google.is_enabled() {
        return Err(AppError::OAuth("Google sign-in is not configured".to_string()));
    }
    verify_csrf_state(query.state.as_deref(), expected_state)?;

    let code = query
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::OAuth("callback is missing code".to_string()))?;

    let identity = state.google.exchange_code(code).await?;
    state.accounts.find_or_create_federated(&identity).await
}

// =============================================================================
// Helpers
// =============================================================================

/// Generate a random CSRF state token
fn generate_csrf_state() -> String {
    let mut bytes = [0_u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Verify CSRF state from cookie matches callback state
fn verify_csrf_state(received: Option<&str>, expected: Option<&str>) -> Result<(), AppError> {
    match (received, expected) {
        (Some(received), Some(expected)) if !expected.is_empty() && received == expected => Ok(()),
        _ => Err(AppError::OAuth("OAuth state mismatch".to_string())),
    }
}

fn build_oauth_state_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, value))
        .path(OAUTH_STATE_COOKIE_PATH)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(OAUTH_STATE_TTL_MINUTES))
        .build()
}

fn clear_oauth_state_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((OAUTH_STATE_COOKIE, ""))
        .path(OAUTH_STATE_COOKIE_PATH)
        .http_only(true)
        .build();
    cookie.make_removal();
    cookie
}
