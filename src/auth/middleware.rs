//! Authentication extractors and middleware
//!
//! Each request resolves its principal once; the result is cached in the
//! request extensions so later extractors reuse it.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{Request, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use super::session::Principal;
use crate::AppState;
use crate::data::User;
use crate::error::AppError;

async fn principal_from_parts(parts: &mut Parts, state: &AppState) -> Result<Principal, AppError> {
    if let Some(principal) = parts.extensions.get::<Principal>().cloned() {
        return Ok(principal);
    }

    let jar = CookieJar::from_headers(&parts.headers);
    let principal = state.sessions.resolve(&jar).await?;
    parts.extensions.insert(principal.clone());

    Ok(principal)
}

/// Extractor for the request principal, authenticated or not
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentPrincipal(principal): CurrentPrincipal) -> impl IntoResponse {
///     format!("signed in: {}", principal.is_authenticated())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        Ok(CurrentPrincipal(
            principal_from_parts(parts, &app_state).await?,
        ))
    }
}

/// Extractor for an authenticated user
///
/// Anonymous requests are rejected with `NotAuthenticated`, which renders
/// as a redirect to `/login`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        match principal_from_parts(parts, &app_state).await? {
            Principal::Authenticated(user) => Ok(CurrentUser(user)),
            Principal::Anonymous => Err(AppError::NotAuthenticated),
        }
    }
}

/// Middleware for non-page endpoints that answer anonymous callers with 401
///
/// # Usage
/// ```ignore
/// let protected = Router::new()
///     .route("/metrics", get(metrics_handler))
///     .layer(middleware::from_fn_with_state(state, require_session));
/// ```
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match state.sessions.resolve(&jar).await {
        Ok(principal @ Principal::Authenticated(_)) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Ok(Principal::Anonymous) => StatusCode::UNAUTHORIZED.into_response(),
        Err(error) => error.into_response(),
    }
}
