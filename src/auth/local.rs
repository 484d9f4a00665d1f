//! Username/password sign-in, registration and logout

use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::middleware::CurrentPrincipal;
use crate::AppState;
use crate::error::AppError;
use crate::metrics::{REGISTRATIONS_TOTAL, observe_login};
use crate::views::{self, Viewer};

/// Login and registration form body
#[derive(Debug, Deserialize)]
pub(super) struct CredentialsForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// GET /login
pub(super) async fn login_page(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Html<String> {
    Html(views::login_page(
        &state.config.site.title,
        &Viewer::from(&principal),
        state.google.is_enabled(),
    ))
}

/// POST /login
///
/// Failures all land on `/login` with no hint whether the username exists.
pub(super) async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    match state
        .accounts
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            observe_login("local", true);
            let jar = state.sessions.establish(jar, &user).await?;
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(AppError::NotAuthenticated) => {
            observe_login("local", false);
            tracing::info!("Local sign-in rejected");
            Ok(Redirect::to("/login").into_response())
        }
        Err(error) => Err(error),
    }
}

/// GET /register
pub(super) async fn register_page(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Html<String> {
    Html(views::register_page(
        &state.config.site.title,
        &Viewer::from(&principal),
    ))
}

/// POST /register
///
/// Creates the account and signs it in. Conflicts and invalid input send
/// the visitor back to the form without detail.
pub(super) async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    match state.accounts.register(&form.username, &form.password).await {
        Ok(user) => {
            REGISTRATIONS_TOTAL.with_label_values(&["success"]).inc();
            let jar = state.sessions.establish(jar, &user).await?;
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(error @ (AppError::DuplicateIdentifier | AppError::Validation(_))) => {
            REGISTRATIONS_TOTAL
                .with_label_values(&[error.error_type()])
                .inc();
            tracing::info!(reason = error.error_type(), "Registration rejected");
            Ok(Redirect::to("/register").into_response())
        }
        Err(error) => Err(error),
    }
}

/// POST /logout
pub(super) async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let jar = state.sessions.terminate(jar).await?;
    Ok((jar, Redirect::to("/")))
}
