//! Error types for Quill
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.
//! Responses are HTML pages or redirects; internal details are logged,
//! never rendered.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Username or federated identity already registered (409)
    #[error("Identifier already registered")]
    DuplicateIdentifier,

    /// Post title already in use (409)
    #[error("A post titled {0:?} already exists")]
    DuplicateTitle(String),

    /// Bad credentials or missing session (redirect to /login)
    #[error("Authentication required")]
    NotAuthenticated,

    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Data store failure (500)
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    /// Identity provider exchange failed (502)
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// HTTP client error (502)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Short label used for metrics and logs
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::DuplicateIdentifier => "duplicate_identifier",
            AppError::DuplicateTitle(_) => "duplicate_title",
            AppError::NotAuthenticated => "not_authenticated",
            AppError::NotFound => "not_found",
            AppError::Validation(_) => "validation",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::OAuth(_) => "oauth",
            AppError::HttpClient(_) => "http_client",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// `NotAuthenticated` becomes a redirect to the login page; every other
    /// variant renders a minimal error page with the mapped status code.
    fn into_response(self) -> Response {
        use crate::metrics::ERRORS_TOTAL;

        ERRORS_TOTAL.with_label_values(&[self.error_type()]).inc();

        let (status, message) = match &self {
            AppError::NotAuthenticated => {
                return Redirect::to("/login").into_response();
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::DuplicateIdentifier | AppError::DuplicateTitle(_) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::OAuth(_) | AppError::HttpClient(_) => {
                tracing::warn!(error = %self, "Upstream identity provider failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "Sign-in provider unavailable".to_string(),
                )
            }
            AppError::StoreUnavailable(_) | AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            }
        };

        (status, Html(crate::views::error_page(status, &message))).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
