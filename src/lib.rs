//! Quill - a small multi-user blogging site
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Layer (Axum)                       │
//! │  - Blog pages (home, compose, posts)                        │
//! │  - Local and Google sign-in                                 │
//! │  - Session extractors                                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Accounts (register, authenticate, find-or-create)        │
//! │  - Posts (compose, list, lookup)                            │
//! │  - Sessions                                                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx): users, posts, sessions                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: blog page handlers and the metrics endpoint
//! - `auth`: sign-in flows, password hashing, sessions
//! - `service`: business logic layer
//! - `data`: database layer
//! - `views`: HTML rendering
//! - `config`: configuration management
//! - `error`: error types

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;
pub mod views;

use std::sync::Arc;

/// Maximum accepted request body (form posts)
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across all handlers
///
/// Every service is constructed once at startup and handed to the router;
/// cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Local and federated accounts
    pub accounts: Arc<service::AccountService>,

    /// Post store operations
    pub posts: Arc<service::PostService>,

    /// Session issue/resolve
    pub sessions: Arc<auth::SessionManager>,

    /// Google OAuth client
    pub google: Arc<auth::GoogleClient>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database
    /// 2. Initialize HTTP client
    /// 3. Construct services
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        // 1. Connect to SQLite database
        let db = Arc::new(data::Database::connect(&config.database.path).await?);

        // 2. Initialize HTTP client
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("Quill/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        // 3. Construct services
        let state = Self {
            accounts: Arc::new(service::AccountService::new(db.clone())),
            posts: Arc::new(service::PostService::new(db.clone())),
            sessions: Arc::new(auth::SessionManager::new(db.clone(), &config)),
            google: Arc::new(auth::GoogleClient::new(&config, http_client)),
            config: Arc::new(config),
            db,
        };

        tracing::info!(
            google_enabled = state.google.is_enabled(),
            "Application state initialized successfully"
        );

        Ok(state)
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, middleware};
    use tower::ServiceBuilder;
    use tower_http::{
        compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
    };

    let metrics = api::metrics_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_session,
    ));

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(auth::auth_router())
        .merge(api::blog_router())
        .merge(metrics)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
