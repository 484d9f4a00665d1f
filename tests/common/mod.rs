//! Common test utilities for E2E tests
#![allow(dead_code)]

use axum::{
    Form, Json, Router,
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use quill::{AppState, config};
use serde::Deserialize;
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const GOOGLE_CLIENT_ID: &str = "test-client-id";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server with a stubbed Google provider
    pub async fn new() -> Self {
        let google_addr = spawn_google_stub().await;

        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig { path: db_path },
            auth: config::AuthConfig {
                session_secret: "test-secret-key-that-is-32-bytes!!".to_string(),
                session_max_age: 604800,
                google: config::GoogleOAuthConfig {
                    client_id: GOOGLE_CLIENT_ID.to_string(),
                    client_secret: "test-client-secret".to_string(),
                    callback_url: None,
                    authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
                    token_url: format!("{google_addr}/token"),
                    userinfo_url: format!("{google_addr}/userinfo"),
                },
            },
            site: config::SiteConfig {
                title: "Test Journal".to_string(),
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        quill::metrics::init_metrics();
        let state = AppState::new(config).await.unwrap();

        // Redirects are asserted on, never followed
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        let app = quill::build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// POST a form, optionally carrying a session cookie
    pub async fn post_form(
        &self,
        path: &str,
        session: Option<&str>,
        form: &[(&str, &str)],
    ) -> reqwest::Response {
        let mut request = self.client.post(self.url(path)).form(form);
        if let Some(session) = session {
            request = request.header(header::COOKIE, format!("session={session}"));
        }
        request.send().await.unwrap()
    }

    /// GET a page, optionally carrying a session cookie
    pub async fn get(&self, path: &str, session: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(session) = session {
            request = request.header(header::COOKIE, format!("session={session}"));
        }
        request.send().await.unwrap()
    }

    /// Register an account and return its session cookie value
    pub async fn register(&self, username: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/register",
                None,
                &[("username", username), ("password", password)],
            )
            .await;
        assert_eq!(location(&response), Some("/"));
        cookie_value(&response, "session").expect("session cookie")
    }

    /// Log in and return the session cookie value
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/login",
                None,
                &[("username", username), ("password", password)],
            )
            .await;
        assert_eq!(location(&response), Some("/"));
        cookie_value(&response, "session").expect("session cookie")
    }
}

/// Location header of a redirect response
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Value of a cookie set by the response
pub fn cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    set_cookie_header(response, name).map(|raw| {
        raw[name.len() + 1..]
            .split(';')
            .next()
            .unwrap_or_default()
            .to_string()
    })
}

/// Raw Set-Cookie header for a cookie name
pub fn set_cookie_header(response: &reqwest::Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(ToOwned::to_owned)
}

// =============================================================================
// Google stub
// =============================================================================

#[derive(Deserialize)]
struct TokenForm {
    code: String,
    client_id: String,
    grant_type: String,
}

/// Spawn a stand-in for Google's token and userinfo endpoints
///
/// The code `person-1` yields the access token `token-person-1`, whose
/// userinfo subject is `google-person-1`. The code `broken` is refused.
async fn spawn_google_stub() -> String {
    let app = Router::new()
        .route("/token", post(stub_token))
        .route("/userinfo", get(stub_userinfo));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn stub_token(Form(form): Form<TokenForm>) -> (StatusCode, Json<serde_json::Value>) {
    if form.code == "broken"
        || form.client_id != GOOGLE_CLIENT_ID
        || form.grant_type != "authorization_code"
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "access_token": format!("token-{}", form.code),
            "token_type": "Bearer",
            "expires_in": 3600,
        })),
    )
}

async fn stub_userinfo(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
    let person = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer token-"));

    match person {
        Some(person) => (
            StatusCode::OK,
            Json(json!({
                "sub": format!("google-{person}"),
                "name": format!("Google {person}"),
            })),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_token" })),
        ),
    }
}
