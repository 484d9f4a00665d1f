//! Blog pages
//!
//! Public reading routes plus the signed-in compose and "my posts" routes.
//! Signed-in routes take [`CurrentUser`], whose rejection redirects
//! anonymous visitors to `/login`.

use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::{CurrentPrincipal, CurrentUser};
use crate::error::AppError;
use crate::views::{self, Viewer};

/// Create blog router
///
/// Routes:
/// - GET / - All posts
/// - GET /about, /contact - Static pages
/// - GET/POST /compose - Composer (signed in)
/// - GET /allblogs - Own posts (signed in)
/// - GET /posts/:title - Single post
pub fn blog_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/compose", get(compose_page).post(compose))
        .route("/allblogs", get(owned_posts))
        .route("/posts/:title", get(show_post))
}

async fn home(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Html<String>, AppError> {
    let posts = state.posts.list_all().await?;
    Ok(Html(views::home_page(
        &state.config.site.title,
        &Viewer::from(&principal),
        &posts,
    )))
}

async fn about(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Html<String> {
    Html(views::about_page(
        &state.config.site.title,
        &Viewer::from(&principal),
    ))
}

async fn contact(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Html<String> {
    Html(views::contact_page(
        &state.config.site.title,
        &Viewer::from(&principal),
    ))
}

/// GET /compose
async fn compose_page(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Html<String> {
    Html(views::compose_page(
        &state.config.site.title,
        &Viewer::from(&user),
    ))
}

/// Composer form body (field names match the form inputs)
#[derive(Debug, Deserialize)]
struct ComposeForm {
    #[serde(rename = "postTitle", default)]
    title: String,
    #[serde(rename = "postBody", default)]
    body: String,
}

/// POST /compose
///
/// The post is persisted before the redirect is issued. Rejected input
/// returns the author to the composer.
async fn compose(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ComposeForm>,
) -> Result<Redirect, AppError> {
    match state.posts.compose(&user, &form.title, &form.body).await {
        Ok(_) => Ok(Redirect::to("/")),
        Err(error @ (AppError::Validation(_) | AppError::DuplicateTitle(_))) => {
            tracing::info!(user_id = %user.id, %error, "Compose rejected");
            Ok(Redirect::to("/compose"))
        }
        Err(error) => Err(error),
    }
}

/// GET /allblogs
async fn owned_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, AppError> {
    let posts = state.posts.list_owned_by(&user).await?;
    Ok(Html(views::owned_posts_page(
        &state.config.site.title,
        &Viewer::from(&user),
        &posts,
    )))
}

/// GET /posts/:title
///
/// A missing title is logged and answered with a 404 page.
async fn show_post(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(title): Path<String>,
) -> Result<Response, AppError> {
    let viewer = Viewer::from(&principal);
    let site_title = &state.config.site.title;

    match state.posts.get_by_title(&title).await {
        Ok(post) => Ok(Html(views::post_page(site_title, &viewer, &post)).into_response()),
        Err(AppError::NotFound) => {
            tracing::info!(%title, "No such post");
            crate::metrics::ERRORS_TOTAL
                .with_label_values(&["not_found"])
                .inc();
            Ok((
                StatusCode::NOT_FOUND,
                Html(views::post_not_found_page(site_title, &viewer, &title)),
            )
                .into_response())
        }
        Err(error) => Err(error),
    }
}
