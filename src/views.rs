//! Server-rendered HTML pages
//!
//! Every page receives a [`Viewer`] so the navigation bar can reflect the
//! session state. All user-supplied text goes through `html_escape`.

use axum::http::StatusCode;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::auth::Principal;
use crate::data::{Post, User};

const HOME_STARTING_CONTENT: &str = "Lacus vel facilisis volutpat est velit egestas dui id ornare. Semper auctor neque vitae tempus quam. Sit amet cursus sit amet dictum sit amet justo. Viverra tellus in hac habitasse. Imperdiet proin fermentum leo vel orci porta. Donec ultrices tincidunt arcu non sodales neque sodales ut. Mattis molestie a iaculis at erat pellentesque adipiscing.";
const ABOUT_CONTENT: &str = "Hac habitasse platea dictumst vestibulum rhoncus est pellentesque. Dictumst vestibulum rhoncus est pellentesque elit ullamcorper. Non diam phasellus vestibulum lorem sed. Platea dictumst quisque sagittis purus sit. Egestas sed sed risus pretium quam vulputate dignissim suspendisse.";
const CONTACT_CONTENT: &str = "Scelerisque eleifend donec pretium vulputate sapien. Rhoncus urna neque viverra justo nec ultrices. Arcu dui vivamus arcu felis bibendum. Consectetur adipiscing elit duis tristique. Risus viverra adipiscing at in tellus integer feugiat.";

const EXCERPT_CHARS: usize = 100;

/// Session facts every page needs
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub authenticated: bool,
    pub display_name: Option<String>,
}

impl From<&Principal> for Viewer {
    fn from(principal: &Principal) -> Self {
        Self {
            authenticated: principal.is_authenticated(),
            display_name: principal.display_name().map(ToOwned::to_owned),
        }
    }
}

impl From<&User> for Viewer {
    fn from(user: &User) -> Self {
        Self {
            authenticated: true,
            display_name: user.shown_name().map(ToOwned::to_owned),
        }
    }
}

fn post_href(post: &Post) -> String {
    format!("/posts/{}", urlencoding::encode(&post.title))
}

fn excerpt(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

fn nav(viewer: &Viewer) -> String {
    if viewer.authenticated {
        let name = viewer.display_name.as_deref().unwrap_or("friend");
        format!(
            r#"<li><a href="/compose">Compose</a></li>
      <li><a href="/allblogs">My posts</a></li>
      <li>Signed in as <strong>{}</strong></li>
      <li><form method="post" action="/logout"><button type="submit">Log out</button></form></li>"#,
            encode_text(name)
        )
    } else {
        r#"<li><a href="/login">Log in</a></li>
      <li><a href="/register">Register</a></li>"#
            .to_string()
    }
}

fn layout(site_title: &str, viewer: &Viewer, page_title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{page} - {site}</title>
</head>
<body>
  <header>
    <a href="/">{site}</a>
    <ul>
      <li><a href="/">Home</a></li>
      <li><a href="/about">About</a></li>
      <li><a href="/contact">Contact</a></li>
      {nav}
    </ul>
  </header>
  <main>
{body}
  </main>
</body>
</html>"#,
        page = encode_text(page_title),
        site = encode_text(site_title),
        nav = nav(viewer),
        body = body,
    )
}

fn post_list(posts: &[Post]) -> String {
    if posts.is_empty() {
        return "<p>No posts yet.</p>".to_string();
    }

    posts
        .iter()
        .map(|post| {
            format!(
                r#"<article>
  <h2>{}</h2>
  <p>{} <a href="{}">Read more</a></p>
</article>"#,
                encode_text(&post.title),
                encode_text(&excerpt(&post.content)),
                encode_double_quoted_attribute(&post_href(post)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// GET /
pub fn home_page(site_title: &str, viewer: &Viewer, posts: &[Post]) -> String {
    let body = format!(
        "<h1>Home</h1>\n<p>{}</p>\n{}",
        HOME_STARTING_CONTENT,
        post_list(posts)
    );
    layout(site_title, viewer, "Home", &body)
}

/// GET /about
pub fn about_page(site_title: &str, viewer: &Viewer) -> String {
    let body = format!("<h1>About</h1>\n<p>{ABOUT_CONTENT}</p>");
    layout(site_title, viewer, "About", &body)
}

/// GET /contact
pub fn contact_page(site_title: &str, viewer: &Viewer) -> String {
    let body = format!("<h1>Contact</h1>\n<p>{CONTACT_CONTENT}</p>");
    layout(site_title, viewer, "Contact", &body)
}

/// GET /login
pub fn login_page(site_title: &str, viewer: &Viewer, google_enabled: bool) -> String {
    let google = if google_enabled {
        r#"<p><a href="/auth/google">Sign in with Google</a></p>"#
    } else {
        ""
    };
    let body = format!(
        r#"<h1>Log in</h1>
<form method="post" action="/login">
  <label>Username <input type="text" name="username" required /></label>
  <label>Password <input type="password" name="password" required /></label>
  <button type="submit">Log in</button>
</form>
{google}"#
    );
    layout(site_title, viewer, "Log in", &body)
}

/// GET /register
pub fn register_page(site_title: &str, viewer: &Viewer) -> String {
    let body = r#"<h1>Register</h1>
<form method="post" action="/register">
  <label>Username <input type="text" name="username" required /></label>
  <label>Password <input type="password" name="password" required /></label>
  <button type="submit">Register</button>
</form>"#;
    layout(site_title, viewer, "Register", body)
}

/// GET /compose
pub fn compose_page(site_title: &str, viewer: &Viewer) -> String {
    let body = r#"<h1>Compose</h1>
<form method="post" action="/compose">
  <label>Title <input type="text" name="postTitle" required /></label>
  <label>Post <textarea name="postBody" rows="5" required></textarea></label>
  <button type="submit">Publish</button>
</form>"#;
    layout(site_title, viewer, "Compose", body)
}

/// GET /allblogs
pub fn owned_posts_page(site_title: &str, viewer: &Viewer, posts: &[Post]) -> String {
    let body = format!("<h1>My posts</h1>\n{}", post_list(posts));
    layout(site_title, viewer, "My posts", &body)
}

/// GET /posts/:title
pub fn post_page(site_title: &str, viewer: &Viewer, post: &Post) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>",
        encode_text(&post.title),
        encode_text(&post.content)
    );
    layout(site_title, viewer, &post.title, &body)
}

/// Page for a post title that does not exist
pub fn post_not_found_page(site_title: &str, viewer: &Viewer, title: &str) -> String {
    let body = format!(
        "<h1>Post not found</h1>\n<p>There is no post titled \u{201c}{}\u{201d}.</p>\n<p><a href=\"/\">Back home</a></p>",
        encode_text(title)
    );
    layout(site_title, viewer, "Not found", &body)
}

/// Bare error page used by `AppError`
pub fn error_page(status: StatusCode, message: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8" /><title>{code} {reason}</title></head>
<body>
  <h1>{code} {reason}</h1>
  <p>{message}</p>
  <p><a href="/">Back home</a></p>
</body>
</html>"#,
        code = status.as_u16(),
        reason = reason,
        message = encode_text(message),
    )
}
