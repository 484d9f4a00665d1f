//! E2E tests for composing and reading posts

mod common;

use common::{TestServer, location};

#[tokio::test]
async fn test_compose_and_read_back() {
    let server = TestServer::new().await;
    server.register("alice", "pw1").await;
    let session = server.login("alice", "pw1").await;

    let response = server
        .post_form(
            "/compose",
            Some(&session),
            &[("postTitle", "Hello"), ("postBody", "World")],
        )
        .await;
    assert_eq!(location(&response), Some("/"));

    let home = server.get("/", None).await.text().await.unwrap();
    assert!(home.contains("<h2>Hello</h2>"));
    assert!(home.contains(r#"href="/posts/Hello""#));

    let mine = server.get("/allblogs", Some(&session)).await;
    assert_eq!(mine.status(), 200);
    let mine = mine.text().await.unwrap();
    assert!(mine.contains("<h2>Hello</h2>"));
    assert_eq!(mine.matches("<article>").count(), 1);

    let post = server.get("/posts/Hello", None).await;
    assert_eq!(post.status(), 200);
    let body = post.text().await.unwrap();
    assert!(body.contains("<h1>Hello</h1>"));
    assert!(body.contains("<p>World</p>"));
}

#[tokio::test]
async fn test_own_posts_exclude_other_authors() {
    let server = TestServer::new().await;
    let alice = server.register("alice", "pw1").await;
    let bob = server.register("bob", "pw2").await;

    server
        .post_form(
            "/compose",
            Some(&alice),
            &[("postTitle", "From Alice"), ("postBody", "a")],
        )
        .await;
    server
        .post_form(
            "/compose",
            Some(&bob),
            &[("postTitle", "From Bob"), ("postBody", "b")],
        )
        .await;

    let mine = server
        .get("/allblogs", Some(&bob))
        .await
        .text()
        .await
        .unwrap();
    assert!(mine.contains("From Bob"));
    assert!(!mine.contains("From Alice"));

    let home = server.get("/", None).await.text().await.unwrap();
    assert!(home.contains("From Alice"));
    assert!(home.contains("From Bob"));
}

#[tokio::test]
async fn test_anonymous_compose_redirects_to_login() {
    let server = TestServer::new().await;

    let response = server.get("/compose", None).await;
    assert_eq!(location(&response), Some("/login"));

    let response = server
        .post_form(
            "/compose",
            None,
            &[("postTitle", "Sneaky"), ("postBody", "nope")],
        )
        .await;
    assert_eq!(location(&response), Some("/login"));

    let response = server.get("/allblogs", None).await;
    assert_eq!(location(&response), Some("/login"));

    assert!(server.state.db.get_all_posts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_post_renders_404_page() {
    let server = TestServer::new().await;

    let response = server.get("/posts/Nowhere", None).await;

    assert_eq!(response.status(), 404);
    let body = response.text().await.unwrap();
    assert!(body.contains("Post not found"));
    assert!(body.contains("Nowhere"));
}

#[tokio::test]
async fn test_duplicate_title_returns_to_composer() {
    let server = TestServer::new().await;
    let session = server.register("alice", "pw1").await;

    server
        .post_form(
            "/compose",
            Some(&session),
            &[("postTitle", "Same"), ("postBody", "first")],
        )
        .await;
    let response = server
        .post_form(
            "/compose",
            Some(&session),
            &[("postTitle", "Same"), ("postBody", "second")],
        )
        .await;

    assert_eq!(location(&response), Some("/compose"));
    let body = server
        .get("/posts/Same", None)
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("first"));
    assert!(!body.contains("second"));
}

#[tokio::test]
async fn test_titles_with_spaces_are_reachable() {
    let server = TestServer::new().await;
    let session = server.register("alice", "pw1").await;

    server
        .post_form(
            "/compose",
            Some(&session),
            &[("postTitle", "Two Words"), ("postBody", "body")],
        )
        .await;

    let home = server.get("/", None).await.text().await.unwrap();
    assert!(home.contains(r#"href="/posts/Two%20Words""#));

    let response = server.get("/posts/Two%20Words", None).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_post_content_is_escaped() {
    let server = TestServer::new().await;
    let session = server.register("mallory", "pw").await;

    server
        .post_form(
            "/compose",
            Some(&session),
            &[("postTitle", "xss"), ("postBody", "<script>alert(1)</script>")],
        )
        .await;

    let body = server.get("/posts/xss", None).await.text().await.unwrap();
    assert!(!body.contains("<script>alert(1)</script>"));
    assert!(body.contains("&lt;script&gt;"));
}
