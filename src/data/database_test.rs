//! Database tests

use super::*;
use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use crate::error::AppError;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn local_user(username: &str) -> User {
    User {
        id: EntityId::new().0,
        username: Some(username.to_string()),
        password_hash: Some("$argon2id$placeholder".to_string()),
        google_id: None,
        display_name: None,
        created_at: Utc::now(),
    }
}

fn google_user(subject: &str) -> User {
    User {
        id: EntityId::new().0,
        username: None,
        password_hash: None,
        google_id: Some(subject.to_string()),
        display_name: Some("Google Person".to_string()),
        created_at: Utc::now(),
    }
}

fn post_for(owner: &User, title: &str) -> Post {
    Post {
        id: EntityId::new().0,
        title: title.to_string(),
        content: format!("{title} body"),
        owner_id: owner.id.clone(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_user_insert_and_lookup() {
    let (db, _temp_dir) = create_test_db().await;

    let user = local_user("alice");
    db.insert_user(&user).await.unwrap();

    let by_id = db.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(by_id.username.as_deref(), Some("alice"));

    let by_name = db.get_user_by_username("alice").await.unwrap().unwrap();
    assert_eq!(by_name.id, user.id);

    assert!(db.get_user_by_username("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let (db, _temp_dir) = create_test_db().await;

    let first = local_user("alice");
    db.insert_user(&first).await.unwrap();

    let error = db.insert_user(&local_user("alice")).await.unwrap_err();
    assert!(matches!(error, AppError::DuplicateIdentifier));

    let stored = db.get_user_by_username("alice").await.unwrap().unwrap();
    assert_eq!(stored.id, first.id);
}

#[tokio::test]
async fn test_duplicate_google_id_is_rejected() {
    let (db, _temp_dir) = create_test_db().await;

    db.insert_user(&google_user("sub-1")).await.unwrap();
    let error = db.insert_user(&google_user("sub-1")).await.unwrap_err();
    assert!(matches!(error, AppError::DuplicateIdentifier));
    assert_eq!(db.count_users_by_google_id("sub-1").await.unwrap(), 1);
}

#[tokio::test]
async fn test_google_users_may_share_missing_username() {
    let (db, _temp_dir) = create_test_db().await;

    db.insert_user(&google_user("sub-1")).await.unwrap();
    db.insert_user(&google_user("sub-2")).await.unwrap();

    let found = db.get_user_by_google_id("sub-2").await.unwrap().unwrap();
    assert!(found.username.is_none());
}

#[tokio::test]
async fn test_user_without_auth_method_is_rejected() {
    let (db, _temp_dir) = create_test_db().await;

    let mut user = local_user("nobody");
    user.password_hash = None;

    let error = db.insert_user(&user).await.unwrap_err();
    assert!(matches!(error, AppError::StoreUnavailable(_)));
}

#[tokio::test]
async fn test_posts_by_owner_in_insertion_order() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = local_user("alice");
    let bob = local_user("bob");
    db.insert_user(&alice).await.unwrap();
    db.insert_user(&bob).await.unwrap();

    db.insert_post(&post_for(&alice, "First")).await.unwrap();
    db.insert_post(&post_for(&bob, "Other")).await.unwrap();
    db.insert_post(&post_for(&alice, "Second")).await.unwrap();

    let titles: Vec<String> = db
        .get_posts_by_owner(&alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|post| post.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);

    assert_eq!(db.get_all_posts().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_duplicate_post_title_is_rejected() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = local_user("alice");
    db.insert_user(&alice).await.unwrap();
    db.insert_post(&post_for(&alice, "Hello")).await.unwrap();

    let error = db.insert_post(&post_for(&alice, "Hello")).await.unwrap_err();
    assert!(matches!(error, AppError::DuplicateTitle(title) if title == "Hello"));
    assert_eq!(db.get_all_posts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_post_requires_existing_owner() {
    let (db, _temp_dir) = create_test_db().await;

    let ghost = local_user("ghost");
    let error = db.insert_post(&post_for(&ghost, "Orphan")).await.unwrap_err();
    assert!(matches!(error, AppError::StoreUnavailable(_)));
    assert!(db.get_post_by_title("Orphan").await.unwrap().is_none());
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = local_user("alice");
    db.insert_user(&alice).await.unwrap();

    let now = Utc::now();
    let live = SessionRecord {
        token_hash: "live".to_string(),
        user_id: alice.id.clone(),
        created_at: now,
        expires_at: now + Duration::hours(1),
    };
    let stale = SessionRecord {
        token_hash: "stale".to_string(),
        user_id: alice.id.clone(),
        created_at: now - Duration::hours(2),
        expires_at: now - Duration::hours(1),
    };
    db.insert_session(&live).await.unwrap();
    db.insert_session(&stale).await.unwrap();

    let fetched = db.get_session("live").await.unwrap().unwrap();
    assert_eq!(fetched.user_id, alice.id);
    assert!(!fetched.is_expired());

    assert_eq!(db.delete_expired_sessions(now).await.unwrap(), 1);
    assert!(db.get_session("stale").await.unwrap().is_none());

    assert!(db.delete_session("live").await.unwrap());
    assert!(!db.delete_session("live").await.unwrap());
}

#[tokio::test]
async fn test_expired_sessions_compare_mixed_timestamp_formats() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = local_user("alice");
    db.insert_user(&alice).await.unwrap();

    let rows = [
        // Sorts before the cutoff as text, expires after it
        ("later-space", "2024-01-01 12:00:00+00:00"),
        ("later-fraction", "2024-01-01T11:30:00.5+00:00"),
        ("earlier-nanos", "2024-01-01T11:29:59.999999999+00:00"),
        ("earlier-seconds", "2024-01-01T11:00:00+00:00"),
    ];
    for (token_hash, expires_at) in rows {
        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token_hash)
        .bind(&alice.id)
        .bind("2024-01-01T00:00:00+00:00")
        .bind(expires_at)
        .execute(db.pool())
        .await
        .unwrap();
    }

    let cutoff = DateTime::parse_from_rfc3339("2024-01-01T11:30:00Z")
        .unwrap()
        .with_timezone(&Utc);
    assert_eq!(db.delete_expired_sessions(cutoff).await.unwrap(), 2);

    let remaining: Vec<String> =
        sqlx::query_scalar("SELECT token_hash FROM sessions ORDER BY token_hash")
            .fetch_all(db.pool())
            .await
            .unwrap();
    assert_eq!(remaining, vec!["later-fraction", "later-space"]);
}
