//! Post service
//!
//! Composing, listing and looking up posts.

use std::sync::Arc;

use crate::data::{Database, EntityId, Post, User};
use crate::error::AppError;

/// Post service
pub struct PostService {
    db: Arc<Database>,
}

impl PostService {
    /// Create new post service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a post owned by `owner`
    ///
    /// The post and its owner link are written by a single insert.
    ///
    /// # Errors
    /// `Validation` for a blank title or body, `DuplicateTitle` if the
    /// title is already used.
    pub async fn compose(&self, owner: &User, title: &str, content: &str) -> Result<Post, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
        if content.trim().is_empty() {
            return Err(AppError::Validation("content cannot be empty".to_string()));
        }

        let post = Post {
            id: EntityId::new().0,
            title: title.to_string(),
            content: content.to_string(),
            owner_id: owner.id.clone(),
            created_at: chrono::Utc::now(),
        };
        self.db.insert_post(&post).await?;

        crate::metrics::POSTS_CREATED_TOTAL.inc();
        tracing::info!(post_id = %post.id, owner_id = %owner.id, "Post composed");

        Ok(post)
    }

    /// All posts, oldest first
    pub async fn list_all(&self) -> Result<Vec<Post>, AppError> {
        self.db.get_all_posts().await
    }

    /// Posts owned by `owner`, oldest first
    pub async fn list_owned_by(&self, owner: &User) -> Result<Vec<Post>, AppError> {
        self.db.get_posts_by_owner(&owner.id).await
    }

    /// Look up a post by its title
    ///
    /// # Errors
    /// `NotFound` if no post has this title
    pub async fn get_by_title(&self, title: &str) -> Result<Post, AppError> {
        self.db
            .get_post_by_title(title)
            .await?
            .ok_or(AppError::NotFound)
    }
}
