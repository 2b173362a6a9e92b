/// Post service - creation and reads
use anyhow::anyhow;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{PostRepository, UserRepository};
use crate::domain::Post;
use crate::error::{AppError, Result};

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Create a post stamped with the author's current name and avatar
    pub async fn create_post(&self, actor: Uuid, text: &str) -> Result<Post> {
        let author = self
            .users
            .find_profile(actor)
            .await?
            .ok_or_else(|| AppError::Storage(anyhow!("no profile for user {actor}")))?;

        let post = Post::new(actor, text, author);
        self.posts.save_post(&post).await?;

        tracing::info!(post_id = %post.id, user_id = %actor, "post created");
        Ok(post)
    }

    /// All posts, newest first
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.list_posts().await?)
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .fetch_post(post_id)
            .await?
            .ok_or(AppError::PostNotFound)
    }

    /// Whether the post store is reachable
    pub async fn ready(&self) -> Result<()> {
        Ok(self.posts.ping().await?)
    }
}
