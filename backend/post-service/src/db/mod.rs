/// Persistence collaborators for Post Service
///
/// The services only see the traits below. `Pg*` adapters back them with
/// PostgreSQL; `memory` holds process-local stores used when no database is
/// configured and by the test suite.
use anyhow::Result;
use uuid::Uuid;

use crate::domain::{AuthorProfile, Post, User};

pub mod memory;
pub mod post_repo;
pub mod user_repo;

pub use memory::{InMemoryPostRepository, InMemoryUserRepository};
pub use post_repo::PgPostRepository;
pub use user_repo::PgUserRepository;

/// Storage for whole post aggregates
#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    /// Fetch a post with its likes and comments
    async fn fetch_post(&self, id: Uuid) -> Result<Option<Post>>;

    /// Insert or replace the whole aggregate
    async fn save_post(&self, post: &Post) -> Result<()>;

    /// Remove a post and everything it owns
    async fn delete_post(&self, id: Uuid) -> Result<()>;

    /// All posts, newest first
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Readiness probe
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Account storage, also the source of author display metadata
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Lookup by normalised email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Store a new account. Returns `false` when the email is already taken.
    async fn insert_user(&self, user: &User) -> Result<bool>;

    async fn find_profile(&self, id: Uuid) -> Result<Option<AuthorProfile>> {
        Ok(self.find_by_id(id).await?.map(|user| user.profile()))
    }
}
