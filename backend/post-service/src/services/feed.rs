/// Feed aggregate - likes, comments and deletion for a single post
///
/// Every mutation runs fetch, mutate, persist while holding the post's entry
/// in [`PostLocks`], so concurrent requests against one post cannot lose each
/// other's updates. Posts are never cached between calls; the repository is
/// the only source of truth.
use anyhow::anyhow;
use std::sync::Arc;
use uuid::Uuid;

use super::post_locks::PostLocks;
use crate::db::{PostRepository, UserRepository};
use crate::domain::{Comment, Like, Post};
use crate::error::{AppError, Result};

pub struct FeedAggregate {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    locks: PostLocks,
}

impl FeedAggregate {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            posts,
            users,
            locks: PostLocks::new(),
        }
    }

    async fn load(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .fetch_post(post_id)
            .await?
            .ok_or(AppError::PostNotFound)
    }

    /// Like a post. Liking twice is an error, not a no-op.
    pub async fn like(&self, post_id: Uuid, actor: Uuid) -> Result<Vec<Like>> {
        let _lock = self.locks.acquire(post_id).await;
        let mut post = self.load(post_id).await?;

        if let Err(err) = post.add_like(actor) {
            tracing::debug!(%post_id, user_id = %actor, "duplicate like rejected");
            return Err(err);
        }
        self.posts.save_post(&post).await?;

        tracing::info!(%post_id, user_id = %actor, likes = post.likes.len(), "post liked");
        Ok(post.likes)
    }

    pub async fn unlike(&self, post_id: Uuid, actor: Uuid) -> Result<Vec<Like>> {
        let _lock = self.locks.acquire(post_id).await;
        let mut post = self.load(post_id).await?;

        if let Err(err) = post.remove_like(actor) {
            tracing::debug!(%post_id, user_id = %actor, "unlike without like rejected");
            return Err(err);
        }
        self.posts.save_post(&post).await?;

        tracing::info!(%post_id, user_id = %actor, likes = post.likes.len(), "post unliked");
        Ok(post.likes)
    }

    /// Add a comment at the front of the post's comment list.
    ///
    /// `text` is expected to be validated by the caller.
    pub async fn add_comment(&self, post_id: Uuid, actor: Uuid, text: &str) -> Result<Vec<Comment>> {
        let _lock = self.locks.acquire(post_id).await;
        let mut post = self.load(post_id).await?;

        let author = self
            .users
            .find_profile(actor)
            .await?
            .ok_or_else(|| AppError::Storage(anyhow!("no profile for user {actor}")))?;

        let comment = Comment::new(actor, text, author);
        let comment_id = comment.id;
        post.prepend_comment(comment);
        self.posts.save_post(&post).await?;

        tracing::info!(%post_id, %comment_id, user_id = %actor, "comment added");
        Ok(post.comments)
    }

    pub async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        actor: Uuid,
    ) -> Result<Vec<Comment>> {
        let _lock = self.locks.acquire(post_id).await;
        let mut post = self.load(post_id).await?;

        if let Err(err) = post.remove_comment(comment_id, actor) {
            tracing::warn!(%post_id, %comment_id, user_id = %actor, error = %err, "comment deletion rejected");
            return Err(err);
        }
        self.posts.save_post(&post).await?;

        tracing::info!(%post_id, %comment_id, user_id = %actor, "comment deleted");
        Ok(post.comments)
    }

    /// Delete a post with all of its likes and comments. Only the owner may.
    pub async fn delete_post(&self, post_id: Uuid, actor: Uuid) -> Result<()> {
        let _lock = self.locks.acquire(post_id).await;
        let post = self.load(post_id).await?;

        if let Err(err) = post.ensure_owner(actor) {
            tracing::warn!(%post_id, user_id = %actor, "post deletion by non-owner rejected");
            return Err(err);
        }
        self.posts.delete_post(post_id).await?;

        tracing::info!(%post_id, user_id = %actor, "post deleted");
        Ok(())
    }

    #[cfg(test)]
    fn live_locks(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InMemoryPostRepository, InMemoryUserRepository};
    use crate::domain::{AuthorProfile, User};

    struct Fixture {
        feed: Arc<FeedAggregate>,
        posts: Arc<InMemoryPostRepository>,
        users: Arc<InMemoryUserRepository>,
    }

    impl Fixture {
        fn new() -> Self {
            let posts = Arc::new(InMemoryPostRepository::new());
            let users = Arc::new(InMemoryUserRepository::new());
            let feed = Arc::new(FeedAggregate::new(posts.clone(), users.clone()));
            Self { feed, posts, users }
        }

        async fn user(&self, name: &str) -> Uuid {
            let user = User::new(name, &format!("{name}@example.com"), "hash".to_string());
            self.users.insert_user(&user).await.unwrap();
            user.id
        }

        async fn post(&self, owner: Uuid) -> Uuid {
            let post = Post::new(
                owner,
                "first post",
                AuthorProfile {
                    name: "owner".to_string(),
                    avatar: "avatar".to_string(),
                },
            );
            self.posts.save_post(&post).await.unwrap();
            post.id
        }
    }

    struct FailingPosts;

    #[async_trait::async_trait]
    impl PostRepository for FailingPosts {
        async fn fetch_post(&self, _id: Uuid) -> anyhow::Result<Option<Post>> {
            Err(anyhow!("connection refused"))
        }
        async fn save_post(&self, _post: &Post) -> anyhow::Result<()> {
            Err(anyhow!("connection refused"))
        }
        async fn delete_post(&self, _id: Uuid) -> anyhow::Result<()> {
            Err(anyhow!("connection refused"))
        }
        async fn list_posts(&self) -> anyhow::Result<Vec<Post>> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_like_twice_fails() {
        let fx = Fixture::new();
        let owner = fx.user("owner").await;
        let post_id = fx.post(owner).await;

        let likes = fx.feed.like(post_id, owner).await.unwrap();
        assert_eq!(likes, vec![Like { user_id: owner }]);

        assert!(matches!(
            fx.feed.like(post_id, owner).await,
            Err(AppError::AlreadyLiked)
        ));
        let stored = fx.posts.fetch_post(post_id).await.unwrap().unwrap();
        assert_eq!(stored.likes, vec![Like { user_id: owner }]);
    }

    #[tokio::test]
    async fn test_like_missing_post() {
        let fx = Fixture::new();
        assert!(matches!(
            fx.feed.like(Uuid::new_v4(), Uuid::new_v4()).await,
            Err(AppError::PostNotFound)
        ));
    }

    #[tokio::test]
    async fn test_unlike_keeps_unrelated_likes() {
        let fx = Fixture::new();
        let owner = fx.user("owner").await;
        let fan = fx.user("fan").await;
        let post_id = fx.post(owner).await;
        fx.feed.like(post_id, fan).await.unwrap();

        assert!(matches!(
            fx.feed.unlike(post_id, owner).await,
            Err(AppError::NotLiked)
        ));

        fx.feed.like(post_id, owner).await.unwrap();
        let likes = fx.feed.unlike(post_id, owner).await.unwrap();
        assert_eq!(likes, vec![Like { user_id: fan }]);
    }

    #[tokio::test]
    async fn test_add_comment_prepends_with_profile() {
        let fx = Fixture::new();
        let owner = fx.user("owner").await;
        let post_id = fx.post(owner).await;

        fx.feed.add_comment(post_id, owner, "one").await.unwrap();
        fx.feed.add_comment(post_id, owner, "two").await.unwrap();
        let comments = fx.feed.add_comment(post_id, owner, "three").await.unwrap();

        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["three", "two", "one"]);
        assert_eq!(comments[0].name, "owner");
        assert!(comments[0].avatar.starts_with("https://www.gravatar.com/avatar/"));
    }

    #[tokio::test]
    async fn test_add_comment_without_profile_is_storage_error() {
        let fx = Fixture::new();
        let owner = fx.user("owner").await;
        let post_id = fx.post(owner).await;

        let err = fx
            .feed
            .add_comment(post_id, Uuid::new_v4(), "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(fx
            .posts
            .fetch_post(post_id)
            .await
            .unwrap()
            .unwrap()
            .comments
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_comment_rules() {
        let fx = Fixture::new();
        let owner = fx.user("owner").await;
        let other = fx.user("other").await;
        let post_id = fx.post(owner).await;

        fx.feed.add_comment(post_id, owner, "mine one").await.unwrap();
        let comments = fx.feed.add_comment(post_id, owner, "mine two").await.unwrap();
        let target = comments[1].id;
        fx.feed.add_comment(post_id, other, "theirs").await.unwrap();

        // other owns a comment on this post, but not this one
        assert!(matches!(
            fx.feed.delete_comment(post_id, target, other).await,
            Err(AppError::NotAuthorized)
        ));
        assert!(matches!(
            fx.feed.delete_comment(post_id, Uuid::new_v4(), owner).await,
            Err(AppError::CommentNotFound)
        ));

        let remaining = fx.feed.delete_comment(post_id, target, owner).await.unwrap();
        let texts: Vec<&str> = remaining.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["theirs", "mine two"]);
    }

    #[tokio::test]
    async fn test_delete_post_owner_only() {
        let fx = Fixture::new();
        let owner = fx.user("owner").await;
        let other = fx.user("other").await;
        let post_id = fx.post(owner).await;
        fx.feed.like(post_id, other).await.unwrap();
        fx.feed.add_comment(post_id, other, "hi").await.unwrap();

        assert!(matches!(
            fx.feed.delete_post(post_id, other).await,
            Err(AppError::NotAuthorized)
        ));

        fx.feed.delete_post(post_id, owner).await.unwrap();
        assert!(fx.posts.fetch_post(post_id).await.unwrap().is_none());

        // Deletion is terminal
        assert!(matches!(
            fx.feed.like(post_id, owner).await,
            Err(AppError::PostNotFound)
        ));
        assert!(matches!(
            fx.feed.delete_post(post_id, owner).await,
            Err(AppError::PostNotFound)
        ));
        assert_eq!(fx.feed.live_locks(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_likes_are_not_lost() {
        let fx = Fixture::new();
        let owner = fx.user("owner").await;
        let post_id = fx.post(owner).await;

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let feed = fx.feed.clone();
                tokio::spawn(async move { feed.like(post_id, Uuid::new_v4()).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = fx.posts.fetch_post(post_id).await.unwrap().unwrap();
        assert_eq!(stored.likes.len(), 32);
    }

    #[tokio::test]
    async fn test_storage_failures_are_wrapped() {
        let feed = FeedAggregate::new(
            Arc::new(FailingPosts),
            Arc::new(InMemoryUserRepository::new()),
        );

        let err = feed.like(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(err.is_transient());
    }
}
