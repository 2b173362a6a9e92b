use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Display metadata for the author of a post or comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub name: String,
    pub avatar: String,
}

/// One user's endorsement of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user_id: Uuid,
}

/// Reply attached to a post; never edited after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: Uuid, text: impl Into<String>, author: AuthorProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            text: text.into(),
            name: author.name,
            avatar: author.avatar,
            created_at: Utc::now(),
        }
    }
}

/// Post aggregate: the post together with the likes and comments it owns.
///
/// `likes` and `comments` are both kept most-recent-first. A user appears in
/// `likes` at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(user_id: Uuid, text: impl Into<String>, author: AuthorProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            text: text.into(),
            name: author.name,
            avatar: author.avatar,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.iter().any(|like| like.user_id == user_id)
    }

    pub fn add_like(&mut self, user_id: Uuid) -> Result<()> {
        if self.is_liked_by(user_id) {
            return Err(AppError::AlreadyLiked);
        }
        self.likes.insert(0, Like { user_id });
        Ok(())
    }

    pub fn remove_like(&mut self, user_id: Uuid) -> Result<()> {
        let index = self
            .likes
            .iter()
            .position(|like| like.user_id == user_id)
            .ok_or(AppError::NotLiked)?;
        self.likes.remove(index);
        Ok(())
    }

    pub fn prepend_comment(&mut self, comment: Comment) {
        self.comments.insert(0, comment);
    }

    /// Remove the comment with `comment_id`, provided `actor` wrote it.
    ///
    /// Only the matched comment is removed, so an author with several
    /// comments on the same post keeps the others.
    pub fn remove_comment(&mut self, comment_id: Uuid, actor: Uuid) -> Result<Comment> {
        let index = self
            .comments
            .iter()
            .position(|comment| comment.id == comment_id)
            .ok_or(AppError::CommentNotFound)?;

        if self.comments[index].user_id != actor {
            return Err(AppError::NotAuthorized);
        }

        Ok(self.comments.remove(index))
    }

    pub fn ensure_owner(&self, actor: Uuid) -> Result<()> {
        if self.user_id != actor {
            return Err(AppError::NotAuthorized);
        }
        Ok(())
    }
}
