/// Post Service Library
///
/// Social feed backend: accounts, posts, likes and comments.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `domain`: Post aggregate and account types
/// - `services`: Business logic layer (feed mutations, post reads, accounts)
/// - `db`: Repository traits with PostgreSQL and in-memory adapters
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod services;

use crypto_core::jwt::TokenGuard;
use std::sync::Arc;

use db::{PostRepository, UserRepository};
use services::{AccountService, FeedAggregate, PostService};

pub use config::Config;
pub use error::{AppError, Result};

/// Shared state handed to every handler
pub struct AppState {
    pub feed: Arc<FeedAggregate>,
    pub posts: Arc<PostService>,
    pub accounts: Arc<AccountService>,
    pub guard: Arc<TokenGuard>,
}

impl AppState {
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        user_repo: Arc<dyn UserRepository>,
        guard: Arc<TokenGuard>,
    ) -> Self {
        Self {
            feed: Arc::new(FeedAggregate::new(post_repo.clone(), user_repo.clone())),
            posts: Arc::new(PostService::new(post_repo, user_repo.clone())),
            accounts: Arc::new(AccountService::new(user_repo, guard.clone())),
            guard,
        }
    }
}
