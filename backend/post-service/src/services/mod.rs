/// Business logic layer for Post Service
pub mod accounts;
pub mod feed;
pub mod post_locks;
pub mod posts;

pub use accounts::AccountService;
pub use feed::FeedAggregate;
pub use post_locks::PostLocks;
pub use posts::PostService;
