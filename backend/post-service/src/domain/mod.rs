/// Domain types for posts and accounts
pub mod post;
pub mod user;

pub use post::{AuthorProfile, Comment, Like, Post};
pub use user::{PublicUser, User};
