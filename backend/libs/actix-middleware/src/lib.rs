//! # Actix Middleware Library
//!
//! Unified middleware components for DevConnect Actix services
//!
//! ## Modules
//! - `jwt_auth`: token authentication middleware backed by `crypto_core::TokenGuard`
//! - `logging`: structured request logging

pub mod jwt_auth;
pub mod logging;

pub use jwt_auth::{AuthRejection, JwtAuthMiddleware, UserId, AUTH_TOKEN_HEADER};
pub use logging::Logging;
