//! Shared credential primitives for DevConnect services
//!
//! - `jwt`: signed, time-bounded identity tokens (`TokenGuard`)
//! - `password`: Argon2id password hashing

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtConfig, TokenError, TokenGuard};
pub use password::{hash_password, verify_password, PasswordError};
