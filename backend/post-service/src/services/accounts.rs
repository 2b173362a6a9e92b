/// Account service - registration, login and identity lookup
use crypto_core::jwt::TokenGuard;
use crypto_core::password::{self, PasswordError};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::UserRepository;
use crate::domain::user::normalize_email;
use crate::domain::{PublicUser, User};
use crate::error::{AppError, Result};

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    guard: Arc<TokenGuard>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, guard: Arc<TokenGuard>) -> Self {
        Self { users, guard }
    }

    /// Create an account and return a token for it
    pub async fn register(&self, name: &str, email: &str, plain_password: &str) -> Result<String> {
        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }

        let password_hash = password::hash_password(plain_password)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let user = User::new(name.trim(), &email, password_hash);

        // Lost a race with a concurrent registration for the same email
        if !self.users.insert_user(&user).await? {
            return Err(AppError::UserAlreadyExists);
        }

        tracing::info!(user_id = %user.id, "user registered");
        Ok(self.guard.issue(user.id)?)
    }

    /// Check credentials and return a fresh token
    pub async fn login(&self, email: &str, plain_password: &str) -> Result<String> {
        let email = normalize_email(email);
        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                tracing::debug!("login for unknown email");
                return Err(AppError::InvalidLogin);
            }
        };

        match password::verify_password(plain_password, &user.password_hash) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => {
                tracing::debug!(user_id = %user.id, "login with wrong password");
                return Err(AppError::InvalidLogin);
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "stored hash for user {} unusable: {}",
                    user.id, e
                )))
            }
        }

        Ok(self.guard.issue(user.id)?)
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<PublicUser> {
        // A valid token for a vanished account is no longer a valid identity
        self.users
            .find_by_id(user_id)
            .await?
            .map(PublicUser::from)
            .ok_or(AppError::InvalidCredential)
    }
}
