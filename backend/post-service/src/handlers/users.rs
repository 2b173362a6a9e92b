/// Account handlers - registration, login and current user
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Please enter a password with 6 or more characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Register a new account
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let mut req = req.into_inner();
    req.name = req.name.trim().to_string();
    req.validate()?;

    let token = state
        .accounts
        .register(&req.name, &req.email, &req.password)
        .await?;
    Ok(HttpResponse::Created().json(TokenResponse { token }))
}

/// Exchange email and password for a token
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let token = state.accounts.login(&req.email, &req.password).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

pub async fn current_user(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let user = state.accounts.current_user(user_id.0).await?;
    Ok(HttpResponse::Ok().json(user))
}
