/// Post handlers - HTTP endpoints for posts, likes and comments
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct TextRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
}

impl TextRequest {
    /// Trimmed text, rejected when blank
    fn validated(mut self) -> Result<String> {
        self.text = self.text.trim().to_string();
        self.validate()?;
        Ok(self.text)
    }
}

/// Create a new post
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<TextRequest>,
) -> Result<HttpResponse> {
    let text = req.into_inner().validated()?;
    let post = state.posts.create_post(user_id.0, &text).await?;
    Ok(HttpResponse::Created().json(post))
}

/// List all posts, newest first
pub async fn list_posts(state: web::Data<AppState>, _user_id: UserId) -> Result<HttpResponse> {
    let posts = state.posts.list_posts().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Get a post by ID
pub async fn get_post(
    state: web::Data<AppState>,
    _user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = state.posts.get_post(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post (owner only)
pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.feed.delete_post(post_id.into_inner(), user_id.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "msg": "Post removed" })))
}

pub async fn like_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let likes = state.feed.like(post_id.into_inner(), user_id.0).await?;
    Ok(HttpResponse::Ok().json(likes))
}

pub async fn unlike_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let likes = state.feed.unlike(post_id.into_inner(), user_id.0).await?;
    Ok(HttpResponse::Ok().json(likes))
}

pub async fn add_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<TextRequest>,
) -> Result<HttpResponse> {
    let text = req.into_inner().validated()?;
    let comments = state
        .feed
        .add_comment(post_id.into_inner(), user_id.0, &text)
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Delete a comment (comment author only)
pub async fn delete_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comments = state
        .feed
        .delete_comment(post_id, comment_id, user_id.0)
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}
