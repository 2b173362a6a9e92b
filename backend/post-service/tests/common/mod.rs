//! Shared helpers for Post Service HTTP tests
//!
//! Builds application state over in-memory stores with a fixed signing secret,
//! so tests can decode the identities inside issued tokens.
#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use crypto_core::jwt::{JwtConfig, TokenGuard};
use post_service::db::{InMemoryPostRepository, InMemoryUserRepository};
use post_service::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_SECRET: &str = "post-service-test-secret-long-enough";

pub fn guard() -> Arc<TokenGuard> {
    Arc::new(TokenGuard::new(&JwtConfig::new(TEST_SECRET, 3600)))
}

pub fn state() -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
        guard(),
    ))
}

/// Register a user and return their token and id
pub async fn register<S, B>(app: &S, name: &str, email: &str) -> (String, Uuid)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "name": name, "email": email, "password": "secret1" }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().expect("token in body").to_string();
    let user_id = guard()
        .authenticate(Some(&token))
        .expect("issued token should verify");
    (token, user_id)
}

/// Create a post as the token's owner and return its id
pub async fn create_post<S, B>(app: &S, token: &str, text: &str) -> Uuid
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("x-auth-token", token))
        .set_json(json!({ "text": text }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    body["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("post id in body")
}

/// Send a request and return status plus JSON body
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn liker_ids(body: &Value) -> Vec<Uuid> {
    body.as_array()
        .expect("likes array")
        .iter()
        .map(|like| Uuid::parse_str(like["user_id"].as_str().unwrap()).unwrap())
        .collect()
}
