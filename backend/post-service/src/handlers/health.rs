use actix_web::{web, HttpResponse};

use crate::AppState;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "post-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready once the post store answers
pub async fn ready(state: web::Data<AppState>) -> HttpResponse {
    match state.posts.ready().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ready": true })),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "ready": false,
                "error": "storage unavailable",
            }))
        }
    }
}
