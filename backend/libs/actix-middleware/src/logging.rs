//! Logging middleware
//!
//! Emits one structured `tracing` event per request once the response is
//! known. Server errors are logged at `warn`, everything else at `info`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::Instant;
use uuid::Uuid;

use crate::jwt_auth::UserId;

/// Middleware that logs HTTP requests and responses
#[derive(Clone, Default)]
pub struct Logging;

impl<S, B> Transform<S, ServiceRequest> for Logging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggingService { service }))
    }
}

pub struct LoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for LoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let request_id = Uuid::new_v4();
        let method = req.method().clone();
        let path = req.path().to_string();
        tracing::debug!(%request_id, method = %method, path = %path, "HTTP request started");

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            let status = res.status().as_u16();
            // Populated by JwtAuthMiddleware when it sits inside this layer
            let user_id = res.request().extensions().get::<UserId>().map(|u| u.0);

            if res.status().is_server_error() {
                tracing::warn!(
                    %request_id,
                    method = %method,
                    path = %path,
                    status,
                    user_id = ?user_id,
                    duration_ms = elapsed_ms,
                    "HTTP request failed"
                );
            } else {
                tracing::info!(
                    %request_id,
                    method = %method,
                    path = %path,
                    status,
                    user_id = ?user_id,
                    duration_ms = elapsed_ms,
                    "HTTP request completed"
                );
            }

            Ok(res)
        })
    }
}
