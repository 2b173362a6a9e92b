use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, header::HeaderMap, StatusCode},
    Error, HttpMessage, HttpResponse, ResponseError,
};
use crypto_core::jwt::{TokenError, TokenGuard};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

/// Header carrying the raw token, checked before `Authorization`
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// User ID extracted from a verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// 401 response for requests that fail token authentication
#[derive(Debug)]
pub struct AuthRejection(pub TokenError);

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for AuthRejection {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            TokenError::Missing | TokenError::Invalid => StatusCode::UNAUTHORIZED,
            TokenError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

/// Token Authentication Middleware
///
/// Runs [`TokenGuard::authenticate`] on every request. The credential is read
/// from `x-auth-token`, falling back to `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    guard: Arc<TokenGuard>,
}

impl JwtAuthMiddleware {
    pub fn new(guard: Arc<TokenGuard>) -> Self {
        Self { guard }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            guard: self.guard.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    guard: Arc<TokenGuard>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let guard = self.guard.clone();

        Box::pin(async move {
            let outcome = raw_credential(req.headers()).and_then(|raw| guard.authenticate(raw));

            match outcome {
                Ok(user_id) => {
                    req.extensions_mut().insert(UserId(user_id));
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    tracing::debug!(path = %req.path(), error = %err, "request rejected by token guard");
                    let response = AuthRejection(err).error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Pull the raw credential out of the request headers.
///
/// A header that is present but not valid UTF-8 counts as a malformed
/// credential rather than a missing one.
fn raw_credential(headers: &HeaderMap) -> Result<Option<&str>, TokenError> {
    if let Some(value) = headers.get(AUTH_TOKEN_HEADER) {
        return value.to_str().map(Some).map_err(|_| TokenError::Invalid);
    }

    match headers.get(header::AUTHORIZATION) {
        Some(value) => {
            let value = value.to_str().map_err(|_| TokenError::Invalid)?;
            Ok(Some(value.strip_prefix("Bearer ").unwrap_or(value)))
        }
        None => Ok(None),
    }
}

/// FromRequest implementation for UserId
impl actix_web::FromRequest for UserId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<UserId>() {
            Some(user_id) => ready(Ok(*user_id)),
            None => ready(Err(AuthRejection(TokenError::Missing).into())),
        }
    }
}
