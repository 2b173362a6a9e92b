/// Error types for Post Service
///
/// Every failure a request can hit is one of the variants below. Business
/// outcomes (missing post, duplicate like, foreign comment) are definitive and
/// never retried; `Storage` is the only variant that may be transient.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use crypto_core::jwt::TokenError;
use validator::ValidationErrors;

/// Result type for post-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Status class an error surfaces as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Unauthenticated,
    Rejected,
    Internal,
}

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No token, authorization denied")]
    MissingCredential,

    #[error("Token is not valid")]
    InvalidCredential,

    #[error("Post not found")]
    PostNotFound,

    #[error("Comment does not exist")]
    CommentNotFound,

    #[error("Post already liked")]
    AlreadyLiked,

    #[error("Post has not yet been liked")]
    NotLiked,

    #[error("User not authorized")]
    NotAuthorized,

    #[error("{0}")]
    Validation(String),

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid Credentials")]
    InvalidLogin,

    /// Collaborator failure with an opaque cause
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::PostNotFound | AppError::CommentNotFound => ErrorKind::NotFound,
            AppError::NotAuthorized => ErrorKind::Forbidden,
            AppError::MissingCredential | AppError::InvalidCredential => {
                ErrorKind::Unauthenticated
            }
            AppError::AlreadyLiked
            | AppError::NotLiked
            | AppError::Validation(_)
            | AppError::UserAlreadyExists
            | AppError::InvalidLogin => ErrorKind::Rejected,
            AppError::Storage(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the same request could succeed if repeated later
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Storage(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Rejected => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = match self.kind() {
            ErrorKind::Internal => {
                tracing::error!(error = %self, "request failed");
                "Server Error".to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => AppError::MissingCredential,
            TokenError::Invalid => AppError::InvalidCredential,
            TokenError::Signing(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join(", "))
    }
}
