use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use chirpy_db::StoreError;
use chirpy_types::api::ErrorResponse;

/// Coarse classification of [`ApiError`], one per HTTP status family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unauthorized,
    Forbidden,
    ValidationFailed,
    StorageFailure,
    Internal,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("chirp not found")]
    PostNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("refresh token not found")]
    TokenNotFound,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("refresh token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("missing credentials")]
    MissingCredentials,

    #[error("forbidden")]
    Forbidden,

    #[error("Chirp is too long")]
    BodyTooLong,

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::PostNotFound | ApiError::UserNotFound | ApiError::TokenNotFound => {
                ErrorKind::NotFound
            }
            ApiError::DuplicateEmail => ErrorKind::Conflict,
            ApiError::InvalidCredentials
            | ApiError::TokenExpired
            | ApiError::InvalidToken(_)
            | ApiError::MissingCredentials => ErrorKind::Unauthorized,
            ApiError::Forbidden => ErrorKind::Forbidden,
            ApiError::BodyTooLong | ApiError::InvalidInput(_) => ErrorKind::ValidationFailed,
            ApiError::Storage(_) => ErrorKind::StorageFailure,
            ApiError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorKind::StorageFailure | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Refresh-token endpoints answer 401 rather than 404 for unknown tokens.
    pub(crate) fn unknown_token_as_unauthorized(self) -> Self {
        match self {
            ApiError::TokenNotFound => ApiError::InvalidToken("unknown refresh token".into()),
            other => other,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            debug!("Request rejected ({}): {}", status, self);
        }

        // Don't leak file paths or internals to clients.
        let message = match self.kind() {
            ErrorKind::StorageFailure | ErrorKind::Internal => "Something went wrong".to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
