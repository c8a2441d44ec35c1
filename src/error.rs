//! HTTP-facing error type with consistent JSON bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::{services::AuthError, validation::FieldViolation};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid request")]
    Validation(Vec<FieldViolation>),

    #[error("email {0} is already registered")]
    DuplicateEmail(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("user not found")]
    UserNotFound,

    #[error("internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::DuplicateEmail(email) => AppError::DuplicateEmail(email),
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::NotFound(_) => AppError::UserNotFound,
            AuthError::Internal(e) => AppError::Internal(e),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldViolation>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(errors) => ErrorBody {
                message: "invalid request".into(),
                errors,
            },
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                ErrorBody {
                    message: "internal server error".into(),
                    errors: Vec::new(),
                }
            }
            other => ErrorBody {
                message: other.to_string(),
                errors: Vec::new(),
            },
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
