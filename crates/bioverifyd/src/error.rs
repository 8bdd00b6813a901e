//! Error types for bioverifyd

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bioverify_core::{BioVerifyError, WorkflowError};
use serde::Serialize;
use thiserror::Error;

/// Daemon startup errors
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] bioverify_state::StateError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BioVerifyError> for DaemonError {
    fn from(err: BioVerifyError) -> Self {
        DaemonError::Config(err.to_string())
    }
}

pub type DaemonResult<T> = std::result::Result<T, DaemonError>;

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Server-side misconfiguration; requests fail closed.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotConfigured(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotConfigured(_) => "NOT_CONFIGURED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<BioVerifyError> for ApiError {
    fn from(err: BioVerifyError) -> Self {
        match err {
            BioVerifyError::Configuration(msg) => ApiError::NotConfigured(msg),
            BioVerifyError::Authentication(msg) => ApiError::Unauthorized(msg),
            BioVerifyError::Decode(msg) | BioVerifyError::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::ThreadNotFound { .. } => ApiError::NotFound(err.to_string()),
            WorkflowError::NotInterrupted { .. }
            | WorkflowError::NotRetryable { .. }
            | WorkflowError::WrongInterrupt { .. } => {
                ApiError::Conflict(err.to_string())
            }
            WorkflowError::InvalidResume(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
