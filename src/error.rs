//! Error types for Mallard
//!
//! This module defines custom error types used throughout the application.
//! Every failure aborts the in-flight request; nothing is retried or
//! downgraded to partial success.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream error: {0}")]
    UpstreamStatus(String),

    #[error("Malformed upstream event: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Session token missing from upstream status response")]
    TokenMissing,

    #[error("Upstream stream ended without a terminal marker")]
    IncompleteStream,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "INVALID_REQUEST",
            AppError::Transport(_) => "UPSTREAM_UNREACHABLE",
            AppError::UpstreamStatus(_) => "UPSTREAM_ERROR",
            AppError::Decode(_) => "UPSTREAM_DECODE_ERROR",
            AppError::TokenMissing => "TOKEN_MISSING",
            AppError::IncompleteStream => "INCOMPLETE_STREAM",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Transport(_)
            | AppError::UpstreamStatus(_)
            | AppError::Decode(_)
            | AppError::TokenMissing
            | AppError::IncompleteStream => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message,
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
