//! Error types for the storage layer and the HTTP API
//!
//! Every failure reaches the client as a structured JSON body rather than a
//! bare status code:
//!
//! ```json
//! { "message": "Website with this URL already exists", "code": "duplicate" }
//! ```
//!
//! Failed reachability checks additionally carry `"verificationFailed": true`
//! so the caller can offer to resubmit with `force`.

use std::path::PathBuf;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures while reading or writing one of the JSON files
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors returned by the request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or missing input
    #[error("{0}")]
    Validation(String),

    /// Another record already uses this URL
    #[error("Website with this URL already exists")]
    Duplicate,

    /// No record with the requested id
    #[error("Website not found")]
    NotFound,

    /// The URL did not answer the reachability check; resubmit with `force`
    #[error("Could not verify the website. It may be offline or the URL may be incorrect.")]
    VerificationFailed(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ApiError {
    /// Machine-readable error code included in the response body
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Duplicate => "duplicate",
            ApiError::NotFound => "not_found",
            ApiError::VerificationFailed(_) => "verification_failed",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Storage(_) => "storage",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::VerificationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::Duplicate => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Storage(err) => {
                error!(error = %err, "storage failure");
                json!({
                    "message": "Failed to access website storage",
                    "code": self.code(),
                })
            }
            ApiError::VerificationFailed(_) => json!({
                "message": self.to_string(),
                "code": self.code(),
                "verificationFailed": true,
            }),
            _ => json!({
                "message": self.to_string(),
                "code": self.code(),
            }),
        };

        (self.status(), Json(body)).into_response()
    }
}
