//! Error types for mdash-layout
//!
//! [`LayoutError`] is what the core returns. [`ApiError`] is its HTTP face
//! for handlers that answer failures with a real status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Failures of the layout core
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A store round trip failed; no partial result is produced
    #[error("Query failed ({step}): {source}")]
    Query {
        step: &'static str,
        #[source]
        source: mdash_common::Error,
    },

    /// Entity lookup returned no row
    #[error("Entity not found: {0}")]
    NotFound(Uuid),

    /// Embedded graph layout JSON did not parse
    #[error("Malformed graph layout for metric {metric_id}: {source}")]
    Decode {
        metric_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Request key is neither empty nor a UUID
    #[error("Invalid entity id: {0}")]
    InvalidEntityId(String),
}

impl LayoutError {
    pub(crate) fn query(step: &'static str, source: mdash_common::Error) -> Self {
        Self::Query { step, source }
    }

    /// Status code mirrored into response envelopes
    pub fn status_code(&self) -> StatusCode {
        match self {
            LayoutError::InvalidEntityId(_) => StatusCode::BAD_REQUEST,
            LayoutError::NotFound(_) => StatusCode::NOT_FOUND,
            LayoutError::Query { .. } | LayoutError::Decode { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            LayoutError::Query { .. } => "QUERY_ERROR",
            LayoutError::NotFound(_) => "NOT_FOUND",
            LayoutError::Decode { .. } => "DECODE_ERROR",
            LayoutError::InvalidEntityId(_) => "BAD_REQUEST",
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failure from the layout core, status taken from the error
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Layout(ref err) => (err.status_code(), err.code(), err.to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
