//! Response envelope
//!
//! Envelope handlers always answer HTTP 200; `status` carries the outcome.

use axum::http::StatusCode;
use serde::Serialize;

use crate::error::LayoutError;

/// `{status, message, data}` body
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope<T> {
    pub status: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data: None,
        }
    }

    pub fn from_error(err: &LayoutError) -> Self {
        Self::failure(err.status_code(), err.to_string())
    }
}
