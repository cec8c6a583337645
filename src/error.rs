// src/error.rs
//! Typed errors for calls against the recruiting API

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not authenticated: no access token in storage")]
    NotAuthenticated,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} error: {message}")]
    Status { status: StatusCode, message: String },

    #[error("email verification rejected")]
    VerificationRejected,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Map a non-success status and its body to an error
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Status { status, message },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::NotAuthenticated)
    }
}

/// Pull the human-readable message out of an API error body.
///
/// The API answers with `{"error": ...}`, `{"detail": ...}` or `{"message": ...}`
/// depending on the endpoint; anything else is returned verbatim.
fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    if body.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        body.trim().to_string()
    }
}
