//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::responses::ErrorEnvelope;

/// Message returned to clients in place of internal error details
const GENERIC_SERVER_ERROR: &str = "Internal Server Error";

/// Result type alias using the service error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the service
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A dataset could not be loaded
    #[error("Dataset '{name}' unavailable: {reason}")]
    DataUnavailable {
        /// Dataset name
        name: String,
        /// What went wrong
        reason: String,
    },

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Bad request
    #[error("{0}")]
    BadRequest(String),

    /// Client exceeded its request quota
    #[error("{0}")]
    TooManyRequests(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a 404 with the given message
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Shorthand for a 400 with the given message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Config(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::DataUnavailable { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let envelope = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            ErrorEnvelope::new(status, GENERIC_SERVER_ERROR)
        } else {
            ErrorEnvelope::new(status, self.to_string())
        };

        envelope.into_response()
    }
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
