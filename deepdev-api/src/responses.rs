//! Response envelopes
//!
//! Every endpoint answers with one of two JSON shapes:
//!
//! ```json
//! { "success": true,  "data": ..., "pagination": {...}, "message": "..." }
//! { "success": false, "error": { "message": "...", "statusCode": 404 } }
//! ```
//!
//! `pagination` and `message` are omitted when absent.
//!
//! # Example
//!
//! ```rust
//! use deepdev_api::responses::ApiResponse;
//!
//! let body = serde_json::to_value(ApiResponse::ok(vec![1, 2, 3])).unwrap();
//! assert_eq!(body["success"], true);
//! assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
//! assert!(body.get("pagination").is_none());
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::query::{Page, PaginationMeta};

/// Success envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    /// Always `true`
    pub success: bool,

    /// Payload
    pub data: T,

    /// Pagination metadata, present on paginated list responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,

    /// Informational message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Wrap a payload
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            pagination: None,
            message: None,
        }
    }

    /// Attach an informational message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Wrap one page of a list together with its metadata
    ///
    /// # Example
    ///
    /// ```rust
    /// use deepdev_api::query::paginate;
    /// use deepdev_api::responses::ApiResponse;
    ///
    /// let response = ApiResponse::paginated(paginate(&["a", "b", "c"], 2, 2));
    /// assert_eq!(response.data, vec!["c"]);
    /// assert_eq!(response.pagination.unwrap().page, 2);
    /// ```
    pub fn paginated(page: Page<T>) -> Self {
        Self {
            success: true,
            data: page.data,
            pagination: Some(page.pagination),
            message: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Inner error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Human-readable message
    pub message: String,

    /// HTTP status code, repeated in the body
    pub status_code: u16,
}

/// Error envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    /// Always `false`
    pub success: bool,

    /// Error details
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    /// Create an error envelope for `status`
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                message: message.into(),
                status_code: status.as_u16(),
            },
        }
    }

    /// Status code carried in the body
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
