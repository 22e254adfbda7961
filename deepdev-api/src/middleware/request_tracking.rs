//! Request tracking middleware
//!
//! Every request gets an `x-request-id` (generated unless the client sent
//! one) that is echoed on the response and recorded on the trace span.

use http::{HeaderName, HeaderValue, Request};
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
};
use uuid::Uuid;

/// Prefix for generated request ids
pub const REQUEST_ID_PREFIX: &str = "req_";

/// Sensitive headers that should be masked in logs
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
];

/// Generates time-sortable request ids of the form `req_<uuidv7>`
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeSortableRequestId;

impl MakeRequestId for MakeSortableRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = format!("{}{}", REQUEST_ID_PREFIX, Uuid::now_v7().simple());
        let header_value = HeaderValue::from_str(&id).ok()?;
        Some(RequestId::new(header_value))
    }
}

/// Layer that assigns request ids
pub fn request_id_layer() -> SetRequestIdLayer<MakeSortableRequestId> {
    SetRequestIdLayer::x_request_id(MakeSortableRequestId)
}

/// Layer that copies the request id onto the response
pub fn request_id_propagation_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Layer that masks sensitive request headers in traces
pub fn sensitive_headers_layer() -> SetSensitiveRequestHeadersLayer {
    let headers = SENSITIVE_HEADERS
        .iter()
        .copied()
        .map(HeaderName::from_static)
        .collect::<Vec<_>>();

    SetSensitiveRequestHeadersLayer::new(headers)
}
