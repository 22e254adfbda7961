//! HTTP middleware

pub mod rate_limit;
pub mod request_tracking;

pub use rate_limit::{RateLimit, RATE_LIMIT_MESSAGE};
pub use request_tracking::{
    request_id_layer, request_id_propagation_layer, sensitive_headers_layer,
    MakeSortableRequestId, SENSITIVE_HEADERS,
};
