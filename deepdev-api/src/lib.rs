//! # deepdev-api
//!
//! REST hub serving reference datasets (quotes, jokes, facts, countries,
//! space, finance, developer trends) plus a handful of generators.
//!
//! ## Features
//!
//! - **Shared list pipeline**: every list endpoint normalizes `page`,
//!   `limit`, `sort` and `search`, then runs search, filters, sort and
//!   pagination over the same [`record::Record`] abstraction
//! - **Uniform envelopes**: `{success, data, pagination?, message?}` on
//!   success and `{success: false, error: {message, statusCode}}` on failure
//! - **Snapshot datasets**: JSON files are loaded once and can be reloaded
//!   periodically without readers ever seeing partial data
//! - **Middleware stack**: request ids, tracing, CORS, compression,
//!   timeouts, body limits and panic recovery
//! - **Graceful shutdown**: SIGTERM and SIGINT drain in-flight requests
//!
//! ## Example
//!
//! ```rust,no_run
//! use deepdev_api::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::load(config.clone()).await?;
//!
//!     Server::new(config).serve(deepdev_api::app(state)).await?;
//!     Ok(())
//! }
//! ```

use axum::{http::StatusCode, http::Uri, routing::get, Router};

pub mod cache;
pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod observability;
pub mod query;
pub mod record;
pub mod resources;
pub mod responses;
pub mod server;
pub mod state;
pub mod store;

use crate::responses::ErrorEnvelope;
use crate::state::AppState;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cache::{CacheEntry, MemoryCache, TtlCache};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::health::{health, readiness};
    pub use crate::observability::init_tracing;
    pub use crate::query::{ListQuery, Page, PaginationMeta, SortKey};
    pub use crate::record::{FieldValue, Record};
    pub use crate::responses::{ApiResponse, ErrorEnvelope};
    pub use crate::server::Server;
    pub use crate::state::AppState;
    pub use crate::store::{DataSource, DataStore, Datasets, JsonDirSource};

    pub use axum::{
        extract::{Path, Query, State},
        routing::get,
        Json, Router,
    };
}

/// The complete route table: health checks at the root, resources under `/api`
///
/// Unknown paths answer with a 404 error envelope.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .nest("/api", resources::router())
        .fallback(route_not_found)
        .with_state(state)
}

async fn route_not_found(uri: Uri) -> ErrorEnvelope {
    ErrorEnvelope::new(
        StatusCode::NOT_FOUND,
        format!("Route {} not found", uri.path()),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{config::Config, state::AppState};

    /// State backed by the bundled seed datasets
    pub async fn state() -> AppState {
        let mut config = Config::default();
        config.data.dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        AppState::load(config).await.expect("seed datasets load")
    }

    /// Send one request through `app`, decoding the JSON body
    pub async fn send_to(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Send one request to a fresh app
    pub async fn send(request: Request<Body>) -> (StatusCode, Value) {
        send_to(crate::app(state().await), request).await
    }

    pub async fn get_with(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send_to(app, request).await
    }

    pub async fn get(uri: &str) -> (StatusCode, Value) {
        get_with(crate::app(state().await), uri).await
    }
}
