//! Health check handlers

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Human readable status line
    pub message: String,
}

/// Readiness check response with per-dataset record counts
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Every dataset holds at least one record
    pub ready: bool,

    /// Service name
    pub service: String,

    /// Version
    pub version: String,

    /// Record count per dataset
    pub datasets: BTreeMap<String, usize>,
}

/// Liveness check
///
/// Always returns 200 OK while the process is serving.
pub async fn health() -> impl IntoResponse {
    let response = HealthResponse {
        status: "OK".to_string(),
        message: "deepdevnodes API is running".to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check
///
/// Returns 503 Service Unavailable while any dataset is empty.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.datasets().await;
    let datasets: BTreeMap<String, usize> = snapshot
        .counts()
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();

    let empty: Vec<&str> = datasets
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| name.as_str())
        .collect();
    let ready = empty.is_empty();
    if !ready {
        tracing::warn!(empty = ?empty, "Readiness check failed: empty datasets");
    }

    let response = ReadinessResponse {
        ready,
        service: state.config().service.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        datasets,
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DataSource, DataStore, Datasets};
    use crate::test_support::{get, get_with};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EmptySource;

    #[async_trait]
    impl DataSource for EmptySource {
        async fn load(&self) -> crate::error::Result<Datasets> {
            Ok(Datasets::default())
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["message"], "deepdevnodes API is running");
    }

    #[tokio::test]
    async fn test_ready_with_seed_data() {
        let (status, body) = get("/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], true);
        assert!(body["datasets"]["quotes"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_not_ready_when_empty() {
        let store = DataStore::load(Arc::new(EmptySource)).await.unwrap();
        let app = crate::app(AppState::new(crate::config::Config::default(), store));

        let (status, body) = get_with(app, "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ready"], false);
        assert_eq!(body["datasets"]["memeTemplates"], 0);
    }
}
