//! HTTP server with graceful shutdown

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::Config,
    error::Result,
    middleware::{
        request_id_layer, request_id_propagation_layer, sensitive_headers_layer, RateLimit,
    },
};

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.config.service.port))
    }

    /// Wrap `app` in the configured middleware stack
    ///
    /// Layers added later wrap the ones added earlier, so request ids are
    /// assigned before tracing and propagation see the request.
    pub fn layered(&self, app: Router) -> Router {
        let body_limit = self.config.middleware.body_limit_mb * 1024 * 1024;

        let app = app.layer(self.build_cors_layer());
        let app = if self.config.middleware.compression {
            app.layer(CompressionLayer::new())
        } else {
            app
        };

        let app = app
            .layer(TimeoutLayer::with_status_code(
                http::StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout(),
            ))
            .layer(RequestBodyLimitLayer::new(body_limit));

        let app = match self.rate_limit() {
            Some(rate_limit) => app.layer(axum::middleware::from_fn_with_state(
                rate_limit,
                RateLimit::middleware,
            )),
            None => app,
        };

        let app = app
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_response(DefaultOnResponse::new().include_headers(true)),
            )
            .layer(sensitive_headers_layer())
            .layer(request_id_propagation_layer())
            .layer(request_id_layer());

        if self.config.middleware.catch_panic {
            app.layer(CatchPanicLayer::new())
        } else {
            app
        }
    }

    /// Rate limiter for the configured quota, if enabled
    fn rate_limit(&self) -> Option<RateLimit> {
        self.config
            .middleware
            .rate_limit
            .as_ref()
            .and_then(RateLimit::from_config)
    }

    /// Run the server with the given router
    pub async fn serve(self, app: Router) -> Result<()> {
        let addr = self.bind_addr();

        tracing::info!("Starting {} on {}", self.config.service.name, addr);
        self.log_middleware_config();

        let app = self.layered(app);
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        // peer addresses feed the client IP endpoint
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Log middleware configuration for debugging
    fn log_middleware_config(&self) {
        let middleware = &self.config.middleware;
        tracing::info!("Middleware configuration:");
        tracing::info!(
            "  - Panic recovery: {}",
            enabled(middleware.catch_panic)
        );
        tracing::info!("  - Request ID tracking: enabled");
        tracing::info!("  - Sensitive header masking: enabled");
        tracing::info!("  - Request body limit: {} MB", middleware.body_limit_mb);
        tracing::info!("  - Compression: {}", enabled(middleware.compression));
        tracing::info!("  - CORS mode: {}", middleware.cors_mode);
        tracing::info!(
            "  - Request timeout: {} seconds",
            self.config.service.timeout_secs
        );

        match middleware.rate_limit.as_ref().filter(|limit| limit.enabled) {
            Some(limit) => tracing::info!(
                "  - Rate limiting: {} req / {} sec (burst: {})",
                limit.requests_per_period,
                limit.period_secs,
                limit.burst_size
            ),
            None => tracing::info!("  - Rate limiting: disabled"),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build CORS layer based on configuration
    fn build_cors_layer(&self) -> CorsLayer {
        match self.config.middleware.cors_mode.as_str() {
            "permissive" => {
                tracing::debug!("Enabling permissive CORS");
                CorsLayer::permissive()
            }
            "restrictive" => {
                tracing::debug!("Enabling restrictive CORS (default deny)");
                CorsLayer::new()
            }
            "disabled" => {
                tracing::debug!("CORS disabled (using restrictive)");
                CorsLayer::new()
            }
            _ => {
                tracing::warn!(
                    "Unknown CORS mode: {}, defaulting to permissive",
                    self.config.middleware.cors_mode
                );
                CorsLayer::permissive()
            }
        }
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn test_server_creation() {
        let config = Config::default();
        let server = Server::new(config.clone());
        assert_eq!(server.config().service.port, config.service.port);
        assert_eq!(server.bind_addr().port(), 3000);
    }

    #[tokio::test]
    async fn test_layered_app_sets_request_id() {
        let state = crate::test_support::state().await;
        let app = Server::new(state.config().clone()).layered(crate::app(state));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response.headers()["x-request-id"].to_str().unwrap();
        assert!(request_id.starts_with("req_"));
    }

    #[tokio::test]
    async fn test_layered_app_keeps_incoming_request_id() {
        let state = crate::test_support::state().await;
        let app = Server::new(state.config().clone()).layered(crate::app(state));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/quotes")
                    .header("x-request-id", "client-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "client-123");
    }

    fn limited_app(state: crate::state::AppState, requests: u32) -> Router {
        let mut config = state.config().clone();
        config.middleware.rate_limit = Some(crate::config::RateLimitConfig {
            enabled: true,
            requests_per_period: requests,
            period_secs: 60,
            burst_size: requests,
        });
        Server::new(config).layered(crate::app(state))
    }

    fn from_client(uri: &str, client: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", client)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_with_envelope() {
        let state = crate::test_support::state().await;
        let app = limited_app(state, 2);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(from_client("/api/quotes", "198.51.100.4"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .clone()
            .oneshot(from_client("/api/quotes", "198.51.100.4"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(http::header::RETRY_AFTER));
        assert!(response.headers().contains_key("x-request-id"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["statusCode"], 429);
        assert_eq!(body["error"]["message"], crate::middleware::RATE_LIMIT_MESSAGE);

        let other = app
            .oneshot(from_client("/api/quotes", "198.51.100.5"))
            .await
            .unwrap();
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_disabled() {
        let state = crate::test_support::state().await;
        let mut config = state.config().clone();
        config.middleware.rate_limit = Some(crate::config::RateLimitConfig {
            enabled: false,
            requests_per_period: 1,
            period_secs: 60,
            burst_size: 1,
        });
        let app = Server::new(config).layered(crate::app(state));

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
