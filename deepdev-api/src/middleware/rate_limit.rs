//! Governor-based per-client rate limiting
//!
//! Clients are keyed by address: the first `x-forwarded-for` hop, then the
//! peer address. A request over quota answers 429 in the error envelope with
//! a `retry-after` header.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};

use crate::{config::RateLimitConfig, error::Error, resources::ip::client_address};

/// Message returned with 429 responses
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// Tracked clients above which idle ones are forgotten
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Build the governor quota for `config`
///
/// `None` when the configured rate is zero. A zero burst falls back to
/// `requests_per_period`.
pub fn quota(config: &RateLimitConfig) -> Option<Quota> {
    let requests = NonZeroU32::new(config.requests_per_period)?;
    let burst = NonZeroU32::new(config.burst_size).unwrap_or(requests);
    Quota::with_period(config.period() / requests.get()).map(|quota| quota.allow_burst(burst))
}

/// Shared per-client limiter state
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
    clock: DefaultClock,
}

impl std::fmt::Debug for RateLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimit")
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

impl RateLimit {
    /// Create a limiter from configuration
    ///
    /// Returns `None` when limiting is disabled or the quota is invalid.
    pub fn from_config(config: &RateLimitConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let Some(quota) = quota(config) else {
            tracing::warn!(
                requests = config.requests_per_period,
                period_secs = config.period_secs,
                "Invalid rate limit quota, rate limiting disabled"
            );
            return None;
        };
        Some(Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
            clock: DefaultClock::default(),
        })
    }

    /// Take one request from `client`'s quota
    ///
    /// On rejection returns how long the client should wait.
    pub fn check(&self, client: &str) -> Result<(), Duration> {
        if self.limiter.len() > MAX_TRACKED_CLIENTS {
            self.limiter.retain_recent();
        }
        self.limiter
            .check_key(&client.to_string())
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Middleware function enforcing the quota
    pub async fn middleware(
        State(rate_limit): State<Self>,
        request: Request,
        next: Next,
    ) -> Response {
        let client = client_address(request.headers(), request.extensions());
        match rate_limit.check(&client) {
            Ok(()) => next.run(request).await,
            Err(retry_after) => {
                tracing::warn!(client = %client, "Rate limit exceeded");
                too_many_requests(retry_after)
            }
        }
    }
}

fn too_many_requests(retry_after: Duration) -> Response {
    let mut response = Error::TooManyRequests(RATE_LIMIT_MESSAGE.to_string()).into_response();
    let secs = retry_after.as_secs().max(1);
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(secs));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(requests: u32, burst: u32) -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            requests_per_period: requests,
            period_secs: 60,
            burst_size: burst,
        }
    }

    #[test]
    fn test_quota_from_config() {
        let quota = quota(&config(2, 0)).unwrap();
        assert_eq!(quota.burst_size().get(), 2);
        assert_eq!(quota.replenish_interval(), Duration::from_secs(30));

        assert!(super::quota(&config(0, 5)).is_none());
    }

    #[test]
    fn test_disabled_or_invalid_has_no_limiter() {
        let mut disabled = config(2, 2);
        disabled.enabled = false;
        assert!(RateLimit::from_config(&disabled).is_none());
        assert!(RateLimit::from_config(&config(0, 0)).is_none());
    }

    #[test]
    fn test_clients_have_separate_quotas() {
        let limit = RateLimit::from_config(&config(2, 2)).unwrap();
        assert!(limit.check("10.0.0.1").is_ok());
        assert!(limit.check("10.0.0.1").is_ok());

        let wait = limit.check("10.0.0.1").unwrap_err();
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_secs(30));

        assert!(limit.check("10.0.0.2").is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let limit = RateLimit::from_config(&config(1, 1)).unwrap();
        let clone = limit.clone();
        assert!(limit.check("client").is_ok());
        assert!(clone.check("client").is_err());
    }

    #[test]
    fn test_rejection_response() {
        let response = too_many_requests(Duration::from_millis(200));
        assert_eq!(response.status(), axum::http::StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    }
}
