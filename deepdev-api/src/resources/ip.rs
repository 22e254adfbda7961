//! Client address echo and mock IP geolocation
//!
//! Lookups are served from a fixed table and cached through the injected
//! [`TtlCache`](crate::cache::TtlCache) held in application state.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{header, Extensions, HeaderMap},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{non_empty, Params};
use crate::error::Result;
use crate::responses::ApiResponse;
use crate::state::AppState;

const CACHE_HIT_MESSAGE: &str = "Data retrieved from cache";
const UNKNOWN: &str = "Unknown";

/// Geolocation record for one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpDetails {
    pub ip: String,
    pub hostname: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub country_name: String,
    pub postal: String,
    pub timezone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub isp: String,
    pub org: String,
    pub timestamp: DateTime<Utc>,
}

struct KnownAddress {
    ip: &'static str,
    hostname: &'static str,
    city: &'static str,
    region: &'static str,
    country: &'static str,
    country_name: &'static str,
    postal: &'static str,
    timezone: &'static str,
    latitude: f64,
    longitude: f64,
    org: &'static str,
}

const KNOWN_ADDRESSES: &[KnownAddress] = &[
    KnownAddress {
        ip: "8.8.8.8",
        hostname: "dns.google",
        city: "Mountain View",
        region: "California",
        country: "US",
        country_name: "United States",
        postal: "94043",
        timezone: "America/Los_Angeles",
        latitude: 37.386,
        longitude: -122.084,
        org: "Google LLC",
    },
    KnownAddress {
        ip: "1.1.1.1",
        hostname: "one.one.one.one",
        city: "San Francisco",
        region: "California",
        country: "US",
        country_name: "United States",
        postal: "94107",
        timezone: "America/Los_Angeles",
        latitude: 37.7749,
        longitude: -122.4194,
        org: "Cloudflare, Inc.",
    },
];

impl IpDetails {
    /// Look up `ip` in the mock table
    ///
    /// Addresses outside the table get placeholder values; the input is
    /// not validated as an address.
    pub fn lookup(ip: &str) -> Self {
        let timestamp = Utc::now();
        match KNOWN_ADDRESSES.iter().find(|known| known.ip == ip) {
            Some(known) => Self {
                ip: known.ip.to_string(),
                hostname: known.hostname.to_string(),
                city: known.city.to_string(),
                region: known.region.to_string(),
                country: known.country.to_string(),
                country_name: known.country_name.to_string(),
                postal: known.postal.to_string(),
                timezone: known.timezone.to_string(),
                latitude: known.latitude,
                longitude: known.longitude,
                isp: known.org.to_string(),
                org: known.org.to_string(),
                timestamp,
            },
            None => Self {
                ip: ip.to_string(),
                hostname: "unknown".to_string(),
                city: UNKNOWN.to_string(),
                region: UNKNOWN.to_string(),
                country: "XX".to_string(),
                country_name: UNKNOWN.to_string(),
                postal: "00000".to_string(),
                timezone: "UTC".to_string(),
                latitude: 0.0,
                longitude: 0.0,
                isp: UNKNOWN.to_string(),
                org: UNKNOWN.to_string(),
                timestamp,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientInfo {
    ip: String,
    user_agent: String,
    timestamp: DateTime<Utc>,
}

/// Keep only the comma-separated `fields`; unknown names are skipped
///
/// Without a `fields` parameter the value is returned unchanged.
pub fn project(value: Value, fields: Option<&str>) -> Value {
    match (fields, value) {
        (Some(fields), Value::Object(mut object)) => {
            let projected: Map<String, Value> = fields
                .split(',')
                .map(str::trim)
                .filter_map(|field| object.remove(field).map(|v| (field.to_string(), v)))
                .collect();
            Value::Object(projected)
        }
        (_, value) => value,
    }
}

/// Best-effort client address
///
/// The first `x-forwarded-for` hop wins, then the socket peer address.
/// IPv4-mapped IPv6 peers are reported in IPv4 form.
pub(crate) fn client_address(headers: &HeaderMap, extensions: &Extensions) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(forwarded) = forwarded {
        return forwarded.to_string();
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_canonical().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

async fn client(
    headers: HeaderMap,
    extensions: Extensions,
    Query(params): Query<Params>,
) -> Result<ApiResponse<Value>> {
    let info = ClientInfo {
        ip: client_address(&headers, &extensions),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(UNKNOWN)
            .to_string(),
        timestamp: Utc::now(),
    };

    let value = serde_json::to_value(info)?;
    Ok(ApiResponse::ok(project(value, non_empty(&params, "fields"))))
}

async fn details(
    State(state): State<AppState>,
    Path(ip): Path<String>,
    Query(params): Query<Params>,
) -> Result<ApiResponse<Value>> {
    let fields = non_empty(&params, "fields");
    let key = format!("ip_{ip}");

    if let Some(entry) = state.ip_cache().get(&key).await {
        tracing::debug!(ip = %ip, cached_at = %entry.cached_at, "IP lookup served from cache");
        let value = serde_json::to_value(entry.value)?;
        return Ok(ApiResponse::ok(project(value, fields)).with_message(CACHE_HIT_MESSAGE));
    }

    let details = IpDetails::lookup(&ip);
    state
        .ip_cache()
        .put(&key, details.clone(), state.config().ip_lookup.cache_ttl())
        .await;

    let value = serde_json::to_value(details)?;
    Ok(ApiResponse::ok(project(value, fields)))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/ip", get(client))
        .route("/ip/{ip}", get(details))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get, send};
    use axum::{body::Body, http::Request, http::StatusCode};
    use serde_json::json;

    #[test]
    fn test_lookup_known_and_unknown() {
        let google = IpDetails::lookup("8.8.8.8");
        assert_eq!(google.hostname, "dns.google");
        assert_eq!(google.isp, "Google LLC");

        let unknown = IpDetails::lookup("not-an-ip");
        assert_eq!(unknown.ip, "not-an-ip");
        assert_eq!(unknown.country, "XX");
        assert_eq!(unknown.postal, "00000");
    }

    #[test]
    fn test_project_skips_unknown_fields() {
        let value = json!({"ip": "1.1.1.1", "city": "San Francisco", "org": "Cloudflare, Inc."});
        assert_eq!(
            project(value.clone(), Some("city, nope ,ip")),
            json!({"city": "San Francisco", "ip": "1.1.1.1"})
        );
        assert_eq!(project(value.clone(), None), value);
    }

    #[test]
    fn test_mapped_ipv6_peer_is_canonical() {
        let mut extensions = Extensions::new();
        let addr: SocketAddr = "[::ffff:10.0.0.7]:4000".parse().unwrap();
        extensions.insert(ConnectInfo(addr));
        assert_eq!(client_address(&HeaderMap::new(), &extensions), "10.0.0.7");
        assert_eq!(client_address(&HeaderMap::new(), &Extensions::new()), "Unknown");
    }

    #[tokio::test]
    async fn test_client_uses_forwarded_header() {
        let request = Request::builder()
            .uri("/api/ip?fields=ip,userAgent")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .header("user-agent", "curl/8.4.0")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({"ip": "203.0.113.9", "userAgent": "curl/8.4.0"}));
    }

    #[tokio::test]
    async fn test_details_second_lookup_hits_cache() {
        let state = crate::test_support::state().await;
        let app = crate::app(state);

        let (status, first) = crate::test_support::get_with(app.clone(), "/api/ip/1.1.1.1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["data"]["city"], "San Francisco");
        assert!(first.get("message").is_none());

        let (_, second) =
            crate::test_support::get_with(app, "/api/ip/1.1.1.1?fields=org").await;
        assert_eq!(second["message"], "Data retrieved from cache");
        assert_eq!(second["data"], json!({"org": "Cloudflare, Inc."}));
    }

    #[tokio::test]
    async fn test_details_unknown_address() {
        let (status, body) = get("/api/ip/192.0.2.1?fields=country,timezone").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({"country": "XX", "timezone": "UTC"}));
    }
}
