//! Current local time for a country or IANA time zone

use axum::{
    extract::{Path, Query},
    routing::get,
    Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::{non_empty, Params};
use crate::error::{Error, Result};
use crate::responses::ApiResponse;
use crate::state::AppState;

/// Default zone per ISO country code
pub const COUNTRY_TIMEZONES: &[(&str, &str)] = &[
    ("US", "America/New_York"),
    ("IN", "Asia/Kolkata"),
    ("GB", "Europe/London"),
    ("DE", "Europe/Berlin"),
    ("FR", "Europe/Paris"),
    ("JP", "Asia/Tokyo"),
    ("AU", "Australia/Sydney"),
    ("CA", "America/Toronto"),
    ("BR", "America/Sao_Paulo"),
    ("ZA", "Africa/Johannesburg"),
];

const MISSING_TIMEZONE: &str =
    "Timezone is required. Provide either a valid country code or tz parameter.";

/// Local wall-clock reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryTime {
    pub country: String,
    pub timezone: String,
    /// e.g. `Tuesday, July 15, 2025 at 02:30:00 PM`
    pub time: String,
    /// Zone abbreviation in effect at that instant
    pub offset: String,
    pub utc: String,
    pub timestamp: i64,
}

/// Zone name for a country code, ignoring case
pub fn country_timezone(country: &str) -> Option<&'static str> {
    COUNTRY_TIMEZONES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(country))
        .map(|(_, zone)| *zone)
}

/// Read the clock at `now` for `country`, or for `tz` when given
pub fn country_time(country: &str, tz: Option<&str>, now: DateTime<Utc>) -> Result<CountryTime> {
    let zone_name = tz
        .or_else(|| country_timezone(country))
        .ok_or_else(|| Error::bad_request(MISSING_TIMEZONE))?;
    let zone: Tz = zone_name
        .parse()
        .map_err(|_| Error::bad_request("Invalid timezone provided"))?;

    let local = now.with_timezone(&zone);
    Ok(CountryTime {
        country: country.to_uppercase(),
        timezone: zone_name.to_string(),
        time: local.format("%A, %B %-d, %Y at %I:%M:%S %p").to_string(),
        offset: local.format("%Z").to_string(),
        utc: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        timestamp: now.timestamp(),
    })
}

async fn by_country(
    Path(country): Path<String>,
    Query(params): Query<Params>,
) -> Result<ApiResponse<CountryTime>> {
    country_time(&country, non_empty(&params, "tz"), Utc::now()).map(ApiResponse::ok)
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/time/{country}", get(by_country))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get;
    use axum::http::StatusCode;
    use chrono::TimeZone;

    fn noon_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_country_lookup_ignores_case() {
        assert_eq!(country_timezone("jp"), Some("Asia/Tokyo"));
        assert_eq!(country_timezone("IN"), Some("Asia/Kolkata"));
        assert_eq!(country_timezone("xx"), None);
    }

    #[test]
    fn test_every_mapped_zone_parses() {
        for (_, zone) in COUNTRY_TIMEZONES {
            assert!(zone.parse::<Tz>().is_ok(), "{zone}");
        }
    }

    #[test]
    fn test_local_time_for_country() {
        let reading = country_time("jp", None, noon_utc()).unwrap();
        assert_eq!(reading.country, "JP");
        assert_eq!(reading.timezone, "Asia/Tokyo");
        assert_eq!(reading.time, "Wednesday, January 15, 2025 at 09:00:00 PM");
        assert_eq!(reading.offset, "JST");
        assert_eq!(reading.utc, "2025-01-15T12:00:00.000Z");
        assert_eq!(reading.timestamp, 1_736_942_400);
    }

    #[test]
    fn test_tz_overrides_country() {
        let reading = country_time("jp", Some("Europe/London"), noon_utc()).unwrap();
        assert_eq!(reading.timezone, "Europe/London");
        assert_eq!(reading.time, "Wednesday, January 15, 2025 at 12:00:00 PM");
    }

    #[test]
    fn test_unknown_country_without_tz() {
        let err = country_time("zz", None, noon_utc()).unwrap_err();
        assert!(matches!(err, Error::BadRequest(ref m) if m == MISSING_TIMEZONE));
    }

    #[tokio::test]
    async fn test_endpoint_success() {
        let (status, body) = get("/api/time/de").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["country"], "DE");
        assert_eq!(body["data"]["timezone"], "Europe/Berlin");
        assert!(body["data"]["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_endpoint_unknown_country() {
        let (status, body) = get("/api/time/zz").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], MISSING_TIMEZONE);
        assert_eq!(body["error"]["statusCode"], 400);
    }

    #[tokio::test]
    async fn test_endpoint_invalid_tz() {
        let (status, body) = get("/api/time/us?tz=Mars/Olympus_Mons").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid timezone provided");
    }
}
