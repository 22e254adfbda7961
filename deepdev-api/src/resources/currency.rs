//! Currency conversion over a fixed demonstration rate table

use axum::{extract::Query, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{non_empty, Params};
use crate::error::{Error, Result};
use crate::responses::ApiResponse;
use crate::state::AppState;

/// Supported ISO currency codes
pub const SUPPORTED_CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "INR", "JPY", "CAD", "AUD"];

/// Direct rates, `(from, to, rate)`
const RATES: &[(&str, &str, f64)] = &[
    ("USD", "EUR", 0.85),
    ("USD", "GBP", 0.73),
    ("USD", "INR", 74.5),
    ("USD", "JPY", 110.0),
    ("USD", "CAD", 1.25),
    ("USD", "AUD", 1.35),
    ("EUR", "USD", 1.18),
    ("EUR", "GBP", 0.86),
    ("EUR", "INR", 87.6),
    ("EUR", "JPY", 129.0),
    ("EUR", "CAD", 1.47),
    ("EUR", "AUD", 1.59),
    ("GBP", "USD", 1.37),
    ("GBP", "EUR", 1.16),
    ("GBP", "INR", 101.8),
    ("GBP", "JPY", 150.0),
    ("GBP", "CAD", 1.71),
    ("GBP", "AUD", 1.85),
    ("INR", "USD", 0.013),
    ("INR", "EUR", 0.011),
    ("INR", "GBP", 0.0098),
    ("INR", "JPY", 1.47),
    ("INR", "CAD", 0.017),
    ("INR", "AUD", 0.018),
    ("JPY", "USD", 0.0091),
    ("JPY", "EUR", 0.0078),
    ("JPY", "GBP", 0.0067),
    ("JPY", "INR", 0.68),
    ("JPY", "CAD", 0.011),
    ("JPY", "AUD", 0.012),
    ("CAD", "USD", 0.8),
    ("CAD", "EUR", 0.68),
    ("CAD", "GBP", 0.58),
    ("CAD", "INR", 59.6),
    ("CAD", "JPY", 88.0),
    ("CAD", "AUD", 1.08),
    ("AUD", "USD", 0.74),
    ("AUD", "EUR", 0.63),
    ("AUD", "GBP", 0.54),
    ("AUD", "INR", 55.2),
    ("AUD", "JPY", 81.5),
    ("AUD", "CAD", 0.93),
];

const RATES_NOTE: &str = "Exchange rates are for demonstration purposes only";

/// Result of a conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub rate: f64,
    pub converted_amount: f64,
    pub inverse_rate: f64,
    pub timestamp: DateTime<Utc>,
    pub note: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ensure_supported(code: &str) -> Result<()> {
    if SUPPORTED_CURRENCIES.contains(&code) {
        Ok(())
    } else {
        Err(Error::bad_request(format!(
            "Unsupported currency: {code}. Supported: {}",
            SUPPORTED_CURRENCIES.join(", ")
        )))
    }
}

/// Exchange rate between two supported currencies
pub fn rate(from: &str, to: &str) -> Option<f64> {
    if from == to {
        return Some(1.0);
    }
    RATES
        .iter()
        .find(|(f, t, _)| *f == from && *t == to)
        .map(|(_, _, rate)| *rate)
}

/// Validate the request and convert `amount`
pub fn convert(from: &str, to: &str, amount: &str) -> Result<Conversion> {
    let from = from.to_uppercase();
    let to = to.to_uppercase();
    ensure_supported(&from)?;
    ensure_supported(&to)?;

    let amount = amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite() && *a > 0.0)
        .ok_or_else(|| Error::bad_request("Amount must be a positive number"))?;

    let rate = rate(&from, &to).ok_or_else(|| {
        Error::bad_request(format!("Exchange rate not available for {from} to {to}"))
    })?;

    Ok(Conversion {
        amount,
        rate,
        converted_amount: round2(amount * rate),
        inverse_rate: round2(1.0 / rate),
        timestamp: Utc::now(),
        note: RATES_NOTE.to_string(),
        from,
        to,
    })
}

async fn convert_handler(Query(params): Query<Params>) -> Result<ApiResponse<Conversion>> {
    let (Some(from), Some(to), Some(amount)) = (
        non_empty(&params, "from"),
        non_empty(&params, "to"),
        non_empty(&params, "amount"),
    ) else {
        return Err(Error::bad_request(
            "Missing required parameters: from, to, amount",
        ));
    };

    convert(from, to, amount).map(ApiResponse::ok)
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/currency/convert", get(convert_handler))
}
