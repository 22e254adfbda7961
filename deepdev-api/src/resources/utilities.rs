//! Generators: UUIDs, lorem ipsum, random numbers, QR codes and barcodes
//!
//! QR codes and barcodes are not rendered here; the responses point at
//! public rendering services.

use axum::{extract::Query, routing::get, Router};
use chrono::{DateTime, Utc};
use rand::{seq::IndexedRandom, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_empty, Params};
use crate::error::{Error, Result};
use crate::responses::ApiResponse;
use crate::state::AppState;

const LOREM_WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation",
];

const MAX_LOREM_COUNT: u32 = 10;
const MAX_QR_TEXT_CHARS: usize = 1000;
const MAX_BARCODE_DATA_CHARS: usize = 50;

/// Barcode symbologies accepted by the rendering service
pub const BARCODE_TYPES: &[&str] = &["code128", "code39", "ean13", "ean8", "upca", "upce"];

const QR_SERVICE: &str = "https://api.qrserver.com/v1/create-qr-code/";
const BARCODE_SERVICE: &str = "https://bwipjs-api.metafloor.com/";
const GENERATOR_NOTE: &str =
    "URLs are generated dynamically. For production use, consider implementing server-side generation.";

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedUuid {
    pub uuid: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// Unit of generated placeholder text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoremKind {
    Words,
    Sentences,
    Paragraphs,
}

impl LoremKind {
    /// Unknown values produce paragraphs
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("words") => Self::Words,
            Some("sentences") => Self::Sentences,
            _ => Self::Paragraphs,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Lorem {
    #[serde(rename = "type")]
    pub kind: LoremKind,
    pub count: u32,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RandomNumber {
    pub number: i64,
    pub min: i64,
    pub max: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QrCode {
    pub text: String,
    pub qr_code_url: String,
    pub size: u32,
    pub format: String,
    pub generated_at: DateTime<Utc>,
    pub note: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Barcode {
    pub data: String,
    pub barcode_type: String,
    pub barcode_url: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub generated_at: DateTime<Utc>,
    pub note: String,
}

fn words<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<&'static str> {
    (0..count)
        .filter_map(|_| LOREM_WORDS.choose(rng).copied())
        .collect()
}

fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let length = rng.random_range(5..15);
    format!("{}.", words(rng, length).join(" "))
}

fn paragraph<R: Rng + ?Sized>(rng: &mut R) -> String {
    let length = rng.random_range(2..5);
    (0..length)
        .map(|_| sentence(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate `count` units of placeholder text
pub fn lorem_text<R: Rng + ?Sized>(rng: &mut R, kind: LoremKind, count: u32) -> String {
    let count = count as usize;
    match kind {
        LoremKind::Words => words(rng, count).join(" "),
        LoremKind::Sentences => (0..count)
            .map(|_| sentence(rng))
            .collect::<Vec<_>>()
            .join(" "),
        LoremKind::Paragraphs => (0..count)
            .map(|_| paragraph(rng))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Parse an optional positive number, falling back to `default`
fn positive_param(params: &Params, key: &str, default: u32) -> Result<u32> {
    match non_empty(params, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| Error::bad_request(format!("{key} must be a positive number"))),
    }
}

async fn uuid() -> ApiResponse<GeneratedUuid> {
    ApiResponse::ok(GeneratedUuid {
        uuid: Uuid::new_v4(),
        timestamp: Utc::now(),
    })
}

async fn lorem(Query(params): Query<Params>) -> Result<ApiResponse<Lorem>> {
    let count = match non_empty(&params, "count") {
        None => 1,
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=MAX_LOREM_COUNT).contains(n))
            .ok_or_else(|| Error::bad_request("Count must be between 1 and 10"))?,
    };
    let kind = LoremKind::parse(non_empty(&params, "type"));
    let text = lorem_text(&mut rand::rng(), kind, count);

    Ok(ApiResponse::ok(Lorem { kind, count, text }))
}

async fn random_number(Query(params): Query<Params>) -> Result<ApiResponse<RandomNumber>> {
    let parse = |key: &str, default: i64| -> Result<i64> {
        non_empty(&params, key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| Error::bad_request("Min and max must be valid numbers"))
        })
    };
    let min = parse("min", 1)?;
    let max = parse("max", 100)?;
    if min >= max {
        return Err(Error::bad_request("Min must be less than max"));
    }

    Ok(ApiResponse::ok(RandomNumber {
        number: rand::rng().random_range(min..=max),
        min,
        max,
        timestamp: Utc::now(),
    }))
}

async fn qr(Query(params): Query<Params>) -> Result<ApiResponse<QrCode>> {
    let text = non_empty(&params, "text")
        .ok_or_else(|| Error::bad_request("Text parameter is required"))?;
    if text.chars().count() > MAX_QR_TEXT_CHARS {
        return Err(Error::bad_request("Text must be less than 1000 characters"));
    }
    let size = positive_param(&params, "size", 256)?;
    let format = non_empty(&params, "format").unwrap_or("png");

    let url = format!(
        "{QR_SERVICE}?size={size}x{size}&data={}",
        urlencoding::encode(text)
    );

    Ok(ApiResponse::ok(QrCode {
        text: text.to_string(),
        qr_code_url: url,
        size,
        format: format.to_string(),
        generated_at: Utc::now(),
        note: format!("QR code {GENERATOR_NOTE}"),
    }))
}

async fn barcode(Query(params): Query<Params>) -> Result<ApiResponse<Barcode>> {
    let data = non_empty(&params, "data")
        .ok_or_else(|| Error::bad_request("Data parameter is required"))?;
    if data.chars().count() > MAX_BARCODE_DATA_CHARS {
        return Err(Error::bad_request("Data must be less than 50 characters"));
    }

    let kind = non_empty(&params, "type").unwrap_or("code128").to_lowercase();
    if !BARCODE_TYPES.contains(&kind.as_str()) {
        return Err(Error::bad_request(format!(
            "Invalid barcode type. Valid types: {}",
            BARCODE_TYPES.join(", ")
        )));
    }
    let width = positive_param(&params, "width", 2)?;
    let height = positive_param(&params, "height", 100)?;
    let format = non_empty(&params, "format").unwrap_or("png");

    let url = format!(
        "{BARCODE_SERVICE}?bcid={kind}&text={}&scale={width}&height={height}&includetext&guardwhitespace",
        urlencoding::encode(data)
    );

    Ok(ApiResponse::ok(Barcode {
        data: data.to_string(),
        barcode_type: kind,
        barcode_url: url,
        width,
        height,
        format: format.to_string(),
        generated_at: Utc::now(),
        note: format!("Barcode {GENERATOR_NOTE}"),
    }))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/utilities/uuid", get(uuid))
        .route("/utilities/lorem", get(lorem))
        .route("/utilities/random", get(random_number))
        .route("/utilities/qr", get(qr))
        .route("/utilities/barcode", get(barcode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get;
    use axum::http::StatusCode;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_lorem_units() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(lorem_text(&mut rng, LoremKind::Words, 4).split(' ').count(), 4);

        let sentences = lorem_text(&mut rng, LoremKind::Sentences, 3);
        assert_eq!(sentences.matches('.').count(), 3);

        let paragraphs = lorem_text(&mut rng, LoremKind::Paragraphs, 2);
        assert_eq!(paragraphs.split("\n\n").count(), 2);
    }

    #[tokio::test]
    async fn test_uuid_is_v4() {
        let (status, body) = get("/api/utilities/uuid").await;
        assert_eq!(status, StatusCode::OK);
        let uuid: Uuid = body["data"]["uuid"].as_str().unwrap().parse().unwrap();
        assert_eq!(uuid.get_version_num(), 4);
    }

    #[tokio::test]
    async fn test_lorem_count_bounds() {
        let (status, body) = get("/api/utilities/lorem?type=words&count=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["type"], "words");
        assert_eq!(body["data"]["count"], 10);

        let (status, body) = get("/api/utilities/lorem?count=11").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Count must be between 1 and 10");

        let (status, _) = get("/api/utilities/lorem?count=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_random_in_range() {
        let (status, body) = get("/api/utilities/random?min=5&max=6").await;
        assert_eq!(status, StatusCode::OK);
        let n = body["data"]["number"].as_i64().unwrap();
        assert!((5..=6).contains(&n));

        let (status, body) = get("/api/utilities/random?min=6&max=6").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Min must be less than max");

        let (status, _) = get("/api/utilities/random?min=low").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_qr_url() {
        let (status, body) = get("/api/utilities/qr?text=hello%20world&size=128").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["qr_code_url"],
            "https://api.qrserver.com/v1/create-qr-code/?size=128x128&data=hello%20world"
        );
        assert_eq!(body["data"]["format"], "png");
    }

    #[tokio::test]
    async fn test_qr_requires_text() {
        let (status, body) = get("/api/utilities/qr").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Text parameter is required");

        let long = "a".repeat(1001);
        let (status, _) = get(&format!("/api/utilities/qr?text={long}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_barcode_validation() {
        let (status, body) = get("/api/utilities/barcode?data=12345&type=EAN13").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["barcode_type"], "ean13");
        assert!(body["data"]["barcode_url"]
            .as_str()
            .unwrap()
            .starts_with("https://bwipjs-api.metafloor.com/?bcid=ean13&text=12345"));

        let (status, body) = get("/api/utilities/barcode?data=1&type=qr").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Invalid barcode type. Valid types: code128, code39, ean13, ean8, upca, upce"
        );

        let long = "9".repeat(51);
        let (status, _) = get(&format!("/api/utilities/barcode?data={long}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
