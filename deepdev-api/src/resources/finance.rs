//! Cryptocurrency and stock market snapshots

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{cap, curated_sort, equals_folded, list_limit, non_empty, Params, DEFAULT_LIST_LIMIT};
use crate::error::{Error, Result};
use crate::query::apply_sort;
use crate::record::{FieldValue, Record};
use crate::responses::ApiResponse;
use crate::state::AppState;

const CRYPTO_MESSAGE: &str = "Cryptocurrency data retrieved successfully";
const STOCK_MESSAGE: &str = "Stock data retrieved successfully";

const CRYPTO_SORTS: &[(&str, &str)] = &[
    ("price", "-price"),
    ("market_cap", "-market_cap"),
    ("change_percent", "-change_percent_24h"),
];

const STOCK_SORTS: &[(&str, &str)] = &[
    ("price", "-price"),
    ("change_percent", "-change_percent"),
    ("market_cap", "-market_cap"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crypto {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub change_24h: f64,
    #[serde(default)]
    pub change_percent_24h: f64,
    pub market_cap: f64,
    #[serde(default)]
    pub volume_24h: f64,
    pub rank: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Crypto {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "symbol" => Some((&self.symbol).into()),
            "name" => Some((&self.name).into()),
            "price" => Some(self.price.into()),
            "change_24h" => Some(self.change_24h.into()),
            "change_percent_24h" => Some(self.change_percent_24h.into()),
            "market_cap" => Some(self.market_cap.into()),
            "volume_24h" => Some(self.volume_24h.into()),
            "rank" => Some(self.rank.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub change_percent: f64,
    #[serde(default)]
    pub volume: u64,
    pub market_cap: f64,
    pub sector: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Stock {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "symbol" => Some((&self.symbol).into()),
            "name" => Some((&self.name).into()),
            "price" => Some(self.price.into()),
            "change" => Some(self.change.into()),
            "change_percent" => Some(self.change_percent.into()),
            "volume" => Some(self.volume.into()),
            "market_cap" => Some(self.market_cap.into()),
            "sector" => Some((&self.sector).into()),
            _ => None,
        }
    }
}

/// Coins ordered by rank unless `sort` names a descending metric
async fn crypto(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Vec<Crypto>> {
    let data = state.datasets().await;
    let sort = curated_sort(non_empty(&params, "sort"), CRYPTO_SORTS, "rank");
    let sorted = apply_sort(&data.crypto, Some(&sort));
    ApiResponse::ok(cap(sorted, list_limit(&params, DEFAULT_LIST_LIMIT))).with_message(CRYPTO_MESSAGE)
}

async fn crypto_by_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<ApiResponse<Crypto>> {
    let data = state.datasets().await;
    data.crypto
        .iter()
        .find(|c| equals_folded(&c.symbol, &symbol))
        .map(|c| ApiResponse::ok(c.clone()).with_message(CRYPTO_MESSAGE))
        .ok_or_else(|| Error::not_found("Cryptocurrency not found"))
}

/// Stocks ordered by symbol; `sector` must match exactly, ignoring case
async fn stocks(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Vec<Stock>> {
    let data = state.datasets().await;
    let pool: Vec<&Stock> = match non_empty(&params, "sector") {
        Some(sector) => data
            .stocks
            .iter()
            .filter(|s| equals_folded(&s.sector, sector))
            .collect(),
        None => data.stocks.iter().collect(),
    };

    let sort = curated_sort(non_empty(&params, "sort"), STOCK_SORTS, "symbol");
    let sorted: Vec<Stock> = apply_sort(&pool, Some(&sort))
        .into_iter()
        .cloned()
        .collect();
    ApiResponse::ok(cap(sorted, list_limit(&params, DEFAULT_LIST_LIMIT))).with_message(STOCK_MESSAGE)
}

async fn stock_by_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<ApiResponse<Stock>> {
    let data = state.datasets().await;
    data.stocks
        .iter()
        .find(|s| equals_folded(&s.symbol, &symbol))
        .map(|s| ApiResponse::ok(s.clone()).with_message(STOCK_MESSAGE))
        .ok_or_else(|| Error::not_found("Stock not found"))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/crypto", get(crypto))
        .route("/crypto/{symbol}", get(crypto_by_symbol))
        .route("/stocks", get(stocks))
        .route("/stocks/{symbol}", get(stock_by_symbol))
}

#[cfg(test)]
mod tests {
    use crate::test_support::get;
    use axum::http::StatusCode;

    fn numbers(body: &serde_json::Value, field: &str) -> Vec<f64> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item[field].as_f64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_crypto_default_rank_order() {
        let (status, body) = get("/api/crypto?limit=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Cryptocurrency data retrieved successfully");
        let ranks = numbers(&body, "rank");
        assert!(ranks.len() > 3);
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_crypto_sort_change_percent_desc() {
        let (_, body) = get("/api/crypto?sort=change_percent&limit=0").await;
        let changes = numbers(&body, "change_percent_24h");
        assert!(changes.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_crypto_limit() {
        let (_, body) = get("/api/crypto?sort=price&limit=2").await;
        let prices = numbers(&body, "price");
        assert_eq!(prices.len(), 2);
        assert!(prices[0] >= prices[1]);
    }

    #[tokio::test]
    async fn test_crypto_by_symbol() {
        let (status, body) = get("/api/crypto/btc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["symbol"], "BTC");

        let (status, body) = get("/api/crypto/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Cryptocurrency not found");
    }

    #[tokio::test]
    async fn test_stocks_default_symbol_order() {
        let (_, body) = get("/api/stocks?limit=0").await;
        let symbols: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["symbol"].as_str().unwrap())
            .collect();
        let mut sorted = symbols.clone();
        sorted.sort();
        assert_eq!(symbols, sorted);
    }

    #[tokio::test]
    async fn test_stocks_sector_exact() {
        let (_, body) = get("/api/stocks?sector=TECHNOLOGY&limit=0").await;
        let stocks = body["data"].as_array().unwrap();
        assert!(!stocks.is_empty());
        assert!(stocks.iter().all(|s| s["sector"] == "Technology"));

        let (_, partial) = get("/api/stocks?sector=tech").await;
        assert!(partial["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stock_by_symbol() {
        let (status, body) = get("/api/stocks/aapl").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["symbol"], "AAPL");
        assert_eq!(body["message"], "Stock data retrieved successfully");

        let (status, _) = get("/api/stocks/zzzz").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
