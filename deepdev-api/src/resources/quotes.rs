//! Quotes

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::{equals_folded, non_empty, pick_random, Params};
use crate::error::{Error, Result};
use crate::query::ListQuery;
use crate::record::{FieldValue, Record};
use crate::responses::ApiResponse;
use crate::state::AppState;

const SEARCH_FIELDS: &[&str] = &["quote", "author"];

/// A quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: u32,
    pub quote: String,
    pub author: String,
    pub category: String,
}

impl Record for Quote {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(self.id.into()),
            "quote" => Some((&self.quote).into()),
            "author" => Some((&self.author).into()),
            "category" => Some((&self.category).into()),
            _ => None,
        }
    }
}

fn in_category<'a>(quotes: &'a [Quote], category: &'a str) -> impl Iterator<Item = &'a Quote> {
    quotes
        .iter()
        .filter(move |q| equals_folded(&q.category, category))
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Vec<Quote>> {
    let data = state.datasets().await;
    let page = ListQuery::from_params(&params).run(&data.quotes, SEARCH_FIELDS);
    ApiResponse::paginated(page)
}

async fn random(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<ApiResponse<Quote>> {
    let data = state.datasets().await;
    let pool: Vec<&Quote> = match non_empty(&params, "category") {
        Some(category) => in_category(&data.quotes, category).collect(),
        None => data.quotes.iter().collect(),
    };

    pick_random(&pool)
        .map(|quote| ApiResponse::ok(Quote::clone(quote)))
        .ok_or_else(|| match non_empty(&params, "category") {
            Some(category) => Error::not_found(format!("No quotes found for category '{category}'")),
            None => Error::not_found("No quotes available"),
        })
}

/// Quotes in one category, then search/sort/paginate within it
///
/// Residual parameters are not applied as filters here.
async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<Params>,
) -> Result<ApiResponse<Vec<Quote>>> {
    let data = state.datasets().await;
    let matching: Vec<&Quote> = in_category(&data.quotes, &category).collect();
    if matching.is_empty() {
        return Err(Error::not_found(format!(
            "No quotes found for category '{category}'"
        )));
    }

    let mut query = ListQuery::from_params(&params);
    query.filters.clear();
    let page = query.run(&matching, SEARCH_FIELDS);
    Ok(ApiResponse::paginated(page.map(Quote::clone)))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotes", get(list))
        .route("/quotes/random", get(random))
        .route("/quotes/{category}", get(by_category))
}
