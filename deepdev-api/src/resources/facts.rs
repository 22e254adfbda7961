//! Facts

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

const SEARCH_FIELDS: &[&str] = &["fact", "source"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: u32,
    pub fact: String,
    pub category: String,
    #[serde(default)]
    pub source: String,
}

impl Record for Fact {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(self.id.into()),
            "fact" => Some((&self.fact).into()),
            "category" => Some((&self.category).into()),
            "source" => Some((&self.source).into()),
            _ => None,
        }
    }
}

fn in_category<'a>(facts: &'a [Fact], category: &str) -> Vec<&'a Fact> {
    facts
        .iter()
        .filter(|f| equals_folded(&f.category, category))
        .collect()
}

/// All facts; `category` matches whole category names, ignoring case
async fn list(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Vec<Fact>> {
    let data = state.datasets().await;
    let mut query = ListQuery::from_params(&params);

    let pool = match query.take_filter("category").filter(|c| !c.is_empty()) {
        Some(category) => in_category(&data.facts, &category),
        None => data.facts.iter().collect(),
    };

    ApiResponse::paginated(query.run(&pool, SEARCH_FIELDS).map(Fact::clone))
}

async fn random(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<ApiResponse<Fact>> {
    let data = state.datasets().await;
    let category = non_empty(&params, "category");
    let pool = match category {
        Some(category) => in_category(&data.facts, category),
        None => data.facts.iter().collect(),
    };

    pick_random(&pool)
        .map(|fact| ApiResponse::ok(Fact::clone(fact)))
        .ok_or_else(|| match category {
            Some(category) => Error::not_found(format!("No facts found for category '{category}'")),
            None => Error::not_found("No facts available"),
        })
}

async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<Params>,
) -> Result<ApiResponse<Vec<Fact>>> {
    let data = state.datasets().await;
    let pool = in_category(&data.facts, &category);
    if pool.is_empty() {
        return Err(Error::not_found(format!(
            "No facts found for category '{category}'"
        )));
    }

    let mut query = ListQuery::from_params(&params);
    query.filters.clear();
    Ok(ApiResponse::paginated(
        query.run(&pool, SEARCH_FIELDS).map(Fact::clone),
    ))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/facts", get(list))
        .route("/facts/random", get(random))
        .route("/facts/{category}", get(by_category))
}

#[cfg(test)]
mod tests {
    use crate::test_support::get;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_list_category_is_whole_word() {
        let (status, body) = get("/api/facts?category=SPACE&limit=50").await;
        assert_eq!(status, StatusCode::OK);
        let facts = body["data"].as_array().unwrap();
        assert!(!facts.is_empty());
        assert!(facts.iter().all(|f| f["category"] == "space"));

        let (_, partial) = get("/api/facts?category=spa").await;
        assert_eq!(partial["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_search_source() {
        let (_, body) = get("/api/facts?search=nasa").await;
        let facts = body["data"].as_array().unwrap();
        assert!(!facts.is_empty());
        assert!(facts
            .iter()
            .all(|f| f["source"].as_str().unwrap().to_lowercase().contains("nasa")
                || f["fact"].as_str().unwrap().to_lowercase().contains("nasa")));
    }

    #[tokio::test]
    async fn test_random_unknown_category() {
        let (status, body) = get("/api/facts/random?category=gossip").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "No facts found for category 'gossip'");
    }

    #[tokio::test]
    async fn test_by_category_page_clamped() {
        let (status, body) = get("/api/facts/animals?page=99").await;
        assert_eq!(status, StatusCode::OK);
        let total_pages = body["pagination"]["totalPages"].clone();
        assert_eq!(body["pagination"]["page"], total_pages);
        assert_eq!(body["pagination"]["hasNext"], false);
    }
}
