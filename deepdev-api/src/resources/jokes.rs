//! Jokes

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::{non_empty, pick_random, Params};
use crate::error::{Error, Result};
use crate::query::ListQuery;
use crate::record::{FieldValue, Record};
use crate::responses::ApiResponse;
use crate::state::AppState;

const SEARCH_FIELDS: &[&str] = &["joke"];

/// Category holding developer jokes
const PROGRAMMING: &str = "programming";
const GENERAL: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joke {
    pub id: u32,
    pub joke: String,
    pub category: String,
}

impl Record for Joke {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(self.id.into()),
            "joke" => Some((&self.joke).into()),
            "category" => Some((&self.category).into()),
            _ => None,
        }
    }
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Vec<Joke>> {
    let data = state.datasets().await;
    ApiResponse::paginated(ListQuery::from_params(&params).run(&data.jokes, SEARCH_FIELDS))
}

/// Random joke; `type=dev` or `type=general` narrows the pool
///
/// Any other type value draws from every joke.
async fn random(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<ApiResponse<Joke>> {
    let data = state.datasets().await;
    let kind = non_empty(&params, "type");
    let category = match kind {
        Some("dev") => Some(PROGRAMMING),
        Some("general") => Some(GENERAL),
        _ => None,
    };

    let pool: Vec<&Joke> = data
        .jokes
        .iter()
        .filter(|joke| category.is_none_or(|c| joke.category == c))
        .collect();

    pick_random(&pool)
        .map(|joke| ApiResponse::ok(Joke::clone(joke)))
        .ok_or_else(|| match kind {
            Some(kind) => Error::not_found(format!("No jokes found for type '{kind}'")),
            None => Error::not_found("No jokes available"),
        })
}

async fn dev(State(state): State<AppState>) -> Result<ApiResponse<Joke>> {
    let data = state.datasets().await;
    let pool: Vec<&Joke> = data
        .jokes
        .iter()
        .filter(|joke| joke.category == PROGRAMMING)
        .collect();

    pick_random(&pool)
        .map(|joke| ApiResponse::ok(Joke::clone(joke)))
        .ok_or_else(|| Error::not_found("No programming jokes found"))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/jokes", get(list))
        .route("/jokes/random", get(random))
        .route("/jokes/dev", get(dev))
}

#[cfg(test)]
mod tests {
    use crate::test_support::get;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_search_bug_any_case() {
        let (status, lower) = get("/api/jokes?search=bug").await;
        assert_eq!(status, StatusCode::OK);
        let (_, upper) = get("/api/jokes?search=BUG").await;

        let jokes = lower["data"].as_array().unwrap();
        assert!(jokes
            .iter()
            .any(|j| j["joke"].as_str().unwrap().contains("light attracts bugs")));
        assert_eq!(lower["data"], upper["data"]);
    }

    #[tokio::test]
    async fn test_filter_by_category() {
        let (_, body) = get("/api/jokes?category=general&limit=50").await;
        let jokes = body["data"].as_array().unwrap();
        assert!(!jokes.is_empty());
        assert!(jokes.iter().all(|j| j["category"] == "general"));
    }

    #[tokio::test]
    async fn test_random_dev_type() {
        let (status, body) = get("/api/jokes/random?type=dev").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["category"], "programming");
    }

    #[tokio::test]
    async fn test_random_unknown_type_draws_from_all() {
        let (status, body) = get("/api/jokes/random?type=knock-knock").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["joke"].is_string());
    }

    #[tokio::test]
    async fn test_dev_joke() {
        let (status, body) = get("/api/jokes/dev").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["category"], "programming");
    }
}
