//! Countries

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::Params;
use crate::error::{Error, Result};
use crate::query::{ListQuery, SortKey};
use crate::record::{FieldValue, Record};
use crate::responses::ApiResponse;
use crate::state::AppState;

const SEARCH_FIELDS: &[&str] = &["name", "capital", "languages"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub name: String,
    pub code: String,
    pub capital: String,
    pub currency: String,
    pub flag: String,
    #[serde(default)]
    pub languages: Vec<String>,
    pub region: String,
    #[serde(default)]
    pub subregion: String,
    pub population: u64,
    pub area: f64,
    #[serde(default)]
    pub timezones: Vec<String>,
    #[serde(default)]
    pub calling_code: String,
    #[serde(default)]
    pub states: Vec<String>,
}

impl Record for Country {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some((&self.name).into()),
            "code" => Some((&self.code).into()),
            "capital" => Some((&self.capital).into()),
            "currency" => Some((&self.currency).into()),
            "languages" => Some((&self.languages).into()),
            "region" => Some((&self.region).into()),
            "subregion" => Some((&self.subregion).into()),
            "population" => Some(self.population.into()),
            "area" => Some(self.area.into()),
            "timezones" => Some((&self.timezones).into()),
            "callingCode" => Some((&self.calling_code).into()),
            _ => None,
        }
    }
}

/// Translate the supported filters into record filters
///
/// `region` matches by substring, `language` against any spoken language,
/// and `currency` exactly (ISO codes, case-insensitive). Other parameters
/// are not filters on this resource.
fn country_query(params: &Params) -> (ListQuery, Option<String>) {
    let mut query = ListQuery::from_params(params).with_default_sort(SortKey::asc("name"));
    let region = query.take_filter("region");
    let language = query.take_filter("language");
    let currency = query
        .take_filter("currency")
        .filter(|c| !c.is_empty())
        .map(|c| c.to_uppercase());
    query.filters.clear();

    if let Some(region) = region {
        query = query.with_filter("region", region);
    }
    if let Some(language) = language {
        query = query.with_filter("languages", language);
    }
    (query, currency)
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Vec<Country>> {
    let data = state.datasets().await;
    let (query, currency) = country_query(&params);

    let pool: Vec<&Country> = data
        .countries
        .iter()
        .filter(|c| currency.as_deref().is_none_or(|code| c.currency == code))
        .collect();

    ApiResponse::paginated(query.run(&pool, SEARCH_FIELDS).map(Country::clone))
}

async fn by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<ApiResponse<Country>> {
    let data = state.datasets().await;
    data.countries
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(&code))
        .map(|c| ApiResponse::ok(c.clone()))
        .ok_or_else(|| Error::not_found(format!("Country with code '{code}' not found")))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/countries", get(list))
        .route("/countries/{code}", get(by_code))
}
