//! Space launches, astronomy pictures and planetary data

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{cap, curated_sort, equals_folded, list_limit, non_empty, Params, DEFAULT_LIST_LIMIT};
use crate::error::{Error, Result};
use crate::query::{apply_sort, ListQuery, SortKey};
use crate::record::{FieldValue, Record};
use crate::responses::ApiResponse;
use crate::state::AppState;

const PLANET_SORTS: &[(&str, &str)] = &[
    ("name", "name"),
    ("diameter", "-diameter"),
    ("mass", "-mass"),
    ("moons", "-moons"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    pub id: String,
    pub name: String,
    pub date_utc: DateTime<Utc>,
    #[serde(default)]
    pub date_local: String,
    pub upcoming: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Launch {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some((&self.id).into()),
            "name" => Some((&self.name).into()),
            "date_utc" => Some(self.date_utc.timestamp_millis().into()),
            "upcoming" => Some(self.upcoming.into()),
            _ => None,
        }
    }
}

/// Astronomy picture of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apod {
    /// `YYYY-MM-DD`
    pub date: String,
    pub title: String,
    pub explanation: String,
    pub url: String,
    #[serde(default)]
    pub hdurl: String,
    pub media_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Apod {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "date" => Some((&self.date).into()),
            "title" => Some((&self.title).into()),
            "media_type" => Some((&self.media_type).into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Millions of kilometres
    pub distance_from_sun: f64,
    /// Kilometres
    pub diameter: f64,
    /// Kilograms
    pub mass: f64,
    pub orbital_period: f64,
    pub rotation_period: f64,
    #[serde(default)]
    pub moons: u32,
    #[serde(default)]
    pub rings: bool,
    #[serde(default)]
    pub atmosphere: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Planet {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some((&self.name).into()),
            "type" => Some((&self.kind).into()),
            "distance_from_sun" => Some(self.distance_from_sun.into()),
            "diameter" => Some(self.diameter.into()),
            "mass" => Some(self.mass.into()),
            "orbital_period" => Some(self.orbital_period.into()),
            "rotation_period" => Some(self.rotation_period.into()),
            "moons" => Some(self.moons.into()),
            "rings" => Some(self.rings.into()),
            "atmosphere" => Some((&self.atmosphere).into()),
            _ => None,
        }
    }
}

/// Launches ordered by date, soonest first
///
/// `upcoming` defaults to `true`; `false` selects past launches and any
/// other value selects both.
async fn launches(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Vec<Launch>> {
    let data = state.datasets().await;
    let mut query = ListQuery::new().with_sort(SortKey::asc("date_utc"));
    if let status @ ("true" | "false") = params.get("upcoming").map_or("true", String::as_str) {
        query = query.with_filter("upcoming", status);
    }

    let selected = query.select(&data.launches, &[]);
    ApiResponse::ok(cap(selected, list_limit(&params, DEFAULT_LIST_LIMIT)))
        .with_message("Space launches retrieved successfully")
}

/// The most recent picture
async fn apod(State(state): State<AppState>) -> Result<ApiResponse<Apod>> {
    let data = state.datasets().await;
    apply_sort(&data.apod, Some(&SortKey::desc("date")))
        .into_iter()
        .next()
        .map(|picture| {
            ApiResponse::ok(picture)
                .with_message("Astronomy Picture of the Day retrieved successfully")
        })
        .ok_or_else(|| Error::not_found("No astronomy picture available"))
}

/// Planets; `type` must match exactly, ignoring case
async fn planets(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Vec<Planet>> {
    let data = state.datasets().await;
    let pool: Vec<&Planet> = match non_empty(&params, "type") {
        Some(kind) => data
            .planets
            .iter()
            .filter(|p| equals_folded(&p.kind, kind))
            .collect(),
        None => data.planets.iter().collect(),
    };

    let sort = curated_sort(non_empty(&params, "sort"), PLANET_SORTS, "distance_from_sun");
    let sorted: Vec<Planet> = apply_sort(&pool, Some(&sort))
        .into_iter()
        .cloned()
        .collect();
    ApiResponse::ok(sorted).with_message("Planetary data retrieved successfully")
}

async fn planet_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ApiResponse<Planet>> {
    let data = state.datasets().await;
    data.planets
        .iter()
        .find(|p| equals_folded(&p.name, &name))
        .map(|p| ApiResponse::ok(p.clone()).with_message("Planet data retrieved successfully"))
        .ok_or_else(|| Error::not_found("Planet not found"))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/space/launches", get(launches))
        .route("/space/apod", get(apod))
        .route("/space/planets", get(planets))
        .route("/space/planets/{name}", get(planet_by_name))
}
