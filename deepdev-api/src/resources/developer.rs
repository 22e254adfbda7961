//! Developer ecosystem trends: GitHub, npm and Stack Overflow

use std::collections::BTreeSet;

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{cap, curated_sort, equals_folded, list_limit, non_empty, Params, DEFAULT_LIST_LIMIT};
use crate::query::{apply_sort, ListQuery};
use crate::record::{FieldValue, Record};
use crate::responses::ApiResponse;
use crate::state::AppState;

const GITHUB_SORTS: &[(&str, &str)] = &[
    ("stars", "-stars"),
    ("forks", "-forks"),
    ("starsToday", "-starsToday"),
];

const NPM_SORTS: &[(&str, &str)] = &[
    ("downloads", "-downloads"),
    ("stars", "-stars"),
    ("downloadsChange", "-downloadsChange"),
];

const STACKOVERFLOW_SORTS: &[(&str, &str)] = &[
    ("score", "-score"),
    ("views", "-view_count"),
    ("answers", "-answer_count"),
    ("newest", "-creation_date"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubRepo {
    pub repository_name: String,
    #[serde(default)]
    pub description: String,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    #[serde(default)]
    pub stars_today: u64,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for GithubRepo {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "repositoryName" => Some((&self.repository_name).into()),
            "description" => Some((&self.description).into()),
            "language" => Some((&self.language).into()),
            "stars" => Some(self.stars.into()),
            "forks" => Some(self.forks.into()),
            "starsToday" => Some(self.stars_today.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpmPackage {
    #[serde(default)]
    pub rank: u32,
    /// Package metadata (name, version, author, ...)
    pub package: Value,
    pub downloads: u64,
    #[serde(default)]
    pub downloads_change: f64,
    #[serde(default)]
    pub stars: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for NpmPackage {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "rank" => Some(self.rank.into()),
            "downloads" => Some(self.downloads.into()),
            "downloadsChange" => Some(self.downloads_change.into()),
            "stars" => Some(self.stars.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: u64,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub score: i64,
    pub view_count: u64,
    pub answer_count: u64,
    pub is_answered: bool,
    pub creation_date: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Question {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "question_id" => Some(self.question_id.into()),
            "title" => Some((&self.title).into()),
            "tags" => Some((&self.tags).into()),
            "score" => Some(self.score.into()),
            "view_count" => Some(self.view_count.into()),
            "answer_count" => Some(self.answer_count.into()),
            "is_answered" => Some(self.is_answered.into()),
            "creation_date" => Some(self.creation_date.timestamp_millis().into()),
            _ => None,
        }
    }
}

/// Capped list with its size
#[derive(Debug, Serialize, Deserialize)]
pub struct Listing<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubStats {
    pub total_repos: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub languages: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpmStats {
    pub total_packages: usize,
    pub total_downloads: u64,
    pub total_stars: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackoverflowStats {
    pub total_questions: usize,
    pub total_answers: u64,
    pub total_views: u64,
    pub answered_questions: usize,
    pub tags: Vec<String>,
}

/// Aggregate figures across the three trend datasets
#[derive(Debug, Serialize, Deserialize)]
pub struct DeveloperStats {
    pub github: GithubStats,
    pub npm: NpmStats,
    pub stackoverflow: StackoverflowStats,
}

impl DeveloperStats {
    pub fn summarize(repos: &[GithubRepo], packages: &[NpmPackage], questions: &[Question]) -> Self {
        Self {
            github: GithubStats {
                total_repos: repos.len(),
                total_stars: repos.iter().map(|r| r.stars).sum(),
                total_forks: repos.iter().map(|r| r.forks).sum(),
                languages: unique(repos.iter().filter_map(|r| r.language.as_deref())),
            },
            npm: NpmStats {
                total_packages: packages.len(),
                total_downloads: packages.iter().map(|p| p.downloads).sum(),
                total_stars: packages.iter().map(|p| p.stars).sum(),
            },
            stackoverflow: StackoverflowStats {
                total_questions: questions.len(),
                total_answers: questions.iter().map(|q| q.answer_count).sum(),
                total_views: questions.iter().map(|q| q.view_count).sum(),
                answered_questions: questions.iter().filter(|q| q.is_answered).count(),
                tags: unique(questions.iter().flat_map(|q| q.tags.iter().map(String::as_str))),
            },
        }
    }
}

/// Distinct non-empty values in first-seen order
fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .filter(|value| !value.is_empty() && seen.insert(*value))
        .map(str::to_string)
        .collect()
}

/// Trending repositories; `language` must match exactly, ignoring case
async fn github_trending(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Listing<GithubRepo>> {
    let data = state.datasets().await;
    let pool: Vec<&GithubRepo> = match non_empty(&params, "language") {
        Some(language) => data
            .github
            .iter()
            .filter(|r| r.language.as_deref().is_some_and(|l| equals_folded(l, language)))
            .collect(),
        None => data.github.iter().collect(),
    };

    let sort = curated_sort(non_empty(&params, "sort"), GITHUB_SORTS, "-stars");
    let sorted: Vec<GithubRepo> = apply_sort(&pool, Some(&sort))
        .into_iter()
        .cloned()
        .collect();
    ApiResponse::ok(cap(sorted, list_limit(&params, DEFAULT_LIST_LIMIT)).into())
}

async fn npm_trending(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Listing<NpmPackage>> {
    let data = state.datasets().await;
    let sort = curated_sort(non_empty(&params, "sort"), NPM_SORTS, "-downloads");
    let sorted = apply_sort(&data.npm, Some(&sort));
    ApiResponse::ok(cap(sorted, list_limit(&params, DEFAULT_LIST_LIMIT)).into())
}

/// Trending questions
///
/// `tag` matches any tag by substring; `answered=true` keeps answered
/// questions and any other value keeps unanswered ones.
async fn stackoverflow_trending(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Listing<Question>> {
    let data = state.datasets().await;
    let mut query = ListQuery::new().with_sort(curated_sort(
        non_empty(&params, "sort"),
        STACKOVERFLOW_SORTS,
        "-score",
    ));
    if let Some(tag) = non_empty(&params, "tag") {
        query = query.with_filter("tags", tag);
    }
    if let Some(answered) = params.get("answered") {
        let answered = if answered == "true" { "true" } else { "false" };
        query = query.with_filter("is_answered", answered);
    }

    let selected = query.select(&data.stackoverflow, &[]);
    ApiResponse::ok(cap(selected, list_limit(&params, DEFAULT_LIST_LIMIT)).into())
}

async fn stats(State(state): State<AppState>) -> ApiResponse<DeveloperStats> {
    let data = state.datasets().await;
    ApiResponse::ok(DeveloperStats::summarize(
        &data.github,
        &data.npm,
        &data.stackoverflow,
    ))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/developer/github-trending", get(github_trending))
        .route("/developer/npm-trending", get(npm_trending))
        .route("/developer/stackoverflow-trending", get(stackoverflow_trending))
        .route("/developer/stats", get(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get;
    use axum::http::StatusCode;

    fn column(body: &Value, field: &str) -> Vec<Value> {
        body["data"]["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item[field].clone())
            .collect()
    }

    #[test]
    fn test_unique_keeps_first_seen_order() {
        let values = ["rust", "go", "rust", "", "zig", "go"];
        assert_eq!(unique(values.into_iter()), vec!["rust", "go", "zig"]);
    }

    #[tokio::test]
    async fn test_github_default_stars_desc() {
        let (status, body) = get("/api/developer/github-trending?limit=0").await;
        assert_eq!(status, StatusCode::OK);
        let stars: Vec<u64> = column(&body, "stars").iter().map(|s| s.as_u64().unwrap()).collect();
        assert_eq!(body["data"]["count"], stars.len());
        assert!(stars.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_github_language_exact() {
        let (_, body) = get("/api/developer/github-trending?language=RUST").await;
        let languages = column(&body, "language");
        assert!(!languages.is_empty());
        assert!(languages.iter().all(|l| l == "Rust"));
    }

    #[tokio::test]
    async fn test_github_limit_and_count() {
        let (_, body) = get("/api/developer/github-trending?sort=forks&limit=2").await;
        assert_eq!(body["data"]["count"], 2);
        let forks: Vec<u64> = column(&body, "forks").iter().map(|f| f.as_u64().unwrap()).collect();
        assert!(forks[0] >= forks[1]);
    }

    #[tokio::test]
    async fn test_npm_sort_downloads_change() {
        let (_, body) = get("/api/developer/npm-trending?sort=downloadsChange&limit=0").await;
        let changes: Vec<f64> = column(&body, "downloadsChange")
            .iter()
            .map(|c| c.as_f64().unwrap())
            .collect();
        assert!(changes.len() > 1);
        assert!(changes.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_stackoverflow_tag_and_answered() {
        let (_, body) =
            get("/api/developer/stackoverflow-trending?tag=script&answered=true&limit=0").await;
        let questions = body["data"]["data"].as_array().unwrap();
        assert!(!questions.is_empty());
        for question in questions {
            assert_eq!(question["is_answered"], true);
            assert!(question["tags"]
                .as_array()
                .unwrap()
                .iter()
                .any(|t| t.as_str().unwrap().contains("script")));
        }

        let (_, unanswered) =
            get("/api/developer/stackoverflow-trending?answered=no&limit=0").await;
        assert!(unanswered["data"]["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|q| q["is_answered"] == false));
    }

    #[tokio::test]
    async fn test_stackoverflow_newest_first() {
        let (_, body) = get("/api/developer/stackoverflow-trending?sort=newest&limit=0").await;
        let dates: Vec<DateTime<Utc>> = column(&body, "creation_date")
            .iter()
            .map(|d| d.as_str().unwrap().parse().unwrap())
            .collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_stats_totals() {
        let (_, github) = get("/api/developer/github-trending?limit=0").await;
        let (status, body) = get("/api/developer/stats").await;
        assert_eq!(status, StatusCode::OK);

        let total_stars: u64 = column(&github, "stars").iter().map(|s| s.as_u64().unwrap()).sum();
        assert_eq!(body["data"]["github"]["totalStars"], total_stars);
        assert_eq!(body["data"]["github"]["totalRepos"], github["data"]["count"]);

        let tags = body["data"]["stackoverflow"]["tags"].as_array().unwrap();
        let mut deduped = tags.clone();
        deduped.dedup();
        assert_eq!(tags.len(), deduped.len());
    }
}
