//! Random user profiles and meme generation

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{non_empty, pick_random, Params};
use crate::error::{Error, Result};
use crate::query::ListQuery;
use crate::record::{FieldValue, Record};
use crate::responses::ApiResponse;
use crate::state::AppState;

const CAPTION_SERVICE: &str = "https://api.imgflip.com/caption_image";
const CAPTION_ACCOUNT: &str = "deepdevnodes";
const SEARCH_FIELDS: &[&str] = &["name", "description"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub template_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for MemeTemplate {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some((&self.id).into()),
            "name" => Some((&self.name).into()),
            "description" => Some((&self.description).into()),
            "template_url" => Some((&self.template_url).into()),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Caption {
    pub top: String,
    pub bottom: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Preview {
    pub template_url: String,
    pub top_text: String,
    pub bottom_text: String,
}

/// A captioned meme ready to render
#[derive(Debug, Serialize, Deserialize)]
pub struct Meme {
    pub template: MemeTemplate,
    pub text: Caption,
    pub generated_url: String,
    pub preview: Preview,
}

impl Meme {
    pub fn new(template: MemeTemplate, top: &str, bottom: &str) -> Self {
        let generated_url = format!(
            "{CAPTION_SERVICE}?template_id={}&username={CAPTION_ACCOUNT}&password={CAPTION_ACCOUNT}&text0={}&text1={}",
            template.id,
            urlencoding::encode(top),
            urlencoding::encode(bottom),
        );
        Self {
            preview: Preview {
                template_url: template.template_url.clone(),
                top_text: top.to_string(),
                bottom_text: bottom.to_string(),
            },
            text: Caption {
                top: top.to_string(),
                bottom: bottom.to_string(),
            },
            generated_url,
            template,
        }
    }
}

fn find_template<'a>(templates: &'a [MemeTemplate], id: &str) -> Result<&'a MemeTemplate> {
    templates
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::not_found("Meme template not found"))
}

async fn random_user(State(state): State<AppState>) -> Result<ApiResponse<Value>> {
    let data = state.datasets().await;
    pick_random(&data.random_users)
        .map(|user| ApiResponse::ok(user.clone()).with_message("Random user generated successfully"))
        .ok_or_else(|| Error::not_found("No users available"))
}

/// Every template, narrowed by `search` and field filters when given
async fn templates(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResponse<Vec<MemeTemplate>> {
    let data = state.datasets().await;
    let selected = ListQuery::from_params(&params).select(&data.meme_templates, SEARCH_FIELDS);
    ApiResponse::ok(selected).with_message("Meme templates retrieved successfully")
}

async fn template_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<MemeTemplate>> {
    let data = state.datasets().await;
    let template = find_template(&data.meme_templates, &id)?;
    Ok(ApiResponse::ok(template.clone()).with_message("Meme template retrieved successfully"))
}

/// Caption a template; `top`/`bottom` take precedence over `topText`/`bottomText`
async fn generate(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<ApiResponse<Meme>> {
    let id = non_empty(&params, "template")
        .ok_or_else(|| Error::bad_request("Template parameter is required"))?;

    let data = state.datasets().await;
    let template = find_template(&data.meme_templates, id)?;

    let top = non_empty(&params, "top")
        .or_else(|| non_empty(&params, "topText"))
        .unwrap_or_default();
    let bottom = non_empty(&params, "bottom")
        .or_else(|| non_empty(&params, "bottomText"))
        .unwrap_or_default();

    Ok(ApiResponse::ok(Meme::new(template.clone(), top, bottom))
        .with_message("Meme generated successfully"))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/fun/random-user", get(random_user))
        .route("/fun/meme", get(generate))
        .route("/fun/meme/templates", get(templates))
        .route("/fun/meme/templates/{id}", get(template_by_id))
}
