use crate::models::{CreateArticle, SlugLookup, UpdateArticle};
use crate::services::articles::{self, ArticleError};
use crate::services::slug::{self, SlugOptions, Validation, MIN_TOKENS};
use crate::web::error::AppResult;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct PaginationParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

fn paginate(
    page: Option<usize>,
    per_page: Option<usize>,
    default_size: usize,
    max_size: usize,
) -> (usize, usize, usize) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(default_size).min(max_size).max(1);
    let offset = (page - 1).saturating_mul(per_page);
    (page, per_page, offset)
}

fn json_envelope(data: serde_json::Value, total: i64, page: usize, per_page: usize) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "data": data,
        "meta": {
            "total": total,
            "page": page,
            "per_page": per_page,
        }
    }))
}

fn json_single(data: serde_json::Value) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "data": data,
    }))
}

/// Percent-encoded API path of an article. Arabic slugs are not valid in a
/// `Location` header as-is.
fn article_path(slug: &str) -> anyhow::Result<String> {
    let mut url = url::Url::parse("http://localhost/api/v1/articles/")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("base url cannot have path segments"))?
        .pop_if_empty()
        .push(slug);
    Ok(url.path().to_string())
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
pub struct SlugifyRequest {
    pub text: String,
    pub max_length: Option<usize>,
    pub max_tokens: Option<usize>,
}

/// POST /api/v1/slugs
///
/// Client supplied limits can only tighten the configured ones.
pub async fn generate_slug(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SlugifyRequest>,
) -> Json<serde_json::Value> {
    let configured = state.config.slug.options();
    let options = SlugOptions {
        max_length: request
            .max_length
            .map_or(configured.max_length, |n| n.min(configured.max_length)),
        max_tokens: request
            .max_tokens
            .map_or(configured.max_tokens, |n| n.clamp(MIN_TOKENS, configured.max_tokens)),
    };

    let generated = slug::slugify_with(&request.text, &options);
    let valid = !generated.is_empty();
    json_single(serde_json::json!({
        "slug": generated,
        "valid": valid,
    }))
}

#[derive(Deserialize)]
pub struct ValidateRequest {
    pub slug: String,
}

/// POST /api/v1/slugs/validate
pub async fn validate_slug(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ValidateRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let verdict: Validation = slug::validate_with(&request.slug, &state.config.slug.options()).into();
    Ok(json_single(serde_json::to_value(verdict)?))
}

/// GET /api/v1/articles
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<serde_json::Value>> {
    let (page, per_page, offset) = paginate(
        params.page,
        params.per_page,
        state.config.api.default_page_size,
        state.config.api.max_page_size,
    );

    let total = articles::count_published(&state.db)?;
    let items = articles::list_published(&state.db, per_page, offset)?;
    Ok(json_envelope(serde_json::to_value(items)?, total, page, per_page))
}

/// POST /api/v1/articles
pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateArticle>,
) -> AppResult<Response> {
    let article = articles::create_article(&state.db, &state.config.slug, input)?;
    tracing::info!("Created article {} at {}", article.id, article.slug);
    Ok((StatusCode::CREATED, json_single(serde_json::to_value(article)?)).into_response())
}

/// GET /api/v1/articles/:slug
///
/// Only published articles are served; drafts answer 404.
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    match articles::lookup_published_slug(&state.db, &slug)? {
        Some(SlugLookup::Live(article)) => {
            Ok(json_single(serde_json::to_value(article)?).into_response())
        }
        Some(SlugLookup::Moved { current_slug }) => {
            Ok(Redirect::permanent(&article_path(&current_slug)?).into_response())
        }
        None => Err(ArticleError::NotFound(slug).into()),
    }
}

/// PUT /api/v1/articles/id/:id
pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<UpdateArticle>,
) -> AppResult<Json<serde_json::Value>> {
    let article = articles::update_article(&state.db, &state.config.slug, &id, input)?;
    Ok(json_single(serde_json::to_value(article)?))
}
