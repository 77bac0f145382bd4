use super::handlers;
use super::state::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::api::health))
        .route("/api/v1/slugs", post(handlers::api::generate_slug))
        .route("/api/v1/slugs/validate", post(handlers::api::validate_slug))
        .route(
            "/api/v1/articles",
            get(handlers::api::list_articles).post(handlers::api::create_article),
        )
        .route("/api/v1/articles/:slug", get(handlers::api::get_article))
        .route(
            "/api/v1/articles/id/:id",
            put(handlers::api::update_article),
        )
}
