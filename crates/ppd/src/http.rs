//! HTTP boundary: thin handlers over the pool reader

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use photopool::{keys, PhotoRecord, PoolReader};
use photostore::Store;
use serde_json::json;
use tracing::error;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub reader: Arc<PoolReader>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/random_photo", get(random_photo))
        .route("/stats", get(stats))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn random_photo(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let categories = parse_categories(params.get("category"));
    match state.reader.serve(categories.as_ref()).await {
        Ok(photo) => Json(json!({ "html_code": render_photo(&photo) })).into_response(),
        Err(err) => {
            error!("failed to serve a photo: {}", err);
            cache_unavailable()
        }
    }
}

async fn stats(State(state): State<AppState>) -> Response {
    match state.store.hash_len(keys::PHOTOS_KEY).await {
        Ok(pool_size) => Json(json!({
            "pool_size": pool_size,
            "stats": state.reader.stats().snapshot(),
        }))
        .into_response(),
        Err(err) => {
            error!("failed to read the pool size: {}", err);
            cache_unavailable()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

fn cache_unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": "cache unavailable" })),
    )
        .into_response()
}

/// `?category=cats,dogs` -> requested category set; absent or blank -> whole pool
fn parse_categories(raw: Option<&String>) -> Option<BTreeSet<String>> {
    let set: BTreeSet<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}

fn render_photo(photo: &PhotoRecord) -> String {
    format!("<div><img src=\"{}\"></div>", photo.url)
}
