use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use fts_core::manifest::DocumentEntry;
use fts_core::{IndexController, SearchOptions, SourceOptions};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const INDEX_PAGE: &str = include_str!("../static/index.html");

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub did_you_mean: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub fts: Arc<IndexController>,
    pub source_options: SourceOptions,
    pub admin_token: Option<String>,
}

impl AppState {
    /// State for a running server; the admin token comes from `ADMIN_TOKEN`.
    pub fn from_env(fts: Arc<IndexController>, source_options: SourceOptions) -> Self {
        let admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());
        Self { fts, source_options, admin_token }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health_handler))
        .route("/search", get(search_handler))
        .route("/documents", post(ingest_handler))
        .route("/index/build", post(build_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_layer() -> CorsLayer {
    match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    }
}

async fn index_page() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<String>> {
    let start = std::time::Instant::now();
    let options = SearchOptions { did_you_mean: params.did_you_mean };
    let texts: Vec<String> = state
        .fts
        .search_hits(&params.query, &options)
        .into_iter()
        .map(|hit| hit.text)
        .collect();
    tracing::debug!(
        query = %params.query,
        hits = texts.len(),
        took_s = start.elapsed().as_secs_f64(),
        "search"
    );
    Json(texts)
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(stats_json(&state.fts))
}

fn stats_json(fts: &IndexController) -> serde_json::Value {
    let stats = fts.stats();
    let built_at = stats
        .built_at
        .and_then(|t| t.format(&time::format_description::well_known::Rfc3339).ok());
    serde_json::json!({
        "state": stats.state.as_str(),
        "num_docs": stats.num_docs,
        "num_terms": stats.num_terms,
        "built_at": built_at,
    })
}

// --- Admin endpoints ---
async fn ingest_handler(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Json(entry): Json<DocumentEntry>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let doc_id = entry.id();
    let source = entry
        .into_source(None, &state.source_options)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("{e:#}")))?;
    state.fts.ingest_shared(source);
    tracing::info!(doc_id, "document ingested over http");
    Ok(Json(serde_json::json!({ "doc_id": doc_id, "state": state.fts.state().as_str() })))
}

async fn build_handler(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let fts = Arc::clone(&state.fts);
    // Sources may block on network or disk.
    tokio::task::spawn_blocking(move || fts.build())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("index build failed: {e}")))?;
    Ok(Json(stats_json(&state.fts)))
}

fn authorize(
    state: &AppState,
    headers: &axum::http::HeaderMap,
) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
