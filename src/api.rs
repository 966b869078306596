use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::ingest::types::{FetchError, Trend};
use crate::ingest::TrendFetcher;
use crate::links::first_query_value;
use crate::poster::{PosterQuery, PosterRenderer};
use crate::suggest::{top_hashtags, PostSuggestion, Suggester, DEFAULT_TOP_HASHTAGS};

/// Read-only per-process state; every request works on its own fetch result.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<AppConfig>,
    pub fetcher: Arc<TrendFetcher>,
    pub suggester: Arc<Suggester>,
    pub poster: Arc<PosterRenderer>,
}

impl AppState {
    /// Production wiring: HTTP providers for every configured source, font from disk.
    pub fn from_config(cfg: AppConfig) -> anyhow::Result<Self> {
        let fetcher = TrendFetcher::from_config(&cfg)?;
        let poster = PosterRenderer::from_config(&cfg.poster);
        Ok(Self::with_parts(cfg, fetcher, poster))
    }

    pub fn with_parts(cfg: AppConfig, fetcher: TrendFetcher, poster: PosterRenderer) -> Self {
        Self {
            suggester: Arc::new(Suggester::new(cfg.text.clone())),
            cfg: Arc::new(cfg),
            fetcher: Arc::new(fetcher),
            poster: Arc::new(poster),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/trends", get(list_trends))
        .route("/api/posts", get(list_posts))
        .route("/api/poster", get(render_poster))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Requested count from `limit` (or `count`); the first occurrence wins.
fn limit_param(raw: Option<&str>) -> Option<String> {
    first_query_value(raw, &["limit", "count"])
}

/// Positive count capped at `max`; anything else gives `default`.
pub fn resolve_limit(raw: Option<&str>, default: usize, max: usize) -> usize {
    match raw.map(str::trim).and_then(|s| s.parse::<usize>().ok()) {
        Some(n) if n > 0 => n.min(max),
        _ => default,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        tracing::error!(target: "api", error = %self, "trend fetch failed");
        let body = ErrorBody {
            error: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct TrendsOut {
    items: Vec<Trend>,
}

async fn list_trends(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<TrendsOut>, FetchError> {
    let limit = resolve_limit(
        limit_param(raw.as_deref()).as_deref(),
        state.cfg.fetch.default_limit,
        state.cfg.fetch.max_limit,
    );
    let items = state.fetcher.fetch_trends(limit).await?;
    Ok(Json(TrendsOut { items }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostsOut {
    trends: Vec<Trend>,
    posts: Vec<PostSuggestion>,
    top_hashtags: Vec<String>,
}

async fn list_posts(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<PostsOut>, FetchError> {
    let limit = resolve_limit(
        limit_param(raw.as_deref()).as_deref(),
        state.cfg.fetch.suggestions_limit,
        state.cfg.fetch.max_limit,
    );
    let trends = state.fetcher.fetch_trends(limit).await?;
    let posts: Vec<PostSuggestion> = trends.iter().map(|t| state.suggester.suggest(t)).collect();
    let top_hashtags = top_hashtags(&posts, DEFAULT_TOP_HASHTAGS);
    Ok(Json(PostsOut {
        trends,
        posts,
        top_hashtags,
    }))
}

async fn render_poster(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let params = state.poster.params(&PosterQuery::from_query_str(raw.as_deref()));
    let download = params.download;

    let png = match state.poster.clone().render_async(params).await {
        Ok(png) => png,
        Err(e) => {
            tracing::error!(target: "api", error = %e, "poster fallback failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "poster unavailable").into_response();
        }
    };

    let mut resp = (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        png,
    )
        .into_response();
    if download {
        resp.headers_mut().insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"poster.png\""),
        );
    }
    resp
}
