//! Interior Trends Agent — Binary Entrypoint
//! Boots the Axum HTTP server: trends, post suggestions, poster rendering, metrics.

use interior_trends_agent::{api, metrics::Metrics, AppConfig, AppState};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - TRENDS_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("TRENDS_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ingest=debug,poster=info,api=info,warn"));

    // The hosted runtime may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = AppConfig::load_default()?;
    tracing::info!(sources = cfg.sources.len(), "config loaded");

    let state = AppState::from_config(cfg)?;
    tracing::info!(
        sources = state.fetcher.source_count(),
        font = state.poster.has_font(),
        "app state built"
    );
    let mut router = api::router(state.clone());

    match Metrics::init(state.fetcher.source_count()) {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = %e, "metrics recorder not installed"),
    }

    Ok(router.into())
}
