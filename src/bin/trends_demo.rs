//! Fetch once from the configured sources and print trends with post ideas as JSON.
//!
//! Usage: `trends_demo [limit] [poster.png]`. With a second argument the first trend is
//! also rendered to that file.

use interior_trends_agent::poster::{PosterQuery, PosterRenderer};
use interior_trends_agent::{AppConfig, Suggester, TrendFetcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let limit = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);
    let poster_out = args.next();

    let cfg = AppConfig::load_default()?;
    let fetcher = TrendFetcher::from_config(&cfg)?;
    let suggester = Suggester::new(cfg.text.clone());

    let trends = fetcher.fetch_trends(limit).await?;
    let posts: Vec<_> = trends.iter().map(|t| suggester.suggest(t)).collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "trends": trends, "posts": posts }))?
    );

    if let (Some(path), Some(first)) = (poster_out, trends.first()) {
        let renderer = PosterRenderer::from_config(&cfg.poster);
        let params = renderer.params(&PosterQuery {
            title: Some(first.title.clone()),
            source: Some(first.source.clone()),
            url: Some(first.link.clone()),
            ..PosterQuery::default()
        });
        std::fs::write(&path, renderer.render(&params)?)?;
        tracing::info!(%path, "poster written");
    }

    Ok(())
}
