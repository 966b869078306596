// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// Sources are fixture providers; the router is driven via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/trends  (limit handling, payload shape)
// - GET /api/posts   (trends + posts + topHashtags)
// - GET /api/poster  (headers, size defaults, download)
// - fetch failure -> 500 JSON

use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use image::GenericImageView;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use interior_trends_agent::ingest::providers::RssFeedProvider;
use interior_trends_agent::ingest::types::SourceProvider;
use interior_trends_agent::poster::PosterRenderer;
use interior_trends_agent::{router, AppConfig, AppState, TrendFetcher};

const BODY_LIMIT: usize = 16 * 1024 * 1024;

const DEZEEN_XML: &str = include_str!("fixtures/dezeen_rss.xml");
const ARCHDAILY_XML: &str = include_str!("fixtures/archdaily_rss.xml");
const MILK_ATOM: &str = include_str!("fixtures/milk_atom.xml");
const BROKEN_XML: &str = include_str!("fixtures/broken.xml");

fn app_with(providers: Vec<Box<dyn SourceProvider>>) -> Router {
    let cfg = AppConfig::builtin();
    let fetcher = TrendFetcher::new(providers, Duration::from_secs(2));
    let poster = PosterRenderer::new(cfg.poster.clone(), None);
    router(AppState::with_parts(cfg, fetcher, poster))
}

fn test_router() -> Router {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(RssFeedProvider::from_fixture("Dezeen", DEZEEN_XML)),
        Box::new(RssFeedProvider::from_fixture("ArchDaily", ARCHDAILY_XML)),
        Box::new(RssFeedProvider::from_fixture("Design Milk", MILK_ATOM)),
    ];
    app_with(providers)
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    app.oneshot(req).await.expect("oneshot")
}

async fn json_body(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("valid JSON")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let resp = get(test_router(), "/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), "ok");
}

#[tokio::test]
async fn api_trends_returns_items_with_expected_fields() {
    let resp = get(test_router(), "/api/trends").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;

    let items = v["items"].as_array().expect("items array");
    assert_eq!(items.len(), 6, "fixtures hold 6 unique trends");
    let first = &items[0];
    assert_eq!(first["source"], "Dezeen");
    assert_eq!(first["title"], "Terracotta tiles return to the kitchen");
    assert_eq!(first["id"].as_str().map(str::len), Some(16));
    assert!(first["publishedAt"].is_string());
    // Undated entries omit the field entirely.
    assert!(items[2].get("publishedAt").is_none());
}

#[tokio::test]
async fn api_trends_honours_limit() {
    let v = json_body(get(test_router(), "/api/trends?limit=2").await).await;
    assert_eq!(v["items"].as_array().unwrap().len(), 2);

    // Non-positive or garbage limits use the default.
    for uri in ["/api/trends?limit=0", "/api/trends?limit=abc"] {
        let v = json_body(get(test_router(), uri).await).await;
        assert_eq!(v["items"].as_array().unwrap().len(), 6, "{uri}");
    }
}

#[tokio::test]
async fn api_posts_pairs_trends_with_suggestions() {
    let resp = get(test_router(), "/api/posts?limit=3").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;

    let trends = v["trends"].as_array().unwrap();
    let posts = v["posts"].as_array().unwrap();
    assert_eq!(trends.len(), 3);
    assert_eq!(posts.len(), 3);
    for (t, p) in trends.iter().zip(posts) {
        assert_eq!(p["trendId"], t["id"]);
        assert_eq!(p["variants"].as_array().unwrap().len(), 3);
    }

    let top = v["topHashtags"].as_array().expect("topHashtags");
    assert!(!top.is_empty() && top.len() <= 10);
    assert_eq!(top[0], "#InteriorDesign");
}

#[tokio::test]
async fn api_poster_returns_png_with_no_store() {
    let resp = get(
        test_router(),
        "/api/poster?title=Warm%20Minimalism&source=Dezeen&url=https%3A%2F%2Fwww.dezeen.com%2Fx&w=200&h=250",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
    assert!(resp.headers().get(header::CONTENT_DISPOSITION).is_none());

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!(img.dimensions(), (200, 250));
}

#[tokio::test]
async fn api_poster_bad_params_still_render_default_size() {
    let resp = get(test_router(), "/api/poster?w=0&h=-4&url=not%20a%20url").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!(img.dimensions(), (1080, 1350));
}

#[tokio::test]
async fn api_poster_download_sets_attachment() {
    let resp = get(test_router(), "/api/poster?width=40&height=40&download=1").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cd = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(cd.starts_with("attachment"));
    assert!(cd.contains("poster.png"));
}

#[tokio::test]
async fn api_trends_all_sources_failed_is_500_json() {
    let providers: Vec<Box<dyn SourceProvider>> =
        vec![Box::new(RssFeedProvider::from_fixture("Broken", BROKEN_XML))];
    let app = app_with(providers);
    let resp = get(app.clone(), "/api/trends").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v = json_body(resp).await;
    assert!(v["error"].as_str().unwrap().contains("Broken"));

    let resp = get(app, "/api/posts").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn api_poster_repeated_or_aliased_params_use_first_value() {
    for (uri, dims) in [
        ("/api/poster?w=10&w=20&h=12", (10, 12)),
        ("/api/poster?w=10&width=20&h=12&height=30", (10, 12)),
        ("/api/poster?width=16&w=10&h=12", (16, 12)),
        ("/api/poster?title=a&title=b&w=10&h=10&download=0&download=1", (10, 10)),
    ] {
        let resp = get(test_router(), uri).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png", "{uri}");
        assert!(resp.headers().get(header::CONTENT_DISPOSITION).is_none(), "{uri}");
        let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.dimensions(), dims, "{uri}");
    }
}

#[tokio::test]
async fn api_trends_repeated_limit_uses_first_value() {
    let resp = get(test_router(), "/api/trends?limit=1&limit=2").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["items"].as_array().unwrap().len(), 1);

    let v = json_body(get(test_router(), "/api/posts?count=2&limit=5").await).await;
    assert_eq!(v["posts"].as_array().unwrap().len(), 2);
}
