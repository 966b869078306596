// tests/ingest_fetch.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

use interior_trends_agent::ingest::providers::RssFeedProvider;
use interior_trends_agent::ingest::types::{FetchError, RawEntry, SourceProvider};
use interior_trends_agent::TrendFetcher;

const DEZEEN_XML: &str = include_str!("fixtures/dezeen_rss.xml");
const ARCHDAILY_XML: &str = include_str!("fixtures/archdaily_rss.xml");
const MILK_ATOM: &str = include_str!("fixtures/milk_atom.xml");
const BROKEN_XML: &str = include_str!("fixtures/broken.xml");

struct FailingProvider;

#[async_trait]
impl SourceProvider for FailingProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawEntry>> {
        Err(anyhow!("connection refused"))
    }
    fn name(&self) -> &str {
        "Offline"
    }
}

struct SlowProvider;

#[async_trait]
impl SourceProvider for SlowProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawEntry>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(vec![RawEntry {
            title: Some("Too late".into()),
            link: Some("https://slow.test/late".into()),
            published_at: None,
        }])
    }
    fn name(&self) -> &str {
        "Slow"
    }
}

fn fixture_fetcher() -> TrendFetcher {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(RssFeedProvider::from_fixture("Dezeen", DEZEEN_XML)),
        Box::new(RssFeedProvider::from_fixture("ArchDaily", ARCHDAILY_XML)),
        Box::new(RssFeedProvider::from_fixture("Design Milk", MILK_ATOM)),
    ];
    TrendFetcher::new(providers, Duration::from_secs(2))
}

#[tokio::test]
async fn merges_sources_in_priority_then_recency_order() {
    let trends = fixture_fetcher().fetch_trends(50).await.expect("fetch ok");
    let titles: Vec<_> = trends.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Terracotta tiles return to the kitchen",
            "Warm Minimalism in Small Spaces",
            "Undated studio tour & notes",
            "Japandi bedrooms for compact apartments",
            "Boucle & curved sofas take over living rooms",
            "Color drenching, room by room",
        ]
    );
    assert!(trends[2].published_at.is_none());
    assert_eq!(trends[4].source, "Design Milk");
}

#[tokio::test]
async fn same_article_from_two_sources_keeps_the_first_source() {
    let trends = fixture_fetcher().fetch_trends(50).await.unwrap();
    let warm: Vec<_> = trends
        .iter()
        .filter(|t| t.link.contains("warm-minimalism"))
        .collect();
    assert_eq!(warm.len(), 1);
    assert_eq!(warm[0].source, "Dezeen");
}

#[tokio::test]
async fn never_more_than_limit_and_ids_unique() {
    let fetcher = fixture_fetcher();
    for limit in 1..=8 {
        let trends = fetcher.fetch_trends(limit).await.unwrap();
        assert!(trends.len() <= limit);
        let ids: HashSet<_> = trends.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids.len(), trends.len());
    }
}

#[tokio::test]
async fn ids_are_stable_across_fetches() {
    let fetcher = fixture_fetcher();
    let a = fetcher.fetch_trends(10).await.unwrap();
    let b = fetcher.fetch_trends(10).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn one_failing_source_is_skipped() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(FailingProvider),
        Box::new(RssFeedProvider::from_fixture("Broken", BROKEN_XML)),
        Box::new(RssFeedProvider::from_fixture("Design Milk", MILK_ATOM)),
    ];
    let fetcher = TrendFetcher::new(providers, Duration::from_secs(2));
    let trends = fetcher.fetch_trends(10).await.expect("partial success");
    assert_eq!(trends.len(), 2);
    assert!(trends.iter().all(|t| t.source == "Design Milk"));
}

#[tokio::test]
async fn all_sources_failing_is_a_fetch_error() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(FailingProvider),
        Box::new(RssFeedProvider::from_fixture("Broken", BROKEN_XML)),
    ];
    let fetcher = TrendFetcher::new(providers, Duration::from_secs(2));
    match fetcher.fetch_trends(10).await {
        Err(FetchError::AllSourcesFailed { attempted, failures }) => {
            assert_eq!(attempted, 2);
            let names: Vec<_> = failures.iter().map(|f| f.source.as_str()).collect();
            assert_eq!(names, vec!["Offline", "Broken"]);
        }
        other => panic!("expected AllSourcesFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn no_sources_is_a_fetch_error() {
    let fetcher = TrendFetcher::new(vec![], Duration::from_secs(1));
    assert!(matches!(
        fetcher.fetch_trends(5).await,
        Err(FetchError::NoSources)
    ));
}

#[tokio::test]
async fn slow_source_times_out_without_blocking_others() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(SlowProvider),
        Box::new(RssFeedProvider::from_fixture("Dezeen", DEZEEN_XML)),
    ];
    let fetcher = TrendFetcher::new(providers, Duration::from_millis(200));
    let trends = fetcher.fetch_trends(10).await.unwrap();
    assert_eq!(trends.len(), 3);
    assert!(trends.iter().all(|t| t.source == "Dezeen"));
}

#[tokio::test]
async fn only_slow_source_fails_the_fetch() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(SlowProvider)];
    let fetcher = TrendFetcher::new(providers, Duration::from_millis(200));
    let err = fetcher.fetch_trends(10).await.unwrap_err();
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn empty_feed_counts_as_success() {
    let empty = r#"<rss version="2.0"><channel><title>Quiet</title></channel></rss>"#;
    let providers: Vec<Box<dyn SourceProvider>> =
        vec![Box::new(RssFeedProvider::from_fixture("Quiet", empty))];
    let fetcher = TrendFetcher::new(providers, Duration::from_secs(1));
    assert!(fetcher.fetch_trends(10).await.unwrap().is_empty());
}
