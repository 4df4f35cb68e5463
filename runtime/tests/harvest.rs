//! Run driver: seed isolation, resource release, aggregation, persistence.

mod common;

use common::*;
use pagesift::config::HarvestConfig;
use pagesift::harvest::Harvester;
use pagesift::output::{persist_results, Persisted};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn config(seeds: &[&str], selector: Option<&str>) -> HarvestConfig {
    let doc = serde_json::json!({
        "start_urls": seeds,
        "examples": ["Alpha headline 0"],
        "pagination_selector": selector,
        "settle_ms": 0,
    });
    HarvestConfig::from_json_str(&doc.to_string(), Path::new("config.json")).unwrap()
}

#[tokio::test]
async fn test_results_are_deduplicated_across_seeds() {
    let site = FakeSite::new(vec![
        ("https://a.test/", FakePage::new("<h2>Shared story</h2><h2>Only on A</h2>")),
        ("https://b.test/", FakePage::new("<h2>Only on B</h2><h2>Shared story</h2>")),
    ]);
    let patterns = Arc::new(FakePatterns::default());
    let harvester = Harvester::new(
        Arc::new(site.clone()),
        patterns.clone(),
        config(&["https://a.test/", "https://b.test/", "https://a.test/"], None),
    );

    let report = harvester.run().await;

    let results: Vec<&str> = report.results.iter().map(String::as_str).collect();
    assert_eq!(results, vec!["Shared story", "Only on A", "Only on B"]);
    assert_eq!(report.seeds.len(), 3);
    assert_eq!(report.failed_seeds(), 0);
    // Duplicate seeds are processed again; each gets its own training.
    assert_eq!(patterns.trained.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_each_seed_gets_its_own_browser_and_releases_it() {
    let site = FakeSite::new(vec![
        ("https://a.test/", FakePage::new("<h2>A</h2>")),
        ("https://b.test/", FakePage::new("<h2>B</h2>")),
    ]);
    let harvester = Harvester::new(
        Arc::new(site.clone()),
        Arc::new(FakePatterns::default()),
        config(&["https://a.test/", "https://b.test/"], None),
    );

    harvester.run().await;

    let log = site.log.lock().unwrap();
    assert_eq!(log.launches, 2);
    assert_eq!(log.shutdowns, 2);
    assert_eq!(log.contexts_opened, 2);
    assert_eq!(log.contexts_closed, 2);
}

#[tokio::test]
async fn test_training_failure_skips_seed_but_releases_browser() {
    let site = FakeSite::new(vec![
        ("https://a.test/", FakePage::new("<h2>From A</h2>")),
        ("https://b.test/", FakePage::new("<h2>From B</h2>")),
    ]);
    let patterns = FakePatterns {
        untrainable: ["https://a.test/".to_string()].into_iter().collect(),
        ..FakePatterns::default()
    };
    let harvester = Harvester::new(
        Arc::new(site.clone()),
        Arc::new(patterns),
        config(&["https://a.test/", "https://b.test/"], None),
    );

    let report = harvester.run().await;

    let results: Vec<&str> = report.results.iter().map(String::as_str).collect();
    assert_eq!(results, vec!["From B"]);
    assert_eq!(report.failed_seeds(), 1);
    let failed = &report.seeds[0];
    assert_eq!(failed.seed, "https://a.test/");
    assert!(failed.error.as_deref().unwrap().contains("connection refused"));

    let log = site.log.lock().unwrap();
    assert_eq!(log.navigations, vec!["https://b.test/"]);
    assert_eq!(log.contexts_closed, log.contexts_opened);
    assert_eq!(log.shutdowns, log.launches);
}

#[tokio::test]
async fn test_browser_failures_do_not_abort_the_run() {
    let site = FakeSite::new(vec![("https://a.test/", FakePage::new("<h2>A</h2>"))]).failing_launch();
    let harvester = Harvester::new(
        Arc::new(site),
        Arc::new(FakePatterns::default()),
        config(&["https://a.test/", "https://b.test/"], None),
    );
    let report = harvester.run().await;
    assert_eq!(report.failed_seeds(), 2);
    assert!(report.results.is_empty());

    let site = FakeSite::new(vec![("https://a.test/", FakePage::new("<h2>A</h2>"))]).failing_context();
    let harvester = Harvester::new(
        Arc::new(site.clone()),
        Arc::new(FakePatterns::default()),
        config(&["https://a.test/"], None),
    );
    let report = harvester.run().await;
    assert_eq!(report.failed_seeds(), 1);
    assert_eq!(site.log.lock().unwrap().shutdowns, 1);
}

#[tokio::test]
async fn test_failing_matcher_everywhere_equals_heuristics_alone() {
    let pages = vec![
        ("https://a.test/", FakePage::new(headlines("a", 2)).next("/2")),
        ("https://a.test/2", FakePage::new(headlines("a2", 1))),
    ];
    let failing = Harvester::new(
        Arc::new(FakeSite::new(pages.clone())),
        Arc::new(FakePatterns {
            failing_matcher: true,
            ..FakePatterns::default()
        }),
        config(&["https://a.test/"], Some("a.next")),
    );
    let report = failing.run().await;

    let results: Vec<&str> = report.results.iter().map(String::as_str).collect();
    assert_eq!(results, vec!["a headline 0", "a headline 1", "a2 headline 0"]);
    assert_eq!(report.failed_seeds(), 0);
    assert_eq!(report.seeds[0].failures.len(), 2);
    assert_eq!(report.seeds[0].pages_visited, 2);
}

#[tokio::test]
async fn test_no_results_writes_no_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("results").join("output.csv");
    let site = FakeSite::new(vec![("https://a.test/", FakePage::new("<p>nothing here</p>"))]);
    let harvester = Harvester::new(
        Arc::new(site),
        Arc::new(FakePatterns::default()),
        config(&["https://a.test/", "https://offline.test/"], None),
    );

    let report = harvester.run().await;
    let results: Vec<String> = report.results.into_iter().collect();
    assert_eq!(persist_results(&output, &results).unwrap(), Persisted::Empty);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_results_are_written_once_per_unique_string() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("results").join("output.csv");
    let site = FakeSite::new(vec![
        ("https://a.test/", FakePage::new("<h2>Same</h2><h2>Same</h2><h2>Other</h2>")),
        ("https://b.test/", FakePage::new("<h2>Same</h2>")),
    ]);
    let harvester = Harvester::new(
        Arc::new(site),
        Arc::new(FakePatterns {
            learned: vec!["Learned".to_string()],
            ..FakePatterns::default()
        }),
        config(&["https://a.test/", "https://b.test/"], None),
    );

    let report = harvester.run().await;
    let results: Vec<String> = report.results.into_iter().collect();
    assert!(matches!(
        persist_results(&output, &results).unwrap(),
        Persisted::Written { rows: 3, .. }
    ));

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let rows: Vec<String> = reader
        .records()
        .map(|r| r.unwrap().get(0).unwrap().to_string())
        .collect();
    assert_eq!(rows, vec!["Same", "Other", "Learned"]);
}

#[tokio::test]
async fn test_report_serialises_to_json() {
    let site = FakeSite::new(vec![("https://a.test/", FakePage::new("<h2>A story</h2>"))]);
    let harvester = Harvester::new(
        Arc::new(site),
        Arc::new(FakePatterns::default()),
        config(&["https://a.test/"], None),
    );
    let report = harvester.run().await;
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["results"], serde_json::json!(["A story"]));
    assert_eq!(json["seeds"][0]["pages_visited"], 1);
    assert!(json["seeds"][0]["error"].is_null());
}
