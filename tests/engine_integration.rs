//! End-to-end engine tests against the simulated provider.

use tempfile::TempDir;
use websearch::{Config, SearchError, SearchFilter, WebSearchEngine};

fn simulated_config() -> Config {
    let mut config = Config::default();
    config.api.default_provider = "simulated".to_string();
    config
}

fn engine_in(dir: &TempDir) -> WebSearchEngine {
    WebSearchEngine::with_data_dir(simulated_config(), dir.path())
}

#[tokio::test]
async fn basic_search_returns_scored_results() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    let (results, total, elapsed) = engine.search("python tutorial", 1, None, true).await;

    assert!(!results.is_empty());
    assert!(total > 0);
    assert!(elapsed >= 0.0);
    for result in &results {
        assert!(!result.title.is_empty());
        assert!(!result.url.is_empty());
        assert!((0.0..=1.0).contains(&result.relevance_score));
    }
}

#[tokio::test]
async fn results_sorted_by_descending_score() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    let (results, _, _) = engine.search("python tutorial", 1, None, true).await;

    for pair in results.windows(2) {
        assert!(pair[0].relevance_score >= pair[1].relevance_score);
    }
}

#[tokio::test]
async fn repeated_search_hits_cache_with_identical_results() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    let (first, first_total, _) = engine.search("python tutorial", 1, None, true).await;
    let hits_before = engine.search_stats().cache_hits;
    let (second, second_total, _) = engine.search("python tutorial", 1, None, true).await;

    assert_eq!(first, second);
    assert_eq!(first_total, second_total);
    assert_eq!(engine.search_stats().cache_hits, hits_before + 1);
}

#[tokio::test]
async fn cache_hit_does_not_touch_history_or_session_counters() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    engine.search("python tutorial", 1, None, true).await;
    let searches_before = engine.search_stats().total_searches;
    let history_before = engine.search_stats().history_entries;

    engine.search("python tutorial", 1, None, true).await;

    let stats = engine.search_stats();
    assert_eq!(stats.total_searches, searches_before);
    assert_eq!(stats.history_entries, history_before);
}

#[tokio::test]
async fn cache_bypass_reexecutes() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    engine.search("python tutorial", 1, None, true).await;
    let hits_before = engine.search_stats().cache_hits;
    engine.search("python tutorial", 1, None, false).await;

    assert_eq!(engine.search_stats().cache_hits, hits_before);
    assert_eq!(engine.search_stats().total_searches, 2);
}

#[tokio::test]
async fn empty_query_returns_empty_page() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    let (results, total, elapsed) = engine.search("   ", 1, None, true).await;
    assert!(results.is_empty());
    assert_eq!(total, 0);
    assert!(elapsed >= 0.0);
    assert_eq!(engine.search_stats().total_searches, 0);
}

#[tokio::test]
async fn filters_only_query_returns_empty_page() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    let (results, total, _) = engine.search("site:example.com", 1, None, true).await;
    assert!(results.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn previous_page_on_first_page_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    engine.search("python tutorial", 1, None, true).await;
    let err = engine.previous_page().await.unwrap_err();
    assert!(matches!(err, SearchError::NotFound(_)));
}

#[tokio::test]
async fn pagination_without_active_search_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    assert!(matches!(
        engine.next_page().await.unwrap_err(),
        SearchError::NotFound(_)
    ));
    assert!(matches!(
        engine.previous_page().await.unwrap_err(),
        SearchError::NotFound(_)
    ));
}

#[tokio::test]
async fn next_then_previous_page_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    let (page_one, _, _) = engine.search("python tutorial", 1, None, true).await;
    assert!(engine.total_pages() > 1);

    let (page_two, _, _) = engine.next_page().await.expect("second page exists");
    assert_eq!(engine.current_page(), 2);
    assert_ne!(page_one, page_two);

    let (back, _, _) = engine.previous_page().await.expect("first page exists");
    assert_eq!(engine.current_page(), 1);
    assert_eq!(back, page_one);
}

#[tokio::test]
async fn next_page_at_last_page_still_executes() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = simulated_config();
    config.search.results_per_page = 1000;
    let mut engine = WebSearchEngine::with_data_dir(config, dir.path());

    engine.search("python tutorial", 11, None, true).await;
    assert_eq!(engine.current_page(), engine.total_pages());

    // Past the last page the provider decides what comes back; the
    // call itself must go through.
    let (_, _, _) = engine.next_page().await.expect("pagination executes");
    assert_eq!(engine.current_page(), 12);
}

#[tokio::test]
async fn next_page_keeps_one_off_filters() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    let filters = SearchFilter {
        language: "en".to_string(),
        ..SearchFilter::default()
    };
    engine
        .search("python tutorial", 1, Some(filters), true)
        .await;
    assert_eq!(engine.current_filters().language, "en");

    engine.next_page().await.expect("second page exists");
    assert_eq!(engine.current_filters().language, "en");

    engine.previous_page().await.expect("first page exists");
    assert_eq!(engine.current_filters().language, "en");
}

#[tokio::test]
async fn high_page_number_does_not_panic() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    let (results, _, _) = engine.search("python tutorial", 500, None, true).await;
    // The simulated provider pads pages indefinitely, so the call just
    // succeeds; the point is that nothing overflows or panics.
    assert!(results.len() <= simulated_config().search.results_per_page);
}

#[tokio::test]
async fn one_off_filters_do_not_stick() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    let filters = SearchFilter {
        language: "en".to_string(),
        ..SearchFilter::default()
    };
    engine.search("python tutorial", 1, Some(filters), true).await;
    assert_eq!(engine.current_filters().language, "en");

    // A later search without explicit filters reverts to the active set.
    engine.search("rust tutorial", 1, None, true).await;
    assert_eq!(engine.current_filters().language, "any");
}

#[tokio::test]
async fn preset_filters_apply_to_searches() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    let preset = engine
        .filters()
        .preset("news")
        .cloned()
        .expect("builtin preset");
    engine.filters_mut().apply(preset).expect("valid preset");

    engine.search("news 2024", 1, None, true).await;
    assert!(engine.current_filters().is_active());
    // The canned news results survive the content-type post-filter.
    assert!(engine
        .current_results()
        .iter()
        .all(|r| r.result_type == websearch::ResultType::News));
}

#[tokio::test]
async fn history_records_completed_searches() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    engine.search("python tutorial", 1, None, true).await;
    engine.search("rust tutorial", 1, None, true).await;

    let recent = engine.recent_history(10);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].query, "python tutorial");
    assert_eq!(recent[1].query, "rust tutorial");
    assert_eq!(recent[1].session_id, engine.session_id());
}

#[tokio::test]
async fn history_persists_across_engine_instances() {
    let dir = TempDir::new().expect("tempdir");

    {
        let mut engine = engine_in(&dir);
        engine.search("python tutorial", 1, None, true).await;
    }

    let engine = engine_in(&dir);
    let recent = engine.recent_history(10);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].query, "python tutorial");
}

#[tokio::test]
async fn history_is_bounded() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = simulated_config();
    config.history.max_entries = 3;
    let mut engine = WebSearchEngine::with_data_dir(config, dir.path());

    for i in 0..5 {
        engine
            .search(&format!("query number {i}"), 1, None, true)
            .await;
    }

    let recent = engine.recent_history(10);
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].query, "query number 2");
    assert_eq!(recent[2].query, "query number 4");
}

#[tokio::test]
async fn stats_track_searches_and_averages() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    engine.search("python tutorial", 1, None, true).await;
    engine.search("rust tutorial", 1, None, true).await;

    let stats = engine.search_stats();
    assert_eq!(stats.total_searches, 2);
    assert!(stats.total_results_returned > 0);
    assert!(stats.average_time >= 0.0);
    assert_eq!(stats.cache_hits, 0);

    let session = engine.session_stats();
    assert_eq!(session.current_query.as_deref(), Some("rust tutorial"));
    assert_eq!(session.current_page, 1);
    assert!(session.total_pages >= 1);
}

#[tokio::test]
async fn suggestions_and_trending_work() {
    let dir = TempDir::new().expect("tempdir");
    let engine = engine_in(&dir);

    let suggestions = engine.suggestions("rust").await;
    assert!(!suggestions.is_empty());
    assert!(suggestions.iter().all(|s| s.contains("rust")));

    assert!(engine.suggestions("   ").await.is_empty());
    assert_eq!(engine.trending().len(), 5);
}

#[tokio::test]
async fn disabled_cache_never_hits() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = simulated_config();
    config.cache.enabled = false;
    let mut engine = WebSearchEngine::with_data_dir(config, dir.path());

    engine.search("python tutorial", 1, None, true).await;
    engine.search("python tutorial", 1, None, true).await;

    let stats = engine.search_stats();
    assert_eq!(stats.cache_hits, 0);
    assert_eq!(stats.total_searches, 2);
    assert_eq!(stats.cached_pages, 0);
}

#[tokio::test]
async fn different_filters_key_different_cache_entries() {
    let dir = TempDir::new().expect("tempdir");
    let mut engine = engine_in(&dir);

    engine.search("python tutorial", 1, None, true).await;
    let filters = SearchFilter {
        language: "en".to_string(),
        ..SearchFilter::default()
    };
    engine.search("python tutorial", 1, Some(filters), true).await;

    let stats = engine.search_stats();
    assert_eq!(stats.cache_hits, 0);
    assert_eq!(stats.cached_pages, 2);
}
