//! Search orchestration: parsing, provider dispatch, caching, scoring,
//! pagination, history and session statistics.
//!
//! [`WebSearchEngine`] is the one type callers interact with. Its
//! [`search`](WebSearchEngine::search) method never fails: parse
//! problems and provider outages degrade to an empty result page with a
//! warning in the log, so an interactive session is never torn down by
//! a bad query or a flaky network.

use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use crate::cache::{fingerprint, CachedPage, ResultCache};
use crate::config::Config;
use crate::error::{Result, SearchError};
use crate::filters::{FilterManager, SearchFilter};
use crate::history::{HistoryManager, SearchHistoryEntry};
use crate::providers::ProviderManager;
use crate::query::StructuredQuery;
use crate::types::{RawResult, SearchResult};

/// Outcome of one search call: the page of results, the provider's
/// total estimate, and elapsed wall-clock seconds.
pub type SearchOutcome = (Vec<SearchResult>, u64, f64);

/// Point-in-time view of the current session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    /// Unique identifier for this engine instance.
    pub session_id: String,
    /// Query of the active search, if any.
    pub current_query: Option<String>,
    /// Page currently held in the session.
    pub current_page: usize,
    /// Results on the current page.
    pub results_on_page: usize,
    /// Provider total estimate for the active search.
    pub total_results: u64,
    /// Total pages available for the active search.
    pub total_pages: usize,
    /// Wall-clock seconds the last search took.
    pub last_search_time: f64,
    /// Human-readable summary of the active filters.
    pub active_filters: String,
}

/// Cumulative counters across the lifetime of the engine.
#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    /// Number of searches executed (cache hits included).
    pub total_searches: u64,
    /// Sum of page result counts returned.
    pub total_results_returned: u64,
    /// Running mean of search execution time in seconds.
    pub average_time: f64,
    /// Number of searches answered from the cache.
    pub cache_hits: u64,
    /// Entries currently in the result cache.
    pub cached_pages: usize,
    /// Entries currently in the search history.
    pub history_entries: usize,
}

/// The interactive search engine.
#[derive(Debug)]
pub struct WebSearchEngine {
    config: Config,
    providers: ProviderManager,
    cache: ResultCache,
    filters: FilterManager,
    history: HistoryManager,

    session_id: String,
    current_query: Option<String>,
    current_results: Vec<SearchResult>,
    current_page: usize,
    current_filters: SearchFilter,
    total_results: u64,
    last_search_time: f64,

    total_searches: u64,
    total_results_returned: u64,
    average_time: f64,
    cache_hits: u64,
}

impl WebSearchEngine {
    /// Create an engine with history persisted in the default data
    /// directory.
    pub fn new(config: Config) -> Self {
        let data_dir = crate::dirs::data_dir();
        Self::with_data_dir(config, &data_dir)
    }

    /// Create an engine with history persisted under an explicit
    /// directory.
    pub fn with_data_dir(config: Config, data_dir: &std::path::Path) -> Self {
        let session_id = Uuid::new_v4().to_string();
        tracing::debug!(%session_id, "engine session started");

        Self {
            providers: ProviderManager::new(&config),
            cache: ResultCache::new(&config.cache),
            filters: FilterManager::new(),
            history: HistoryManager::new(&config.history, data_dir),
            session_id,
            current_query: None,
            current_results: Vec::new(),
            current_page: 1,
            current_filters: SearchFilter::default(),
            total_results: 0,
            last_search_time: 0.0,
            total_searches: 0,
            total_results_returned: 0,
            average_time: 0.0,
            cache_hits: 0,
            config,
        }
    }

    /// Execute a search.
    ///
    /// Returns the scored page of results, the provider's total
    /// estimate, and elapsed seconds. Never fails: an empty or
    /// unparseable query, or a provider error the fallback cannot
    /// absorb, yields `([], 0, elapsed)` after a logged warning.
    ///
    /// When `filters` is `Some`, it is merged over the active filter
    /// set for this search only. When `use_cache` is true and the page
    /// is cached and fresh, the cached page is returned verbatim;
    /// session state follows it but the history and the cumulative
    /// search counters do not change.
    pub async fn search(
        &mut self,
        raw_query: &str,
        page: usize,
        filters: Option<SearchFilter>,
        use_cache: bool,
    ) -> SearchOutcome {
        let effective = match filters {
            Some(over) => self.filters.merge(self.filters.active(), &over),
            None => self.filters.active().clone(),
        };
        self.search_with(raw_query, page, effective, use_cache).await
    }

    /// Run the pipeline with an exact filter set. Pagination goes
    /// through here so the stored filters carry over verbatim instead
    /// of being re-merged over the active set.
    async fn search_with(
        &mut self,
        raw_query: &str,
        page: usize,
        effective: SearchFilter,
        use_cache: bool,
    ) -> SearchOutcome {
        let start = Instant::now();
        let page = page.max(1);

        let parsed = StructuredQuery::parse(raw_query);
        if parsed.is_empty() {
            tracing::warn!(query = %raw_query, "query has no searchable terms");
            return (Vec::new(), 0, start.elapsed().as_secs_f64());
        }

        let key = fingerprint(raw_query, page, &effective);
        if use_cache {
            if let Some(cached) = self.cache.get(key) {
                self.cache_hits += 1;
                let elapsed = start.elapsed().as_secs_f64();
                // Session state follows the hit so pagination stays
                // coherent, but history and the search counters do not.
                self.current_query = Some(raw_query.to_string());
                self.current_results = cached.results.clone();
                self.current_page = page;
                self.current_filters = effective;
                self.total_results = cached.total;
                self.last_search_time = elapsed;
                tracing::debug!(query = %raw_query, page, "cache hit");
                return (cached.results, cached.total, elapsed);
            }
        }

        let (raw_results, total) = match self.providers.search(&parsed, page, &effective).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(query = %raw_query, error = %err, "search failed");
                return (Vec::new(), 0, start.elapsed().as_secs_f64());
            }
        };

        let filtered = self.filters.apply_post_filters(raw_results, &effective);

        let mut results: Vec<SearchResult> = Vec::with_capacity(filtered.len());
        for raw in filtered {
            let score = relevance_score(&parsed, &raw);
            match SearchResult::from_raw(raw, score) {
                Ok(result) => results.push(result),
                Err(err) => tracing::warn!(error = %err, "dropping invalid result"),
            }
        }
        // sort_by is stable, so equal scores keep provider order.
        results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        self.cache.insert(
            key,
            CachedPage {
                results: results.clone(),
                total,
            },
            Duration::from_secs(self.config.cache.search_ttl),
        );

        let elapsed = start.elapsed().as_secs_f64();
        self.current_query = Some(raw_query.to_string());
        self.current_results = results.clone();
        self.current_page = page;
        self.current_filters = effective.clone();
        self.total_results = total;
        self.last_search_time = elapsed;

        self.total_searches += 1;
        self.total_results_returned += results.len() as u64;
        self.average_time +=
            (elapsed - self.average_time) / self.total_searches as f64;

        let recorded_filters = if effective.is_active() {
            Some(effective)
        } else {
            None
        };
        match SearchHistoryEntry::new(
            raw_query,
            total,
            recorded_filters,
            elapsed,
            page,
            &self.session_id,
        ) {
            Ok(entry) => self.history.add(entry),
            Err(err) => tracing::warn!(error = %err, "history entry rejected"),
        }

        tracing::debug!(
            query = %raw_query,
            page,
            count = results.len(),
            total,
            elapsed,
            "search complete"
        );
        (results, total, elapsed)
    }

    /// Advance to the next page of the active search.
    ///
    /// There is no upper bound check: past the last page the provider
    /// may legitimately return an empty page.
    ///
    /// # Errors
    ///
    /// [`SearchError::NotFound`] when no search is active.
    pub async fn next_page(&mut self) -> Result<SearchOutcome> {
        let query = self
            .current_query
            .clone()
            .ok_or_else(|| SearchError::NotFound("no active search".into()))?;
        let page = self.current_page + 1;
        let filters = self.current_filters.clone();
        Ok(self.search_with(&query, page, filters, true).await)
    }

    /// Return to the previous page of the active search.
    ///
    /// # Errors
    ///
    /// [`SearchError::NotFound`] when no search is active or the
    /// session is already on the first page.
    pub async fn previous_page(&mut self) -> Result<SearchOutcome> {
        let query = self
            .current_query
            .clone()
            .ok_or_else(|| SearchError::NotFound("no active search".into()))?;
        if self.current_page <= 1 {
            return Err(SearchError::NotFound("already on first page".into()));
        }
        let page = self.current_page - 1;
        let filters = self.current_filters.clone();
        Ok(self.search_with(&query, page, filters, true).await)
    }

    /// Total pages for the active search, given the configured page
    /// size. Zero when no results.
    pub fn total_pages(&self) -> usize {
        let per_page = self.config.search.results_per_page.max(1);
        (self.total_results as usize).div_ceil(per_page)
    }

    /// Query suggestions for a partial input. Degrades to an empty
    /// list on provider failure.
    pub async fn suggestions(&self, partial: &str) -> Vec<String> {
        let trimmed = partial.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        match self.providers.suggestions(trimmed).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                tracing::warn!(error = %err, "suggestions unavailable");
                Vec::new()
            }
        }
    }

    /// Currently trending search topics.
    pub fn trending(&self) -> Vec<String> {
        self.providers.trending()
    }

    /// Snapshot of the current session.
    pub fn session_stats(&self) -> SessionStats {
        SessionStats {
            session_id: self.session_id.clone(),
            current_query: self.current_query.clone(),
            current_page: self.current_page,
            results_on_page: self.current_results.len(),
            total_results: self.total_results,
            total_pages: self.total_pages(),
            last_search_time: self.last_search_time,
            active_filters: self.filters.summary(),
        }
    }

    /// Cumulative engine counters.
    pub fn search_stats(&self) -> SearchStats {
        SearchStats {
            total_searches: self.total_searches,
            total_results_returned: self.total_results_returned,
            average_time: self.average_time,
            cache_hits: self.cache_hits,
            cached_pages: self.cache.len(),
            history_entries: self.history.len(),
        }
    }

    /// The engine's session identifier.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Results currently held in the session.
    pub fn current_results(&self) -> &[SearchResult] {
        &self.current_results
    }

    /// Query of the active search, if any.
    pub fn current_query(&self) -> Option<&str> {
        self.current_query.as_deref()
    }

    /// Page currently held in the session.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Provider total estimate for the active search.
    pub fn total_results(&self) -> u64 {
        self.total_results
    }

    /// Wall-clock seconds the last search took.
    pub fn last_search_time(&self) -> f64 {
        self.last_search_time
    }

    /// Filters in effect for the active search.
    pub fn current_filters(&self) -> &SearchFilter {
        &self.current_filters
    }

    /// The filter manager, for preset selection and filter updates.
    pub fn filters(&self) -> &FilterManager {
        &self.filters
    }

    /// Mutable access to the filter manager.
    pub fn filters_mut(&mut self) -> &mut FilterManager {
        &mut self.filters
    }

    /// Most recent history entries, newest last.
    pub fn recent_history(&self, limit: usize) -> &[SearchHistoryEntry] {
        self.history.recent(limit)
    }

    /// Clear the persisted search history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// The engine configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Score one raw result against a parsed query.
///
/// Weighted term matching, normalised by the weight that was available
/// to earn: title terms weigh 3, title phrases 5, snippet terms 2, URL
/// terms 1, domain authority up to 2, news recency a flat 1. The
/// normalised score is clamped to `[0, 1]`; a query with nothing to
/// match scores a neutral 0.5.
fn relevance_score(query: &StructuredQuery, raw: &RawResult) -> f64 {
    let title = raw.title.to_lowercase();
    let snippet = raw.snippet.to_lowercase();
    let url = raw.url.to_lowercase();

    let mut num = 0.0_f64;
    let mut denom = 0.0_f64;

    for term in query.scoring_terms() {
        let term = term.to_lowercase();
        denom += 3.0;
        if title.contains(&term) {
            num += 3.0;
        }
        denom += 2.0;
        if snippet.contains(&term) {
            num += 2.0;
        }
        denom += 1.0;
        if url.contains(&term) {
            num += 1.0;
        }
    }

    for phrase in &query.exact_phrases {
        let phrase = phrase.to_lowercase();
        denom += 5.0;
        if title.contains(&phrase) {
            num += 5.0;
        }
    }

    if let Some(authority) = raw
        .metadata
        .get("domain_authority")
        .and_then(|v| v.as_f64())
    {
        denom += 2.0;
        num += 2.0 * (authority / 100.0).clamp(0.0, 1.0);
    }

    if raw.kind == "news" && !raw.date.is_empty() {
        denom += 1.0;
        num += 1.0;
    }

    if denom == 0.0 {
        return 0.5;
    }
    (num / denom).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn raw(title: &str, snippet: &str, url: &str) -> RawResult {
        RawResult {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            source: "example.com".into(),
            date: String::new(),
            kind: "webpage".into(),
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn full_match_scores_one() {
        let query = StructuredQuery::parse("rust");
        let result = raw("Rust language", "All about rust.", "https://rust-lang.org");
        assert!((relevance_score(&query, &result) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_match_scores_zero() {
        let query = StructuredQuery::parse("haskell");
        let result = raw("Rust language", "All about rust.", "https://rust-lang.org");
        assert!(relevance_score(&query, &result).abs() < f64::EPSILON);
    }

    #[test]
    fn title_match_outweighs_url_match() {
        let query = StructuredQuery::parse("tokio");
        let title_hit = raw("Tokio runtime", "Async for everyone.", "https://example.com");
        let url_hit = raw("Async runtime", "Async for everyone.", "https://tokio.rs");
        assert!(relevance_score(&query, &title_hit) > relevance_score(&query, &url_hit));
    }

    #[test]
    fn phrase_in_title_scores_higher_than_absent() {
        let query = StructuredQuery::parse("\"async io\"");
        let with_phrase = raw("Async IO explained", "Details.", "https://a.com");
        let without = raw("Sync IO explained", "Details.", "https://b.com");
        assert!(relevance_score(&query, &with_phrase) > relevance_score(&query, &without));
    }

    #[test]
    fn nothing_to_match_is_neutral() {
        let query = StructuredQuery::parse("-only -excluded");
        let result = raw("Anything", "At all.", "https://c.com");
        assert!((relevance_score(&query, &result) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn domain_authority_breaks_ties() {
        let query = StructuredQuery::parse("rust");
        let plain = raw("Rust guide", "Learn rust.", "https://rust.example");
        let mut authoritative = plain.clone();
        authoritative
            .metadata
            .insert("domain_authority".into(), serde_json::json!(95));
        assert!(relevance_score(&query, &authoritative) > relevance_score(&query, &plain));
    }

    #[test]
    fn news_bonus_requires_date() {
        let query = StructuredQuery::parse("rust");
        let mut dated = raw("Rust news", "Rust ships.", "https://rust.example");
        dated.kind = "news".into();
        dated.date = "2024-06-01".into();
        let mut undated = dated.clone();
        undated.date = String::new();
        assert!(relevance_score(&query, &dated) > relevance_score(&query, &undated));
    }

    #[test]
    fn score_always_in_unit_interval() {
        let query = StructuredQuery::parse("rust tokio \"async io\" +fast");
        let result = raw(
            "Rust tokio fast async io",
            "rust tokio fast async io",
            "https://rust-tokio-fast.io",
        );
        let score = relevance_score(&query, &result);
        assert!((0.0..=1.0).contains(&score));
    }
}
