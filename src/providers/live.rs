//! Live search provider scraping the DuckDuckGo HTML endpoint.
//!
//! Uses the HTML-only version at `https://html.duckduckgo.com/html/`
//! which requires no JavaScript and is tolerant of automated requests.
//! Each hit on the results page gets a follow-up metadata fetch (title,
//! meta description, inferred content type) with a short per-fetch
//! timeout; a failed fetch degrades to a minimal stub result, never to
//! an error. Only a failure of the results page itself surfaces as
//! [`SearchError::Provider`], which the manager answers by falling back
//! to simulation.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use url::Url;

use crate::config::{Config, SearchSettings};
use crate::error::SearchError;
use crate::filters::{ContentType, SafeSearchLevel, SearchFilter};
use crate::http;
use crate::providers::{ProviderKind, SearchProvider};
use crate::query::StructuredQuery;
use crate::types::RawResult;

/// Timeout for each per-result metadata fetch.
const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounded concurrency for metadata fetches.
const METADATA_CONCURRENCY: usize = 4;

/// Snippet placeholder when no description can be extracted.
const NO_DESCRIPTION: &str = "No description available";

/// A hit extracted from the search engine results page, before the
/// metadata fetch.
#[derive(Debug, Clone)]
struct SerpHit {
    title: String,
    url: String,
    snippet: String,
}

/// Live web search provider.
#[derive(Debug, Clone)]
pub struct LiveProvider {
    settings: SearchSettings,
}

impl LiveProvider {
    /// Create a live provider from the search settings.
    pub fn new(config: &Config) -> Self {
        Self {
            settings: config.search.clone(),
        }
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like
    /// `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`;
    /// the `uddg` query parameter carries the destination.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;
        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

impl SearchProvider for LiveProvider {
    async fn search(
        &self,
        query: &StructuredQuery,
        page: usize,
        filters: &SearchFilter,
    ) -> Result<(Vec<RawResult>, u64), SearchError> {
        if self.settings.request_delay > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(self.settings.request_delay)).await;
        }

        let client = http::build_client(&self.settings)?;
        let provider_query = build_provider_query(query, filters);
        let offset = (page.max(1) - 1) * self.settings.results_per_page;

        tracing::debug!(query = %provider_query, page, offset, "live search");

        let offset_param = offset.to_string();
        let mut params = vec![("q", provider_query.as_str())];
        if offset > 0 {
            params.push(("s", offset_param.as_str()));
        }
        match filters.safe_search {
            SafeSearchLevel::Strict => params.push(("kp", "1")),
            SafeSearchLevel::Off => params.push(("kp", "-2")),
            SafeSearchLevel::Moderate => {}
        }

        let response = client
            .post("https://html.duckduckgo.com/html/")
            .form(&params)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::Provider(format!("search request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Provider(format!("search HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Provider(format!("search response read failed: {e}")))?;

        let hits = parse_serp_html(&html, self.settings.results_per_page)?;
        let total = (hits.len() as u64 * 10).min(1_000_000);

        let results: Vec<RawResult> = stream::iter(hits.into_iter().enumerate().map(
            |(i, hit)| {
                let client = client.clone();
                async move { fetch_result_metadata(&client, hit, offset + i + 1).await }
            },
        ))
        .buffered(METADATA_CONCURRENCY)
        .collect()
        .await;

        tracing::debug!(count = results.len(), total, "live results assembled");
        Ok((results, total))
    }

    async fn suggestions(&self, partial: &str) -> Result<Vec<String>, SearchError> {
        Ok(vec![
            format!("{partial} tutorial"),
            format!("{partial} guide"),
            format!("how to {partial}"),
            format!("{partial} examples"),
            format!("best {partial}"),
        ])
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Live
    }
}

/// Build the provider-facing query string, folding content-type filters
/// into engine clauses.
fn build_provider_query(query: &StructuredQuery, filters: &SearchFilter) -> String {
    let mut provider_query = query.to_provider_query();
    match filters.content_type {
        ContentType::Pdf => provider_query.push_str(" filetype:pdf"),
        ContentType::Doc => provider_query.push_str(" filetype:doc OR filetype:docx"),
        ContentType::News => {
            provider_query.push_str(" site:news.google.com OR site:reuters.com OR site:bbc.com");
        }
        _ => {}
    }
    provider_query
}

/// Parse the results page into hits. Extracted as a separate function
/// for testability with mock HTML.
fn parse_serp_html(html: &str, max_results: usize) -> Result<Vec<SerpHit>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(".result.results_links.results_links_deep, .web-result")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut hits = Vec::new();

    for element in document.select(&result_sel) {
        // Sponsored blocks carry the result--ad class.
        let is_ad = element
            .value()
            .attr("class")
            .is_some_and(|classes| classes.contains("result--ad"));
        if is_ad {
            continue;
        }

        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let Some(href) = title_el.value().attr("href") else {
            continue;
        };
        let Some(url) = LiveProvider::extract_url(href) else {
            continue;
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        hits.push(SerpHit { title, url, snippet });
        if hits.len() >= max_results {
            break;
        }
    }

    tracing::trace!(count = hits.len(), "results page parsed");
    Ok(hits)
}

/// Fetch page metadata for one hit, degrading to a stub on any failure.
async fn fetch_result_metadata(client: &reqwest::Client, hit: SerpHit, index: usize) -> RawResult {
    let source = extract_domain(&hit.url);

    let fetched = tokio::time::timeout(METADATA_TIMEOUT, fetch_page_body(client, &hit.url)).await;
    match fetched {
        Ok(Ok(body)) => build_metadata_result(&body, &hit, &source),
        Ok(Err(err)) => {
            tracing::debug!(url = %hit.url, error = %err, "metadata fetch failed");
            stub_result(&hit, index, &source)
        }
        Err(_) => {
            tracing::debug!(url = %hit.url, "metadata fetch timed out");
            stub_result(&hit, index, &source)
        }
    }
}

async fn fetch_page_body(client: &reqwest::Client, url: &str) -> Result<String, SearchError> {
    client
        .get(url)
        .send()
        .await
        .map_err(|e| SearchError::Provider(format!("page request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Provider(format!("page HTTP error: {e}")))?
        .text()
        .await
        .map_err(|e| SearchError::Provider(format!("page read failed: {e}")))
}

/// Build a full result from a fetched page body.
fn build_metadata_result(body: &str, hit: &SerpHit, source: &str) -> RawResult {
    let document = Html::parse_document(body);

    let title = extract_title(&document)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| hit.title.clone());
    let description = extract_description(&document)
        .or_else(|| {
            if hit.snippet.is_empty() {
                None
            } else {
                Some(hit.snippet.clone())
            }
        })
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    RawResult {
        title: truncate(&title, 100),
        url: hit.url.clone(),
        snippet: truncate(&description, 300),
        source: source.to_string(),
        date: String::new(),
        kind: infer_content_type(&hit.url).to_string(),
        metadata: BTreeMap::new(),
    }
}

/// Minimal result substituted when the metadata fetch fails.
fn stub_result(hit: &SerpHit, index: usize, source: &str) -> RawResult {
    RawResult {
        title: format!("Search Result #{index}"),
        url: hit.url.clone(),
        snippet: NO_DESCRIPTION.to_string(),
        source: source.to_string(),
        date: String::new(),
        kind: "webpage".to_string(),
        metadata: BTreeMap::new(),
    }
}

/// Extract the page title from the `<title>` element.
fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Extract a description: `<meta name="description">`, falling back to
/// the first paragraph.
fn extract_description(document: &Html) -> Option<String> {
    if let Ok(meta_sel) = Selector::parse("meta[name=\"description\"]") {
        if let Some(content) = document
            .select(&meta_sel)
            .next()
            .and_then(|el| el.value().attr("content"))
        {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    let p_sel = Selector::parse("p").ok()?;
    document
        .select(&p_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Extract the domain from a URL, stripping a `www.` prefix.
fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .map(|host| host.strip_prefix("www.").unwrap_or(&host).to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Infer a content type tag from the URL alone.
fn infer_content_type(url: &str) -> &'static str {
    let url_lower = url.to_lowercase();
    if url_lower.ends_with(".pdf") {
        "pdf"
    } else if url_lower.contains(".doc") {
        "doc"
    } else if ["news.", "bbc.", "reuters.", "cnn."]
        .iter()
        .any(|d| url_lower.contains(d))
    {
        "news"
    } else if ["youtube.", "vimeo."].iter().any(|d| url_lower.contains(d)) {
        "video"
    } else {
        "webpage"
    }
}

/// Truncate to a character budget, appending an ellipsis when cut.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}
