//! Offline simulated provider.
//!
//! Generates plausible results from keyword heuristics on the raw query,
//! padded with synthetic filler entries up to the page size. Deterministic
//! for a given query and page, no network access. Used in tests and as
//! the fallback when the live provider is unavailable.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::error::SearchError;
use crate::filters::SearchFilter;
use crate::providers::{ProviderKind, SearchProvider};
use crate::query::StructuredQuery;
use crate::types::RawResult;

/// Deterministic offline search provider.
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    results_per_page: usize,
}

impl SimulatedProvider {
    /// Create a simulated provider from the configured page size.
    pub fn new(config: &Config) -> Self {
        Self {
            results_per_page: config.search.results_per_page,
        }
    }

    fn canned_results(&self, query: &StructuredQuery) -> Vec<RawResult> {
        let query_text = query.raw_text.to_lowercase();
        let mut results = Vec::new();

        if query_text.contains("python") {
            results.push(raw(
                "Python.org - Welcome to Python.org",
                "https://www.python.org/",
                "The official home of the Python Programming Language. Download the latest \
                 version, browse documentation, and learn Python programming.",
                "python.org",
                "2024-01-15",
                "webpage",
            ));
            results.push(raw(
                "Python Tutorial - W3Schools",
                "https://www.w3schools.com/python/",
                "Well organized and easy to understand Web building tutorials with lots of \
                 examples of how to use HTML, CSS, JavaScript, SQL, Python, PHP and more.",
                "w3schools.com",
                "2024-01-10",
                "webpage",
            ));
        } else if query_text.contains("news") || query_text.contains("2024") {
            results.push(raw(
                &format!("Latest News: {} - BBC News", title_case(&query.raw_text)),
                "https://www.bbc.com/news",
                "Breaking news, analysis and features from BBC News, including international, \
                 UK, business, technology and entertainment news.",
                "BBC News",
                "2024-01-20",
                "news",
            ));
        } else if query_text.contains("how to") {
            let topic = title_case(query_text.trim_start_matches("how to ").trim());
            results.push(raw(
                &format!("How to {topic} - WikiHow"),
                "https://www.wikihow.com",
                "Detailed step-by-step instructions with helpful tips and illustrations to \
                 guide you through the process.",
                "WikiHow",
                "2024-01-18",
                "webpage",
            ));
        }

        results
    }
}

impl SearchProvider for SimulatedProvider {
    async fn search(
        &self,
        query: &StructuredQuery,
        page: usize,
        _filters: &SearchFilter,
    ) -> Result<(Vec<RawResult>, u64), SearchError> {
        let base_index = (page.max(1) - 1) * self.results_per_page;
        let mut results = self.canned_results(query);

        // Fill the remaining slots with synthetic entries.
        while results.len() < self.results_per_page {
            let idx = results.len() + base_index + 1;
            results.push(raw(
                &format!("{} - Resource #{idx}", title_case(&query.raw_text)),
                &format!(
                    "https://www.example{idx}.com/{}",
                    query.raw_text.replace(' ', "-")
                ),
                &format!(
                    "Additional information and resources about {} with detailed analysis \
                     and comprehensive coverage.",
                    query.raw_text
                ),
                &format!("Source {idx}"),
                "2024-01-15",
                "webpage",
            ));
        }

        results.truncate(self.results_per_page);
        // Simulate a large result set; stable only within the run.
        let total = (results.len() * 10 + (page.max(1) - 1) * 50) as u64;

        tracing::trace!(
            query = %query.raw_text,
            page,
            count = results.len(),
            "simulated search"
        );
        Ok((results, total))
    }

    async fn suggestions(&self, partial: &str) -> Result<Vec<String>, SearchError> {
        Ok(vec![
            format!("{partial} tutorial"),
            format!("{partial} examples"),
            format!("{partial} guide"),
            format!("how to {partial}"),
            format!("{partial} best practices"),
        ])
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Simulated
    }
}

fn raw(title: &str, url: &str, snippet: &str, source: &str, date: &str, kind: &str) -> RawResult {
    RawResult {
        title: title.to_string(),
        url: url.to_string(),
        snippet: snippet.to_string(),
        source: source.to_string(),
        date: date.to_string(),
        kind: kind.to_string(),
        metadata: BTreeMap::new(),
    }
}

/// Capitalise the first letter of each whitespace-delimited word.
fn title_case(text: impl AsRef<str>) -> String {
    text.as_ref()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
