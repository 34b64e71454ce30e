//! Export of the current result page.
//!
//! Three formats: `json` (structured, pretty-printed), `csv` (tabular,
//! RFC 4180 quoting), and `text` (a human-readable numbered report).
//! Export reads the engine's session state; with no active results it
//! yields an empty string rather than an error.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde_json::json;

use crate::engine::WebSearchEngine;
use crate::error::{Result, SearchError};
use crate::types::SearchResult;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON document.
    Json,
    /// CSV with a header row.
    Csv,
    /// Plain-text report.
    Text,
}

impl ExportFormat {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "text",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            other => Err(SearchError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render the engine's current result page in the given format.
///
/// Returns an empty string when the session has no results.
///
/// # Errors
///
/// Returns [`SearchError::Persistence`] when JSON serialization fails.
pub fn export_results(
    engine: &WebSearchEngine,
    format: ExportFormat,
    include_metadata: bool,
) -> Result<String> {
    let results = engine.current_results();
    if results.is_empty() {
        return Ok(String::new());
    }

    match format {
        ExportFormat::Json => export_json(engine, include_metadata),
        ExportFormat::Csv => Ok(export_csv(results, include_metadata)),
        ExportFormat::Text => Ok(export_text(engine)),
    }
}

fn export_json(engine: &WebSearchEngine, include_metadata: bool) -> Result<String> {
    let mut document = json!({
        "query": engine.current_query(),
        "page": engine.current_page(),
        "total_results": engine.total_results(),
        "execution_time": engine.last_search_time(),
        "results": engine.current_results(),
    });

    if include_metadata {
        if let Some(object) = document.as_object_mut() {
            object.insert(
                "filters".to_string(),
                serde_json::to_value(engine.current_filters())
                    .map_err(|e| SearchError::Persistence(format!("filters: {e}")))?,
            );
            object.insert("session_id".to_string(), json!(engine.session_id()));
            object.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));
        }
    }

    serde_json::to_string_pretty(&document)
        .map_err(|e| SearchError::Persistence(format!("export: {e}")))
}

fn export_csv(results: &[SearchResult], include_metadata: bool) -> String {
    let mut out = String::new();
    out.push_str("Title,URL,Snippet,Source,Date,Type");
    if include_metadata {
        out.push_str(",Relevance Score,Metadata");
    }
    out.push('\n');

    for result in results {
        let mut fields = vec![
            csv_field(&result.title),
            csv_field(&result.url),
            csv_field(&result.snippet),
            csv_field(&result.source),
            csv_field(&result.date),
            csv_field(result.result_type.as_str()),
        ];
        if include_metadata {
            fields.push(format!("{:.3}", result.relevance_score));
            let metadata =
                serde_json::to_string(&result.metadata).unwrap_or_else(|_| "{}".to_string());
            fields.push(csv_field(&metadata));
        }
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Quote a CSV field when it contains a comma, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn export_text(engine: &WebSearchEngine) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Search Results");
    let _ = writeln!(out, "==============");
    if let Some(query) = engine.current_query() {
        let _ = writeln!(out, "Query: {query}");
    }
    let _ = writeln!(
        out,
        "Page {} | {} total results | {:.2}s",
        engine.current_page(),
        engine.total_results(),
        engine.last_search_time()
    );
    let _ = writeln!(out);

    for (i, result) in engine.current_results().iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, result.title);
        let _ = writeln!(out, "   {}", result.url);
        let _ = writeln!(out, "   {}", result.snippet);
        let _ = writeln!(
            out,
            "   {} | {} | score {:.2}",
            result.source,
            result.result_type,
            result.relevance_score
        );
        let _ = writeln!(out);
    }
    out
}
