//! Core types for search results.
//!
//! [`RawResult`] is the loosely-typed record a provider hands back;
//! [`SearchResult`] is the validated, scored form the engine exposes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Kind of content a result points at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    /// Ordinary web page.
    #[default]
    Webpage,
    /// News article.
    News,
    /// Image result.
    Image,
    /// Video result.
    Video,
    /// PDF document.
    Pdf,
    /// Academic paper or publication.
    Academic,
    /// Shopping / product page.
    Shopping,
}

impl ResultType {
    /// Parse a provider-level type tag.
    ///
    /// Providers emit free-form strings; anything unrecognised normalises
    /// to [`ResultType::Webpage`] rather than failing.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "news" => Self::News,
            "image" => Self::Image,
            "video" => Self::Video,
            "pdf" => Self::Pdf,
            "academic" => Self::Academic,
            "shopping" => Self::Shopping,
            _ => Self::Webpage,
        }
    }

    /// Stable lowercase tag for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Webpage => "webpage",
            Self::News => "news",
            Self::Image => "image",
            Self::Video => "video",
            Self::Pdf => "pdf",
            Self::Academic => "academic",
            Self::Shopping => "shopping",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw provider-level result, before validation and scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawResult {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub url: String,
    /// Short description of the page.
    pub snippet: String,
    /// Source domain or provider name.
    #[serde(default)]
    pub source: String,
    /// Publication or last-modified date, if known.
    #[serde(default)]
    pub date: String,
    /// Free-form content type tag (`webpage`, `news`, `pdf`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Additional provider metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A single validated, scored search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result page.
    pub title: String,
    /// The URL of the result.
    pub url: String,
    /// A text snippet summarising the page content.
    pub snippet: String,
    /// The source domain or provider.
    pub source: String,
    /// Publication or last-modified date.
    pub date: String,
    /// Type of result.
    pub result_type: ResultType,
    /// Relevance score in `[0.0, 1.0]`, clamped on construction.
    pub relevance_score: f64,
    /// Additional metadata as key-value pairs.
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl SearchResult {
    /// Build a validated result from a provider record and a score.
    ///
    /// The score is clamped to `[0.0, 1.0]`; the type tag normalises
    /// leniently.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] when the title, URL or snippet
    /// is empty or whitespace-only.
    pub fn from_raw(raw: RawResult, relevance_score: f64) -> Result<Self> {
        if raw.title.trim().is_empty() {
            return Err(SearchError::Validation("title cannot be empty".into()));
        }
        if raw.url.trim().is_empty() {
            return Err(SearchError::Validation("url cannot be empty".into()));
        }
        if raw.snippet.trim().is_empty() {
            return Err(SearchError::Validation("snippet cannot be empty".into()));
        }

        Ok(Self {
            title: raw.title,
            url: raw.url,
            snippet: raw.snippet,
            source: raw.source,
            date: raw.date,
            result_type: ResultType::from_tag(&raw.kind),
            relevance_score: relevance_score.clamp(0.0, 1.0),
            metadata: raw.metadata,
        })
    }
}
