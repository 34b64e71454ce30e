//! Search filters: typed filter model, presets, merging and
//! post-search filtering.
//!
//! Every enumerated field parses strictly — an unknown value is a
//! [`SearchError::Validation`], never silently corrected. The only
//! lenient normalisation in the crate is provider-level result type
//! tags (see [`crate::types::ResultType::from_tag`]), which are not
//! user input.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::types::RawResult;

/// Time-range filter for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    /// No date restriction.
    #[default]
    Any,
    /// Last 24 hours.
    Day,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
    /// Last 365 days.
    Year,
    /// Custom range carried in `custom_filters`.
    Custom,
}

impl DateRange {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Custom => "custom",
        }
    }

    /// Cutoff instant for this range, `None` when unrestricted.
    fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Any | Self::Custom => None,
            Self::Day => Some(now - Duration::days(1)),
            Self::Week => Some(now - Duration::days(7)),
            Self::Month => Some(now - Duration::days(30)),
            Self::Year => Some(now - Duration::days(365)),
        }
    }
}

impl FromStr for DateRange {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "any" => Ok(Self::Any),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "custom" => Ok(Self::Custom),
            other => Err(SearchError::Validation(format!(
                "invalid date range: {other}"
            ))),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content-type filter for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// No content-type restriction.
    #[default]
    Any,
    /// Ordinary web pages.
    Webpage,
    /// Image results.
    Image,
    /// Video results.
    Video,
    /// News articles.
    News,
    /// PDF documents.
    Pdf,
    /// Word-processor documents.
    Doc,
}

impl ContentType {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Webpage => "webpage",
            Self::Image => "image",
            Self::Video => "video",
            Self::News => "news",
            Self::Pdf => "pdf",
            Self::Doc => "doc",
        }
    }
}

impl FromStr for ContentType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "any" => Ok(Self::Any),
            "webpage" => Ok(Self::Webpage),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "news" => Ok(Self::News),
            "pdf" => Ok(Self::Pdf),
            "doc" => Ok(Self::Doc),
            other => Err(SearchError::Validation(format!(
                "invalid content type: {other}"
            ))),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Safe-search filtering level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearchLevel {
    /// No filtering.
    Off,
    /// Default filtering.
    #[default]
    Moderate,
    /// Aggressive filtering.
    Strict,
}

impl SafeSearchLevel {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Moderate => "moderate",
            Self::Strict => "strict",
        }
    }
}

impl FromStr for SafeSearchLevel {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "off" => Ok(Self::Off),
            "moderate" => Ok(Self::Moderate),
            "strict" => Ok(Self::Strict),
            other => Err(SearchError::Validation(format!(
                "invalid safe search level: {other}"
            ))),
        }
    }
}

impl fmt::Display for SafeSearchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search filtering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilter {
    /// Date-range restriction.
    pub date_range: DateRange,
    /// Content-type restriction.
    pub content_type: ContentType,
    /// Language code (`"any"`, or a 2- or 5-character code like `en`
    /// or `en-US`).
    pub language: String,
    /// Region code (`"any"`, or a 2-character code like `us`).
    pub region: String,
    /// Safe-search level.
    pub safe_search: SafeSearchLevel,
    /// Additional free-form filters matched against result metadata.
    pub custom_filters: BTreeMap<String, serde_json::Value>,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            date_range: DateRange::Any,
            content_type: ContentType::Any,
            language: "any".to_string(),
            region: "any".to_string(),
            safe_search: SafeSearchLevel::Moderate,
            custom_filters: BTreeMap::new(),
        }
    }
}

impl SearchFilter {
    /// True when any field differs from its default.
    pub fn is_active(&self) -> bool {
        self.date_range != DateRange::Any
            || self.content_type != ContentType::Any
            || self.language != "any"
            || self.region != "any"
            || self.safe_search != SafeSearchLevel::Moderate
            || !self.custom_filters.is_empty()
    }
}

/// Manages filter state, presets, merging and post-search filtering.
#[derive(Debug)]
pub struct FilterManager {
    active: SearchFilter,
    presets: BTreeMap<String, SearchFilter>,
}

impl Default for FilterManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterManager {
    /// Create a filter manager with the built-in presets.
    pub fn new() -> Self {
        Self {
            active: SearchFilter::default(),
            presets: default_presets(),
        }
    }

    /// Validate a filter, failing loudly on any invalid field.
    ///
    /// The enumerated fields are unrepresentable when invalid, so this
    /// checks the free-form language and region codes.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] when the language code is not
    /// `"any"` or 2/5 characters, or the region code is not `"any"` or
    /// 2 characters.
    pub fn validate(&self, filters: &SearchFilter) -> Result<()> {
        if filters.language != "any" && ![2, 5].contains(&filters.language.len()) {
            return Err(SearchError::Validation(format!(
                "invalid language code: {}",
                filters.language
            )));
        }
        if filters.region != "any" && filters.region.len() != 2 {
            return Err(SearchError::Validation(format!(
                "invalid region code: {}",
                filters.region
            )));
        }
        Ok(())
    }

    /// Validate and activate a filter.
    pub fn apply(&mut self, filters: SearchFilter) -> Result<()> {
        self.validate(&filters)?;
        tracing::debug!(active = filters.is_active(), "filters applied");
        self.active = filters;
        Ok(())
    }

    /// Currently active filter.
    pub fn active(&self) -> &SearchFilter {
        &self.active
    }

    /// Reset the active filter to defaults.
    pub fn clear(&mut self) {
        self.active = SearchFilter::default();
    }

    /// Merge two filters, override winning per field unless it holds
    /// that field's default value.
    ///
    /// Custom filter maps are unioned with override taking precedence
    /// on key collision.
    pub fn merge(&self, base: &SearchFilter, over: &SearchFilter) -> SearchFilter {
        let mut custom_filters = base.custom_filters.clone();
        custom_filters.extend(over.custom_filters.clone());

        SearchFilter {
            date_range: if over.date_range != DateRange::Any {
                over.date_range
            } else {
                base.date_range
            },
            content_type: if over.content_type != ContentType::Any {
                over.content_type
            } else {
                base.content_type
            },
            language: if over.language != "any" {
                over.language.clone()
            } else {
                base.language.clone()
            },
            region: if over.region != "any" {
                over.region.clone()
            } else {
                base.region.clone()
            },
            safe_search: if over.safe_search != SafeSearchLevel::Moderate {
                over.safe_search
            } else {
                base.safe_search
            },
            custom_filters,
        }
    }

    /// Look up a named preset.
    pub fn preset(&self, name: &str) -> Option<&SearchFilter> {
        self.presets.get(name)
    }

    /// Register an additional named preset at runtime.
    pub fn add_preset(&mut self, name: &str, filters: SearchFilter) {
        tracing::debug!(name, "filter preset registered");
        self.presets.insert(name.to_string(), filters);
    }

    /// Names of all available presets.
    pub fn preset_names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    /// Human-readable summary of the active filter.
    pub fn summary(&self) -> String {
        if !self.active.is_active() {
            return "No filters active".to_string();
        }

        let mut parts = Vec::new();
        if self.active.date_range != DateRange::Any {
            parts.push(format!("Date: {}", self.active.date_range));
        }
        if self.active.content_type != ContentType::Any {
            parts.push(format!("Type: {}", self.active.content_type));
        }
        if self.active.language != "any" {
            parts.push(format!("Language: {}", self.active.language));
        }
        if self.active.region != "any" {
            parts.push(format!("Region: {}", self.active.region));
        }
        if self.active.safe_search != SafeSearchLevel::Moderate {
            parts.push(format!("Safe search: {}", self.active.safe_search));
        }
        for (key, value) in &self.active.custom_filters {
            parts.push(format!("{key}: {value}"));
        }
        parts.join(", ")
    }

    /// Drop provider results that do not match the filter.
    ///
    /// Results are kept unless the filter positively rules them out:
    /// a content-type mismatch, a parseable date older than the range
    /// cutoff, or a metadata key present with a mismatched value.
    /// Unparseable dates never filter a result out.
    pub fn apply_post_filters(
        &self,
        results: Vec<RawResult>,
        filters: &SearchFilter,
    ) -> Vec<RawResult> {
        if !filters.is_active() {
            return results;
        }
        let now = Utc::now();
        results
            .into_iter()
            .filter(|result| matches_filters(result, filters, now))
            .collect()
    }
}

/// Check one raw result against a filter.
fn matches_filters(result: &RawResult, filters: &SearchFilter, now: DateTime<Utc>) -> bool {
    if filters.content_type != ContentType::Any {
        let kind = if result.kind.is_empty() {
            "webpage"
        } else {
            result.kind.as_str()
        };
        if filters.content_type.as_str() != kind {
            return false;
        }
    }

    if !result.date.is_empty() {
        if let (Some(cutoff), Some(date)) =
            (filters.date_range.cutoff(now), parse_result_date(&result.date))
        {
            if date < cutoff {
                return false;
            }
        }
    }

    for (key, expected) in &filters.custom_filters {
        if let Some(actual) = result.metadata.get(key) {
            if actual != expected {
                return false;
            }
        }
    }

    true
}

/// Parse a result date as RFC 3339 or plain `YYYY-MM-DD`.
fn parse_result_date(date: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Built-in filter presets.
fn default_presets() -> BTreeMap<String, SearchFilter> {
    let mut presets = BTreeMap::new();
    presets.insert("default".to_string(), SearchFilter::default());
    presets.insert(
        "recent".to_string(),
        SearchFilter {
            date_range: DateRange::Week,
            ..SearchFilter::default()
        },
    );
    presets.insert(
        "images".to_string(),
        SearchFilter {
            content_type: ContentType::Image,
            ..SearchFilter::default()
        },
    );
    presets.insert(
        "news".to_string(),
        SearchFilter {
            content_type: ContentType::News,
            date_range: DateRange::Week,
            ..SearchFilter::default()
        },
    );
    presets.insert(
        "pdfs".to_string(),
        SearchFilter {
            content_type: ContentType::Pdf,
            ..SearchFilter::default()
        },
    );
    presets.insert(
        "academic".to_string(),
        SearchFilter {
            custom_filters: BTreeMap::from([(
                "academic".to_string(),
                serde_json::Value::Bool(true),
            )]),
            ..SearchFilter::default()
        },
    );
    presets.insert(
        "safe".to_string(),
        SearchFilter {
            safe_search: SafeSearchLevel::Strict,
            ..SearchFilter::default()
        },
    );
    presets.insert(
        "local".to_string(),
        SearchFilter {
            region: "us".to_string(),
            language: "en".to_string(),
            ..SearchFilter::default()
        },
    );
    presets
}
