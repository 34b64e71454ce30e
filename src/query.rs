//! Query parsing: raw search strings into structured components.
//!
//! The supported syntax mirrors common web search operators:
//!
//! - `"exact phrase"` — quoted text matched as a unit
//! - `+term` — required term
//! - `-term` — excluded term
//! - `site:example.com` — restrict to one site (first occurrence only)
//! - `filetype:pdf` — restrict to one file type (first occurrence only)
//!
//! Everything else is a plain term. Quoted substrings are extracted
//! before token splitting so they are never re-split.

use serde::{Deserialize, Serialize};

/// A parsed search query. Immutable once parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredQuery {
    /// The original query string, untouched.
    pub raw_text: String,
    /// Plain search terms.
    pub terms: Vec<String>,
    /// Terms that must be present (`+term`).
    pub required_terms: Vec<String>,
    /// Terms that must be absent (`-term`).
    pub excluded_terms: Vec<String>,
    /// Phrases that must match exactly (`"phrase"`).
    pub exact_phrases: Vec<String>,
    /// Site restriction (`site:example.com`).
    pub site_filter: Option<String>,
    /// File type restriction (`filetype:pdf`).
    pub filetype_filter: Option<String>,
}

impl StructuredQuery {
    /// Parse a raw query string into structured components.
    ///
    /// Parsing order matters: phrases are pulled out first, then the
    /// first `site:` and `filetype:` occurrences, then the remaining
    /// whitespace-delimited tokens are classified. A second `site:` or
    /// `filetype:` token is left in the plain term stream as ordinary
    /// text.
    pub fn parse(raw: &str) -> Self {
        let mut parsed = Self {
            raw_text: raw.to_string(),
            ..Self::default()
        };

        let (exact_phrases, working) = extract_phrases(raw);
        parsed.exact_phrases = exact_phrases;

        let mut site_taken = false;
        let mut filetype_taken = false;

        for token in working.split_whitespace() {
            if !site_taken {
                if let Some(value) = token.strip_prefix("site:") {
                    if !value.is_empty() {
                        parsed.site_filter = Some(value.to_string());
                        site_taken = true;
                        continue;
                    }
                }
            }
            if !filetype_taken {
                if let Some(value) = token.strip_prefix("filetype:") {
                    if !value.is_empty() {
                        parsed.filetype_filter = Some(value.to_string());
                        filetype_taken = true;
                        continue;
                    }
                }
            }
            if let Some(required) = token.strip_prefix('+') {
                if !required.is_empty() {
                    parsed.required_terms.push(required.to_string());
                }
            } else if let Some(excluded) = token.strip_prefix('-') {
                if !excluded.is_empty() {
                    parsed.excluded_terms.push(excluded.to_string());
                }
            } else {
                parsed.terms.push(token.to_string());
            }
        }

        parsed
    }

    /// True when the query carries nothing to search for.
    ///
    /// A query with no plain terms and no exact phrases is invalid even
    /// if it has filters — there is nothing to match against.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.exact_phrases.is_empty()
    }

    /// All terms that participate in matching: plain plus required.
    pub fn scoring_terms(&self) -> impl Iterator<Item = &str> {
        self.terms
            .iter()
            .chain(self.required_terms.iter())
            .map(String::as_str)
    }

    /// Reassemble a provider-facing query string.
    ///
    /// Required terms and exact phrases are quoted, filters become
    /// `site:`/`filetype:` clauses, excluded terms become negation
    /// clauses.
    pub fn to_provider_query(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        parts.extend(self.terms.iter().cloned());
        for term in &self.required_terms {
            parts.push(format!("\"{term}\""));
        }
        for phrase in &self.exact_phrases {
            parts.push(format!("\"{phrase}\""));
        }
        if let Some(site) = &self.site_filter {
            parts.push(format!("site:{site}"));
        }
        if let Some(filetype) = &self.filetype_filter {
            parts.push(format!("filetype:{filetype}"));
        }
        for term in &self.excluded_terms {
            parts.push(format!("-{term}"));
        }
        parts.join(" ")
    }
}

/// Extract double-quoted phrases, returning them together with the
/// working text with those spans removed.
///
/// Only complete quote pairs are consumed; a trailing unmatched quote
/// stays in the working text.
fn extract_phrases(raw: &str) -> (Vec<String>, String) {
    let mut phrases = Vec::new();
    let mut working = String::with_capacity(raw.len());
    let mut rest = raw;

    loop {
        let Some(open) = rest.find('"') else {
            working.push_str(rest);
            break;
        };
        let Some(close_offset) = rest[open + 1..].find('"') else {
            working.push_str(rest);
            break;
        };
        let close = open + 1 + close_offset;

        working.push_str(&rest[..open]);
        working.push(' ');
        let phrase = rest[open + 1..close].trim();
        if !phrase.is_empty() {
            phrases.push(phrase.to_string());
        }
        rest = &rest[close + 1..];
    }

    (phrases, working)
}
