// src/types/domain_types.rs
//! Domain-specific newtypes and records returned by the client.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Validated API endpoint URL (`.../w/api.php`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUrl(Url);

impl ApiUrl {
    pub fn parse(url: &str) -> Result<Self, ValidationError> {
        match Url::parse(url) {
            Ok(parsed_url) => {
                if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
                    return Err(ValidationError::InvalidUrl {
                        url: url.to_string(),
                        reason: "Only HTTP and HTTPS URLs are supported".to_string(),
                    });
                }
                Ok(Self(parsed_url))
            }
            Err(e) => Err(ValidationError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Swaps the `/<old>.` language segment for `/<new>.`.
    ///
    /// Returns `None` when the URL does not contain the old segment, i.e. the
    /// endpoint does not follow the `https://<prefix>.wikipedia.org` layout.
    pub fn with_language(&self, old_prefix: &str, new_prefix: &str) -> Option<Self> {
        let old_segment = format!("/{}.", old_prefix);
        let current = self.0.as_str();
        if !current.contains(&old_segment) {
            return None;
        }
        let swapped = current.replacen(&old_segment, &format!("/{}.", new_prefix), 1);
        if swapped == current {
            return None;
        }
        Url::parse(&swapped).ok().map(Self)
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free text sent to a search-like module; never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryText(String);

impl QueryText {
    pub fn new(text: impl Into<String>, field: &'static str) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyField(field));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical resolved state of a page.
///
/// All three fields are populated once resolution succeeds and never change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRecord {
    pub pageid: u64,
    pub title: String,
    pub url: String,
}

/// One entry of a disambiguation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisambiguationOption {
    pub title: String,
    pub description: String,
}

/// Primary coordinates of a page, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.lat, self.lon)
    }
}

/// Pages and sub-categories listed under a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMembers {
    pub pages: Vec<String>,
    /// Sub-category names without the `Category:` prefix.
    pub subcategories: Vec<String>,
}

/// One opensearch suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSearchHit {
    pub title: String,
    pub summary: String,
    pub url: String,
}

/// Strips a namespace prefix such as `Category:` from a title.
pub fn strip_namespace<'a>(title: &'a str, prefix: &str) -> &'a str {
    title.strip_prefix(prefix).unwrap_or(title)
}
