// src/api/types.rs
//! Type definitions for the API module.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Parameters that commonly identify what a request is about, in the order
/// they are consulted when naming a query in error messages.
const SUBJECT_KEYS: [&str; 10] = [
    "srsearch", "search", "pssearch", "titles", "pageids", "page", "cmtitle", "gscoord", "bltitle",
    "pageid",
];

/// An ordered set of query-string parameters.
///
/// Ordering is by key, so two equal parameter sets always render the same
/// cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.0.insert(key.to_string(), value.to_string());
    }

    /// Inserts only when the key is absent.
    pub fn set_default(&mut self, key: &str, value: impl ToString) {
        self.0
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Overlays continuation tokens returned in a response's `continue` object.
    ///
    /// Tokens are opaque: strings are echoed verbatim, any other JSON value
    /// is echoed in its textual form.
    pub fn merge_continuation(&mut self, tokens: &serde_json::Map<String, serde_json::Value>) {
        for (key, value) in tokens {
            let token = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.0.insert(key.clone(), token);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// A short human label for the request, used in timeout errors.
    pub fn subject(&self) -> String {
        SUBJECT_KEYS
            .iter()
            .find_map(|key| self.get(key))
            .or_else(|| self.get("list"))
            .or_else(|| self.get("prop"))
            .or_else(|| self.get("action"))
            .unwrap_or("query")
            .to_string()
    }

    /// Stable textual form, used as the memo cache key.
    pub fn cache_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                f.write_str("&")?;
            }
            first = false;
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Everything a transport needs to perform one call.
#[derive(Debug, Clone, Copy)]
pub struct ApiRequest<'a> {
    pub url: &'a Url,
    pub params: &'a QueryParams,
    pub user_agent: &'a str,
    pub timeout: Option<Duration>,
}
