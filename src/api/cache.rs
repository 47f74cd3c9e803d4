// src/api/cache.rs
//! In-process memo cache for query-type operations.
//!
//! Caches raw JSON responses keyed by operation and request parameters. On
//! a hit the cached JSON goes back through the same parsing used for live
//! responses, so results are never stored in their typed form. Entries live
//! until [`ResponseCache::clear_all`], which the client calls whenever the
//! endpoint or language changes.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

/// Unbounded response memo shared by every memoized operation.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the key for one operation call.
    pub fn key(operation: &str, args: &str) -> String {
        format!("{}:{}", operation, args)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let hit = self.entries.lock().get(key).cloned();
        if hit.is_some() {
            log::debug!("Cache hit: {}", key);
        } else {
            log::debug!("Cache miss: {}", key);
        }
        hit
    }

    pub fn insert(&self, key: String, value: Value) {
        self.entries.lock().insert(key, value);
    }

    /// Returns the cached value for `key`, or computes, stores and returns it.
    ///
    /// Failures are returned as-is and never cached.
    pub fn get_or_try_insert<E>(
        &self,
        key: String,
        fetch: impl FnOnce() -> Result<Value, E>,
    ) -> Result<Value, E> {
        if let Some(cached) = self.get(&key) {
            return Ok(cached);
        }
        let value = fetch()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drops every memoized response.
    pub fn clear_all(&self) {
        let mut entries = self.entries.lock();
        if !entries.is_empty() {
            log::debug!("Clearing {} cached responses", entries.len());
        }
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_are_fetched_once() {
        let cache = ResponseCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_try_insert::<()>(ResponseCache::key("search", "q=rust"), || {
                    calls += 1;
                    Ok(json!(["Rust"]))
                })
                .unwrap();
            assert_eq!(value, json!(["Rust"]));
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = ResponseCache::new();
        let key = ResponseCache::key("search", "q=rust");
        let first: Result<Value, &str> = cache.get_or_try_insert(key.clone(), || Err("boom"));
        assert!(first.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_all_empties_the_cache() {
        let cache = ResponseCache::new();
        cache.insert(ResponseCache::key("suggest", "a"), json!("b"));
        cache.insert(ResponseCache::key("summary", "c"), json!("d"));
        cache.clear_all();
        assert!(cache.is_empty());
        assert!(cache.get("suggest:a").is_none());
    }
}
