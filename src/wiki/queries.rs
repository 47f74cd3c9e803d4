// src/wiki/queries.rs
//! Search-style operations on [`Wiki`].
//!
//! Each memoized operation caches the raw response under its name and
//! request parameters, then decodes it on every call.

use super::Wiki;
use crate::api::parser::{decode, decode_query};
use crate::api::responses::{
    CategoryMembersQuery, GeoSearchQuery, LanguagesQuery, PrefixSearchQuery, RandomQuery,
    SearchQuery,
};
use crate::api::{QueryParams, ResponseCache};
use crate::constants::{CATEGORY_PREFIX, GEOSEARCH_RADIUS_MAX, GEOSEARCH_RADIUS_MIN, SEARCH_RESULT_CAP};
use crate::error::WikiError;
use crate::types::{
    strip_namespace, ApiUrl, CategoryMembers, Coordinates, OpenSearchHit, PageIdentifier,
    QueryText, ValidationError,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// How [`Wiki::page_with`] resolves its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    /// Replace a title with the search engine's suggestion first.
    pub auto_suggest: bool,
    /// Follow redirects instead of failing with `UnexpectedRedirect`.
    pub follow_redirect: bool,
    /// Load every lazy field before returning.
    pub preload: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            auto_suggest: true,
            follow_redirect: true,
            preload: false,
        }
    }
}

/// Length limits and resolution behavior for [`Wiki::summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Sentences to return (at most 10); 0 to use `chars`.
    pub sentences: u32,
    /// Approximate character count; used only when `sentences` is 0.
    pub chars: u32,
    pub auto_suggest: bool,
    pub follow_redirect: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            sentences: 0,
            chars: 0,
            auto_suggest: true,
            follow_redirect: true,
        }
    }
}

impl Wiki {
    fn cached_send(&self, operation: &str, params: QueryParams) -> Result<Value, WikiError> {
        let key = ResponseCache::key(operation, &params.cache_key());
        self.cache.get_or_try_insert(key, || self.gateway.send(params))
    }

    /// Full-text search; returns up to `results` titles.
    pub fn search(&self, query: &str, results: u32) -> Result<Vec<String>, WikiError> {
        self.run_search(query, results, false).map(|(titles, _)| titles)
    }

    /// Full-text search that also returns the engine's spelling suggestion.
    pub fn search_with_suggestion(
        &self,
        query: &str,
        results: u32,
    ) -> Result<(Vec<String>, Option<String>), WikiError> {
        self.run_search(query, results, true)
    }

    fn run_search(
        &self,
        query: &str,
        results: u32,
        with_suggestion: bool,
    ) -> Result<(Vec<String>, Option<String>), WikiError> {
        self.require_version("search", 1, 16)?;
        let query = QueryText::new(query, "query")?;

        let mut params = QueryParams::new()
            .with("list", "search")
            .with("srprop", "")
            .with("srlimit", results)
            .with("srsearch", query);
        if with_suggestion {
            params.set("srinfo", "suggestion");
        }

        let response = self.cached_send("search", params)?;
        let found: SearchQuery = decode_query(&response)?;
        let titles = found.search.into_iter().map(|hit| hit.title).collect();
        let suggestion = if with_suggestion {
            found.searchinfo.and_then(|info| info.suggestion)
        } else {
            None
        };
        Ok((titles, suggestion))
    }

    /// The search engine's spelling suggestion for `query`, if any.
    pub fn suggest(&self, query: &str) -> Result<Option<String>, WikiError> {
        self.require_version("suggest", 1, 16)?;
        let query = QueryText::new(query, "query")?;

        let params = QueryParams::new()
            .with("list", "search")
            .with("srinfo", "suggestion")
            .with("srprop", "")
            .with("srsearch", query);
        let response = self.cached_send("suggest", params)?;
        let found: SearchQuery = decode_query(&response)?;
        Ok(found.searchinfo.and_then(|info| info.suggestion))
    }

    /// Pages (and optionally sub-categories) of `category`, named without
    /// the `Category:` prefix.
    pub fn category_members(
        &self,
        category: &str,
        results: u32,
        subcategories: bool,
    ) -> Result<CategoryMembers, WikiError> {
        self.require_version("category_members", 1, 17)?;
        let category = QueryText::new(category, "category")?;

        let params = QueryParams::new()
            .with("list", "categorymembers")
            .with("cmprop", "ids|title|type")
            .with("cmtype", if subcategories { "page|subcat" } else { "page" })
            .with("cmlimit", results)
            .with("cmtitle", format!("{}{}", CATEGORY_PREFIX, category));
        let response = self.cached_send("category_members", params)?;
        let listed: CategoryMembersQuery = decode_query(&response)?;

        let mut members = CategoryMembers::default();
        for member in listed.categorymembers {
            match member.kind.as_str() {
                "page" => members.pages.push(member.title),
                "subcat" => members
                    .subcategories
                    .push(strip_namespace(&member.title, CATEGORY_PREFIX).to_string()),
                _ => {}
            }
        }
        Ok(members)
    }

    /// Titles of pages within `radius` metres of `coordinates`.
    ///
    /// With `title`, the result is restricted to that page.
    pub fn geosearch(
        &self,
        coordinates: Coordinates,
        title: Option<&str>,
        results: u32,
        radius: u32,
    ) -> Result<Vec<String>, WikiError> {
        self.require_extension("geosearch", "GeoData")?;
        if !(GEOSEARCH_RADIUS_MIN..=GEOSEARCH_RADIUS_MAX).contains(&radius) {
            return Err(ValidationError::OutOfBounds {
                field: "radius",
                value: radius,
                min: GEOSEARCH_RADIUS_MIN,
                max: GEOSEARCH_RADIUS_MAX,
            }
            .into());
        }
        if !coordinates.lat.is_finite() || !coordinates.lon.is_finite() {
            return Err(WikiError::InvalidArgument {
                reason: format!("coordinates {} are not finite", coordinates),
            });
        }

        let mut params = QueryParams::new()
            .with("list", "geosearch")
            .with("gsradius", radius)
            .with("gscoord", coordinates)
            .with("gslimit", results);
        if let Some(title) = title {
            params.set("titles", QueryText::new(title, "title")?);
        }

        let response = self.cached_send("geosearch", params)?;
        let found: GeoSearchQuery = decode_query(&response)?;
        match found.pages {
            Some(pages) if !pages.is_empty() => Ok(pages
                .into_iter()
                .filter(|(key, _)| key != "-1")
                .map(|(_, page)| page.title)
                .collect()),
            _ => Ok(found.geosearch.into_iter().map(|hit| hit.title).collect()),
        }
    }

    /// Title completions with a short description and URL each.
    ///
    /// Available on MediaWiki 1.25+ or wherever the OpenSearch extension is
    /// installed.
    pub fn opensearch(
        &self,
        query: &str,
        results: u32,
        redirect: bool,
    ) -> Result<Vec<OpenSearchHit>, WikiError> {
        if !self.site_info()?.has_extension("OpenSearch") {
            self.require_version("opensearch", 1, 25)?;
        }
        let query = QueryText::new(query, "query")?;

        let params = QueryParams::new()
            .with("action", "opensearch")
            .with("search", query)
            .with("limit", results.min(SEARCH_RESULT_CAP))
            .with("redirects", if redirect { "resolve" } else { "return" })
            .with("warningsaserror", true)
            .with("namespace", "");
        let response = self.cached_send("opensearch", params)?;
        let (_, titles, summaries, urls): (String, Vec<String>, Vec<String>, Vec<String>) =
            decode(&response)?;

        Ok(titles
            .into_iter()
            .enumerate()
            .map(|(i, title)| OpenSearchHit {
                title,
                summary: summaries.get(i).cloned().unwrap_or_default(),
                url: urls.get(i).cloned().unwrap_or_default(),
            })
            .collect())
    }

    /// Article titles starting with `prefix`.
    pub fn prefix_search(&self, prefix: &str, results: u32) -> Result<Vec<String>, WikiError> {
        self.require_version("prefix_search", 1, 23)?;
        let prefix = QueryText::new(prefix, "prefix")?;

        let params = QueryParams::new()
            .with("list", "prefixsearch")
            .with("pssearch", prefix)
            .with("pslimit", results.min(SEARCH_RESULT_CAP))
            .with("psnamespace", 0)
            .with("psoffset", 0);
        let response = self.cached_send("prefix_search", params)?;
        let found: PrefixSearchQuery = decode_query(&response)?;
        Ok(found.prefixsearch.into_iter().map(|hit| hit.title).collect())
    }

    /// Titles of random articles. Never memoized.
    pub fn random(&self, pages: u32) -> Result<Vec<String>, WikiError> {
        self.require_version("random", 1, 12)?;
        if pages < 1 {
            return Err(WikiError::InvalidArgument {
                reason: "number of random pages must be at least 1".to_string(),
            });
        }

        let params = QueryParams::new()
            .with("list", "random")
            .with("rnnamespace", 0)
            .with("rnlimit", pages);
        let response = self.gateway.send(params)?;
        let found: RandomQuery = decode_query(&response)?;
        Ok(found.random.into_iter().map(|hit| hit.title).collect())
    }

    /// Plain-text summary of the page `title` resolves to.
    pub fn summary(&self, title: &str, options: SummaryOptions) -> Result<String, WikiError> {
        self.require_extension("summary", "TextExtracts")?;
        let identifier = PageIdentifier::title(title)?;

        let key = ResponseCache::key(
            "summary",
            &format!(
                "{}|{}|{}|{}|{}",
                title, options.sentences, options.chars, options.auto_suggest, options.follow_redirect
            ),
        );
        let summary = self.cache.get_or_try_insert(key, || {
            let page = self.page_with(
                identifier,
                PageOptions {
                    auto_suggest: options.auto_suggest,
                    follow_redirect: options.follow_redirect,
                    preload: false,
                },
            )?;
            page.summary_with(options.sentences, options.chars)
                .map(Value::String)
        })?;

        match summary {
            Value::String(text) => Ok(text),
            other => Err(WikiError::MalformedResponse(format!(
                "cached summary is not text: {}",
                other
            ))),
        }
    }

    /// Language editions known to the endpoint: prefix to local name.
    /// Never memoized.
    pub fn languages(&self) -> Result<BTreeMap<String, String>, WikiError> {
        self.fetch_languages(None)
    }

    /// Fetches the language list from `api_url`, or the configured endpoint.
    pub(super) fn fetch_languages(
        &self,
        api_url: Option<&ApiUrl>,
    ) -> Result<BTreeMap<String, String>, WikiError> {
        let params = QueryParams::new()
            .with("meta", "siteinfo")
            .with("siprop", "languages");
        let response = match api_url {
            Some(url) => self.gateway.send_to(url, params)?,
            None => self.gateway.send(params)?,
        };
        let listed: LanguagesQuery = decode_query(&response)?;
        Ok(listed
            .languages
            .into_iter()
            .map(|lang| (lang.code, lang.name))
            .collect())
    }
}
