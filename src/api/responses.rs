// src/api/responses.rs
//! Typed views of the `query` responses the client reads field by field.
//!
//! Only the keys the client consumes are modelled; everything else in a
//! response is ignored by serde.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// The `{"query": ...}` envelope shared by every `action=query` response.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryEnvelope<T> {
    pub query: T,
}

// --- siteinfo ---

#[derive(Debug, Clone, Deserialize)]
pub struct SiteInfoQuery {
    pub general: SiteGeneral,
    #[serde(default)]
    pub extensions: Vec<NamedEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteGeneral {
    pub generator: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntry {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguagesQuery {
    pub languages: Vec<LanguageEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageEntry {
    pub code: String,
    #[serde(rename = "*")]
    pub name: String,
}

// --- page info (resolution) ---

/// Response to `prop=info|pageprops&redirects=`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfoQuery {
    #[serde(default)]
    pub normalized: Vec<TitleMapping>,
    #[serde(default)]
    pub redirects: Vec<TitleMapping>,
    #[serde(default)]
    pub pages: BTreeMap<String, InfoPage>,
}

/// A `{from, to}` pair from the `normalized` or `redirects` lists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TitleMapping {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InfoPage {
    pub pageid: Option<u64>,
    pub title: Option<String>,
    pub fullurl: Option<String>,
    /// Present (usually as `""`) when the page does not exist.
    pub missing: Option<Value>,
    /// Only `disambiguation` is requested, so any value marks a disambiguation page.
    pub pageprops: Option<Value>,
}

// --- list modules ---

#[derive(Debug, Clone, Deserialize)]
pub struct TitleEntry {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Vec<TitleEntry>,
    pub searchinfo: Option<SearchInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchInfo {
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryMembersQuery {
    #[serde(default)]
    pub categorymembers: Vec<CategoryMemberEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryMemberEntry {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoSearchQuery {
    pub pages: Option<BTreeMap<String, TitleEntry>>,
    #[serde(default)]
    pub geosearch: Vec<TitleEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrefixSearchQuery {
    #[serde(default)]
    pub prefixsearch: Vec<TitleEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomQuery {
    #[serde(default)]
    pub random: Vec<TitleEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BacklinksQuery {
    #[serde(default)]
    pub backlinks: Vec<TitleEntry>,
}

// --- action=parse ---

#[derive(Debug, Clone, Deserialize)]
pub struct ParseEnvelope {
    pub parse: ParsedSections,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedSections {
    #[serde(default)]
    pub sections: Vec<SectionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionEntry {
    pub line: String,
}
