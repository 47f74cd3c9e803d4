// src/page/entity.rs
//! A resolved page whose details load on first access.
//!
//! Every accessor performs only the requests its own field needs, caches
//! the result on the page, and answers later calls from that cache. Fields
//! gated on a MediaWiki version or extension fail with
//! `UnsupportedApiVersion` / `MissingExtension` when the server lacks it.

use super::section::find_section;
use crate::api::parser::{self, decode, decode_query};
use crate::api::responses::{BacklinksQuery, ParseEnvelope};
use crate::api::{ContinuedQuery, QueryParams};
use crate::constants::{BACKLINKS_PAGE_SIZE, CATEGORY_PREFIX, SUMMARY_SENTENCE_CAP};
use crate::error::WikiError;
use crate::types::{strip_namespace, Coordinates, PageRecord};
use crate::wiki::Wiki;
use once_cell::unsync::OnceCell;
use serde_json::Value;
use std::fmt;

/// Plain-text content plus the revision it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PageContent {
    text: String,
    revision_id: u64,
    parent_id: u64,
}

/// A page resolved through [`Wiki::page`].
pub struct WikiPage<'w> {
    wiki: &'w Wiki,
    record: PageRecord,
    content: OnceCell<PageContent>,
    summary: OnceCell<String>,
    images: OnceCell<Vec<String>>,
    coordinates: OnceCell<Option<Coordinates>>,
    references: OnceCell<Vec<String>>,
    links: OnceCell<Vec<String>>,
    categories: OnceCell<Vec<String>>,
    redirects: OnceCell<Vec<String>>,
    backlinks: OnceCell<Vec<String>>,
    sections: OnceCell<Vec<String>>,
    html: OnceCell<String>,
}

impl<'w> WikiPage<'w> {
    pub(crate) fn new(wiki: &'w Wiki, record: PageRecord) -> Self {
        Self {
            wiki,
            record,
            content: OnceCell::new(),
            summary: OnceCell::new(),
            images: OnceCell::new(),
            coordinates: OnceCell::new(),
            references: OnceCell::new(),
            links: OnceCell::new(),
            categories: OnceCell::new(),
            redirects: OnceCell::new(),
            backlinks: OnceCell::new(),
            sections: OnceCell::new(),
            html: OnceCell::new(),
        }
    }

    pub fn record(&self) -> &PageRecord {
        &self.record
    }

    pub fn pageid(&self) -> u64 {
        self.record.pageid
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn url(&self) -> &str {
        &self.record.url
    }

    fn title_params(&self) -> QueryParams {
        QueryParams::new().with("titles", &self.record.title)
    }

    /// Plain-text content, excluding images, tables and other markup.
    ///
    /// Also loads [`revision_id`](Self::revision_id) and
    /// [`parent_id`](Self::parent_id), which come from the same request.
    pub fn content(&self) -> Result<&str, WikiError> {
        self.loaded_content().map(|c| c.text.as_str())
    }

    /// Id of the revision the content was read from.
    pub fn revision_id(&self) -> Result<u64, WikiError> {
        self.loaded_content().map(|c| c.revision_id)
    }

    /// Id of the revision preceding [`revision_id`](Self::revision_id).
    pub fn parent_id(&self) -> Result<u64, WikiError> {
        self.loaded_content().map(|c| c.parent_id)
    }

    fn loaded_content(&self) -> Result<&PageContent, WikiError> {
        self.content.get_or_try_init(|| {
            self.wiki.require_version("content", 1, 11)?;
            self.wiki.require_extension("content", "TextExtracts")?;

            let params = self
                .title_params()
                .with("prop", "extracts|revisions")
                .with("explaintext", "")
                .with("rvprop", "ids");
            let response = self.wiki.gateway().send(params)?;
            let page = parser::require_page_entry(&response, self.record.pageid)?;
            let revision = parser::first_revision(page)?;

            Ok(PageContent {
                text: parser::require_str(page, "extract")?.to_string(),
                revision_id: revision_number(revision, "revid")?,
                parent_id: revision_number(revision, "parentid")?,
            })
        })
    }

    /// Plain-text introduction of the page.
    pub fn summary(&self) -> Result<&str, WikiError> {
        self.summary
            .get_or_try_init(|| self.summary_with(0, 0))
            .map(String::as_str)
    }

    /// Uncached summary limited to `sentences` (at most 10) or, when
    /// `sentences` is 0, to roughly `chars` characters. With both at 0 the
    /// whole introduction is returned.
    pub fn summary_with(&self, sentences: u32, chars: u32) -> Result<String, WikiError> {
        self.wiki.require_extension("summary", "TextExtracts")?;

        let mut params = self
            .title_params()
            .with("prop", "extracts")
            .with("explaintext", "");
        if sentences > 0 {
            params.set("exsentences", sentences.min(SUMMARY_SENTENCE_CAP));
        } else if chars > 0 {
            params.set("exchars", chars);
        } else {
            params.set("exintro", "");
        }

        let response = self.wiki.gateway().send(params)?;
        let page = parser::require_page_entry(&response, self.record.pageid)?;
        Ok(parser::require_str(page, "extract")?.to_string())
    }

    /// URLs of the images used on the page.
    pub fn images(&self) -> Result<&[String], WikiError> {
        self.images
            .get_or_try_init(|| {
                let params = self
                    .title_params()
                    .with("generator", "images")
                    .with("gimlimit", "max")
                    .with("prop", "imageinfo")
                    .with("iiprop", "url");
                let mut urls = Vec::new();
                for image in ContinuedQuery::generator(self.wiki.gateway(), params) {
                    let image = image?;
                    let url = image
                        .get("imageinfo")
                        .and_then(|info| info.get(0))
                        .and_then(|info| info.get("url"))
                        .and_then(Value::as_str);
                    if let Some(url) = url {
                        urls.push(url.to_string());
                    }
                }
                Ok(urls)
            })
            .map(Vec::as_slice)
    }

    /// Primary coordinates of the page, if it has any.
    pub fn coordinates(&self) -> Result<Option<Coordinates>, WikiError> {
        self.coordinates
            .get_or_try_init(|| {
                self.wiki.require_extension("coordinates", "GeoData")?;

                let params = self
                    .title_params()
                    .with("prop", "coordinates")
                    .with("colimit", "max");
                let response = self.wiki.gateway().send(params)?;
                let Some(first) = parser::page_entry(&response, self.record.pageid)
                    .and_then(|page| page.get("coordinates"))
                    .and_then(|coords| coords.get(0))
                else {
                    return Ok(None);
                };
                Ok(Some(decode::<Coordinates>(first)?))
            })
            .copied()
    }

    /// External links on the page, protocol-relative ones completed with `http:`.
    pub fn references(&self) -> Result<&[String], WikiError> {
        self.references
            .get_or_try_init(|| {
                self.wiki.require_version("references", 1, 13)?;
                let params = QueryParams::new()
                    .with("prop", "extlinks")
                    .with("ellimit", "max");
                self.collect_property(params, |link| {
                    let url = parser::require_str(link, "*")?;
                    Ok(Some(if url.starts_with("http") {
                        url.to_string()
                    } else {
                        format!("http:{}", url)
                    }))
                })
            })
            .map(Vec::as_slice)
    }

    /// Titles of the articles (namespace 0) this page links to.
    pub fn links(&self) -> Result<&[String], WikiError> {
        self.links
            .get_or_try_init(|| {
                self.wiki.require_version("links", 1, 13)?;
                let params = QueryParams::new()
                    .with("prop", "links")
                    .with("plnamespace", 0)
                    .with("pllimit", "max");
                self.collect_property(params, |link| {
                    Ok(Some(parser::require_str(link, "title")?.to_string()))
                })
            })
            .map(Vec::as_slice)
    }

    /// Non-hidden categories of the page, without the `Category:` prefix.
    pub fn categories(&self) -> Result<&[String], WikiError> {
        self.categories
            .get_or_try_init(|| {
                self.wiki.require_version("categories", 1, 14)?;
                let params = QueryParams::new()
                    .with("prop", "categories")
                    .with("cllimit", "max")
                    .with("clshow", "!hidden");
                self.collect_property(params, namespace_stripped_title)
            })
            .map(Vec::as_slice)
    }

    /// Titles of the pages that redirect here.
    pub fn redirects(&self) -> Result<&[String], WikiError> {
        self.redirects
            .get_or_try_init(|| {
                self.wiki.require_version("redirects", 1, 24)?;
                let params = QueryParams::new()
                    .with("prop", "redirects")
                    .with("rdprop", "title")
                    .with("rdlimit", 100);
                self.collect_property(params, namespace_stripped_title)
            })
            .map(Vec::as_slice)
    }

    /// Articles (namespace 0, excluding redirects) that link to this page.
    ///
    /// The backlinks list nests its continuation token differently from
    /// `prop` queries, so it pages with its own loop.
    pub fn backlinks(&self) -> Result<&[String], WikiError> {
        self.backlinks
            .get_or_try_init(|| {
                self.wiki.require_version("backlinks", 1, 9)?;

                let mut params = QueryParams::new()
                    .with("list", "backlinks")
                    .with("bltitle", &self.record.title)
                    .with("bllimit", BACKLINKS_PAGE_SIZE)
                    .with("blfilterredir", "nonredirects")
                    .with("blnamespace", 0);
                let mut titles = Vec::new();

                loop {
                    let response = self.wiki.gateway().send(params.clone())?;
                    let round: BacklinksQuery = decode_query(&response)?;
                    titles.extend(round.backlinks.into_iter().map(|entry| entry.title));

                    let Some(next) = response.get("continue") else {
                        break;
                    };
                    let token = next.get("blcontinue").ok_or_else(|| {
                        WikiError::MalformedResponse(
                            "backlinks continuation without blcontinue".to_string(),
                        )
                    })?;
                    params.set("blcontinue", token_text(token));
                }

                Ok(titles)
            })
            .map(Vec::as_slice)
    }

    /// Section headings from the page's table of contents.
    pub fn sections(&self) -> Result<&[String], WikiError> {
        self.sections
            .get_or_try_init(|| {
                let params = QueryParams::new()
                    .with("action", "parse")
                    .with("prop", "sections")
                    .with("page", &self.record.title);
                let response = self.wiki.gateway().send(params)?;
                let parsed: ParseEnvelope = decode(&response)?;
                Ok(parsed
                    .parse
                    .sections
                    .into_iter()
                    .map(|section| section.line)
                    .collect())
            })
            .map(Vec::as_slice)
    }

    /// Rendered HTML of the current revision. Slow on long pages.
    pub fn html(&self) -> Result<&str, WikiError> {
        self.html
            .get_or_try_init(|| {
                self.wiki.require_version("html", 1, 17)?;
                let params = self
                    .title_params()
                    .with("prop", "revisions")
                    .with("rvprop", "content")
                    .with("rvlimit", 1)
                    .with("rvparse", "");
                let response = self.wiki.gateway().send(params)?;
                let page = parser::require_page_entry(&response, self.record.pageid)?;
                let revision = parser::first_revision(page)?;
                Ok(parser::require_str(revision, "*")?.to_string())
            })
            .map(String::as_str)
    }

    /// Plain text of the section titled `section_title`, or `None` if the
    /// content has no such heading. See [`find_section`] for the limits.
    pub fn section(&self, section_title: &str) -> Result<Option<String>, WikiError> {
        Ok(find_section(self.content()?, section_title))
    }

    /// Loads every lazily fetched field.
    ///
    /// Fields the server cannot provide (too old, or lacking the extension)
    /// are left unloaded; any other failure is returned.
    pub fn preload(&self) -> Result<(), WikiError> {
        let loaders: [(&str, &dyn Fn() -> Result<(), WikiError>); 10] = [
            ("content", &|| self.content().map(drop)),
            ("summary", &|| self.summary().map(drop)),
            ("images", &|| self.images().map(drop)),
            ("references", &|| self.references().map(drop)),
            ("links", &|| self.links().map(drop)),
            ("sections", &|| self.sections().map(drop)),
            ("redirects", &|| self.redirects().map(drop)),
            ("coordinates", &|| self.coordinates().map(drop)),
            ("backlinks", &|| self.backlinks().map(drop)),
            ("categories", &|| self.categories().map(drop)),
        ];

        for (field, load) in loaders {
            match load() {
                Ok(()) => {}
                Err(e) if e.is_unsupported_feature() => {
                    log::debug!("Skipping {} for \"{}\": {}", field, self.title(), e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Runs a continued `prop` query for this page and maps each fragment.
    fn collect_property<F>(&self, params: QueryParams, mut map: F) -> Result<Vec<String>, WikiError>
    where
        F: FnMut(&Value) -> Result<Option<String>, WikiError>,
    {
        let params = params.with("titles", &self.record.title);
        let mut values = Vec::new();
        for fragment in ContinuedQuery::page_property(self.wiki.gateway(), params, self.record.pageid) {
            if let Some(value) = map(&fragment?)? {
                values.push(value);
            }
        }
        Ok(values)
    }
}

impl PartialEq for WikiPage<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record
    }
}

impl fmt::Debug for WikiPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WikiPage")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for WikiPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<WikiPage '{}'>", self.record.title)
    }
}

fn namespace_stripped_title(entry: &Value) -> Result<Option<String>, WikiError> {
    let title = parser::require_str(entry, "title")?;
    Ok(Some(strip_namespace(title, CATEGORY_PREFIX).to_string()))
}

fn revision_number(revision: &Value, field: &str) -> Result<u64, WikiError> {
    revision
        .get(field)
        .and_then(Value::as_u64)
        .ok_or_else(|| WikiError::MalformedResponse(format!("revision has no '{}'", field)))
}

fn token_text(token: &Value) -> String {
    match token {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
