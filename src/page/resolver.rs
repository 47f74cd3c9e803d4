// src/page/resolver.rs
//! Resolution of a page identifier into a canonical [`PageRecord`].
//!
//! One `info|pageprops` query classifies the page into exactly one of four
//! outcomes, checked in this order: missing, redirect, disambiguation, found.
//! Redirects are followed by re-running the classification on the target
//! title, up to a bounded number of hops.

use super::disambiguation::parse_disambiguation;
use crate::api::parser::{self, decode_query};
use crate::api::responses::{InfoPage, PageInfoQuery};
use crate::api::{QueryParams, RequestGateway};
use crate::constants::MAX_REDIRECT_CHAIN;
use crate::error::WikiError;
use crate::types::{PageIdentifier, PageRecord};
use serde_json::Value;

/// Outcome of classifying one response.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Classification {
    Found(PageRecord),
    RedirectTo(String),
}

pub struct PageResolver<'g> {
    gateway: &'g RequestGateway,
    max_redirects: usize,
}

impl<'g> PageResolver<'g> {
    pub fn new(gateway: &'g RequestGateway) -> Self {
        Self {
            gateway,
            max_redirects: MAX_REDIRECT_CHAIN,
        }
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Resolves `identifier`, optionally following redirects.
    ///
    /// # Errors
    ///
    /// * `PageNotFound` when the server reports the page missing
    /// * `UnexpectedRedirect` when the page redirects and `follow_redirect` is off
    /// * `Disambiguation` when the page is a disambiguation page
    /// * `RedirectChainTooLong` when more than the configured hops are needed
    pub fn resolve(
        &self,
        identifier: PageIdentifier,
        follow_redirect: bool,
    ) -> Result<PageRecord, WikiError> {
        let start = identifier.clone();
        let mut current = identifier;
        let mut hops = 0;

        loop {
            log::debug!("Resolving {}", current);
            let response = self.gateway.send(info_params(&current))?;

            match self.classify(&current, &response, follow_redirect)? {
                Classification::Found(record) => return Ok(record),
                Classification::RedirectTo(target) => {
                    hops += 1;
                    if hops > self.max_redirects {
                        return Err(WikiError::RedirectChainTooLong {
                            title: start
                                .as_title()
                                .map_or_else(|| start.to_string(), str::to_string),
                            limit: self.max_redirects,
                        });
                    }
                    log::info!("Following redirect from {} to \"{}\"", current, target);
                    current = PageIdentifier::Title(target);
                }
            }
        }
    }

    fn classify(
        &self,
        identifier: &PageIdentifier,
        response: &Value,
        follow_redirect: bool,
    ) -> Result<Classification, WikiError> {
        let query: PageInfoQuery = decode_query(response)?;
        let (pageid_key, page) = query.pages.iter().next().ok_or_else(|| {
            WikiError::MalformedResponse("page info response lists no pages".to_string())
        })?;

        if page.missing.is_some() {
            return Err(WikiError::PageNotFound {
                identifier: identifier.clone(),
            });
        }

        if let Some(redirect) = query.redirects.first() {
            if !follow_redirect {
                return Err(WikiError::UnexpectedRedirect {
                    title: display_title(identifier, page),
                });
            }

            // The redirect's source is the normalized form of the requested
            // title when the server normalized it.
            let expected_from = match (query.normalized.first(), identifier) {
                (Some(normalized), PageIdentifier::Title(title)) => {
                    if &normalized.from != title {
                        return Err(WikiError::MalformedResponse(format!(
                            "normalization of \"{}\" reported for \"{}\"",
                            title, normalized.from
                        )));
                    }
                    normalized.to.clone()
                }
                (_, PageIdentifier::Title(title)) => title.clone(),
                (_, PageIdentifier::PageId(_)) => redirect.from.clone(),
            };

            if redirect.from != expected_from {
                return Err(WikiError::MalformedResponse(format!(
                    "redirect source \"{}\" does not match requested \"{}\"",
                    redirect.from, expected_from
                )));
            }
            return Ok(Classification::RedirectTo(redirect.to.clone()));
        }

        if page.pageprops.is_some() {
            return Err(self.disambiguation(identifier, pageid_key, page));
        }

        let pageid = match page.pageid {
            Some(id) => id,
            None => pageid_key.parse().map_err(|_| {
                WikiError::MalformedResponse(format!("page key '{}' is not an id", pageid_key))
            })?,
        };
        let title = page
            .title
            .clone()
            .ok_or_else(|| WikiError::MalformedResponse("page has no title".to_string()))?;
        let url = page
            .fullurl
            .clone()
            .ok_or_else(|| WikiError::MalformedResponse("page has no fullurl".to_string()))?;

        Ok(Classification::Found(PageRecord { pageid, title, url }))
    }

    /// Builds the disambiguation error from the page's rendered HTML.
    ///
    /// A failure to fetch that HTML is returned in its place.
    fn disambiguation(&self, identifier: &PageIdentifier, pageid_key: &str, page: &InfoPage) -> WikiError {
        let (key, value) = identifier.query_param();
        let params = QueryParams::new()
            .with("prop", "revisions")
            .with("rvprop", "content")
            .with("rvparse", "")
            .with("rvlimit", 1)
            .with(key, value);

        let response = match self.gateway.send(params) {
            Ok(response) => response,
            Err(e) => return e,
        };
        let html = response
            .get("query")
            .and_then(|q| q.get("pages"))
            .and_then(|pages| pages.get(pageid_key))
            .ok_or_else(|| WikiError::MalformedResponse("no page entry in parse response".to_string()))
            .and_then(parser::first_revision)
            .and_then(|revision| parser::require_str(revision, "*").map(str::to_string));

        match html {
            Ok(html) => {
                let choices = parse_disambiguation(&html);
                WikiError::Disambiguation {
                    title: display_title(identifier, page),
                    options: choices.options,
                    details: choices.details,
                }
            }
            Err(e) => e,
        }
    }
}

fn info_params(identifier: &PageIdentifier) -> QueryParams {
    let (key, value) = identifier.query_param();
    QueryParams::new()
        .with("prop", "info|pageprops")
        .with("inprop", "url")
        .with("ppprop", "disambiguation")
        .with("redirects", "")
        .with(key, value)
}

/// The requested title, or the server's title for id lookups.
fn display_title(identifier: &PageIdentifier, page: &InfoPage) -> String {
    match identifier {
        PageIdentifier::Title(title) => title.clone(),
        PageIdentifier::PageId(id) => page.title.clone().unwrap_or_else(|| id.to_string()),
    }
}
