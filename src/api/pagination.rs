// src/api/pagination.rs
//! Continuation-token paging over `action=query` results.
//!
//! The API signals more results with a `continue` object whose entries must
//! be echoed back verbatim on the next request. [`ContinuedQuery`] hides
//! that loop behind an iterator that issues one request per round, and only
//! when the previous round's fragments have been consumed.

use super::client::RequestGateway;
use super::types::QueryParams;
use crate::error::WikiError;
use serde_json::{Map, Value};
use std::collections::VecDeque;

/// Where each round's fragments are found in the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentSource {
    /// Every value of `query.pages` (generator queries).
    Generator,
    /// The array at `query.pages[pageid][property]`.
    PageProperty { pageid: u64, property: String },
}

/// Lazy sequence of result fragments across continuation rounds.
///
/// Each cursor starts from empty continuation state; it is finite (provided
/// the server eventually omits `continue`) and cannot be restarted. A
/// request failure is yielded once, after which the cursor is exhausted.
pub struct ContinuedQuery<'g> {
    gateway: &'g RequestGateway,
    base_params: QueryParams,
    source: FragmentSource,
    continuation: Option<Map<String, Value>>,
    buffered: VecDeque<Value>,
    rounds: usize,
    finished: bool,
}

impl<'g> ContinuedQuery<'g> {
    pub fn new(gateway: &'g RequestGateway, base_params: QueryParams, source: FragmentSource) -> Self {
        Self {
            gateway,
            base_params,
            source,
            continuation: None,
            buffered: VecDeque::new(),
            rounds: 0,
            finished: false,
        }
    }

    /// Cursor over `query.pages[pageid][property]`.
    ///
    /// The property is also the `prop` parameter of the base query.
    pub fn page_property(gateway: &'g RequestGateway, base_params: QueryParams, pageid: u64) -> Self {
        let property = base_params.get("prop").unwrap_or_default().to_string();
        Self::new(
            gateway,
            base_params,
            FragmentSource::PageProperty { pageid, property },
        )
    }

    /// Cursor over every page a generator produces.
    pub fn generator(gateway: &'g RequestGateway, base_params: QueryParams) -> Self {
        Self::new(gateway, base_params, FragmentSource::Generator)
    }

    /// Number of requests issued so far.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Issues the next round and buffers its fragments.
    fn fetch_round(&mut self) -> Result<(), WikiError> {
        let mut params = self.base_params.clone();
        if let Some(tokens) = &self.continuation {
            params.merge_continuation(tokens);
        }

        self.rounds += 1;
        log::debug!("Continuation round {} for {}", self.rounds, params.subject());
        let response = self.gateway.send(params)?;

        let Some(query) = response.get("query") else {
            self.finished = true;
            return Ok(());
        };

        let pages = query.get("pages");
        match &self.source {
            FragmentSource::Generator => {
                if let Some(pages) = pages.and_then(Value::as_object) {
                    self.buffered.extend(pages.values().cloned());
                }
            }
            FragmentSource::PageProperty { pageid, property } => {
                let fragments = pages
                    .and_then(|p| p.get(pageid.to_string()))
                    .and_then(|page| page.get(property))
                    .and_then(Value::as_array);
                if let Some(fragments) = fragments {
                    self.buffered.extend(fragments.iter().cloned());
                }
            }
        }

        match response.get("continue").and_then(Value::as_object) {
            Some(tokens) => self.continuation = Some(tokens.clone()),
            None => self.finished = true,
        }
        Ok(())
    }
}

impl Iterator for ContinuedQuery<'_> {
    type Item = Result<Value, WikiError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(fragment) = self.buffered.pop_front() {
                return Some(Ok(fragment));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.fetch_round() {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}
