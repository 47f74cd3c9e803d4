// src/api/mod.rs
//! MediaWiki API interaction: transport, request gateway, paging and caching.
//!
//! Business logic depends on [`RequestGateway`], never on HTTP details; the
//! wire call itself sits behind [`QueryTransport`].

pub mod cache;
pub mod client;
pub mod pagination;
pub mod parser;
pub mod responses;
pub mod types;

use crate::error::WikiError;
use serde_json::Value;

/// The ability to perform one API call and return its decoded JSON body.
///
/// Implementations do not interpret the body; API-reported errors are
/// classified by the gateway.
pub trait QueryTransport: Send + Sync {
    fn fetch(&self, request: &types::ApiRequest<'_>) -> Result<Value, WikiError>;
}

pub use cache::ResponseCache;
pub use client::{HttpTransport, RequestGateway, Throttle};
pub use pagination::{ContinuedQuery, FragmentSource};
pub use types::{ApiRequest, QueryParams};
