// src/lib.rs
//! wikiquery library: a blocking client for the MediaWiki action API.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Client**: `Wiki`, `PageOptions`, `SummaryOptions`
//! - **Pages**: `WikiPage`, `PageResolver`, disambiguation and section parsing
//! - **Category trees**: `CategoryTreeWalker`, `CategoryTreeNode`
//! - **API plumbing**: `RequestGateway`, `QueryTransport`, `ContinuedQuery`, `ResponseCache`
//! - **Error handling**: `WikiError`, `ValidationError`

pub mod api;
pub mod category_tree;
pub mod config;
pub mod constants;
mod error;
pub mod error_recovery;
pub mod page;
pub mod types;
mod wiki;

// --- Error Handling ---
pub use crate::error::{Result, WikiError};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, WikiConfig};

// --- Client ---
pub use crate::wiki::{PageOptions, SummaryOptions, Wiki};

// --- Pages ---
pub use crate::page::{
    disambiguation_titles, extract_disambiguation_options, find_section, PageResolver, WikiPage,
};

// --- Category Trees ---
pub use crate::category_tree::{CategoryTreeNode, CategoryTreeWalker};

// --- Domain Types ---
pub use crate::types::{
    ApiUrl, ApiVersion, CategoryMembers, Coordinates, DisambiguationOption, OpenSearchHit,
    PageIdentifier, PageRecord, SiteInfo,
};

// --- API Client ---
pub use crate::api::{
    ApiRequest, ContinuedQuery, FragmentSource, HttpTransport, QueryParams, QueryTransport,
    RequestGateway, ResponseCache,
};
