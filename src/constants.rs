// src/constants.rs
//! Constants that define the operational boundaries of the client.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Endpoint defaults
// ---------------------------------------------------------------------------

/// The API endpoint used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://en.wikipedia.org/w/api.php";

/// Language prefix matching [`DEFAULT_API_URL`].
pub const DEFAULT_LANGUAGE: &str = "en";

/// Minimum spacing between requests when rate limiting is switched on
/// without an explicit interval.
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Upstream conventions
// ---------------------------------------------------------------------------

/// `error.info` strings the API uses when it gave up on a request itself.
pub const UPSTREAM_TIMEOUT_MESSAGES: [&str; 2] = ["HTTP request timed out.", "Pool queue is full"];

/// Namespace prefix of category titles.
pub const CATEGORY_PREFIX: &str = "Category:";

/// Class fragment MediaWiki puts on table-of-contents list items.
pub const TOC_CLASS_MARKER: &str = "tocsection";

/// Largest limit the opensearch and prefixsearch modules accept.
pub const SEARCH_RESULT_CAP: u32 = 100;

/// Largest sentence count accepted by the TextExtracts module.
pub const SUMMARY_SENTENCE_CAP: u32 = 10;

/// Accepted geosearch radius, in meters.
pub const GEOSEARCH_RADIUS_MIN: u32 = 10;
pub const GEOSEARCH_RADIUS_MAX: u32 = 10_000;

// ---------------------------------------------------------------------------
// Traversal bounds
// ---------------------------------------------------------------------------

/// Maximum number of redirect hops followed while resolving one page.
///
/// The server resolves redirects itself, so a legitimate chain almost never
/// needs more than one or two hops here.
pub const MAX_REDIRECT_CHAIN: usize = 10;

/// Member listing size used by the category tree walker.
pub const CATEGORY_TREE_MEMBER_LIMIT: u32 = 500;

/// Backlinks requested per round.
pub const BACKLINKS_PAGE_SIZE: u32 = 500;

/// Attempts made for one category fetch before the walk gives up.
pub const CATEGORY_FETCH_ATTEMPTS: u32 = 5;

/// Pause between category fetch attempts.
pub const CATEGORY_FETCH_BACKOFF: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing unparseable response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
