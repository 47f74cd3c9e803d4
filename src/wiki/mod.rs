// src/wiki/mod.rs
//! The client facade: configuration, site capabilities and page lookup.

mod queries;

pub use queries::{PageOptions, SummaryOptions};

use crate::api::{parser, HttpTransport, QueryParams, QueryTransport, RequestGateway, ResponseCache};
use crate::category_tree::{CategoryTreeNode, CategoryTreeWalker};
use crate::config::{normalize_language, WikiConfig};
use crate::error::WikiError;
use crate::page::{PageResolver, WikiPage};
use crate::types::{ApiUrl, ApiVersion, PageIdentifier, SiteInfo};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// A MediaWiki client bound to one endpoint.
///
/// Query operations are memoized per endpoint; switching the endpoint or
/// language drops every memoized response. Pages borrow the client, so the
/// configuration cannot change while a page is alive.
pub struct Wiki {
    config: WikiConfig,
    gateway: RequestGateway,
    cache: ResponseCache,
    site_info: RwLock<Option<Arc<SiteInfo>>>,
}

impl Wiki {
    /// Creates a client that talks HTTP to `config.api_url`.
    pub fn new(config: WikiConfig) -> Result<Self, WikiError> {
        let transport = HttpTransport::new()?;
        Ok(Self::with_transport(config, Box::new(transport)))
    }

    /// Creates a client over an arbitrary transport.
    pub fn with_transport(config: WikiConfig, transport: Box<dyn QueryTransport>) -> Self {
        let gateway = RequestGateway::new(transport, &config);
        Self {
            config,
            gateway,
            cache: ResponseCache::new(),
            site_info: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    /// Number of memoized responses currently held.
    pub fn cached_responses(&self) -> usize {
        self.cache.len()
    }

    /// Drops every memoized response.
    pub fn clear_cache(&self) {
        self.cache.clear_all();
    }

    // --- Site capabilities ---

    /// Version and extensions of the endpoint, probed once per endpoint.
    pub fn site_info(&self) -> Result<Arc<SiteInfo>, WikiError> {
        let cached = self.site_info.read().clone();
        if let Some(info) = cached {
            return Ok(info);
        }

        let params = QueryParams::new()
            .with("meta", "siteinfo")
            .with("siprop", "extensions|general");
        let response = self.gateway.send(params)?;
        let info = Arc::new(parser::parse_site_info(&response)?);
        log::debug!(
            "{} runs MediaWiki {} with {} extensions",
            self.config.api_url,
            info.version,
            info.extensions.len()
        );

        *self.site_info.write() = Some(Arc::clone(&info));
        Ok(info)
    }

    pub fn api_version(&self) -> Result<ApiVersion, WikiError> {
        Ok(self.site_info()?.version)
    }

    pub fn installed_extensions(&self) -> Result<BTreeSet<String>, WikiError> {
        Ok(self.site_info()?.extensions.clone())
    }

    /// Fails with `UnsupportedApiVersion` unless the endpoint runs at least `major.minor`.
    pub fn require_version(&self, operation: &str, major: u32, minor: u32) -> Result<(), WikiError> {
        let actual = self.api_version()?;
        if actual.at_least(major, minor) {
            return Ok(());
        }
        Err(WikiError::UnsupportedApiVersion {
            operation: operation.to_string(),
            required: ApiVersion::new(major, minor),
            actual,
            api_url: self.config.api_url.to_string(),
        })
    }

    /// Fails with `MissingExtension` unless `extension` is installed.
    pub fn require_extension(&self, operation: &str, extension: &str) -> Result<(), WikiError> {
        if self.site_info()?.has_extension(extension) {
            return Ok(());
        }
        Err(WikiError::MissingExtension {
            operation: operation.to_string(),
            extension: extension.to_string(),
            api_url: self.config.api_url.to_string(),
        })
    }

    // --- Pages ---

    /// Looks up a page by title with auto-suggest and redirect following.
    pub fn page(&self, title: &str) -> Result<WikiPage<'_>, WikiError> {
        self.page_with(PageIdentifier::title(title)?, PageOptions::default())
    }

    /// Looks up a page by id, following redirects.
    pub fn page_by_id(&self, pageid: u64) -> Result<WikiPage<'_>, WikiError> {
        self.page_with(PageIdentifier::page_id(pageid), PageOptions::default())
    }

    /// Looks up a page.
    ///
    /// With `auto_suggest`, a title is first replaced by the search
    /// suggestion for it, or the best search hit; no hit at all fails with
    /// `PageNotFound`. Id lookups never go through search.
    pub fn page_with(
        &self,
        identifier: PageIdentifier,
        options: PageOptions,
    ) -> Result<WikiPage<'_>, WikiError> {
        let identifier = match identifier {
            PageIdentifier::Title(title) if options.auto_suggest => {
                let (results, suggestion) = self.search_with_suggestion(&title, 1)?;
                match suggestion.or_else(|| results.into_iter().next()) {
                    Some(suggested) => {
                        if suggested != title {
                            log::debug!("Auto-suggest replaced \"{}\" with \"{}\"", title, suggested);
                        }
                        PageIdentifier::Title(suggested)
                    }
                    None => {
                        return Err(WikiError::PageNotFound {
                            identifier: PageIdentifier::Title(title),
                        })
                    }
                }
            }
            other => other,
        };

        let record = PageResolver::new(&self.gateway).resolve(identifier, options.follow_redirect)?;
        let page = WikiPage::new(self, record);
        if options.preload {
            page.preload()?;
        }
        Ok(page)
    }

    /// Builds category trees rooted at `categories`; see [`CategoryTreeWalker`].
    pub fn category_tree(
        &self,
        categories: &[&str],
        max_depth: i32,
    ) -> Result<IndexMap<String, CategoryTreeNode>, WikiError> {
        CategoryTreeWalker::new(self).build_tree(categories, max_depth)
    }

    // --- Configuration ---

    /// Switches to another language edition of the current endpoint.
    ///
    /// The endpoint must follow the `/<prefix>.` host layout. The new
    /// endpoint is probed before anything changes.
    pub fn set_language(&mut self, prefix: &str) -> Result<(), WikiError> {
        let prefix = normalize_language(prefix)?;
        if prefix == self.config.language {
            return Ok(());
        }

        let api_url = self
            .config
            .api_url
            .with_language(&self.config.language, &prefix)
            .ok_or_else(|| WikiError::LanguageChange {
                api_url: self.config.api_url.to_string(),
                old_prefix: self.config.language.clone(),
                new_prefix: prefix.clone(),
            })?;
        self.probe_endpoint(&api_url)?;

        log::info!("Language changed from '{}' to '{}'", self.config.language, prefix);
        self.config.language = prefix;
        self.switch_endpoint(api_url);
        Ok(())
    }

    /// Points the client at another MediaWiki endpoint.
    ///
    /// `language` is the prefix the new endpoint serves, used by later
    /// [`set_language`](Self::set_language) calls.
    pub fn set_api_url(&mut self, api_url: &str, language: &str) -> Result<(), WikiError> {
        let api_url = ApiUrl::parse(api_url)?;
        let language = normalize_language(language)?;
        self.probe_endpoint(&api_url)?;

        self.config.language = language;
        self.switch_endpoint(api_url);
        Ok(())
    }

    /// Enables (`Some(min_wait)`) or disables (`None`) request spacing.
    pub fn set_rate_limit(&mut self, min_wait: Option<Duration>) {
        log::info!("Rate limit set to {:?}", min_wait);
        self.config.rate_limit = min_wait;
        self.gateway.set_rate_limit(min_wait);
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        log::info!("Request timeout set to {:?}", timeout);
        self.config.timeout = timeout;
        self.gateway.set_timeout(timeout);
    }

    pub fn set_user_agent(&mut self, user_agent: &str) -> Result<(), WikiError> {
        if user_agent.trim().is_empty() {
            return Err(WikiError::InvalidArgument {
                reason: "user agent must not be empty".to_string(),
            });
        }
        self.config.user_agent = user_agent.to_string();
        self.gateway.set_user_agent(user_agent.to_string());
        Ok(())
    }

    /// Checks that `api_url` answers a language listing like a MediaWiki API.
    fn probe_endpoint(&self, api_url: &ApiUrl) -> Result<(), WikiError> {
        self.fetch_languages(Some(api_url)).map(drop).map_err(|e| {
            log::warn!("Endpoint probe of {} failed: {}", api_url, e);
            WikiError::InvalidApiUrl {
                api_url: api_url.to_string(),
            }
        })
    }

    fn switch_endpoint(&mut self, api_url: ApiUrl) {
        log::info!("API endpoint is now {}", api_url);
        self.gateway.set_api_url(api_url.clone());
        self.config.api_url = api_url;
        self.cache.clear_all();
        *self.site_info.get_mut() = None;
    }
}

impl std::fmt::Debug for Wiki {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wiki")
            .field("config", &self.config)
            .field("cached_responses", &self.cache.len())
            .finish_non_exhaustive()
    }
}
