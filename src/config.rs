// src/config.rs
use crate::constants::{DEFAULT_API_URL, DEFAULT_LANGUAGE, DEFAULT_RATE_LIMIT_WAIT};
use crate::error::WikiError;
use crate::types::{ApiUrl, ValidationError};
use clap::{Parser, Subcommand};
use std::time::Duration;

/// Environment variable that overrides the default endpoint.
pub const API_URL_ENV: &str = "WIKIQUERY_API_URL";

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: Command,

    /// MediaWiki API endpoint (defaults to $WIKIQUERY_API_URL, then English Wikipedia)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Language prefix to query (e.g. 'fr'); rewrites the '/<prefix>.' part of the endpoint
    #[arg(short, long)]
    pub lang: Option<String>,

    /// HTTP timeout in seconds (no timeout when omitted)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Enable rate limiting with the default 50 ms spacing between requests
    #[arg(long, default_value_t = false)]
    pub rate_limit: bool,

    /// Enable rate limiting with the given minimum spacing between requests, in milliseconds
    #[arg(long)]
    pub rate_limit_ms: Option<u64>,

    /// Custom User-Agent header
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Full-text search for page titles
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        results: u32,
    },
    /// Spelling suggestion for a query
    Suggest { query: String },
    /// Plain-text summary of a page
    Summary {
        title: String,
        /// Number of leading sentences (max 10)
        #[arg(long, default_value_t = 0)]
        sentences: u32,
        /// Approximate number of characters
        #[arg(long, default_value_t = 0)]
        chars: u32,
    },
    /// Resolve a page and print its id, title and url
    Page {
        title: String,
        /// Fail instead of following redirects
        #[arg(long, default_value_t = false)]
        no_redirect: bool,
        /// Use the title verbatim instead of asking search for the best match
        #[arg(long, default_value_t = false)]
        exact: bool,
    },
    /// Links from a page to other articles
    Links { title: String },
    /// Non-hidden categories of a page
    Categories { title: String },
    /// Plain text of one section of a page
    Section { title: String, section: String },
    /// Pages and sub-categories of a category
    Members {
        category: String,
        #[arg(long, default_value_t = 10)]
        results: u32,
    },
    /// Category tree rooted at one or more categories
    Tree {
        categories: Vec<String>,
        /// Maximum depth; 0 or less expands everything
        #[arg(long, default_value_t = 1)]
        depth: i32,
    },
    /// Pages near a coordinate
    Geo {
        lat: f64,
        lon: f64,
        #[arg(long, default_value_t = 1000)]
        radius: u32,
        #[arg(long, default_value_t = 10)]
        results: u32,
    },
    /// Random article titles
    Random {
        #[arg(default_value_t = 1)]
        pages: u32,
    },
    /// Language editions known to the endpoint
    Languages,
}

/// Client configuration: which endpoint to talk to and how.
///
/// Owned by [`crate::Wiki`]; changing the endpoint or language through the
/// client clears every memoized response.
#[derive(Debug, Clone)]
pub struct WikiConfig {
    pub api_url: ApiUrl,
    pub language: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    /// Minimum spacing between requests; `None` disables rate limiting.
    pub rate_limit: Option<Duration>,
}

impl WikiConfig {
    /// Resolves a configuration from CLI input and environment.
    pub fn resolve(cli: &CommandLineInput) -> Result<Self, WikiError> {
        let mut config = Self::default();

        let api_url = match &cli.api_url {
            Some(url) => Some(url.clone()),
            None => match std::env::var(API_URL_ENV) {
                Ok(url) if url.trim().is_empty() => {
                    return Err(WikiError::MissingConfiguration(format!(
                        "{} is set but empty",
                        API_URL_ENV
                    )))
                }
                Ok(url) => Some(url),
                Err(_) => None,
            },
        };
        if let Some(url) = api_url {
            config.api_url = ApiUrl::parse(&url)?;
        }

        if let Some(lang) = &cli.lang {
            let lang = normalize_language(lang)?;
            if lang != config.language {
                config.api_url = config
                    .api_url
                    .with_language(&config.language, &lang)
                    .ok_or_else(|| WikiError::LanguageChange {
                        api_url: config.api_url.to_string(),
                        old_prefix: config.language.clone(),
                        new_prefix: lang.clone(),
                    })?;
                config.language = lang;
            }
        }

        if let Some(agent) = &cli.user_agent {
            if agent.trim().is_empty() {
                return Err(ValidationError::EmptyField("user agent").into());
            }
            config.user_agent = agent.clone();
        }

        config.timeout = cli.timeout.map(Duration::from_secs);
        if cli.rate_limit {
            config = config.with_default_rate_limit();
        }
        if let Some(ms) = cli.rate_limit_ms {
            config.rate_limit = Some(Duration::from_millis(ms));
        }
        Ok(config)
    }

    /// Rate limiting with the default minimum spacing.
    pub fn with_default_rate_limit(mut self) -> Self {
        self.rate_limit = Some(DEFAULT_RATE_LIMIT_WAIT);
        self
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api_url: ApiUrl::parse(DEFAULT_API_URL).expect("Default API URL should be valid"),
            language: DEFAULT_LANGUAGE.to_string(),
            user_agent: default_user_agent(),
            timeout: None,
            rate_limit: None,
        }
    }
}

pub fn default_user_agent() -> String {
    format!("wikiquery/{}", env!("CARGO_PKG_VERSION"))
}

/// Lower-cases a language prefix and checks it is a plausible host label.
pub fn normalize_language(prefix: &str) -> Result<String, ValidationError> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Err(ValidationError::EmptyField("language"));
    }
    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ValidationError::InvalidLanguage {
            prefix,
            reason: "only ASCII letters, digits and hyphens are allowed".to_string(),
        });
    }
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> CommandLineInput {
        CommandLineInput::parse_from(args)
    }

    #[test]
    fn defaults_point_at_english_wikipedia() {
        let config = WikiConfig::default();
        assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(config.language, "en");
        assert!(config.rate_limit.is_none());
        assert!(config.user_agent.starts_with("wikiquery/"));
    }

    #[test]
    fn language_flag_rewrites_endpoint() {
        let input = cli(&[
            "wikiquery",
            "--api-url",
            "http://en.wikipedia.org/w/api.php",
            "--lang",
            "FR",
            "languages",
        ]);
        let config = WikiConfig::resolve(&input).unwrap();
        assert_eq!(config.language, "fr");
        assert_eq!(config.api_url.as_str(), "http://fr.wikipedia.org/w/api.php");
    }

    #[test]
    fn language_flag_on_custom_endpoint_fails() {
        let input = cli(&[
            "wikiquery",
            "--api-url",
            "https://wiki.example.org/api.php",
            "--lang",
            "de",
            "languages",
        ]);
        assert!(matches!(
            WikiConfig::resolve(&input),
            Err(WikiError::LanguageChange { .. })
        ));
    }

    #[test]
    fn rate_limit_and_timeout_flags() {
        let input = cli(&[
            "wikiquery",
            "--api-url",
            "http://en.wikipedia.org/w/api.php",
            "--timeout",
            "5",
            "--rate-limit-ms",
            "250",
            "random",
        ]);
        let config = WikiConfig::resolve(&input).unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.rate_limit, Some(Duration::from_millis(250)));
    }

    #[test]
    fn rate_limit_switch_uses_default_spacing() {
        let input = cli(&[
            "wikiquery",
            "--api-url",
            "http://en.wikipedia.org/w/api.php",
            "--rate-limit",
            "random",
        ]);
        let config = WikiConfig::resolve(&input).unwrap();
        assert_eq!(config.rate_limit, Some(DEFAULT_RATE_LIMIT_WAIT));
    }

    #[test]
    fn bad_language_prefixes_are_rejected() {
        assert!(normalize_language("").is_err());
        assert!(normalize_language("e n").is_err());
        assert_eq!(normalize_language(" Simple ").unwrap(), "simple");
    }
}
