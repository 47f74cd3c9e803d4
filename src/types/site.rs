// src/types/site.rs
//! Server capabilities: the MediaWiki version and installed extensions.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A `major.minor` MediaWiki version. Patch levels never gate features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses the `generator` field of siteinfo, e.g. `"MediaWiki 1.28.0-wmf.22"`.
    pub fn from_generator(generator: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidVersion(generator.to_string());
        let release = generator.split_whitespace().nth(1).ok_or_else(invalid)?;
        let numeric = release.split('-').next().ok_or_else(invalid)?;
        let mut parts = numeric.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        Ok(Self { major, minor })
    }

    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        *self >= Self::new(major, minor)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// What a server reports about itself through `meta=siteinfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteInfo {
    pub version: ApiVersion,
    /// Full release string, e.g. `1.28.0`.
    pub release: String,
    pub extensions: BTreeSet<String>,
}

impl SiteInfo {
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }
}
