use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a page is addressed in a query: by title or by numeric page id.
///
/// Exactly one form is carried at a time. Following a redirect replaces the
/// identifier with a new `Title`, never with a mix of both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageIdentifier {
    Title(String),
    PageId(u64),
}

impl PageIdentifier {
    /// Creates a title identifier, rejecting blank titles.
    pub fn title(title: impl Into<String>) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }
        Ok(Self::Title(title))
    }

    pub fn page_id(pageid: u64) -> Self {
        Self::PageId(pageid)
    }

    /// The query parameter that selects this page (`titles` or `pageids`).
    pub fn query_param(&self) -> (&'static str, String) {
        match self {
            Self::Title(title) => ("titles", title.clone()),
            Self::PageId(id) => ("pageids", id.to_string()),
        }
    }

    pub fn as_title(&self) -> Option<&str> {
        match self {
            Self::Title(title) => Some(title),
            Self::PageId(_) => None,
        }
    }
}

impl fmt::Display for PageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title(title) => write!(f, "\"{}\"", title),
            Self::PageId(id) => write!(f, "Page id \"{}\"", id),
        }
    }
}
