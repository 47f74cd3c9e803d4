use thiserror::Error;

mod domain_types;
mod ids;
mod site;

pub use domain_types::*;
pub use ids::*;
pub use site::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Value out of bounds for {field}: {value}, expected {min}..={max}")]
    OutOfBounds {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid language prefix: {prefix} - {reason}")]
    InvalidLanguage { prefix: String, reason: String },

    #[error("Invalid API version string: {0}")]
    InvalidVersion(String),
}
