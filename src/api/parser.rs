// src/api/parser.rs
//! Response parsing shared by every operation.
//!
//! Bodies are decoded into `serde_json::Value` once; operations then either
//! read single fields from the tree or decode a sub-tree into one of the
//! typed views in [`super::responses`].

use super::responses::{QueryEnvelope, SiteInfoQuery};
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::WikiError;
use crate::types::{ApiVersion, SiteInfo};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes a raw HTTP body into a JSON tree.
pub fn parse_json_body(body: &str, status: StatusCode, url: &str) -> Result<Value, WikiError> {
    if !status.is_success() {
        return Err(WikiError::Upstream {
            message: format!("HTTP {} from {}", status, url),
        });
    }

    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        let preview: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        WikiError::MalformedResponse(format!("{} (body: {})", e, preview))
    })
}

/// Turns an API-reported `error` object into a [`WikiError`].
pub fn check_api_error(response: &Value, subject: &str) -> Result<(), WikiError> {
    let Some(error) = response.get("error") else {
        return Ok(());
    };
    let info = error
        .get("info")
        .and_then(Value::as_str)
        .or_else(|| error.get("code").and_then(Value::as_str))
        .unwrap_or("unknown error");
    Err(WikiError::from_upstream_info(info, subject))
}

/// Decodes a JSON tree into a typed view.
pub fn decode<T: DeserializeOwned>(response: &Value) -> Result<T, WikiError> {
    T::deserialize(response).map_err(|e| {
        WikiError::MalformedResponse(format!(
            "unexpected shape for {}: {}",
            std::any::type_name::<T>(),
            e
        ))
    })
}

/// Decodes the `query` section of a response.
pub fn decode_query<T: DeserializeOwned>(response: &Value) -> Result<T, WikiError> {
    let envelope: QueryEnvelope<T> = decode(response)?;
    Ok(envelope.query)
}

/// The entry for one page under `query.pages`, keyed by its id.
pub fn page_entry(response: &Value, pageid: u64) -> Option<&Value> {
    response
        .get("query")?
        .get("pages")?
        .get(pageid.to_string())
}

/// Like [`page_entry`], but a missing entry is a malformed response.
pub fn require_page_entry(response: &Value, pageid: u64) -> Result<&Value, WikiError> {
    page_entry(response, pageid).ok_or_else(|| {
        WikiError::MalformedResponse(format!("no entry for page id {} in response", pageid))
    })
}

/// Reads a string field from the first revision of a page entry.
pub fn first_revision(page: &Value) -> Result<&Value, WikiError> {
    page.get("revisions")
        .and_then(|revisions| revisions.get(0))
        .ok_or_else(|| WikiError::MalformedResponse("page entry has no revisions".to_string()))
}

/// Reads a required string field.
pub fn require_str<'a>(value: &'a Value, field: &str) -> Result<&'a str, WikiError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| WikiError::MalformedResponse(format!("missing string field '{}'", field)))
}

/// Parses a `meta=siteinfo&siprop=extensions|general` response.
pub fn parse_site_info(response: &Value) -> Result<SiteInfo, WikiError> {
    let query: SiteInfoQuery = decode_query(response)?;
    let version = ApiVersion::from_generator(&query.general.generator)
        .map_err(|e| WikiError::MalformedResponse(e.to_string()))?;
    let release = query
        .general
        .generator
        .split_whitespace()
        .nth(1)
        .and_then(|r| r.split('-').next())
        .unwrap_or_default()
        .to_string();

    Ok(SiteInfo {
        version,
        release,
        extensions: query.extensions.into_iter().map(|ext| ext.name).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_errors_are_classified() {
        let response = json!({ "error": { "code": "maxlag", "info": "Pool queue is full" } });
        let err = check_api_error(&response, "Rust").unwrap_err();
        assert!(matches!(err, WikiError::TransportTimeout { .. }));

        let response = json!({ "error": { "code": "badvalue", "info": "Bad value" } });
        let err = check_api_error(&response, "Rust").unwrap_err();
        assert!(matches!(err, WikiError::Upstream { ref message } if message == "Bad value"));

        assert!(check_api_error(&json!({ "query": {} }), "Rust").is_ok());
        assert!(check_api_error(&json!(["Rust", []]), "Rust").is_ok());
    }

    #[test]
    fn site_info_is_parsed() {
        let response = json!({
            "query": {
                "general": { "generator": "MediaWiki 1.28.0-wmf.22" },
                "extensions": [{ "name": "TextExtracts" }, { "name": "GeoData" }]
            }
        });
        let info = parse_site_info(&response).unwrap();
        assert_eq!(info.version, ApiVersion::new(1, 28));
        assert_eq!(info.release, "1.28.0");
        assert!(info.has_extension("GeoData"));
        assert!(!info.has_extension("OpenSearch"));
    }

    #[test]
    fn http_failures_become_upstream_errors() {
        let err = parse_json_body("", StatusCode::BAD_GATEWAY, "http://x/api.php").unwrap_err();
        assert!(matches!(err, WikiError::Upstream { .. }));
    }

    #[test]
    fn garbage_bodies_are_malformed() {
        let err = parse_json_body("<html>", StatusCode::OK, "http://x/api.php").unwrap_err();
        assert!(matches!(err, WikiError::MalformedResponse(_)));
    }

    #[test]
    fn page_entries_are_looked_up_by_id() {
        let response = json!({ "query": { "pages": { "736": { "title": "Albert Einstein" } } } });
        let page = require_page_entry(&response, 736).unwrap();
        assert_eq!(require_str(page, "title").unwrap(), "Albert Einstein");
        assert!(page_entry(&response, 1).is_none());
    }
}
