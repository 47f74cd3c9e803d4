// tests/common/mod.rs
//! Shared helpers: a scripted transport that records every request, and
//! builders for the response shapes the client reads.

#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use wikiquery::{ApiRequest, QueryParams, QueryTransport, Wiki, WikiConfig, WikiError};

/// One request as seen by the transport.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub params: QueryParams,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    pub fn is_site_info_probe(&self) -> bool {
        self.param("siprop") == Some("extensions|general")
    }
}

/// Handle on the requests a [`ScriptedTransport`] has served.
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<RecordedRequest>>>);

impl RequestLog {
    pub fn all(&self) -> Vec<RecordedRequest> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn count(&self, predicate: impl Fn(&RecordedRequest) -> bool) -> usize {
        self.0.lock().iter().filter(|r| predicate(r)).count()
    }

    /// Requests carrying `key=value`.
    pub fn with_param(&self, key: &str, value: &str) -> Vec<RecordedRequest> {
        self.0
            .lock()
            .iter()
            .filter(|r| r.param(key) == Some(value))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

type Responder = dyn Fn(&RecordedRequest) -> Result<Value, WikiError> + Send + Sync;

/// A transport that answers from a closure instead of the network.
pub struct ScriptedTransport {
    responder: Box<Responder>,
    log: RequestLog,
}

impl ScriptedTransport {
    pub fn new(
        responder: impl Fn(&RecordedRequest) -> Result<Value, WikiError> + Send + Sync + 'static,
    ) -> (Self, RequestLog) {
        let log = RequestLog::default();
        let transport = Self {
            responder: Box::new(responder),
            log: log.clone(),
        };
        (transport, log)
    }
}

impl QueryTransport for ScriptedTransport {
    fn fetch(&self, request: &ApiRequest<'_>) -> Result<Value, WikiError> {
        let recorded = RecordedRequest {
            url: request.url.to_string(),
            params: request.params.clone(),
        };
        self.log.0.lock().push(recorded.clone());
        (self.responder)(&recorded)
    }
}

/// A client over a scripted transport, with default configuration.
pub fn scripted_wiki(
    responder: impl Fn(&RecordedRequest) -> Result<Value, WikiError> + Send + Sync + 'static,
) -> (Wiki, RequestLog) {
    let (transport, log) = ScriptedTransport::new(responder);
    (Wiki::with_transport(WikiConfig::default(), Box::new(transport)), log)
}

// --- response builders ---

pub const ALL_EXTENSIONS: [&str; 3] = ["TextExtracts", "GeoData", "OpenSearch"];

pub fn site_info(generator: &str, extensions: &[&str]) -> Value {
    let extensions: Vec<Value> = extensions.iter().map(|name| json!({ "name": name })).collect();
    json!({
        "query": {
            "general": { "generator": generator },
            "extensions": extensions
        }
    })
}

/// Site info of a current Wikipedia-like endpoint.
pub fn modern_site_info() -> Value {
    site_info("MediaWiki 1.28.0-wmf.22", &ALL_EXTENSIONS)
}

/// An `info|pageprops` response for an existing, ordinary page.
pub fn page_info(pageid: u64, title: &str) -> Value {
    json!({
        "query": {
            "pages": {
                pageid.to_string(): {
                    "pageid": pageid,
                    "ns": 0,
                    "title": title,
                    "fullurl": format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_"))
                }
            }
        }
    })
}

/// An `info|pageprops` response for a page that does not exist.
pub fn missing_page(title: &str) -> Value {
    json!({
        "query": {
            "pages": {
                "-1": { "ns": 0, "title": title, "missing": "" }
            }
        }
    })
}

/// An `info|pageprops` response where the server followed `from` to `to`.
pub fn redirected_page_info(from: &str, to: &str, pageid: u64) -> Value {
    let mut response = page_info(pageid, to);
    response["query"]["redirects"] = json!([{ "from": from, "to": to }]);
    response
}

/// A `prop=...` response with `values` under `pages[pageid][property]`.
pub fn page_property(pageid: u64, property: &str, values: Value) -> Value {
    json!({
        "query": {
            "pages": {
                pageid.to_string(): { "pageid": pageid, property: values }
            }
        }
    })
}

pub fn api_error(info: &str) -> Value {
    json!({ "error": { "code": "internal_api_error", "info": info } })
}
