// src/api/client.rs
//! The request gateway and its default HTTP transport.
//!
//! [`RequestGateway`] is the only place a query leaves the process. It adds
//! the parameters every call needs, spaces calls out when rate limiting is
//! on, and turns API-reported errors into [`WikiError`]s.

use super::parser;
use super::types::{ApiRequest, QueryParams};
use super::QueryTransport;
use crate::config::WikiConfig;
use crate::error::WikiError;
use crate::types::ApiUrl;
use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::header;
use serde_json::Value;
use std::time::{Duration, Instant};

/// A thin wrapper around a blocking reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, WikiError> {
        // reqwest's blocking client cuts requests off after 30 s unless told otherwise
        let client = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self { client })
    }
}

impl QueryTransport for HttpTransport {
    fn fetch(&self, request: &ApiRequest<'_>) -> Result<Value, WikiError> {
        log::debug!("GET {}?{}", request.url, request.params);

        let pairs: Vec<(&str, &str)> = request.params.iter().collect();
        let mut builder = self
            .client
            .get(request.url.clone())
            .query(&pairs)
            .header(header::USER_AGENT, request.user_agent);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send()?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text()?;
        parser::parse_json_body(&body, status, &url)
    }
}

/// Enforces a minimum spacing between consecutive requests.
#[derive(Debug, Default)]
pub struct Throttle {
    min_wait: Option<Duration>,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_wait: Option<Duration>) -> Self {
        Self {
            min_wait,
            last_call: Mutex::new(None),
        }
    }

    /// Time left before the next request may go out.
    pub fn remaining(&self) -> Option<Duration> {
        let min_wait = self.min_wait?;
        let last_call = (*self.last_call.lock())?;
        let ready_at = last_call + min_wait;
        ready_at.checked_duration_since(Instant::now())
    }

    /// Blocks until the minimum spacing since the previous call has passed.
    pub fn wait(&self) {
        if let Some(pause) = self.remaining() {
            log::debug!("Rate limiting: waiting {:?} before next request", pause);
            std::thread::sleep(pause);
        }
    }

    pub fn record_call(&self) {
        *self.last_call.lock() = Some(Instant::now());
    }

    pub fn is_enabled(&self) -> bool {
        self.min_wait.is_some()
    }
}

/// Sends single queries to the configured endpoint.
pub struct RequestGateway {
    transport: Box<dyn QueryTransport>,
    api_url: ApiUrl,
    user_agent: String,
    timeout: Option<Duration>,
    throttle: Throttle,
}

impl RequestGateway {
    pub fn new(transport: Box<dyn QueryTransport>, config: &WikiConfig) -> Self {
        Self {
            transport,
            api_url: config.api_url.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout,
            throttle: Throttle::new(config.rate_limit),
        }
    }

    /// Sends one query to the configured endpoint.
    ///
    /// Adds `format=json`, and `action=query` unless another action is set.
    pub fn send(&self, params: QueryParams) -> Result<Value, WikiError> {
        let url = self.api_url.clone();
        self.send_to(&url, params)
    }

    /// Sends one query to an explicit endpoint, bypassing the configured one.
    ///
    /// Used to probe a candidate endpoint before switching to it.
    pub fn send_to(&self, url: &ApiUrl, mut params: QueryParams) -> Result<Value, WikiError> {
        params.set("format", "json");
        params.set_default("action", "query");
        let subject = params.subject();

        self.throttle.wait();
        let request = ApiRequest {
            url: url.as_url(),
            params: &params,
            user_agent: &self.user_agent,
            timeout: self.timeout,
        };
        let outcome = self.transport.fetch(&request);
        self.throttle.record_call();

        let response = match outcome {
            Ok(response) => response,
            Err(WikiError::Network(e)) if e.is_timeout() => {
                log::warn!("Request for '{}' timed out", subject);
                return Err(WikiError::TransportTimeout { query: subject });
            }
            Err(e) => return Err(e),
        };

        parser::check_api_error(&response, &subject)?;
        Ok(response)
    }

    pub fn api_url(&self) -> &ApiUrl {
        &self.api_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn rate_limit(&self) -> Option<Duration> {
        self.throttle.min_wait
    }

    pub(crate) fn set_api_url(&mut self, api_url: ApiUrl) {
        self.api_url = api_url;
    }

    pub(crate) fn set_user_agent(&mut self, user_agent: String) {
        self.user_agent = user_agent;
    }

    pub(crate) fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Replaces the throttle; the previous call time is forgotten.
    pub(crate) fn set_rate_limit(&mut self, min_wait: Option<Duration>) {
        self.throttle = Throttle::new(min_wait);
    }
}
