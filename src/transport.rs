//! HTTP Transport
//!
//! Executes exactly one HTTP request per call against either an absolute URL
//! or a path under a discovered node. Redirects are never followed and TLS
//! certificates are always verified. There is no retry logic here.

use reqwest::{redirect, Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::ChainpointConfig;
use crate::error::{ChainpointError, Result};

/// Where a request is sent.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Absolute(&'a str),
    /// Path segments appended to a node base address, each percent-encoded.
    Node {
        base: &'a str,
        segments: &'a [&'a str],
    },
}

impl Target<'_> {
    pub fn resolve(&self) -> Result<Url> {
        match self {
            Target::Absolute(url) => parse_url(url),
            Target::Node { base, segments } => {
                let mut url = parse_url(base)?;
                url.path_segments_mut()
                    .map_err(|_| {
                        ChainpointError::NetworkFailure(format!("Not a base URL: {}", base))
                    })?
                    .pop_if_empty()
                    .extend(segments.iter());
                Ok(url)
            }
        }
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw)
        .map_err(|e| ChainpointError::NetworkFailure(format!("Invalid URL {}: {}", raw, e)))
}

/// Request data. JSON is sent as the body of a POST and as query pairs of a GET.
#[derive(Debug, Clone)]
pub enum Payload {
    Json(serde_json::Value),
    /// Pre-encoded query string, appended verbatim.
    Query(String),
}

/// Status and body of a successful exchange.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(|b| b.is_ascii_whitespace())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

pub struct Transport {
    client: Client,
    timeout: Duration,
}

impl Transport {
    pub fn new(config: &ChainpointConfig) -> Result<Self> {
        Self::with_timeouts(config.timeout(), config.connect_timeout())
    }

    pub fn with_timeouts(timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .redirect(redirect::Policy::none())
            .user_agent(concat!("chainpoint-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ChainpointError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, timeout })
    }

    pub async fn get(&self, url: &str) -> Result<RequestOutcome> {
        self.send(Method::GET, Target::Absolute(url), None).await
    }

    /// Send one request. Any I/O error, timeout, redirect or non-2xx status is a
    /// `NetworkFailure`.
    pub async fn send(
        &self,
        method: Method,
        target: Target<'_>,
        payload: Option<&Payload>,
    ) -> Result<RequestOutcome> {
        let mut parsed = target.resolve()?;
        let url = parsed.to_string();

        if let Some(Payload::Query(query)) = payload {
            if !query.is_empty() {
                parsed.set_query(Some(query));
            }
        }

        debug!("{} {}", method, parsed);

        let mut request = self.client.request(method.clone(), parsed);
        if let Some(Payload::Json(value)) = payload {
            if method == Method::GET {
                request = request.query(value);
            } else if !is_empty_json(value) {
                request = request.json(value);
            }
        }

        let response = request.send().await.map_err(|e| self.classify(&url, e))?;
        let status = response.status();

        if status.is_redirection() {
            return Err(ChainpointError::NetworkFailure(format!(
                "Refusing to follow redirect ({}) from {}",
                status, url
            )));
        }

        if !status.is_success() {
            return Err(ChainpointError::NetworkFailure(format!(
                "{} returned status {}",
                url, status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(&url, e))?
            .to_vec();

        debug!("{} answered {} ({} bytes)", url, status, body.len());
        Ok(RequestOutcome { status, body })
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> ChainpointError {
        if err.is_timeout() {
            ChainpointError::NetworkFailure(format!(
                "{} timed out after {} seconds",
                url,
                self.timeout.as_secs()
            ))
        } else {
            ChainpointError::NetworkFailure(format!("{}: {}", url, err))
        }
    }
}

fn is_empty_json(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Parse `raw` as an absolute http(s) URL with a host.
pub fn parse_http_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}
