//! Webhook sink: POSTs a JSON payload to a configured URL
//!
//! Every request carries `Content-Type: application/json` followed by any
//! configured custom headers. The body is the alert payload on alert and the
//! resolve payload on resolve; both default to an empty object.
//!
//! Configuration problems (unparseable URL, unsupported scheme, HTTP client
//! that cannot be built) are logged once at construction. The sink is still
//! usable as a value but fails every delivery with
//! [`SinkError::Misconfigured`].

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde_json::{Map, Value};
use tracing::{debug, error};

use super::error::Result;
use super::{NotificationSink, SinkError};

/// Default per-request timeout (connection + transfer)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

const USER_AGENT: &str = concat!("deadman-switch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct HttpPostJsonSink {
    name: String,
    target: std::result::Result<(Client, Url), String>,
    headers: BTreeMap<String, String>,
    alert_payload: Map<String, Value>,
    resolve_payload: Map<String, Value>,
    timeout: Duration,
}

impl HttpPostJsonSink {
    /// Create a sink posting to `url`. The sink is named after the URL until
    /// [`with_name`](Self::with_name) says otherwise.
    pub fn new(url: &str) -> Self {
        let target = parse_target(url).and_then(|url| {
            Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .map(|client| (client, url))
                .map_err(|e| format!("failed to create HTTP client: {e}"))
        });

        if let Err(reason) = &target {
            error!(url = %url, "Invalid webhook sink configuration: {}", reason);
        }

        Self {
            name: url.to_string(),
            target,
            headers: BTreeMap::new(),
            alert_payload: Map::new(),
            resolve_payload: Map::new(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add custom headers sent with every request
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_alert_payload(mut self, payload: Map<String, Value>) -> Self {
        self.alert_payload = payload;
        self
    }

    pub fn with_resolve_payload(mut self, payload: Map<String, Value>) -> Self {
        self.resolve_payload = payload;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> Option<&Url> {
        self.target.as_ref().ok().map(|(_, url)| url)
    }

    pub fn is_misconfigured(&self) -> bool {
        self.target.is_err()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn post(&self, payload: &Map<String, Value>) -> Result<()> {
        let (client, url) = self
            .target
            .as_ref()
            .map_err(|reason| SinkError::Misconfigured(reason.clone()))?;
        if self.timeout.is_zero() || Instant::now().checked_add(self.timeout).is_none() {
            return Err(SinkError::Misconfigured(format!(
                "request timeout {:?} is out of range",
                self.timeout
            )));
        }

        let body = serde_json::to_vec(payload)?;
        debug!(
            sink = %self.name,
            "POST request sent to {} with data: {}",
            url,
            String::from_utf8_lossy(&body)
        );

        let mut request = client
            .post(url.clone())
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::HttpStatus {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }

        Ok(())
    }
}

/// Parse a webhook URL, accepting only `http` and `https`
pub fn parse_target(url: &str) -> std::result::Result<Url, String> {
    let parsed = Url::parse(url).map_err(|e| format!("cannot parse URL '{url}': {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(format!("unsupported URL scheme '{other}' in '{url}'")),
    }
}

impl NotificationSink for HttpPostJsonSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify_alert(&self) -> Result<()> {
        self.post(&self.alert_payload)
    }

    fn notify_resolve(&self) -> Result<()> {
        self.post(&self.resolve_payload)
    }
}
