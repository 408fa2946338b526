//! Client configuration with documented defaults.

use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

use crate::protocol::ClientInfo;

/// Default port the workflow server listens on.
pub const DEFAULT_PORT: u16 = 5678;

/// Hosts probed, in order, when looking for the workflow server.
pub const DEFAULT_CANDIDATE_HOSTS: &[&str] = &[
    "host.docker.internal",
    "localhost",
    "127.0.0.1",
    // Docker default bridge
    "172.17.0.1",
    // container named `n8n`
    "n8n",
];

/// Endpoint path used when the webhook URL has no recognizable segment.
pub const DEFAULT_ENDPOINT_PATH: &str = "/api/mcp";

/// Path segments that mark where the MCP endpoint starts in a webhook URL.
const ENDPOINT_SEGMENTS: &[&str] = &["/mcp/", "/webhook-test/", "/mcp-test/"];

/// Offset used to stamp the protocol version (UTC+08:00).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

/// Default timeout for a resolver probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for one protocol request attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause between the initialize reply and the initialized notification.
pub const DEFAULT_HANDSHAKE_PAUSE: Duration = Duration::from_millis(100);

/// Retry policy for transport attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Backoff before retry `n` (0-based) is `unit * 2^n`.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    /// Delay to wait after failed attempt `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Configuration for an [`McpClient`](crate::McpClient).
#[derive(Debug, Clone)]
pub struct McpClientConfig {
    /// Path appended to the resolved base address, e.g. `/mcp/abc`.
    pub endpoint_path: String,
    /// Base addresses probed in order, e.g. `http://localhost:5678`.
    pub candidates: Vec<String>,
    /// Timeout for each resolver probe.
    pub probe_timeout: Duration,
    /// Timeout for each protocol request attempt.
    pub request_timeout: Duration,
    /// Retry policy for protocol requests.
    pub retry: RetryPolicy,
    /// Pause before the initialized notification.
    pub handshake_pause: Duration,
    /// Version sent in the handshake and the version header.
    pub protocol_version: String,
    /// Identity sent in the handshake.
    pub client_info: ClientInfo,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for McpClientConfig {
    fn default() -> Self {
        Self {
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            candidates: candidate_urls(DEFAULT_CANDIDATE_HOSTS, DEFAULT_PORT),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
            handshake_pause: DEFAULT_HANDSHAKE_PAUSE,
            protocol_version: dated_protocol_version(DEFAULT_UTC_OFFSET_HOURS),
            client_info: ClientInfo::default(),
            user_agent: format!("flowrelay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl McpClientConfig {
    /// Create a config for an explicit endpoint path.
    pub fn new(endpoint_path: impl Into<String>) -> Self {
        Self {
            endpoint_path: endpoint_path.into(),
            ..Default::default()
        }
    }

    /// Create a config whose endpoint path is taken from a webhook URL.
    pub fn from_webhook_url(webhook_url: &str) -> Self {
        Self::new(endpoint_path_from_webhook(webhook_url))
    }

    /// Probe `http://{host}:{port}` for each host.
    pub fn with_candidate_hosts<S: AsRef<str>>(mut self, hosts: &[S], port: u16) -> Self {
        self.candidates = candidate_urls(hosts, port);
        self
    }

    /// Probe the given base addresses verbatim.
    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Set the probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the handshake pause.
    pub fn with_handshake_pause(mut self, pause: Duration) -> Self {
        self.handshake_pause = pause;
        self
    }

    /// Pin the protocol version instead of deriving it from the date.
    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }
}

/// Build `http://{host}:{port}` base addresses.
pub fn candidate_urls<S: AsRef<str>>(hosts: &[S], port: u16) -> Vec<String> {
    hosts
        .iter()
        .map(|host| format!("http://{}:{}", host.as_ref(), port))
        .collect()
}

/// Derive the MCP endpoint path from a configured webhook URL.
///
/// The first matching segment of `/mcp/`, `/webhook-test/`, `/mcp-test/`
/// is kept together with everything after it.
pub fn endpoint_path_from_webhook(webhook_url: &str) -> String {
    for segment in ENDPOINT_SEGMENTS {
        if let Some(idx) = webhook_url.find(segment) {
            let rest = &webhook_url[idx + segment.len()..];
            let rest = rest.split(segment).next().unwrap_or_default();
            return format!("{}{}", segment, rest);
        }
    }
    DEFAULT_ENDPOINT_PATH.to_string()
}

/// Today's date at the given UTC offset, formatted `YYYY-MM-DD`.
pub fn dated_protocol_version(utc_offset_hours: i32) -> String {
    let offset = utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    Utc::now()
        .with_timezone(&offset)
        .format("%Y-%m-%d")
        .to_string()
}
