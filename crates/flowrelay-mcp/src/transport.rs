//! Streamable-HTTP transport.
//!
//! Every JSON-RPC message is a single `POST` to the session's endpoint. The
//! server answers with plain JSON, an event stream carrying one JSON frame,
//! or `202 Accepted` for asynchronous acknowledgements.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, USER_AGENT};
use serde::Serialize;

use crate::config::{McpClientConfig, RetryPolicy};
use crate::error::{McpError, Result, TransportError};
use crate::protocol::RpcReply;
use crate::session::Session;

/// Header carrying the server-issued session token, in both directions.
pub const SESSION_ID_HEADER: &str = "Mcp-Session-Id";

/// Header carrying the negotiated protocol version.
pub const PROTOCOL_VERSION_HEADER: &str = "MCP-Protocol-Version";

/// Media types accepted on every request.
pub const ACCEPT_VALUE: &str = "application/json, text/event-stream";

/// Longest body excerpt kept in a [`TransportError::BadRequest`].
const BODY_EXCERPT_LEN: usize = 500;

/// Sends JSON-RPC messages to the session endpoint with retry.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint_path: String,
    user_agent: String,
    retry: RetryPolicy,
}

impl HttpTransport {
    /// Build a transport from client configuration.
    pub fn new(config: &McpClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| McpError::Client(format!("failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            endpoint_path = %config.endpoint_path,
            timeout_secs = config.request_timeout.as_secs(),
            max_attempts = config.retry.max_attempts,
            "created MCP HTTP transport"
        );

        Ok(Self {
            http,
            endpoint_path: config.endpoint_path.clone(),
            user_agent: config.user_agent.clone(),
            retry: config.retry,
        })
    }

    /// Full endpoint URL for the session, if it has a base address.
    pub fn endpoint_url(&self, session: &Session) -> Option<String> {
        session
            .base_url()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), self.endpoint_path))
    }

    /// Send one message and return the decoded reply.
    ///
    /// Network failures and 5xx statuses are retried with exponential
    /// backoff. A 404 expires the session and is returned immediately.
    pub async fn send<M: Serialize>(
        &self,
        session: &Session,
        message: &M,
    ) -> std::result::Result<RpcReply, TransportError> {
        let url = self.endpoint_url(session).ok_or(TransportError::NoEndpoint)?;
        let body = serde_json::to_string(message)?;

        tracing::trace!(url = %url, json = %body, "sending MCP HTTP request");

        let mut attempt = 0;
        loop {
            let err = match self.attempt(session, &url, &body).await {
                Ok(reply) => return Ok(reply),
                Err(err) => err,
            };

            attempt += 1;
            if !err.is_transient() || attempt >= self.retry.max_attempts {
                tracing::warn!(url = %url, attempts = attempt, error = %err, "MCP request failed");
                return Err(err);
            }

            let delay = self.retry.backoff(attempt - 1);
            tracing::warn!(
                error = %err,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "MCP request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(
        &self,
        session: &Session,
        url: &str,
        body: &str,
    ) -> std::result::Result<RpcReply, TransportError> {
        let mut request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_VALUE)
            .header(USER_AGENT, &self.user_agent)
            .header(PROTOCOL_VERSION_HEADER, session.protocol_version())
            .body(body.to_string());
        if let Some(session_id) = session.session_id() {
            request = request.header(SESSION_ID_HEADER, session_id);
        }

        let response = request.send().await.map_err(classify_reqwest_error)?;

        // The server may rotate the token on any reply, including errors.
        adopt_session_header(session, response.headers());

        let status = response.status().as_u16();
        match status {
            200 => {
                let is_stream = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|ct| ct.contains("text/event-stream"));
                let text = response.text().await.map_err(classify_reqwest_error)?;

                tracing::trace!(json = %text, stream = is_stream, "received MCP HTTP response");

                if is_stream {
                    parse_event_stream(&text)
                } else {
                    serde_json::from_str(&text).map_err(|e| TransportError::decode(e.to_string()))
                }
            }
            202 => Ok(RpcReply::accepted()),
            400 => {
                let text = response.text().await.unwrap_or_default();
                tracing::error!(body = %excerpt(&text), "MCP server rejected request");
                Err(TransportError::BadRequest {
                    body: excerpt(&text).to_string(),
                })
            }
            404 => {
                tracing::warn!("MCP session expired, handshake required");
                session.expire();
                Err(TransportError::SessionExpired)
            }
            500..=599 => Err(TransportError::Server { status }),
            _ => Err(TransportError::UnexpectedStatus { status }),
        }
    }
}

fn adopt_session_header(session: &Session, headers: &HeaderMap) {
    if let Some(session_id) = headers
        .get(SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        session.adopt_session_id(session_id);
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::network(err.to_string())
    }
}

fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Decode the first usable `data:` frame of an event-stream body.
///
/// Empty payloads and the `[DONE]` sentinel are skipped.
pub fn parse_event_stream(body: &str) -> std::result::Result<RpcReply, TransportError> {
    for line in body.lines() {
        let Some(payload) = line.strip_prefix("data:") else {
            continue;
        };
        let payload = payload.trim();
        if payload.is_empty() || payload == "[DONE]" {
            continue;
        }
        return serde_json::from_str(payload)
            .map_err(|e| TransportError::decode(format!("invalid event-stream frame: {}", e)));
    }

    Err(TransportError::decode("event stream carried no data frame"))
}
