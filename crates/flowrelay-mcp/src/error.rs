//! Error types for MCP operations.

use thiserror::Error;

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;

/// Why a single transport exchange produced no usable reply.
///
/// The transport never panics or bubbles a raw HTTP error; every failure
/// mode collapses into one of these variants.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No base address has been resolved yet.
    #[error("no workflow server address resolved")]
    NoEndpoint,

    /// Connection refused, DNS failure, broken body read, etc.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded its per-attempt timeout.
    #[error("request timed out")]
    Timeout,

    /// HTTP 400; the request itself is wrong and is never retried.
    #[error("bad request: {body}")]
    BadRequest {
        /// First part of the response body.
        body: String,
    },

    /// HTTP 404; the server forgot our session.
    #[error("session expired")]
    SessionExpired,

    /// HTTP 5xx after the attempt budget ran out.
    #[error("server error {status}")]
    Server {
        /// HTTP status code.
        status: u16,
    },

    /// Any other HTTP status.
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
    },

    /// Malformed JSON or unusable event-stream framing.
    #[error("decode error: {0}")]
    Decode(String),

    /// The outbound message could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TransportError {
    /// Create a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout | Self::Server { .. }
        )
    }
}

/// Error type for session-level MCP operations.
#[derive(Debug, Error)]
pub enum McpError {
    /// None of the candidate hosts answered the probe.
    #[error("no n8n instance accessible")]
    Unreachable,

    /// A transport exchange failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered, but not in the shape the protocol requires.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to build the HTTP client.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl McpError {
    /// Create a protocol error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}
