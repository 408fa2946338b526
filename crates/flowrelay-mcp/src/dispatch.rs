//! Tool-call outcomes and their display form.

use serde_json::Value;
use thiserror::Error;

use crate::error::TransportError;
use crate::protocol::RpcReply;

/// Prefix of every user-facing failure string.
pub const ERROR_PREFIX: &str = "❌";

/// Why a tool invocation produced no result.
#[derive(Debug, Error)]
pub enum ToolCallError {
    /// Handshake could not be completed.
    #[error("MCP client not initialized")]
    NotInitialized,

    /// The transport gave up.
    #[error("No response from MCP server")]
    NoResponse(#[source] TransportError),

    /// The server answered with a JSON-RPC error.
    #[error("MCP error {code}: {message}")]
    Remote {
        /// Error code as text.
        code: String,
        /// Error message.
        message: String,
    },

    /// The reply had neither `result` nor `error`.
    #[error("Unexpected response format")]
    UnexpectedFormat,
}

/// Classify a transport reply. `error` wins over `result`.
pub fn interpret(reply: RpcReply) -> Result<Value, ToolCallError> {
    if let Some(error) = reply.error {
        return Err(ToolCallError::Remote {
            code: error.code_text(),
            message: error.message_text().to_string(),
        });
    }
    reply.result.ok_or(ToolCallError::UnexpectedFormat)
}

/// Render an outcome for display: pretty-printed JSON on success,
/// `❌ <reason>` on failure.
pub fn render(outcome: &Result<Value, ToolCallError>) -> String {
    match outcome {
        Ok(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        Err(err) => format!("{} {}", ERROR_PREFIX, err),
    }
}

/// Whether a rendered outcome is a failure string.
pub fn is_failure(rendered: &str) -> bool {
    rendered.starts_with(ERROR_PREFIX)
}
