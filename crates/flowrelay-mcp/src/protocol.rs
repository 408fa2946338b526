//! JSON-RPC 2.0 envelope and MCP message types.
//!
//! Inbound types are deliberately lenient: n8n omits fields freely, so
//! everything except the envelope shape itself is optional.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// JSON-RPC version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method names used by the client.
pub mod methods {
    /// Handshake request.
    pub const INITIALIZE: &str = "initialize";
    /// Handshake acknowledgement notification.
    pub const INITIALIZED: &str = "notifications/initialized";
    /// Tool listing request.
    pub const TOOLS_LIST: &str = "tools/list";
    /// Tool invocation request.
    pub const TOOLS_CALL: &str = "tools/call";
}

/// Generate a fresh request id such as `tool-2f1c…`.
pub fn request_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON-RPC Base Types
// ─────────────────────────────────────────────────────────────────────────────

/// A JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Request ID for correlating responses.
    pub id: String,
    /// Method name to call.
    pub method: String,
    /// Method parameters.
    pub params: Value,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request.
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC notification (no id, no response expected).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Method name.
    pub method: String,
    /// Method parameters (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Create a new notification.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Anything the server may send back: a result, an error, or a bare
/// `{"status": "accepted"}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcReply {
    /// Request ID this reply is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Result on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Set only on asynchronous acknowledgements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl RpcReply {
    /// The fixed reply used for HTTP 202.
    pub fn accepted() -> Self {
        Self {
            status: Some("accepted".to_string()),
            ..Default::default()
        }
    }

    /// Check if this is an asynchronous acknowledgement.
    pub fn is_accepted(&self) -> bool {
        self.status.as_deref() == Some("accepted")
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code. Usually an integer, but servers are not consistent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    /// Error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Optional additional data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Code as display text, `unknown` when absent.
    pub fn code_text(&self) -> String {
        match &self.code {
            Some(Value::String(code)) => code.clone(),
            Some(Value::Null) | None => "unknown".to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// Message as display text, `Unknown error` when absent.
    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or("Unknown error")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MCP Protocol Types
// ─────────────────────────────────────────────────────────────────────────────

/// Client info sent during initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    pub version: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            name: "flowrelay".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version.
    pub protocol_version: String,
    /// Declared client capabilities; we only ever declare `tools`.
    pub capabilities: Value,
    /// Client info.
    pub client_info: ClientInfo,
}

impl InitializeParams {
    /// Build handshake parameters for the given protocol version.
    pub fn new(protocol_version: impl Into<String>, client_info: ClientInfo) -> Self {
        Self {
            protocol_version: protocol_version.into(),
            capabilities: serde_json::json!({ "tools": {} }),
            client_info,
        }
    }
}

/// Server info returned during initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name.
    #[serde(default = "unknown_name")]
    pub name: String,
    /// Server version.
    #[serde(default = "unknown_version")]
    pub version: String,
}

fn unknown_name() -> String {
    "Unknown".to_string()
}

fn unknown_version() -> String {
    "?".to_string()
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: unknown_name(),
            version: unknown_version(),
        }
    }
}

/// Result of the initialize request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitializeResult {
    /// Protocol version echoed by the server.
    pub protocol_version: Option<String>,
    /// Server capabilities, kept as the raw advertised map.
    pub capabilities: Map<String, Value>,
    /// Server info.
    pub server_info: ServerInfo,
}

/// Parameters for the tools/call request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments to pass to the tool.
    pub arguments: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let req = JsonRpcRequest::new("init-1", methods::INITIALIZE, json!({"test": true}));
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"id\":\"init-1\""));
        assert!(json.contains("\"method\":\"initialize\""));
    }

    #[test]
    fn test_notification_has_no_id() {
        let note = JsonRpcNotification::new(methods::INITIALIZED, None);
        let value = serde_json::to_value(&note).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("params").is_none());
        assert_eq!(value["method"], "notifications/initialized");
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = request_id("tool");
        let b = request_id("tool");
        assert!(a.starts_with("tool-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_error_reply() {
        let json =
            r#"{"jsonrpc":"2.0","id":"x","error":{"code":-32600,"message":"Invalid Request"}}"#;
        let reply: RpcReply = serde_json::from_str(json).unwrap();
        let err = reply.error.unwrap();
        assert_eq!(err.code_text(), "-32600");
        assert_eq!(err.message_text(), "Invalid Request");
    }

    #[test]
    fn test_error_without_fields() {
        let err: JsonRpcError = serde_json::from_str("{}").unwrap();
        assert_eq!(err.code_text(), "unknown");
        assert_eq!(err.message_text(), "Unknown error");
    }

    #[test]
    fn test_accepted_reply() {
        let reply = RpcReply::accepted();
        assert!(reply.is_accepted());
        assert!(reply.result.is_none());
        assert_eq!(serde_json::to_value(&reply).unwrap(), json!({"status": "accepted"}));
    }

    #[test]
    fn test_initialize_params() {
        let params = InitializeParams::new("2025-01-01", ClientInfo::default());
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["protocolVersion"], "2025-01-01");
        assert_eq!(value["capabilities"], json!({"tools": {}}));
        assert_eq!(value["clientInfo"]["name"], "flowrelay");
    }

    #[test]
    fn test_initialize_result_is_lenient() {
        let result: InitializeResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(result.server_info.name, "Unknown");
        assert_eq!(result.server_info.version, "?");
        assert!(result.capabilities.is_empty());

        let result: InitializeResult = serde_json::from_value(json!({
            "protocolVersion": "2025-03-26",
            "capabilities": {"tools": {"listChanged": true}},
            "serverInfo": {"name": "n8n-mcp-server", "version": "1.0.0"}
        }))
        .unwrap();
        assert_eq!(result.server_info.name, "n8n-mcp-server");
        assert!(result.capabilities.contains_key("tools"));
    }
}
