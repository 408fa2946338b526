//! Streamable-HTTP MCP client for n8n workflow servers.
//!
//! This crate finds a reachable n8n instance, performs the MCP handshake,
//! discovers its tools, and invokes them on behalf of the chat front-end.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  McpClient                                                  │
//! │  - Lazy, serialized handshake (initialize → tools/list)     │
//! │  - call_tool / call_tool_display                            │
//! └─────────────────────────────────────────────────────────────┘
//!            │                                   │
//!            ▼                                   ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │  EndpointResolver        │   │  HttpTransport               │
//! │  - Probe candidate hosts │   │  - POST + JSON / event-stream│
//! │    in order              │   │  - Mcp-Session-Id adoption   │
//! └──────────────────────────┘   │  - Retry with backoff        │
//!                                └──────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use flowrelay_mcp::{McpClient, McpClientConfig};
//! use serde_json::Map;
//!
//! let config = McpClientConfig::from_webhook_url("http://localhost:5678/mcp/abc");
//! let client = McpClient::new(config)?;
//!
//! if client.initialize().await {
//!     for name in client.list_tool_names().await {
//!         println!("{name}");
//!     }
//!     let text = client.call_tool_display("Find_Emails", Map::new()).await;
//!     println!("{text}");
//! }
//! ```
//!
//! # Session lifecycle
//!
//! 1. Probe candidate hosts until one answers `GET /` with `200`
//! 2. Send `initialize`; adopt the `Mcp-Session-Id` response header
//! 3. Send `notifications/initialized`
//! 4. Fetch `tools/list`, falling back to a built-in tool set when empty
//!
//! A `404` on any request expires the session; the next call redoes the
//! whole sequence.

pub mod client;
pub mod config;
pub mod directive;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod resolver;
pub mod session;
pub mod tools;
pub mod transport;

// Re-export main types
pub use client::McpClient;
pub use config::{McpClientConfig, RetryPolicy, endpoint_path_from_webhook};
pub use directive::{ToolDirective, parse_directive};
pub use dispatch::{ERROR_PREFIX, ToolCallError};
pub use error::{McpError, Result, TransportError};
pub use protocol::{
    ClientInfo, InitializeResult, JsonRpcError, JsonRpcNotification, JsonRpcRequest, RpcReply,
    ServerInfo,
};
pub use resolver::{EndpointResolver, UNREACHABLE_MESSAGE};
pub use session::{Session, SessionPhase, SessionSnapshot};
pub use tools::{ToolDescriptor, ToolParameter, fallback_tools};
pub use transport::HttpTransport;
