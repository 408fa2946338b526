//! MCP client: handshake state machine and tool invocation.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::config::McpClientConfig;
use crate::dispatch::{self, ToolCallError};
use crate::error::{McpError, Result, TransportError};
use crate::protocol::{
    CallToolParams, ClientInfo, InitializeParams, InitializeResult, JsonRpcNotification,
    JsonRpcRequest, methods, request_id,
};
use crate::resolver::EndpointResolver;
use crate::session::{Session, SessionPhase, SessionSnapshot};
use crate::tools::{ListToolsResult, ToolDescriptor, fallback_tools};
use crate::transport::HttpTransport;

/// Outcome of the most recent handshake.
#[derive(Debug, Default)]
struct HandshakeRecord {
    epoch: u64,
    succeeded: bool,
}

/// Client for one n8n MCP endpoint.
///
/// Safe to share behind an `Arc`. Concurrent callers of [`initialize`]
/// are serialized; callers that queued behind a failed handshake get that
/// failure instead of starting another, and callers that queued behind a
/// successful one return `true` while the session is still ready.
///
/// [`initialize`]: McpClient::initialize
#[derive(Debug)]
pub struct McpClient {
    config: McpClientConfig,
    session: Session,
    transport: HttpTransport,
    resolver: EndpointResolver,
    tools: RwLock<Vec<ToolDescriptor>>,
    handshake: tokio::sync::Mutex<HandshakeRecord>,
    handshake_epoch: AtomicU64,
}

impl McpClient {
    /// Create a client. No network traffic happens until first use.
    pub fn new(config: McpClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        let resolver = EndpointResolver::new(config.candidates.clone(), config.probe_timeout)?;

        tracing::info!(
            endpoint_path = %config.endpoint_path,
            candidates = config.candidates.len(),
            protocol_version = %config.protocol_version,
            "created MCP client"
        );

        Ok(Self {
            session: Session::new(config.protocol_version.clone()),
            transport,
            resolver,
            tools: RwLock::new(Vec::new()),
            handshake: tokio::sync::Mutex::new(HandshakeRecord::default()),
            handshake_epoch: AtomicU64::new(0),
            config,
        })
    }

    /// Client configuration.
    pub fn config(&self) -> &McpClientConfig {
        &self.config
    }

    /// Shared session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Copy of the session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Whether the session is ready for tool calls.
    pub fn is_initialized(&self) -> bool {
        self.session.is_initialized()
    }

    /// Current session token, if any.
    pub fn session_id(&self) -> Option<String> {
        self.session.session_id()
    }

    /// Full endpoint URL, once a base address is resolved.
    pub fn endpoint_url(&self) -> Option<String> {
        self.transport.endpoint_url(&self.session)
    }

    /// Cached tool list from the last successful handshake.
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.tools.read().clone()
    }

    /// Probe the candidate hosts without touching the session.
    pub async fn test_connectivity(&self) -> (bool, String) {
        self.resolver.test_connectivity().await
    }

    /// Make sure the session is ready, running the handshake if needed.
    ///
    /// Returns `false` when the server could not be reached or the handshake
    /// failed. Never panics.
    pub async fn initialize(&self) -> bool {
        let seen_epoch = self.handshake_epoch.load(Ordering::Acquire);
        let mut record = self.handshake.lock().await;

        if self.session.is_initialized() {
            return true;
        }
        if record.epoch != seen_epoch && !record.succeeded {
            // The handshake we queued behind failed.
            return false;
        }

        let succeeded = match self.run_handshake().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "MCP handshake failed");
                if self.session.phase() != SessionPhase::Unbound {
                    self.session.set_phase(SessionPhase::Unbound);
                }
                false
            }
        };

        record.epoch += 1;
        record.succeeded = succeeded;
        self.handshake_epoch.store(record.epoch, Ordering::Release);
        succeeded
    }

    async fn run_handshake(&self) -> Result<()> {
        self.session.set_phase(SessionPhase::Resolving);
        let Some(base_url) = self.resolver.resolve().await else {
            self.session.unbind();
            return Err(McpError::Unreachable);
        };
        self.session.bind(base_url);

        let params = InitializeParams::new(
            self.session.protocol_version(),
            self.config.client_info.clone(),
        );
        let request = JsonRpcRequest::new(
            request_id("init"),
            methods::INITIALIZE,
            serde_json::to_value(&params)?,
        );
        let reply = self.transport.send(&self.session, &request).await?;
        if let Some(error) = reply.error {
            return Err(McpError::protocol(format!(
                "initialize rejected: {} {}",
                error.code_text(),
                error.message_text()
            )));
        }
        let result = reply
            .result
            .ok_or_else(|| McpError::protocol("initialize reply carried no result"))?;
        let result: InitializeResult = serde_json::from_value(result)?;

        tracing::info!(
            server = %result.server_info.name,
            version = %result.server_info.version,
            protocol_version = ?result.protocol_version,
            "MCP server initialized"
        );
        self.session
            .record_handshake(result.capabilities, result.server_info);

        tokio::time::sleep(self.config.handshake_pause).await;

        let notification = JsonRpcNotification::new(methods::INITIALIZED, None);
        match self.transport.send(&self.session, &notification).await {
            Ok(reply) if reply.is_accepted() => {
                tracing::debug!("initialized notification accepted");
            }
            Ok(_) => tracing::debug!("initialized notification answered with a body"),
            Err(e) => tracing::debug!(error = %e, "initialized notification not acknowledged"),
        }

        let tools = self.fetch_tools().await;
        *self.tools.write() = tools;
        self.session.set_phase(SessionPhase::Ready);

        Ok(())
    }

    async fn fetch_tools(&self) -> Vec<ToolDescriptor> {
        let request = JsonRpcRequest::new(
            request_id("tools"),
            methods::TOOLS_LIST,
            Value::Object(Map::new()),
        );
        let listed = match self.transport.send(&self.session, &request).await {
            Ok(reply) => reply
                .result
                .and_then(|result| serde_json::from_value::<ListToolsResult>(result).ok())
                .map(|list| list.tools)
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "tools/list failed");
                Vec::new()
            }
        };

        if listed.is_empty() {
            tracing::info!("no tools discovered, using built-in tool set");
            fallback_tools()
        } else {
            tracing::debug!(count = listed.len(), "discovered MCP tools");
            listed
        }
    }

    /// Tool names, initializing first if needed. Empty when unreachable.
    pub async fn list_tool_names(&self) -> Vec<String> {
        if !self.initialize().await {
            return Vec::new();
        }
        self.tools
            .read()
            .iter()
            .filter(|t| !t.name.is_empty())
            .map(|t| t.name.clone())
            .collect()
    }

    /// Invoke a tool and return its raw result.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> std::result::Result<Value, ToolCallError> {
        if !self.initialize().await {
            return Err(ToolCallError::NotInitialized);
        }

        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };
        let params = serde_json::to_value(&params)
            .map_err(|e| ToolCallError::NoResponse(TransportError::Encode(e)))?;
        let request = JsonRpcRequest::new(request_id("tool"), methods::TOOLS_CALL, params);

        tracing::debug!(tool = %name, "calling MCP tool");
        let reply = self
            .transport
            .send(&self.session, &request)
            .await
            .map_err(ToolCallError::NoResponse)?;

        let outcome = dispatch::interpret(reply);
        if let Err(e) = &outcome {
            tracing::warn!(tool = %name, error = %e, "MCP tool call failed");
        }
        outcome
    }

    /// Invoke a tool and render the outcome for display.
    pub async fn call_tool_display(&self, name: &str, arguments: Map<String, Value>) -> String {
        dispatch::render(&self.call_tool(name, arguments).await)
    }

    /// Identity this client sends in the handshake.
    pub fn client_info(&self) -> &ClientInfo {
        &self.config.client_info
    }
}
