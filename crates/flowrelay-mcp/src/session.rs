//! Session state shared by the transport and the handshake state machine.
//!
//! ```text
//! Unbound ──▶ Resolving ──▶ Handshaking ──▶ Listing ──▶ Ready
//!    ▲                                                   │
//!    └──────────────── 404 (session expired) ────────────┘
//! ```
//!
//! The lock here is never held across an `.await`; handshake serialization
//! lives in [`McpClient`](crate::McpClient).

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::protocol::ServerInfo;

/// Where the handshake state machine currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// No usable session.
    #[default]
    Unbound,
    /// Probing candidate hosts.
    Resolving,
    /// `initialize` sent, waiting for the reply.
    Handshaking,
    /// Handshake done, fetching the tool list.
    Listing,
    /// Usable for tool calls.
    Ready,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionPhase::Unbound => "unbound",
            SessionPhase::Resolving => "resolving",
            SessionPhase::Handshaking => "handshaking",
            SessionPhase::Listing => "listing",
            SessionPhase::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Point-in-time copy of the session, for status reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    /// Resolved base address.
    pub base_url: Option<String>,
    /// Server-issued session token.
    pub session_id: Option<String>,
    /// Current phase.
    pub phase: SessionPhase,
    /// Capabilities advertised in the handshake.
    pub capabilities: Map<String, Value>,
    /// Server identity from the handshake.
    pub server_info: Option<ServerInfo>,
}

impl SessionSnapshot {
    /// Whether handshake and tool listing both completed.
    pub fn initialized(&self) -> bool {
        self.phase == SessionPhase::Ready
    }
}

/// One live connection to a workflow server.
#[derive(Debug)]
pub struct Session {
    state: RwLock<SessionSnapshot>,
    protocol_version: String,
}

impl Session {
    /// Create an empty, unbound session.
    pub fn new(protocol_version: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(SessionSnapshot::default()),
            protocol_version: protocol_version.into(),
        }
    }

    /// Protocol version fixed at construction.
    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.read().clone()
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.state.read().phase
    }

    /// Whether the session is ready for tool calls.
    pub fn is_initialized(&self) -> bool {
        self.phase() == SessionPhase::Ready
    }

    /// Resolved base address, if any.
    pub fn base_url(&self) -> Option<String> {
        self.state.read().base_url.clone()
    }

    /// Current session token, if any.
    pub fn session_id(&self) -> Option<String> {
        self.state.read().session_id.clone()
    }

    /// Adopt a server-issued session token, replacing any previous one.
    pub fn adopt_session_id(&self, session_id: &str) {
        let mut state = self.state.write();
        if state.session_id.as_deref() != Some(session_id) {
            tracing::debug!(session = %short_id(session_id), "adopted MCP session id");
        }
        state.session_id = Some(session_id.to_string());
    }

    /// Handle a session-expiry signal: forget the token and require a new
    /// handshake. The base address is kept.
    pub fn expire(&self) {
        let mut state = self.state.write();
        state.session_id = None;
        state.phase = SessionPhase::Unbound;
    }

    pub(crate) fn set_phase(&self, phase: SessionPhase) {
        self.state.write().phase = phase;
    }

    /// Resolution failed: drop the address and stay unbound.
    pub(crate) fn unbind(&self) {
        let mut state = self.state.write();
        state.base_url = None;
        state.phase = SessionPhase::Unbound;
    }

    /// Start a fresh handshake against `base_url`; any old token is dropped.
    pub(crate) fn bind(&self, base_url: String) {
        let mut state = self.state.write();
        state.base_url = Some(base_url);
        state.session_id = None;
        state.phase = SessionPhase::Handshaking;
    }

    pub(crate) fn record_handshake(
        &self,
        capabilities: Map<String, Value>,
        server_info: ServerInfo,
    ) {
        let mut state = self.state.write();
        state.capabilities = capabilities;
        state.server_info = Some(server_info);
        state.phase = SessionPhase::Listing;
    }
}

/// First eight characters of a session id, for logs and status output.
pub fn short_id(session_id: &str) -> &str {
    match session_id.char_indices().nth(8) {
        Some((idx, _)) => &session_id[..idx],
        None => session_id,
    }
}
