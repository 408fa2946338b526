//! Telegram front-end: routes chat messages through the language model and
//! the MCP tool server.
//!
//! ```text
//! ┌──────────┐  text   ┌───────┐  prompt   ┌─────────────┐
//! │ Telegram │ ──────▶ │ Relay │ ────────▶ │ LLM gateway │
//! └──────────┘         └───┬───┘           └─────────────┘
//!      ▲                   │ ACTION: call_tool
//!      │ reply             ▼
//!      └──────────── ┌───────────┐
//!                    │ McpClient │ ──▶ n8n
//!                    └───────────┘
//! ```

pub mod classify;
pub mod commands;
pub mod prompt;
pub mod render;
pub mod telegram;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use flowrelay_llm::CompletionBackend;
use flowrelay_mcp::{McpClient, parse_directive};

use self::classify::{QueryKind, classify};
use self::commands::{BotCommand, HELP_TEXT, NO_TOOLS_TEXT, StatusReport};
use self::render::{Reply, render_tool_reply};
use self::telegram::{Message, TelegramClient};

/// Reply when the MCP handshake fails.
pub const MCP_UNAVAILABLE_TEXT: &str = "❌ Could not connect to n8n server";

/// Reply when the language model cannot be reached.
pub const LLM_UNAVAILABLE_TEXT: &str = "❌ Error connecting to AI service.";

/// Pause after a failed poll before trying again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(1);

// ─────────────────────────────────────────────────────────────────────────────
// Relay
// ─────────────────────────────────────────────────────────────────────────────

/// Message handling shared by every chat.
pub struct Relay {
    mcp: Arc<McpClient>,
    llm: Arc<dyn CompletionBackend>,
}

impl Relay {
    pub fn new(mcp: Arc<McpClient>, llm: Arc<dyn CompletionBackend>) -> Self {
        Self { mcp, llm }
    }

    pub fn mcp(&self) -> &McpClient {
        &self.mcp
    }

    /// Handle any incoming text: slash commands first, then free-form queries.
    pub async fn handle(&self, text: &str) -> Reply {
        match BotCommand::parse(text) {
            Some(BotCommand::Help) => Reply::markdown(HELP_TEXT),
            Some(BotCommand::Status) => {
                Reply::markdown(commands::status_text(&self.status_report().await))
            }
            Some(BotCommand::Tools) => match commands::tools_text(&self.mcp.tools()) {
                Some(text) => Reply::markdown(text),
                None => Reply::plain(NO_TOOLS_TEXT),
            },
            None => self.respond(text).await,
        }
    }

    /// Answer a free-form query, calling a tool when the model asks for one.
    pub async fn respond(&self, text: &str) -> Reply {
        if !self.mcp.initialize().await {
            return Reply::plain(MCP_UNAVAILABLE_TEXT);
        }

        let kind = classify(text);
        let system_prompt = prompt::system_prompt(kind, &self.mcp.tools());

        let answer = match self.llm.complete(&system_prompt, text).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(error = %e, "completion request failed");
                return Reply::plain(LLM_UNAVAILABLE_TEXT);
            }
        };

        match parse_directive(&answer) {
            Some(directive) if kind == QueryKind::Workflow => {
                tracing::info!(tool = %directive.tool, "executing tool from model reply");
                let result = self
                    .mcp
                    .call_tool_display(&directive.tool, directive.arguments)
                    .await;
                render_tool_reply(&directive.tool, &result)
            }
            Some(directive) => {
                tracing::debug!(tool = %directive.tool, "ignoring tool directive in general query");
                Reply::plain(answer)
            }
            None => Reply::plain(answer),
        }
    }

    /// Collect everything `/status` shows.
    pub async fn status_report(&self) -> StatusReport {
        let (reachable, address) = self.mcp.test_connectivity().await;
        let model = self.llm.model();
        StatusReport {
            reachable,
            address,
            endpoint_path: self.mcp.config().endpoint_path.clone(),
            model: (!model.is_empty()).then(|| model.to_string()),
            tool_count: self.mcp.tools().len(),
            initialized: self.mcp.is_initialized(),
            session_id: self.mcp.session_id(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Polling loop
// ─────────────────────────────────────────────────────────────────────────────

/// Long-poll Telegram until Ctrl-C, handling each message on its own task.
pub async fn run(client: TelegramClient, relay: Arc<Relay>, poll_timeout: Duration) -> Result<()> {
    let mut offset: Option<i64> = None;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!("bot started, polling for updates");

    loop {
        let current_offset = offset;
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutting down Telegram bot");
                break;
            }
            updates = client.get_updates(current_offset, poll_timeout) => {
                let updates = match updates {
                    Ok(updates) => updates,
                    Err(err) => {
                        tracing::warn!(error = %err, "Telegram polling error");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                };

                if !updates.is_empty() {
                    tracing::debug!(count = updates.len(), "received updates");
                }
                for update in updates {
                    offset = Some(update.update_id + 1);
                    if let Some(message) = update.message {
                        tokio::spawn(handle_message(client.clone(), Arc::clone(&relay), message));
                    }
                }
            }
        }
    }

    Ok(())
}

async fn handle_message(client: TelegramClient, relay: Arc<Relay>, message: Message) {
    let Some(text) = message.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return;
    };
    let chat_id = message.chat.id;
    let (user_id, username) = message
        .from
        .as_ref()
        .map(|u| (u.id, u.username.as_deref().unwrap_or("unknown")))
        .unwrap_or((0, "unknown"));
    tracing::info!(chat_id, user_id, user = %username, "message received");

    if let Err(e) = client.send_typing(chat_id).await {
        tracing::debug!(error = %e, "failed to send typing indicator");
    }

    let reply = relay.handle(text).await;
    send_reply(&client, chat_id, message.message_id, &reply).await;
}

/// Send a reply, retrying as plain text when Markdown is rejected.
async fn send_reply(client: &TelegramClient, chat_id: i64, reply_to: i64, reply: &Reply) {
    let result = client
        .send_message(chat_id, &reply.text, Some(reply_to), reply.markdown)
        .await;

    match result {
        Ok(()) => {}
        Err(e) if reply.markdown => {
            tracing::warn!(error = %e, "markdown reply rejected, resending as plain text");
            if let Err(e) = client
                .send_message(chat_id, &reply.text, Some(reply_to), false)
                .await
            {
                tracing::error!(error = %e, "failed to send reply");
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to send reply"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flowrelay_llm::LlmError;
    use flowrelay_mcp::{McpClientConfig, RetryPolicy};
    use parking_lot::Mutex;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/mcp/relay";

    /// Backend that returns a canned answer and records the prompt it saw.
    struct StubBackend {
        answer: std::result::Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubBackend {
        fn answering(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(answer.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                answer: Err(()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for StubBackend {
        async fn complete(&self, system_prompt: &str, _user_text: &str) -> flowrelay_llm::Result<String> {
            self.prompts.lock().push(system_prompt.to_string());
            self.answer
                .clone()
                .map_err(|()| LlmError::Network("connection refused".to_string()))
        }

        fn model(&self) -> &str {
            "stub-model"
        }
    }

    fn can_bind_localhost() -> bool {
        std::net::TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn rpc_result(result: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": "x", "result": result}))
    }

    async fn n8n_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(body_partial_json(json!({"method": "initialize"})))
            .respond_with(
                rpc_result(json!({"protocolVersion": "2025-01-01", "capabilities": {}}))
                    .insert_header("Mcp-Session-Id", "relay-session-1"),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(body_partial_json(json!({"method": "notifications/initialized"})))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(body_partial_json(json!({"method": "tools/list"})))
            .respond_with(rpc_result(json!({"tools": [{
                "name": "Send_Email",
                "description": "Send an email",
                "inputSchema": {"properties": {"to": {"type": "string"}}, "required": ["to"]}
            }]})))
            .mount(&server)
            .await;
        server
    }

    fn mcp_client(candidates: Vec<String>) -> Arc<McpClient> {
        let config = McpClientConfig::new(ENDPOINT)
            .with_candidates(candidates)
            .with_probe_timeout(Duration::from_millis(500))
            .with_request_timeout(Duration::from_secs(5))
            .with_retry(RetryPolicy::new(1, Duration::from_millis(10)))
            .with_handshake_pause(Duration::ZERO)
            .with_protocol_version("2025-01-01");
        Arc::new(McpClient::new(config).unwrap())
    }

    const DIRECTIVE: &str =
        "ACTION: call_tool\nTOOL: Send_Email\nARGUMENTS: {\"to\": \"a@b.c\"}";

    #[tokio::test]
    async fn test_workflow_query_dispatches_tool() {
        if !can_bind_localhost() {
            return;
        }
        let server = n8n_server().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(body_partial_json(json!({
                "method": "tools/call",
                "params": {"name": "Send_Email", "arguments": {"to": "a@b.c"}}
            })))
            .respond_with(rpc_result(json!({"sent": true})))
            .expect(1)
            .mount(&server)
            .await;

        let backend = StubBackend::answering(DIRECTIVE);
        let relay = Relay::new(mcp_client(vec![server.uri()]), backend.clone());

        let reply = relay.handle("send an email to a@b.c").await;
        assert!(reply.markdown);
        assert!(reply.text.starts_with("✅ **Tool: Send_Email**"));
        assert!(reply.text.contains("\"sent\": true"));

        let prompts = backend.prompts.lock();
        assert!(prompts[0].contains("**Send_Email**"));
    }

    #[tokio::test]
    async fn test_general_query_ignores_directive() {
        if !can_bind_localhost() {
            return;
        }
        let server = n8n_server().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(body_partial_json(json!({"method": "tools/call"})))
            .respond_with(rpc_result(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let relay = Relay::new(
            mcp_client(vec![server.uri()]),
            StubBackend::answering(DIRECTIVE),
        );
        let reply = relay.handle("hello there").await;
        assert_eq!(reply, Reply::plain(DIRECTIVE));
    }

    #[tokio::test]
    async fn test_plain_answer_passes_through() {
        if !can_bind_localhost() {
            return;
        }
        let server = n8n_server().await;
        let relay = Relay::new(
            mcp_client(vec![server.uri()]),
            StubBackend::answering("Nothing to run."),
        );
        let reply = relay.handle("run something").await;
        assert_eq!(reply, Reply::plain("Nothing to run."));
    }

    #[tokio::test]
    async fn test_llm_failure_reply() {
        if !can_bind_localhost() {
            return;
        }
        let server = n8n_server().await;
        let relay = Relay::new(mcp_client(vec![server.uri()]), StubBackend::failing());
        let reply = relay.handle("find my emails").await;
        assert_eq!(reply, Reply::plain(LLM_UNAVAILABLE_TEXT));
    }

    #[tokio::test]
    async fn test_unreachable_n8n_reply() {
        let relay = Relay::new(
            mcp_client(vec!["http://127.0.0.1:1".to_string()]),
            StubBackend::answering(DIRECTIVE),
        );
        let reply = relay.handle("send an email").await;
        assert_eq!(reply, Reply::plain(MCP_UNAVAILABLE_TEXT));
    }

    #[tokio::test]
    async fn test_commands() {
        let relay = Relay::new(
            mcp_client(vec!["http://127.0.0.1:1".to_string()]),
            StubBackend::answering("unused"),
        );

        let help = relay.handle("/start").await;
        assert!(help.markdown);
        assert_eq!(help.text, HELP_TEXT);

        assert_eq!(relay.handle("/tools").await, Reply::plain(NO_TOOLS_TEXT));

        let status = relay.handle("/status").await;
        assert!(status.text.contains("❌ Disconnected"));
        assert!(status.text.contains("`/mcp/relay`"));
        assert!(status.text.contains("`stub-model`"));
    }

    #[tokio::test]
    async fn test_tools_command_after_handshake() {
        if !can_bind_localhost() {
            return;
        }
        let server = n8n_server().await;
        let relay = Relay::new(
            mcp_client(vec![server.uri()]),
            StubBackend::answering("hi"),
        );
        assert!(relay.mcp().initialize().await);

        let reply = relay.handle("/tools").await;
        assert!(reply.markdown);
        assert!(reply.text.contains("**Send\\_Email**: Send an email"));

        let status = relay.handle("/status").await;
        assert!(status.text.contains("✅ Connected"));
        assert!(status.text.contains("🔑 Session ID: `relay-se...`"));
    }
}
