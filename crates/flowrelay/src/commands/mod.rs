//! CLI command handlers.

pub mod ask;
pub mod bot;
pub mod call;
pub mod status;
pub mod tools;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use flowrelay_config::FlowrelayConfig;
use flowrelay_llm::{GatewayConfig, OpenAiGateway};
use flowrelay_mcp::config::dated_protocol_version;
use flowrelay_mcp::{McpClient, McpClientConfig, RetryPolicy};

use crate::bot::Relay;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration.
    pub config: FlowrelayConfig,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Build the MCP client from the `[mcp]` section.
pub fn build_mcp_client(config: &FlowrelayConfig) -> Result<McpClient> {
    config.validate_mcp()?;
    let mcp = config.mcp();
    let webhook_url = mcp.webhook_url.as_deref().unwrap_or_default();

    let protocol_version = mcp
        .protocol_version
        .clone()
        .unwrap_or_else(|| dated_protocol_version(mcp.utc_offset_hours));

    let client_config = McpClientConfig::from_webhook_url(webhook_url)
        .with_candidate_hosts(&mcp.candidate_hosts, mcp.port)
        .with_probe_timeout(Duration::from_secs(mcp.probe_timeout_secs))
        .with_request_timeout(Duration::from_secs(mcp.request_timeout_secs))
        .with_retry(RetryPolicy::new(
            mcp.max_attempts,
            Duration::from_millis(mcp.backoff_unit_ms),
        ))
        .with_handshake_pause(Duration::from_millis(mcp.handshake_pause_ms))
        .with_protocol_version(protocol_version);

    tracing::debug!(
        endpoint = %client_config.endpoint_path,
        protocol_version = %client_config.protocol_version,
        "building MCP client"
    );

    McpClient::new(client_config).context("failed to create MCP client")
}

/// Build the completion gateway from the `[llm]` section.
pub fn build_gateway(config: &FlowrelayConfig) -> Result<OpenAiGateway> {
    config.validate_llm()?;
    let llm = config.llm();

    let mut gateway_config = GatewayConfig::new(
        llm.url.unwrap_or_default(),
        llm.model.unwrap_or_default(),
    )
    .with_timeout(Duration::from_secs(llm.timeout_secs));
    if let Some(api_key) = llm.api_key {
        gateway_config = gateway_config.with_api_key(api_key);
    }

    OpenAiGateway::new(gateway_config).context("failed to create completion gateway")
}

/// Build the relay used by the bot and `ask`.
pub fn build_relay(config: &FlowrelayConfig) -> Result<Relay> {
    let mcp = Arc::new(build_mcp_client(config)?);
    let llm = Arc::new(build_gateway(config)?);
    Ok(Relay::new(mcp, llm))
}
