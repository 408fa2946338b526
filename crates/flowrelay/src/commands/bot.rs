//! Bot command - runs the Telegram front-end.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use console::Style;

use super::{Context, build_relay};
use crate::bot::{self, telegram::TelegramClient};

/// Arguments for the bot command.
#[derive(Args, Debug)]
pub struct BotArgs {
    /// Override the Telegram API base URL
    #[arg(long, env = "TELEGRAM_API_URL")]
    pub api_url: Option<String>,

    /// Skip the startup handshake with n8n
    #[arg(long)]
    pub lazy: bool,
}

/// Run the bot command.
pub async fn run(args: BotArgs, ctx: &Context) -> Result<()> {
    ctx.config.validate_bot()?;

    let telegram = ctx.config.telegram();
    let poll_timeout = Duration::from_secs(telegram.poll_timeout_secs);
    let mut client = TelegramClient::new(telegram.bot_token.unwrap_or_default(), poll_timeout)?;
    if let Some(api_url) = args.api_url {
        client = client.with_base_url(api_url);
    }

    let relay = Arc::new(build_relay(&ctx.config)?);
    let dim = Style::new().dim();

    eprintln!(
        "{}",
        dim.apply_to(format!(
            "MCP endpoint: {}",
            relay.mcp().config().endpoint_path
        ))
    );

    if !args.lazy {
        let (reachable, address) = relay.mcp().test_connectivity().await;
        if reachable {
            tracing::info!(url = %address, "n8n is reachable");
            if relay.mcp().initialize().await {
                tracing::info!(
                    tools = relay.mcp().tools().len(),
                    "MCP client initialized"
                );
            } else {
                tracing::warn!("MCP handshake failed; will retry on first message");
            }
        } else {
            tracing::warn!("{}", address);
        }
    }

    bot::run(client, relay, poll_timeout).await
}
