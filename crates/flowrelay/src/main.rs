//! flowrelay - Telegram bot relaying chat to n8n workflows over MCP
//!
//! Main entry point for the flowrelay CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod bot;
mod commands;

use commands::{ask, bot as bot_cmd, call, status, tools};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// flowrelay - Telegram bot relaying chat to n8n workflows over MCP
#[derive(Parser)]
#[command(name = "flowrelay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// User config directory (default: platform config dir)
    #[arg(long, global = true, env = "FLOWRELAY_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot
    Bot(bot_cmd::BotArgs),

    /// Check n8n connectivity and session state
    Status(status::StatusArgs),

    /// List the tools exposed by n8n
    Tools(tools::ToolsArgs),

    /// Call a single tool
    Call(call::CallArgs),

    /// Send one message through the bot pipeline
    Ask(ask::AskArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = flowrelay_config::load_config_with_options(None, cli.config_dir.as_deref())?;
    let logging = loaded.config.logging();

    // Initialize tracing: console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "flowrelay=debug,flowrelay_mcp=debug,flowrelay_llm=debug,flowrelay_config=debug,info"
            .to_string()
    } else {
        format!(
            "flowrelay={0},flowrelay_mcp={0},flowrelay_llm={0},flowrelay_config={0},warn",
            logging.level
        )
    };

    let console_filter = if cli.verbose {
        EnvFilter::new(filter)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
    };

    let (file_layer, _guard) = if logging.file {
        let file_appender = tracing_appender::rolling::daily(&logging.dir, &logging.file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_filter(EnvFilter::new(
                "flowrelay=trace,flowrelay_mcp=trace,flowrelay_llm=trace,flowrelay_config=trace,info",
            ));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(file_layer)
        .init();

    for path in loaded.loaded_from() {
        tracing::debug!(path = %path.display(), "config loaded");
    }
    if !loaded.env_applied.is_empty() {
        tracing::debug!(vars = ?loaded.env_applied, "environment overrides applied");
    }
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    // Create context for commands
    let ctx = commands::Context {
        config: loaded.config,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Bot(args) => bot_cmd::run(args, &ctx).await,
        Commands::Status(args) => status::run(args, &ctx).await,
        Commands::Tools(args) => tools::run(args, &ctx).await,
        Commands::Call(args) => call::run(args, &ctx).await,
        Commands::Ask(args) => ask::run(args, &ctx).await,
    }
}
