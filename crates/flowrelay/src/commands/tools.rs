//! Tools command - lists the tools the n8n server exposes.

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};

use super::{Context, build_mcp_client};

/// Arguments for the tools command.
#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Print tool names only
    #[arg(short, long)]
    pub names: bool,
}

/// Run the tools command.
pub async fn run(args: ToolsArgs, ctx: &Context) -> Result<()> {
    let client = build_mcp_client(&ctx.config)?;

    if !client.initialize().await {
        bail!("could not connect to n8n MCP server");
    }

    if args.names {
        for name in client.list_tool_names().await {
            println!("{}", name);
        }
        return Ok(());
    }

    let dim = Style::new().dim();
    let tools = client.tools();

    println!();
    println!("{} ({})", style("Available Tools").bold(), tools.len());
    println!("{}", dim.apply_to("─".repeat(40)));

    for tool in &tools {
        println!();
        println!("  {}", style(&tool.name).cyan().bold());
        println!("  {}", dim.apply_to(tool.description_or_default()));
        for param in tool.parameters() {
            let requirement = if param.required { "required" } else { "optional" };
            print!("    {} {} ({})", param.name, dim.apply_to(&param.kind), requirement);
            if !param.description.is_empty() {
                print!(" - {}", param.description);
            }
            println!();
        }
    }

    println!();
    Ok(())
}
