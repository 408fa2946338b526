//! Status command - checks n8n connectivity and the MCP session.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::{Context, build_mcp_client};

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also run the MCP handshake
    #[arg(short = 'H', long)]
    pub handshake: bool,
}

/// Run the status command.
pub async fn run(args: StatusArgs, ctx: &Context) -> Result<()> {
    let client = build_mcp_client(&ctx.config)?;
    let (reachable, address) = client.test_connectivity().await;

    let green = Style::new().green();
    let red = Style::new().red();
    let dim = Style::new().dim();

    println!();
    println!("{}", style("flowrelay Status").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!();

    if reachable {
        println!("  {} {}", dim.apply_to("n8n:"), green.apply_to("● connected"));
        println!("  {} {}", dim.apply_to("URL:"), address);
    } else {
        println!("  {} {}", dim.apply_to("n8n:"), red.apply_to("● unreachable"));
        if ctx.verbose {
            for candidate in &client.config().candidates {
                println!("  {} {}", dim.apply_to("Tried:"), candidate);
            }
        }
    }
    println!(
        "  {} {}",
        dim.apply_to("Endpoint:"),
        client.config().endpoint_path
    );
    println!(
        "  {} {}",
        dim.apply_to("Protocol:"),
        client.config().protocol_version
    );

    let model = ctx.config.llm().model.unwrap_or_default();
    println!(
        "  {} {}",
        dim.apply_to("Model:"),
        if model.is_empty() { "Not configured" } else { model.as_str() }
    );

    if args.handshake && reachable {
        println!();
        println!("{}", dim.apply_to("─".repeat(40)));
        println!();
        if client.initialize().await {
            let snapshot = client.snapshot();
            println!(
                "  {} {}",
                dim.apply_to("Session:"),
                green.apply_to(snapshot.phase.to_string())
            );
            if let Some(session_id) = &snapshot.session_id {
                println!(
                    "  {} {}...",
                    dim.apply_to("Session ID:"),
                    flowrelay_mcp::session::short_id(session_id)
                );
            }
            println!("  {} {}", dim.apply_to("Tools:"), client.tools().len());
        } else {
            println!(
                "  {} {}",
                dim.apply_to("Session:"),
                red.apply_to("handshake failed")
            );
        }
    }

    println!();
    Ok(())
}
