//! Ask command - runs one message through the relay, as the bot would.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::{Context, build_relay};
use crate::bot::classify::classify;

/// Arguments for the ask command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The message to send
    #[arg(required = true)]
    pub text: String,
}

/// Run the ask command.
pub async fn run(args: AskArgs, ctx: &Context) -> Result<()> {
    let relay = build_relay(&ctx.config)?;

    if ctx.verbose {
        let dim = Style::new().dim();
        println!(
            "{}",
            dim.apply_to(format!("Query kind: {:?}", classify(&args.text)))
        );
        println!();
    }

    let reply = relay.handle(&args.text).await;
    println!("{}", reply.text);
    Ok(())
}
