//! Call command - invokes a single tool and prints the result.

use anyhow::{Context as _, Result, bail};
use clap::Args;
use flowrelay_mcp::dispatch::is_failure;
use serde_json::{Map, Value};

use super::{Context, build_mcp_client};

/// Arguments for the call command.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Exact tool name
    #[arg(required = true)]
    pub tool: String,

    /// Tool arguments as a JSON object
    #[arg(short, long, default_value = "{}")]
    pub args: String,
}

/// Run the call command.
pub async fn run(args: CallArgs, ctx: &Context) -> Result<()> {
    let arguments = parse_arguments(&args.args)?;
    let client = build_mcp_client(&ctx.config)?;

    let output = client.call_tool_display(&args.tool, arguments).await;
    println!("{}", output);

    if is_failure(&output) {
        bail!("tool call failed");
    }
    Ok(())
}

/// Parse `--args` into an argument map; anything but an object is rejected.
pub fn parse_arguments(raw: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw).context("--args is not valid JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("--args must be a JSON object, got: {}", other),
    }
}
