//! Slash commands: `/start`, `/help`, `/status`, `/tools`.

use flowrelay_mcp::ToolDescriptor;
use flowrelay_mcp::session::short_id;

/// A recognized slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start` or `/help`.
    Help,
    /// `/status`.
    Status,
    /// `/tools`.
    Tools,
}

impl BotCommand {
    /// Parse the first word of a message. `/status@my_bot` is accepted.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name {
            "start" | "help" => Some(Self::Help),
            "status" => Some(Self::Status),
            "tools" => Some(Self::Tools),
            _ => None,
        }
    }
}

/// Usage text for `/start` and `/help`.
pub const HELP_TEXT: &str = "🤖 **n8n MCP Telegram Bot**
Available commands:
• `/help` - Show this help
• `/status` - Check bot status
• `/tools` - List available tools

**Examples:**
• \"Send an email to john@example.com with subject 'Hello'\"
• \"Find my recent emails\"
• \"Create a calendar event for tomorrow\"
• \"What's the weather like?\"

_Note: For best results, be specific about what you want to do._
";

/// Reply when no tools have been discovered yet.
pub const NO_TOOLS_TEXT: &str = "🔍 No tools discovered yet. Try sending a message first.";

/// Everything `/status` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Whether any candidate host answered.
    pub reachable: bool,
    /// Reachable base address, or the unreachable sentinel.
    pub address: String,
    /// MCP endpoint path.
    pub endpoint_path: String,
    /// Completion model, if configured.
    pub model: Option<String>,
    /// Number of cached tools.
    pub tool_count: usize,
    /// Whether the session is ready.
    pub initialized: bool,
    /// Current session token.
    pub session_id: Option<String>,
}

fn check(ok: bool, yes: &str, no: &str) -> String {
    if ok {
        format!("✅ {}", yes)
    } else {
        format!("❌ {}", no)
    }
}

/// Markdown body for `/status`.
pub fn status_text(report: &StatusReport) -> String {
    let mut text = format!(
        "📊 *Bot Status*\n\n\
         ✅ Bot is running\n\
         🌐 n8n Connectivity: {}\n\
         🔗 MCP Endpoint: `{}`\n\
         🤖 AI Model: `{}`\n\
         🛠️ Available Tools: {}\n\
         🔌 MCP Client: {}\n",
        check(report.reachable, "Connected", "Disconnected"),
        report.endpoint_path,
        report.model.as_deref().unwrap_or("Not configured"),
        report.tool_count,
        check(report.initialized, "Initialized", "Not initialized"),
    );

    if report.reachable {
        text.push_str(&format!("\n📍 n8n URL: `{}`", report.address));
    }
    if let Some(session_id) = &report.session_id {
        text.push_str(&format!("\n🔑 Session ID: `{}...`", short_id(session_id)));
    }
    text
}

/// Markdown body for `/tools`, or `None` when the list is empty.
pub fn tools_text(tools: &[ToolDescriptor]) -> Option<String> {
    if tools.is_empty() {
        return None;
    }
    let mut text = String::from("🛠️ **Available Tools:**\n\n");
    for tool in tools {
        text.push_str(&format!(
            "• **{}**: {}\n",
            escape_markdown(&tool.name),
            escape_markdown(tool.description_or_default())
        ));
    }
    Some(text)
}

/// Backslash-escape `_ * [ ] ( )`.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '[' | ']' | '(' | ')') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
