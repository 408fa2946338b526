//! System prompts sent to the completion gateway.

use flowrelay_mcp::ToolDescriptor;

use super::classify::QueryKind;

/// Prompt for non-workflow messages.
pub const GENERAL_PROMPT: &str =
    "You are a helpful assistant. Answer questions conversationally.";

/// Build the system prompt for a message of the given kind.
pub fn system_prompt(kind: QueryKind, tools: &[ToolDescriptor]) -> String {
    match kind {
        QueryKind::General => GENERAL_PROMPT.to_string(),
        QueryKind::Workflow => workflow_prompt(tools),
    }
}

fn workflow_prompt(tools: &[ToolDescriptor]) -> String {
    let tools_list = if tools.is_empty() {
        "No tools available".to_string()
    } else {
        tools.iter().map(tool_line).collect::<Vec<_>>().join("\n")
    };

    format!(
        r#"You are an assistant that can call tools through an MCP server.

Available tools:
{tools_list}

IMPORTANT: Use EXACT tool names and parameter names (with underscores).

Response format for tool calls:
ACTION: call_tool
TOOL: exact_tool_name
ARGUMENTS: {{
    "parameter": value
}}

Examples:
- Find emails: Find_Emails with {{"Return_All": true}}
- Send email: Send_Email with {{"To": "email", "Subject": "text", "Message": "text"}}
- Calendar events: Find_multiple_events with {{}}
- Create event: Create_an_event with {{"Start": "ISO_date", "End": "ISO_date", "Description": "text"}}"#
    )
}

/// `• **name**: description` plus a parameter summary line.
fn tool_line(tool: &ToolDescriptor) -> String {
    let params: Vec<String> = tool
        .parameters()
        .into_iter()
        .map(|p| {
            let requirement = if p.required { "required" } else { "optional" };
            let mut line = format!("\"{}\": {} ({})", p.name, p.kind, requirement);
            if !p.description.is_empty() {
                line.push_str(" - ");
                line.push_str(&p.description);
            }
            line
        })
        .collect();
    let params = if params.is_empty() {
        "No parameters".to_string()
    } else {
        params.join(", ")
    };

    format!(
        "• **{}**: {}\n  Parameters: {{{}}}",
        tool.name,
        tool.description_or_default(),
        params
    )
}
