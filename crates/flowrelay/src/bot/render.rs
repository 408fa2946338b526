//! Chat rendering of tool outcomes.

use flowrelay_mcp::dispatch::is_failure;

/// Longest reply the chat platform accepts comfortably.
pub const MESSAGE_LIMIT: usize = 4000;

/// Characters kept from an over-long error string.
const ERROR_KEEP: usize = 3900;

/// Characters kept from an over-long tool result.
const RESULT_KEEP: usize = 3500;

/// A reply ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Message text.
    pub text: String,
    /// Whether the text uses Markdown formatting.
    pub markdown: bool,
}

impl Reply {
    /// Plain-text reply.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
        }
    }

    /// Markdown reply.
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: true,
        }
    }
}

/// Render the display string of a tool call for chat.
///
/// Failures pass through (truncated if needed). JSON results get a fenced
/// block under a `✅ **Tool: name**` header; anything that does not fit
/// drops to plain text with the first part of the result.
pub fn render_tool_reply(tool: &str, result: &str) -> Reply {
    if is_failure(result) {
        if char_len(result) > MESSAGE_LIMIT {
            return Reply::plain(format!(
                "{}...\n\n[Message truncated]",
                truncate_chars(result, ERROR_KEEP)
            ));
        }
        return Reply::plain(result);
    }

    match serde_json::from_str::<serde_json::Value>(result) {
        Ok(value) => {
            let formatted = serde_json::to_string_pretty(&value).unwrap_or_else(|_| result.to_string());
            let message = format!("✅ **Tool: {}**\n\n```json\n{}\n```", tool, formatted);
            if char_len(&message) > MESSAGE_LIMIT {
                Reply::plain(truncated_result(tool, &formatted))
            } else {
                Reply::markdown(message)
            }
        }
        Err(_) => {
            let message = format!("✅ **Tool: {}**\n\n{}", tool, result);
            if char_len(&message) > MESSAGE_LIMIT {
                Reply::plain(truncated_result(tool, result))
            } else {
                Reply::plain(message)
            }
        }
    }
}

fn truncated_result(tool: &str, body: &str) -> String {
    format!(
        "✅ Tool: {}\n\n{}...\n\n[Truncated]",
        tool,
        truncate_chars(body, RESULT_KEEP)
    )
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_result_is_fenced() {
        let reply = render_tool_reply("Find_Emails", "{\"ok\":true}");
        assert!(reply.markdown);
        assert_eq!(
            reply.text,
            "✅ **Tool: Find_Emails**\n\n```json\n{\n  \"ok\": true\n}\n```"
        );
    }

    #[test]
    fn test_error_passes_through() {
        let reply = render_tool_reply("x", "❌ MCP client not initialized");
        assert_eq!(reply, Reply::plain("❌ MCP client not initialized"));
    }

    #[test]
    fn test_long_error_truncated() {
        let long = format!("❌ {}", "e".repeat(5000));
        let reply = render_tool_reply("x", &long);
        assert!(reply.text.ends_with("...\n\n[Message truncated]"));
        assert_eq!(
            reply.text.chars().count(),
            ERROR_KEEP + "...\n\n[Message truncated]".len()
        );
    }

    #[test]
    fn test_long_json_result_truncated() {
        let big = serde_json::to_string(&vec!["abcdefghij"; 600]).unwrap();
        let reply = render_tool_reply("Find_Emails", &big);
        assert!(!reply.markdown);
        assert!(reply.text.starts_with("✅ Tool: Find_Emails\n\n"));
        assert!(reply.text.ends_with("...\n\n[Truncated]"));
    }

    #[test]
    fn test_plain_text_result() {
        let reply = render_tool_reply("Send_Email", "sent");
        assert_eq!(reply.text, "✅ **Tool: Send_Email**\n\nsent");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
