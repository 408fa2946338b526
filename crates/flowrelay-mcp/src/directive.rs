//! Parser for tool directives embedded in model replies.
//!
//! The model is prompted to answer workflow requests with a block like:
//!
//! ```text
//! ACTION: call_tool
//! TOOL: Send_Email
//! ARGUMENTS: {"To": "a@b.com", "Subject": "Hi"}
//! ```
//!
//! Anything else in the reply is ignored.

use std::ops::Range;

use serde_json::{Map, Value};

/// Marker that must be present for a directive to be recognized.
pub const ACTION_MARKER: &str = "ACTION:";

/// Action token naming a tool invocation.
pub const CALL_TOOL_ACTION: &str = "call_tool";

/// Marker preceding the tool name.
pub const TOOL_MARKER: &str = "TOOL:";

/// Marker preceding the JSON argument object.
pub const ARGUMENTS_MARKER: &str = "ARGUMENTS:";

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDirective {
    /// Tool to call.
    pub tool: String,
    /// Arguments; empty when the model sent none or sent malformed JSON.
    pub arguments: Map<String, Value>,
}

/// Check if text looks like it carries a directive.
pub fn contains_directive(text: &str) -> bool {
    text.contains(ACTION_MARKER) && text.contains(CALL_TOOL_ACTION)
}

/// Extract a tool directive from model output.
///
/// Returns `None` unless both the action marker and `call_tool` appear and a
/// tool name follows `TOOL:`, on the same line or the next non-blank one. Malformed arguments still yield a
/// directive, with an empty argument map.
pub fn parse_directive(text: &str) -> Option<ToolDirective> {
    if !contains_directive(text) {
        return None;
    }

    let tool = text
        .find(TOOL_MARKER)
        .map(|idx| text[idx + TOOL_MARKER.len()..].trim_start())
        .and_then(|rest| rest.lines().next())
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.starts_with(ARGUMENTS_MARKER))?
        .to_string();

    let arguments = text
        .find(ARGUMENTS_MARKER)
        .map(|idx| parse_arguments(&text[idx + ARGUMENTS_MARKER.len()..], &tool))
        .unwrap_or_default();

    tracing::debug!(tool = %tool, args = arguments.len(), "parsed tool directive");

    Some(ToolDirective { tool, arguments })
}

fn parse_arguments(text: &str, tool: &str) -> Map<String, Value> {
    let Some(span) = balanced_object_span(text) else {
        tracing::warn!(tool = %tool, "tool directive has no argument object");
        return Map::new();
    };

    match serde_json::from_str::<Value>(&text[span]) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(tool = %tool, kind = %json_kind(&other), "tool arguments are not an object");
            Map::new()
        }
        Err(e) => {
            tracing::warn!(tool = %tool, error = %e, "malformed tool arguments");
            Map::new()
        }
    }
}

/// Byte range of the first `{ ... }` with balanced braces.
///
/// Braces inside JSON string literals are not counted.
pub fn balanced_object_span(text: &str) -> Option<Range<usize>> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(start..end);
                }
            }
            _ => {}
        }
    }

    None
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
