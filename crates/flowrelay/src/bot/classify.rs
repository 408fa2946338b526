//! Keyword routing between workflow requests and general chat.

/// Substrings that mark a message as a workflow request.
pub const WORKFLOW_KEYWORDS: &[&str] = &[
    "workflow",
    "automation",
    "process",
    "trigger",
    "n8n",
    "run",
    "email",
    "calendar",
    "gmail",
    "send",
    "find",
    "create",
    "search",
];

/// How a user message should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// May result in a tool call.
    Workflow,
    /// Plain conversation; tool directives are ignored.
    General,
}

/// Case-insensitive substring match against [`WORKFLOW_KEYWORDS`].
pub fn classify(text: &str) -> QueryKind {
    let lower = text.to_lowercase();
    if WORKFLOW_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        QueryKind::Workflow
    } else {
        QueryKind::General
    }
}
