//! Tool descriptors advertised by the workflow server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool definition from the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Tool name. Not checked for uniqueness.
    #[serde(default)]
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

/// One parameter extracted from a tool's input schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolParameter {
    /// Parameter name.
    pub name: String,
    /// JSON type name, `string` when the schema does not say.
    pub kind: String,
    /// Description, empty when absent.
    pub description: String,
    /// Whether the schema lists it under `required`.
    pub required: bool,
}

impl ToolDescriptor {
    /// Create a descriptor with no schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema: None,
        }
    }

    /// Description, or a placeholder when the server sent none.
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("No description")
    }

    /// Flatten `inputSchema.properties` / `inputSchema.required`.
    pub fn parameters(&self) -> Vec<ToolParameter> {
        let Some(schema) = self.input_schema.as_ref() else {
            return Vec::new();
        };
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, details)| ToolParameter {
                        name: name.clone(),
                        kind: details
                            .get("type")
                            .and_then(Value::as_str)
                            .unwrap_or("string")
                            .to_string(),
                        description: details
                            .get("description")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        required: required.contains(&name.as_str()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Result of the tools/list request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// List of available tools.
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
}

/// Built-in tool set used when discovery comes back empty, so the bot stays
/// usable against the stock Gmail/Calendar workflow.
pub fn fallback_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new("Find_Emails", "Find and retrieve emails from Gmail"),
        ToolDescriptor::new("Send_Email", "Send an email via Gmail"),
        ToolDescriptor::new(
            "Create_an_event",
            "Create a calendar event in Google Calendar",
        ),
        ToolDescriptor::new("Find_single_event", "Find a specific calendar event"),
        ToolDescriptor::new("Find_multiple_events", "Find multiple calendar events"),
        ToolDescriptor::new("Update_event", "Update an existing calendar event"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_descriptor_deserialization() {
        let json = r#"{
            "name": "Send_Email",
            "description": "Send an email via Gmail",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "To": {"type": "string", "description": "Recipient"},
                    "Subject": {"type": "string"},
                    "Attach": {}
                },
                "required": ["To"]
            }
        }"#;
        let tool: ToolDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(tool.name, "Send_Email");

        let mut params = tool.parameters();
        params.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].name, "Attach");
        assert_eq!(params[0].kind, "string");
        assert_eq!(params[2].name, "To");
        assert!(params[2].required);
        assert_eq!(params[2].description, "Recipient");
        assert!(!params[1].required);
    }

    #[test]
    fn test_tool_without_schema_has_no_parameters() {
        let tool: ToolDescriptor = serde_json::from_value(json!({"name": "ping"})).unwrap();
        assert!(tool.parameters().is_empty());
        assert_eq!(tool.description_or_default(), "No description");
    }

    #[test]
    fn test_fallback_tools() {
        let tools = fallback_tools();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Find_Emails",
                "Send_Email",
                "Create_an_event",
                "Find_single_event",
                "Find_multiple_events",
                "Update_event"
            ]
        );
    }
}
