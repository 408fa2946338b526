//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [telegram]   # bot token, long-poll timeout
//! [llm]        # completion gateway
//! [mcp]        # n8n endpoint discovery and transport tuning
//! [logging]    # log directory and filter
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Environment variable names recognized as the final config layer.
pub mod env {
    /// Telegram bot token.
    pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
    /// Completion gateway URL.
    pub const OPWEBUI_URL: &str = "OPWEBUI_URL";
    /// Completion model name.
    pub const OPWEBUI_MODEL: &str = "OPWEBUI_MODEL";
    /// Completion gateway API key.
    pub const OPWEBUI_API_KEY: &str = "OPWEBUI_API_KEY";
    /// n8n MCP webhook URL.
    pub const N8N_WEBHOOK_URL: &str = "N8N_WEBHOOK_URL";
}

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowrelayConfig {
    /// Telegram front-end settings.
    pub telegram: Option<TelegramConfig>,
    /// Completion gateway settings.
    pub llm: Option<LlmConfig>,
    /// MCP client settings.
    pub mcp: Option<McpConfig>,
    /// Log output settings.
    pub logging: Option<LoggingConfig>,
}

impl FlowrelayConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole, not field by field.
    pub fn merge(&mut self, other: FlowrelayConfig) {
        if other.telegram.is_some() {
            self.telegram = other.telegram;
        }
        if other.llm.is_some() {
            self.llm = other.llm;
        }
        if other.mcp.is_some() {
            self.mcp = other.mcp;
        }
        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Overlay values from environment-like lookup. Empty values are ignored.
    ///
    /// Returns the names of the variables that were applied.
    pub fn apply_env<F>(&mut self, lookup: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut applied = Vec::new();

        if let Some(token) = get(env::TELEGRAM_BOT_TOKEN) {
            self.telegram.get_or_insert_with(Default::default).bot_token = Some(token);
            applied.push(env::TELEGRAM_BOT_TOKEN);
        }
        if let Some(url) = get(env::OPWEBUI_URL) {
            self.llm.get_or_insert_with(Default::default).url = Some(url);
            applied.push(env::OPWEBUI_URL);
        }
        if let Some(model) = get(env::OPWEBUI_MODEL) {
            self.llm.get_or_insert_with(Default::default).model = Some(model);
            applied.push(env::OPWEBUI_MODEL);
        }
        if let Some(key) = get(env::OPWEBUI_API_KEY) {
            self.llm.get_or_insert_with(Default::default).api_key = Some(key);
            applied.push(env::OPWEBUI_API_KEY);
        }
        if let Some(url) = get(env::N8N_WEBHOOK_URL) {
            self.mcp.get_or_insert_with(Default::default).webhook_url = Some(url);
            applied.push(env::N8N_WEBHOOK_URL);
        }

        applied
    }

    /// Telegram settings, defaulted when the section is absent.
    pub fn telegram(&self) -> TelegramConfig {
        self.telegram.clone().unwrap_or_default()
    }

    /// Gateway settings, defaulted when the section is absent.
    pub fn llm(&self) -> LlmConfig {
        self.llm.clone().unwrap_or_default()
    }

    /// MCP settings, defaulted when the section is absent.
    pub fn mcp(&self) -> McpConfig {
        self.mcp.clone().unwrap_or_default()
    }

    /// Logging settings, defaulted when the section is absent.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Names of required settings the bot cannot run without.
    pub fn missing_for_bot(&self) -> Vec<String> {
        let telegram = self.telegram();
        let llm = self.llm();
        let mut missing = Vec::new();
        if is_blank(&telegram.bot_token) {
            missing.push(env::TELEGRAM_BOT_TOKEN.to_string());
        }
        if is_blank(&llm.url) {
            missing.push(env::OPWEBUI_URL.to_string());
        }
        if is_blank(&llm.api_key) {
            missing.push(env::OPWEBUI_API_KEY.to_string());
        }
        missing.extend(self.missing_for_mcp());
        missing
    }

    /// Names of required settings for talking to n8n.
    pub fn missing_for_mcp(&self) -> Vec<String> {
        if is_blank(&self.mcp().webhook_url) {
            vec![env::N8N_WEBHOOK_URL.to_string()]
        } else {
            Vec::new()
        }
    }

    /// Names of required settings for the completion gateway.
    pub fn missing_for_llm(&self) -> Vec<String> {
        let llm = self.llm();
        let mut missing = Vec::new();
        if is_blank(&llm.url) {
            missing.push(env::OPWEBUI_URL.to_string());
        }
        if is_blank(&llm.api_key) {
            missing.push(env::OPWEBUI_API_KEY.to_string());
        }
        missing
    }

    /// Fail with every missing bot setting at once.
    pub fn validate_bot(&self) -> Result<()> {
        into_result(self.missing_for_bot())
    }

    /// Fail when the n8n webhook URL is absent.
    pub fn validate_mcp(&self) -> Result<()> {
        into_result(self.missing_for_mcp())
    }

    /// Fail with every missing gateway setting at once.
    pub fn validate_llm(&self) -> Result<()> {
        into_result(self.missing_for_llm())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn into_result(missing: Vec<String>) -> Result<()> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingSettings(missing))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Telegram
// ─────────────────────────────────────────────────────────────────────────────

/// Telegram bot settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API token.
    pub bot_token: Option<String>,
    /// Long-poll timeout for `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            poll_timeout_secs: 30,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LLM
// ─────────────────────────────────────────────────────────────────────────────

/// Completion gateway settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Full chat-completions URL.
    pub url: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Bearer token. Prefer `OPWEBUI_API_KEY` over storing it here.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: None,
            model: None,
            api_key: None,
            timeout_secs: 120,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MCP
// ─────────────────────────────────────────────────────────────────────────────

/// n8n MCP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    /// Webhook URL the endpoint path is derived from.
    pub webhook_url: Option<String>,
    /// Hosts probed in order.
    pub candidate_hosts: Vec<String>,
    /// Port used with every candidate host.
    pub port: u16,
    /// Timeout for each probe.
    pub probe_timeout_secs: u64,
    /// Timeout for each protocol request attempt.
    pub request_timeout_secs: u64,
    /// Total attempts per protocol request.
    pub max_attempts: u32,
    /// Backoff unit between attempts.
    pub backoff_unit_ms: u64,
    /// Pause before the initialized notification.
    pub handshake_pause_ms: u64,
    /// UTC offset used to stamp the protocol version date.
    pub utc_offset_hours: i32,
    /// Pinned protocol version; overrides the date-derived one.
    pub protocol_version: Option<String>,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            candidate_hosts: ["host.docker.internal", "localhost", "127.0.0.1", "172.17.0.1", "n8n"]
                .into_iter()
                .map(String::from)
                .collect(),
            port: 5678,
            probe_timeout_secs: 5,
            request_timeout_secs: 30,
            max_attempts: 3,
            backoff_unit_ms: 1000,
            handshake_pause_ms: 100,
            utc_offset_hours: 8,
            protocol_version: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the rolling JSON log file.
    pub dir: PathBuf,
    /// File name prefix; the date is appended daily.
    pub file_name: String,
    /// Default console filter when `RUST_LOG` is unset.
    pub level: String,
    /// Whether the JSON file layer is enabled.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_name: "flowrelay.log".to_string(),
            level: "info".to_string(),
            file: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [telegram]
            poll_timeout_secs = 10

            [llm]
            url = "http://webui:8080/api/chat/completions"
            model = "llama3"

            [mcp]
            webhook_url = "http://localhost:5678/mcp/abc"
            candidate_hosts = ["n8n"]
            max_attempts = 5
            protocol_version = "2025-03-26"

            [logging]
            dir = "/var/log/flowrelay"
            file = false
        "#;
        let config = FlowrelayConfig::from_toml(toml).unwrap();
        assert_eq!(config.telegram().poll_timeout_secs, 10);
        assert_eq!(config.llm().model.as_deref(), Some("llama3"));
        assert_eq!(config.llm().timeout_secs, 120);

        let mcp = config.mcp();
        assert_eq!(mcp.candidate_hosts, vec!["n8n".to_string()]);
        assert_eq!(mcp.max_attempts, 5);
        assert_eq!(mcp.port, 5678);
        assert_eq!(mcp.protocol_version.as_deref(), Some("2025-03-26"));

        assert_eq!(config.logging().dir, PathBuf::from("/var/log/flowrelay"));
        assert!(!config.logging().file);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = FlowrelayConfig::from_toml("").unwrap();
        assert_eq!(config, FlowrelayConfig::new());
        let mcp = config.mcp();
        assert_eq!(mcp.candidate_hosts.len(), 5);
        assert_eq!(mcp.utc_offset_hours, 8);
        assert_eq!(config.logging().file_name, "flowrelay.log");
    }

    #[test]
    fn test_invalid_toml() {
        let result = FlowrelayConfig::from_toml("[mcp\nport = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_merge_replaces_sections() {
        let mut base = FlowrelayConfig::from_toml("[llm]\nmodel = \"a\"\n[mcp]\nport = 1").unwrap();
        let overlay = FlowrelayConfig::from_toml("[llm]\nurl = \"http://x\"").unwrap();
        base.merge(overlay);
        assert_eq!(base.llm().url.as_deref(), Some("http://x"));
        assert!(base.llm().model.is_none());
        assert_eq!(base.mcp().port, 1);
    }

    #[test]
    fn test_apply_env() {
        let mut config = FlowrelayConfig::from_toml("[mcp]\nport = 9999").unwrap();
        let applied = config.apply_env(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("OPWEBUI_MODEL", "mistral"),
            ("N8N_WEBHOOK_URL", "http://n8n:5678/mcp/x"),
            ("OPWEBUI_URL", "   "),
        ]));
        assert_eq!(
            applied,
            vec!["TELEGRAM_BOT_TOKEN", "OPWEBUI_MODEL", "N8N_WEBHOOK_URL"]
        );
        assert_eq!(config.telegram().bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.llm().model.as_deref(), Some("mistral"));
        assert!(config.llm().url.is_none());
        // Env only touches the webhook field; file values survive.
        assert_eq!(config.mcp().port, 9999);
        assert_eq!(
            config.mcp().webhook_url.as_deref(),
            Some("http://n8n:5678/mcp/x")
        );
    }

    #[test]
    fn test_validate_bot_lists_everything_missing() {
        let config = FlowrelayConfig::new();
        match config.validate_bot() {
            Err(ConfigError::MissingSettings(missing)) => assert_eq!(
                missing,
                vec![
                    "TELEGRAM_BOT_TOKEN",
                    "OPWEBUI_URL",
                    "OPWEBUI_API_KEY",
                    "N8N_WEBHOOK_URL"
                ]
            ),
            other => panic!("expected MissingSettings, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_partial_requirements() {
        let mut config = FlowrelayConfig::new();
        config.apply_env(lookup(&[("N8N_WEBHOOK_URL", "http://h/mcp/x")]));
        assert!(config.validate_mcp().is_ok());
        assert!(config.validate_llm().is_err());
        assert_eq!(
            config.missing_for_bot(),
            vec!["TELEGRAM_BOT_TOKEN", "OPWEBUI_URL", "OPWEBUI_API_KEY"]
        );
    }
}
