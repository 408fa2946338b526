//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// One or more required settings are absent. Lists all of them.
    #[error("missing required settings: {}", .0.join(", "))]
    MissingSettings(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_lists_all() {
        let err = ConfigError::MissingSettings(vec![
            "TELEGRAM_BOT_TOKEN".to_string(),
            "N8N_WEBHOOK_URL".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "missing required settings: TELEGRAM_BOT_TOKEN, N8N_WEBHOOK_URL"
        );
    }
}
