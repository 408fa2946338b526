//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/flowrelay/config.toml` (user config)
//! 2. `./flowrelay.toml` (project-local)
//! 3. Environment variables (`TELEGRAM_BOT_TOKEN`, `OPWEBUI_*`, `N8N_WEBHOOK_URL`)

use std::path::{Path, PathBuf};

use crate::{ConfigError, FlowrelayConfig, Result};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "flowrelay.toml";

/// Default config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "flowrelay";

/// Environment variable that overrides the user config directory.
const CONFIG_DIR_ENV: &str = "FLOWRELAY_CONFIG_DIR";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: FlowrelayConfig,
    /// File sources that were checked, lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// Environment variables that overrode file values.
    pub env_applied: Vec<&'static str>,
    /// Warnings generated during loading (e.g. plaintext secrets).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration from all layers, including the process environment.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Load configuration with explicit control over the user config directory.
///
/// `config_dir` overrides both `FLOWRELAY_CONFIG_DIR` and the platform default.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    load_config_with_env(project_dir, config_dir, |name| std::env::var(name).ok())
}

/// Load configuration using `env` in place of the process environment.
pub fn load_config_with_env<F>(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
    env: F,
) -> Result<LoadedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = FlowrelayConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    // 1. User config: explicit override, then env var, then platform default
    let user_config_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => user_config_path(),
    };
    if let Some(path) = user_config_path {
        sources.push(load_layer(&mut config, &path, &mut warnings));
    }

    // 2. Project-local config
    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    sources.push(load_layer(&mut config, &project_path, &mut warnings));

    // Secrets are checked before env overlays, which are fine to hold them.
    check_plaintext_secrets(&config, &mut warnings);

    // 3. Environment
    let env_applied = config.apply_env(env);

    Ok(LoadedConfig {
        config,
        sources,
        env_applied,
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<FlowrelayConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    FlowrelayConfig::from_toml(&contents)
}

/// Get the user config file path for flowrelay.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the user config directory for flowrelay.
///
/// Checks `FLOWRELAY_CONFIG_DIR` env var first, then falls back to the
/// platform default (`~/.config/flowrelay` on Linux).
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Try to load a config file and merge it into the existing config.
///
/// A missing file is skipped; an unreadable or invalid one becomes a warning.
fn load_layer(config: &mut FlowrelayConfig, path: &Path, warnings: &mut Vec<String>) -> ConfigSource {
    if !path.is_file() {
        return ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        };
    }

    match load_config_file(path) {
        Ok(layer) => {
            tracing::debug!(path = %path.display(), "loaded config layer");
            config.merge(layer);
            ConfigSource {
                path: path.to_path_buf(),
                loaded: true,
            }
        }
        Err(e) => {
            warnings.push(format!("Failed to load {}: {}", path.display(), e));
            ConfigSource {
                path: path.to_path_buf(),
                loaded: false,
            }
        }
    }
}

/// Check for plaintext secrets in file layers and emit warnings.
fn check_plaintext_secrets(config: &FlowrelayConfig, warnings: &mut Vec<String>) {
    if let Some(ref telegram) = config.telegram
        && telegram.bot_token.is_some()
    {
        warnings.push(
            "[telegram] contains a plaintext bot token. \
             Consider setting TELEGRAM_BOT_TOKEN in the environment instead."
                .to_string(),
        );
    }

    if let Some(ref llm) = config.llm
        && llm.api_key.is_some()
    {
        warnings.push(
            "[llm] contains a plaintext API key. \
             Consider setting OPWEBUI_API_KEY in the environment instead."
                .to_string(),
        );
    }
}
