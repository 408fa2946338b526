//! Configuration for flowrelay.
//!
//! Provides TOML-based configuration with:
//! - Optional `[telegram]`, `[llm]`, `[mcp]` and `[logging]` sections
//! - Config file layering (user config + project-local overrides)
//! - Environment variables as the final layer
//! - Validation that reports every missing required setting at once

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_env,
    load_config_with_options, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
