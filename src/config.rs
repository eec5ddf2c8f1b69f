//! Application configuration
//!
//! Non-secret settings ship embedded in `config.toml` and can be overridden
//! per-setting through environment variables. The completion API credential
//! is deliberately not part of this file: it is read from the environment
//! when the relay client is built, and its absence surfaces as a
//! request-time error rather than a startup failure.

use serde::Deserialize;

/// Embedded defaults, compiled into the binary.
const CONFIG_TOML: &str = include_str!("../config.toml");

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub completion: CompletionConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the relay endpoint binds to.
    pub bind_addr: String,
}

/// Completion API settings
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    /// Model name requested from the completion API.
    pub model: String,
    /// Upper bound on reply length, in tokens.
    pub max_tokens: u32,
}

impl Config {
    /// Load the embedded configuration, applying environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(CONFIG_TOML)?;
        if let Ok(bind) = std::env::var("VOXCHAT_BIND") {
            config.server.bind_addr = bind;
        }
        if let Ok(model) = std::env::var("VOXCHAT_MODEL") {
            config.completion.model = model;
        }
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid embedded config.toml: {0}")]
    Parse(#[from] toml::de::Error),
}
