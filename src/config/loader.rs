//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable supplying the preferred provider endpoint.
pub const PROVIDER_ENV: &str = "SOLANA_RPC_URL";

/// Environment variable overriding the listener bind address.
pub const LISTEN_ENV: &str = "RELAY_LISTEN";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RelayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides on top of a loaded (or default) config.
///
/// `SOLANA_RPC_URL` sets the preferred provider; `RELAY_LISTEN` overrides the
/// bind address. Empty values are ignored.
pub fn apply_env_overrides(config: &mut RelayConfig) {
    if let Ok(url) = std::env::var(PROVIDER_ENV) {
        if !url.is_empty() {
            config.upstream.provider_url = Some(url);
        }
    }
    if let Ok(addr) = std::env::var(LISTEN_ENV) {
        if !addr.is_empty() {
            config.listener.bind_address = addr;
        }
    }
}
