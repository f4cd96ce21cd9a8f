//! Configuration loading.

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

use super::types::{Config, ConfigError};

/// Loads configuration from a TOML file with environment overrides.
///
/// Environment variables prefixed with `GRABBIT_` are merged over the
/// file contents (e.g. `GRABBIT_SERVER_PORT=9000`).
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("GRABBIT_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Loads configuration from a TOML string (useful for testing).
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
