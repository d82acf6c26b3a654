//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::bridge::BridgeConfig;
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable toggling the fault guard
pub const ENV_FAULT_GUARD: &str = "UNSAFE_EXT_FAULT_GUARD";
/// Environment variable overriding the fault exit status
pub const ENV_EXIT_STATUS: &str = "UNSAFE_EXT_EXIT_STATUS";
/// Environment variable overriding the log filter
pub const ENV_LOG: &str = "UNSAFE_EXT_LOG";

/// Configuration loader
///
/// Merges configuration sources with the following precedence:
/// 1. Built-in defaults - lowest priority
/// 2. User config (~/.unsafe-ext/config.toml)
/// 3. Explicit config file given via [`ConfigLoader::with_file`]
/// 4. Environment variables (UNSAFE_EXT_*) - highest priority
pub struct ConfigLoader {
    /// Overrides the user config location (mainly for tests)
    user_config_path: Option<PathBuf>,
    /// Explicit config file supplied by the embedder
    explicit_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            user_config_path: None,
            explicit_path: None,
        }
    }

    /// Use a specific user config location instead of ~/.unsafe-ext/config.toml
    pub fn with_user_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_config_path = Some(path.into());
        self
    }

    /// Layer an explicit config file over the user config
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// Load and merge all configuration sources
    pub fn load(&self) -> ConfigResult<BridgeConfig> {
        let mut merged = toml::Table::new();

        // The user config is optional and silently skipped when missing
        let user_path = match &self.user_config_path {
            Some(path) => Some(path.clone()),
            None => Self::user_config_path().ok(),
        };
        if let Some(path) = user_path.filter(|p| p.exists()) {
            merge_tables(&mut merged, read_table(&path)?);
        }

        // An explicit file must exist
        if let Some(path) = &self.explicit_path {
            merge_tables(&mut merged, read_table(path)?);
        }

        let source = self
            .explicit_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("<merged>"));
        let config: BridgeConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|error| ConfigError::TomlParseError {
                file: source,
                error,
            })?;

        let config = apply_env_overrides(config)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the user config file path (~/.unsafe-ext/config.toml)
    pub fn user_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".unsafe-ext").join("config.toml"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_table(path: &Path) -> ConfigResult<toml::Table> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::IoError(e)
        }
    })?;

    content
        .parse::<toml::Table>()
        .map_err(|error| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error,
        })
}

/// Merge `overlay` into `base`; nested tables merge key by key
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Apply environment variable overrides
///
/// Environment variables follow the pattern: UNSAFE_EXT_<KEY>
fn apply_env_overrides(mut config: BridgeConfig) -> ConfigResult<BridgeConfig> {
    if let Ok(guard) = env::var(ENV_FAULT_GUARD) {
        config.fault.install = matches!(guard.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(status) = env::var(ENV_EXIT_STATUS) {
        config.fault.exit_status =
            status
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    field: ENV_EXIT_STATUS.to_string(),
                    reason: format!("expected an integer, got '{}'", status),
                })?;
    }

    if let Ok(filter) = env::var(ENV_LOG) {
        config.logging.filter = filter;
    }

    Ok(config)
}
