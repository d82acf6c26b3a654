//! Bridge configuration file (`config.toml`)

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Exit status used when a segmentation fault terminates the process (128 + SIGSEGV).
pub const DEFAULT_EXIT_STATUS: i32 = 139;

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Top-level bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, default)]
pub struct BridgeConfig {
    /// Segmentation fault guard settings
    pub fault: FaultConfig,

    /// Diagnostics output settings
    pub logging: LoggingConfig,
}

/// Fault guard settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct FaultConfig {
    /// Install the SIGSEGV handler during extension initialization
    pub install: bool,

    /// Process exit status after a reported fault
    pub exit_status: i32,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            install: true,
            exit_status: DEFAULT_EXIT_STATUS,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"unsafe_runtime=debug"`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        Self::parse(&content).map_err(|e| match e {
            ParseFailure::Toml(error) => ConfigError::TomlParseError {
                file: path.to_path_buf(),
                error,
            },
            ParseFailure::Invalid(e) => e,
        })
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Self::parse(content).map_err(|e| match e {
            ParseFailure::Toml(error) => ConfigError::TomlParseError {
                file: "<string>".into(),
                error,
            },
            ParseFailure::Invalid(e) => e,
        })
    }

    fn parse(content: &str) -> Result<Self, ParseFailure> {
        let config: Self = toml::from_str(content).map_err(ParseFailure::Toml)?;
        config.validate().map_err(ParseFailure::Invalid)?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=255).contains(&self.fault.exit_status) {
            return Err(ConfigError::InvalidValue {
                field: "fault.exit_status".to_string(),
                reason: format!("must be between 1 and 255, got {}", self.fault.exit_status),
            });
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.filter".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(ConfigError),
}
