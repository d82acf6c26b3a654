//! Configuration for the unsafe-ext native bridge
//!
//! Settings are read from TOML and merged in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. User config (~/.unsafe-ext/config.toml)
//! 3. An explicit config file passed by the embedder
//! 4. Environment variables (UNSAFE_EXT_*)
//!
//! # Example
//!
//! ```no_run
//! use unsafe_config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load().unwrap();
//! assert!(config.fault.exit_status > 0);
//! ```

pub mod bridge;
pub mod loader;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use bridge::{BridgeConfig, FaultConfig, LoggingConfig};
pub use loader::ConfigLoader;
