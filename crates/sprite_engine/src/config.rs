//! TOML-backed configuration support.

pub use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration trait for TOML-backed settings types.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a TOML file.
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file.
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist.
    fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if std::path::Path::new(path).exists() {
            Self::load_from_file(path)
        } else {
            log::debug!("config file {path} not found, using defaults");
            Ok(Self::default())
        }
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialize(String),
}
