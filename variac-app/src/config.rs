//! Configuration loading
//!
//! Reads [`AppConfig`] from TOML. Every field is optional; missing ones
//! take their defaults and out-of-range values are clamped.

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use variac_core::config::AppConfig;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "variac.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parse and normalize a TOML configuration
pub fn parse_config(text: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str::<AppConfig>(text).map(AppConfig::normalized)
}

/// Load the configuration
///
/// Uses `path` when given, else [`DEFAULT_CONFIG_FILE`] if it exists, else
/// the defaults. An explicit path that cannot be read is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match path {
        Some(path) => path,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if !fallback.is_file() {
                info!("No config file, using defaults");
                return Ok(AppConfig::default());
            }
            fallback
        }
    };

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
