use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::JoinConfig;

/// Config file looked up inside the data directory
pub const CONFIG_FILE: &str = "join.toml";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read and parse a config file
pub fn read_config(path: &Path) -> Result<JoinConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the effective config: an explicit path must exist; otherwise
/// `<data_dir>/join.toml` is used when present, else defaults.
pub fn load_config(explicit: Option<&Path>, data_dir: &Path) -> Result<JoinConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    let path = data_dir.join(CONFIG_FILE);
    if path.exists() {
        read_config(&path)
    } else {
        Ok(JoinConfig::default())
    }
}
