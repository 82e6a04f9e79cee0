//! Persisted configuration file handling.
//!
//! The settings layer writes the resolved connection record to a small
//! JSON file under the host content directory; the early-stage page
//! serving path reads it back without touching the host options store.

use crate::params::ConnectionParams;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of the generated configuration file below the host content
/// directory.
const CONFIG_SUBPATH: &str = "pagevault-config/config.json";

/// Error type for configuration persistence.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Returns the full configuration file path below `content_dir`.
pub fn default_path(content_dir: &Path) -> PathBuf {
    content_dir.join(CONFIG_SUBPATH)
}

/// Loads the persisted record.
///
/// Returns `None` when the file is absent, unreadable or malformed;
/// resolution then falls back to the compiled-in defaults.
pub fn load(path: &Path) -> Option<ConnectionParams> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "config file not readable");
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(params) => Some(params),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "config file malformed");
            None
        }
    }
}

/// Writes the record as pretty-printed JSON, creating parent directories
/// as needed.
pub fn save(path: &Path, params: &ConnectionParams) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let contents = serde_json::to_string_pretty(params)?;
    fs::write(path, contents)?;
    Ok(())
}
