//! Configuration file discovery and loading.
//!
//! An explicit `--config` path must exist. Without one, `.aptprobe.yml` in
//! the project root is used when present and defaults apply otherwise.

use crate::config::schema::ProberConfig;
use crate::error::{ProbeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the project root.
pub const CONFIG_FILE_NAME: &str = ".aptprobe.yml";

/// Find `.aptprobe.yml` in `project_root`.
pub fn discover(project_root: &Path) -> Option<PathBuf> {
    let path = project_root.join(CONFIG_FILE_NAME);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<ProberConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProbeError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ProbeError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a `ProberConfig`.
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<ProberConfig> {
    if content.trim().is_empty() {
        return Ok(ProberConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| ProbeError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<ProberConfig> {
    if let Some(path) = config_override {
        tracing::debug!("Loading config from {}", path.display());
        return load_config_file(path);
    }

    match discover(project_root) {
        Some(path) => {
            tracing::debug!("Discovered config at {}", path.display());
            load_config_file(&path)
        }
        None => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            Ok(ProberConfig::default())
        }
    }
}
