//! Path resolution for the HEMO configuration file.

use hemo_core::error::{HemoError, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "HEMO_CONFIG";

const APP_DIR: &str = "hemo";
const CONFIG_FILE: &str = "config.toml";

/// Path management for HEMO.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/hemo/              # Platform config directory
/// └── config.toml              # Engine configuration
/// ```
pub struct HemoPaths;

impl HemoPaths {
    /// Returns the HEMO configuration directory for the platform.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: e.g. `~/.config/hemo/`
    /// - `Err(HemoError::Config)`: the platform has no config directory
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| HemoError::config("Cannot determine the platform config directory"))
    }

    /// Returns the default path of the configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Resolves the configuration file to read.
    ///
    /// Priority:
    /// 1. `explicit` (e.g. a `--config` flag)
    /// 2. `env_override` (the value of `HEMO_CONFIG`), ignored when empty
    /// 3. `<config_dir>/hemo/config.toml`
    pub fn resolve_config_file(
        explicit: Option<&Path>,
        env_override: Option<&str>,
    ) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        match env_override.map(str::trim) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Self::config_file(),
        }
    }
}
