//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the engine configuration
//! from the configuration file (~/.config/hemo/config.toml by default).

use crate::paths::{CONFIG_ENV_VAR, HemoPaths};
use hemo_core::EngineConfig;
use hemo_core::error::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the engine configuration.
///
/// A missing file yields the built-in defaults. A file that exists but fails
/// to parse or validate is an error; it is never silently replaced.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration, loaded on first access.
    config: Arc<RwLock<Option<Arc<EngineConfig>>>>,
}

impl ConfigService {
    /// Creates a service reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service for the resolved configuration path.
    ///
    /// See [`HemoPaths::resolve_config_file`] for the resolution order.
    pub fn from_env(explicit: Option<&Path>) -> Result<Self> {
        let env_override = std::env::var(CONFIG_ENV_VAR).ok();
        let path = HemoPaths::resolve_config_file(explicit, env_override.as_deref())?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the engine configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<Arc<EngineConfig>> {
        {
            let read_lock = self
                .config
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let loaded = Arc::new(Self::load(&self.path)?);

        let mut write_lock = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *write_lock = None;
    }

    /// Reads and validates the configuration at `path`.
    pub fn load(path: &Path) -> Result<EngineConfig> {
        if !path.exists() {
            tracing::info!(
                "[ConfigService] No config at {}, using built-in defaults",
                path.display()
            );
            return Ok(EngineConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = EngineConfig::from_toml_str(&content)?;
        tracing::info!(
            "[ConfigService] Loaded config from {} ({} mode(s), {} magnification(s))",
            path.display(),
            config.modes.len(),
            config.magnifications.len()
        );
        Ok(config)
    }
}
