//! Engine configuration.
//!
//! The configuration table (modes, magnifications, severity thresholds and
//! engine timings) is loaded once at process start and only read afterwards.
//! [`EngineConfig::default`] carries the built-in clinical tables; a TOML file
//! may override any section.

mod magnification;
mod mode;
mod thresholds;

pub use magnification::Magnification;
pub use mode::{AnalysisMode, InterpretationKind};
pub use thresholds::{ParasitemiaThresholds, SeverityThresholds, ThrombocytopeniaThresholds};

use crate::error::{HemoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Timings and defaults for the session engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Upper bound on a single detector call
    pub detection_timeout_secs: u64,
    /// Sessions older than this are evicted regardless of state
    pub session_ttl_secs: u64,
    /// How often the sweeper looks for expired sessions
    pub sweep_interval_secs: u64,
    /// Magnification used when a session is started without one
    pub default_magnification: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            detection_timeout_secs: 30,
            session_ttl_secs: 60 * 60,
            sweep_interval_secs: 60,
            default_magnification: magnification::DEFAULT_MAGNIFICATION.to_string(),
        }
    }
}

impl EngineSettings {
    pub fn detection_timeout(&self) -> Duration {
        Duration::from_secs(self.detection_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Root configuration of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub engine: EngineSettings,
    pub modes: Vec<AnalysisMode>,
    pub magnifications: Vec<Magnification>,
    pub thresholds: SeverityThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            modes: mode::default_modes(),
            magnifications: magnification::default_magnifications(),
            thresholds: SeverityThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document. Sections missing from the
    /// document keep their built-in defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Looks up a mode by id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMode` listing the configured mode ids when `id` is unknown.
    pub fn mode(&self, id: &str) -> Result<&AnalysisMode> {
        self.modes
            .iter()
            .find(|mode| mode.id == id)
            .ok_or_else(|| HemoError::invalid_mode(id, self.mode_ids()))
    }

    pub fn mode_ids(&self) -> Vec<&str> {
        self.modes.iter().map(|mode| mode.id.as_str()).collect()
    }

    /// Looks up a magnification by tag.
    ///
    /// # Errors
    ///
    /// Returns `UnknownMagnification` rather than falling back to the default.
    pub fn magnification(&self, id: &str) -> Result<&Magnification> {
        self.magnifications
            .iter()
            .find(|magnification| magnification.id == id)
            .ok_or_else(|| HemoError::unknown_magnification(id))
    }

    /// Resolves an optional tag, using the configured default when absent.
    pub fn resolve_magnification(&self, id: Option<&str>) -> Result<&Magnification> {
        self.magnification(id.unwrap_or(&self.engine.default_magnification))
    }

    /// Checks the table for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.modes.is_empty() {
            return Err(HemoError::config("at least one mode must be configured"));
        }

        let mut seen = HashSet::new();
        for mode in &self.modes {
            if !seen.insert(mode.id.as_str()) {
                return Err(HemoError::config(format!("duplicate mode id '{}'", mode.id)));
            }
            if mode.classes.is_empty() {
                return Err(HemoError::config(format!(
                    "mode '{}' has an empty class vocabulary",
                    mode.id
                )));
            }
            let unique: HashSet<_> = mode.classes.iter().collect();
            if unique.len() != mode.classes.len() {
                return Err(HemoError::config(format!(
                    "mode '{}' lists a class more than once",
                    mode.id
                )));
            }
            if let Some(target) = mode.concentration_target
                && !mode.contains(target)
            {
                return Err(HemoError::config(format!(
                    "mode '{}' extrapolates {} which is not in its vocabulary",
                    mode.id, target
                )));
            }
            if mode
                .detector_mode
                .as_deref()
                .is_some_and(|name| name.trim().is_empty())
            {
                return Err(HemoError::config(format!(
                    "mode '{}' has a blank detector_mode",
                    mode.id
                )));
            }
            if mode.kind == InterpretationKind::Thrombocytopenia
                && mode.concentration_target.is_none()
            {
                return Err(HemoError::config(format!(
                    "mode '{}' is interpreted by concentration but has no concentration_target",
                    mode.id
                )));
            }
        }

        let mut seen = HashSet::new();
        for magnification in &self.magnifications {
            if !seen.insert(magnification.id.as_str()) {
                return Err(HemoError::config(format!(
                    "duplicate magnification '{}'",
                    magnification.id
                )));
            }
            if !(magnification.conversion_factor.is_finite()
                && magnification.conversion_factor > 0.0)
            {
                return Err(HemoError::config(format!(
                    "magnification '{}' needs a positive conversion_factor",
                    magnification.id
                )));
            }
        }
        if self
            .magnification(&self.engine.default_magnification)
            .is_err()
        {
            return Err(HemoError::config(format!(
                "default magnification '{}' is not in the magnification table",
                self.engine.default_magnification
            )));
        }

        let parasitemia = &self.thresholds.parasitemia;
        if !(0.0 <= parasitemia.low_max && parasitemia.low_max < parasitemia.moderate_max) {
            return Err(HemoError::config(
                "parasitemia thresholds must satisfy 0 <= low_max < moderate_max",
            ));
        }
        let platelets = &self.thresholds.thrombocytopenia;
        if !(0.0 < platelets.severe_below
            && platelets.severe_below < platelets.moderate_below
            && platelets.moderate_below < platelets.mild_below)
        {
            return Err(HemoError::config(
                "thrombocytopenia thresholds must satisfy 0 < severe_below < moderate_below < mild_below",
            ));
        }

        if self.engine.detection_timeout_secs == 0 {
            return Err(HemoError::config("detection_timeout_secs must be positive"));
        }
        if self.engine.sweep_interval_secs == 0 {
            return Err(HemoError::config("sweep_interval_secs must be positive"));
        }

        Ok(())
    }
}
