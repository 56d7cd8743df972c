//! Severity thresholds feeding the interpretation rule tables.

use serde::{Deserialize, Serialize};

/// Average parasites per field separating the parasitemia tiers.
///
/// Zero parasites is always Negative; up to `low_max` is Low, up to
/// `moderate_max` Moderate, anything above High.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParasitemiaThresholds {
    pub low_max: f64,
    pub moderate_max: f64,
}

impl Default for ParasitemiaThresholds {
    fn default() -> Self {
        Self {
            low_max: 10.0,
            moderate_max: 50.0,
        }
    }
}

/// Platelets per microliter separating the thrombocytopenia tiers.
///
/// Below `severe_below` is Severe, below `moderate_below` Moderate, below
/// `mild_below` Mild, otherwise Normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrombocytopeniaThresholds {
    pub severe_below: f64,
    pub moderate_below: f64,
    pub mild_below: f64,
}

impl Default for ThrombocytopeniaThresholds {
    fn default() -> Self {
        Self {
            severe_below: 50_000.0,
            moderate_below: 100_000.0,
            mild_below: 150_000.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    #[serde(default)]
    pub parasitemia: ParasitemiaThresholds,
    #[serde(default)]
    pub thrombocytopenia: ThrombocytopeniaThresholds,
}
