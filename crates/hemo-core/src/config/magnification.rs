//! Optical magnification table.

use serde::{Deserialize, Serialize};

/// Conversion from an average per-field count to a per-microliter concentration
/// for one objective/eyepiece combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Magnification {
    /// Tag clients pass when starting a session (e.g. `100x-oil`)
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Objects per microliter represented by one object per field
    pub conversion_factor: f64,
}

pub(crate) const DEFAULT_MAGNIFICATION: &str = "100x-oil";

pub(crate) fn default_magnifications() -> Vec<Magnification> {
    vec![
        Magnification {
            id: DEFAULT_MAGNIFICATION.to_string(),
            name: "100x Oil Immersion (Standard)".to_string(),
            description: "1000x total magnification - clinical standard".to_string(),
            conversion_factor: 15_000.0,
        },
        Magnification {
            id: "100x-oil-fn22".to_string(),
            name: "100x Oil (FN=22 eyepiece)".to_string(),
            description: "1000x with wider field number eyepiece".to_string(),
            conversion_factor: 20_000.0,
        },
        Magnification {
            id: "40x".to_string(),
            name: "40x Objective".to_string(),
            description: "400x total magnification".to_string(),
            conversion_factor: 3_750.0,
        },
    ]
}
