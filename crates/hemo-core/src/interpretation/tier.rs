//! Severity tier vocabularies.
//!
//! Each scale is a strict total order; the declaration order of the variants
//! is the severity order, so a new tier must be inserted at its rank rather
//! than appended.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Malaria parasite density grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParasitemiaLevel {
    Negative,
    Low,
    Moderate,
    High,
}

/// Platelet count grading for the dengue workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThrombocytopeniaLevel {
    Normal,
    Mild,
    Moderate,
    Severe,
}

/// Severity tier of an interpretation, tagged with its scale.
///
/// Tiers are only comparable within one scale; use [`SeverityTier::rank`]
/// to compare severities of the same mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scale", content = "level", rename_all = "snake_case")]
pub enum SeverityTier {
    Parasitemia(ParasitemiaLevel),
    Thrombocytopenia(ThrombocytopeniaLevel),
}

impl SeverityTier {
    /// Zero-based position on the tier's scale; 0 is the least severe.
    pub fn rank(self) -> u8 {
        match self {
            Self::Parasitemia(level) => level as u8,
            Self::Thrombocytopenia(level) => level as u8,
        }
    }

    /// Whether this is the lowest tier of its scale.
    pub fn is_lowest(self) -> bool {
        self.rank() == 0
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parasitemia(level) => write!(f, "{level:?}"),
            Self::Thrombocytopenia(level) => write!(f, "{level:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_follows_declaration_order() {
        assert_eq!(SeverityTier::Parasitemia(ParasitemiaLevel::Negative).rank(), 0);
        assert_eq!(SeverityTier::Parasitemia(ParasitemiaLevel::High).rank(), 3);
        assert_eq!(
            SeverityTier::Thrombocytopenia(ThrombocytopeniaLevel::Mild).rank(),
            1
        );
        assert!(ParasitemiaLevel::Low < ParasitemiaLevel::Moderate);
        assert!(ThrombocytopeniaLevel::Moderate < ThrombocytopeniaLevel::Severe);
    }

    #[test]
    fn test_serialized_shape() {
        let tier = SeverityTier::Thrombocytopenia(ThrombocytopeniaLevel::Severe);
        assert_eq!(
            serde_json::to_value(tier).unwrap(),
            serde_json::json!({"scale": "thrombocytopenia", "level": "Severe"})
        );
        assert_eq!(tier.to_string(), "Severe");
    }
}
