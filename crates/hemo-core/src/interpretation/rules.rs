//! Ordered decision tables mapping a scalar metric to a severity tier.

use super::tier::{ParasitemiaLevel, ThrombocytopeniaLevel};
use crate::config::{ParasitemiaThresholds, ThrombocytopeniaThresholds};
use serde::Serialize;

/// Condition over the driving metric of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", content = "bound", rename_all = "snake_case")]
pub enum Predicate {
    /// `metric <= bound`
    AtMost(f64),
    /// `metric < bound`
    Below(f64),
}

impl Predicate {
    pub fn matches(self, metric: f64) -> bool {
        match self {
            Self::AtMost(bound) => metric <= bound,
            Self::Below(bound) => metric < bound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rule<T> {
    pub predicate: Predicate,
    pub tier: T,
}

/// Rules evaluated top to bottom; the first match wins and `fallback`
/// applies when none matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleTable<T> {
    rules: Vec<Rule<T>>,
    fallback: T,
}

impl<T: Copy> RuleTable<T> {
    pub fn new(rules: Vec<Rule<T>>, fallback: T) -> Self {
        Self { rules, fallback }
    }

    pub fn evaluate(&self, metric: f64) -> T {
        self.rules
            .iter()
            .find(|rule| rule.predicate.matches(metric))
            .map(|rule| rule.tier)
            .unwrap_or(self.fallback)
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn fallback(&self) -> T {
        self.fallback
    }
}

/// Grades average parasites per field.
pub fn parasitemia_table(thresholds: &ParasitemiaThresholds) -> RuleTable<ParasitemiaLevel> {
    RuleTable::new(
        vec![
            Rule {
                predicate: Predicate::AtMost(0.0),
                tier: ParasitemiaLevel::Negative,
            },
            Rule {
                predicate: Predicate::AtMost(thresholds.low_max),
                tier: ParasitemiaLevel::Low,
            },
            Rule {
                predicate: Predicate::AtMost(thresholds.moderate_max),
                tier: ParasitemiaLevel::Moderate,
            },
        ],
        ParasitemiaLevel::High,
    )
}

/// Grades platelets per microliter; lower counts are more severe.
pub fn thrombocytopenia_table(
    thresholds: &ThrombocytopeniaThresholds,
) -> RuleTable<ThrombocytopeniaLevel> {
    RuleTable::new(
        vec![
            Rule {
                predicate: Predicate::Below(thresholds.severe_below),
                tier: ThrombocytopeniaLevel::Severe,
            },
            Rule {
                predicate: Predicate::Below(thresholds.moderate_below),
                tier: ThrombocytopeniaLevel::Moderate,
            },
            Rule {
                predicate: Predicate::Below(thresholds.mild_below),
                tier: ThrombocytopeniaLevel::Mild,
            },
        ],
        ThrombocytopeniaLevel::Normal,
    )
}
