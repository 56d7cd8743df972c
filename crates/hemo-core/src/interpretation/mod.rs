//! Clinical interpretation of aggregated session metrics.
//!
//! The interpreter holds no state: the tier comes from an ordered rule table
//! ([`rules`]) over one scalar metric, and the prose comes from a fixed
//! per-tier lookup ([`guidance`]). Identical metrics always produce identical
//! output.
//!
//! | Kind | Metric | Scale |
//! |------|--------|-------|
//! | Parasitemia | average parasites per field | Negative < Low < Moderate < High |
//! | Thrombocytopenia | extrapolated platelets/µL | Normal < Mild < Moderate < Severe |

pub mod guidance;
pub mod rules;
mod tier;

pub use rules::{Predicate, Rule, RuleTable};
pub use tier::{ParasitemiaLevel, SeverityTier, ThrombocytopeniaLevel};

use crate::aggregation::AggregationResult;
use crate::config::{
    AnalysisMode, InterpretationKind, ParasitemiaThresholds, SeverityThresholds,
    ThrombocytopeniaThresholds,
};
use crate::error::{HemoError, Result};
use crate::vocabulary::CellClass;
use guidance::TierGuidance;
use serde::{Deserialize, Serialize};

/// Total of one class, as listed in a multi-class breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTotal {
    pub class: CellClass,
    pub count: u64,
}

/// Severity tier and presentation payload derived from session metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalInterpretation {
    pub severity_tier: SeverityTier,
    pub severity_rank: u8,
    pub status_label: String,
    pub range_description: String,
    pub interpretation_text: String,
    pub recommendation_text: String,
    pub guidelines: Vec<String>,
    /// Non-zero class totals in vocabulary order, multi-class modes only
    pub per_class_breakdown: Option<Vec<ClassTotal>>,
}

/// Interprets aggregated metrics according to the mode's rule table.
///
/// # Errors
///
/// Returns `Internal` when a concentration-graded mode is given an
/// aggregation without an extrapolated concentration.
pub fn interpret(
    metrics: &AggregationResult,
    mode: &AnalysisMode,
    thresholds: &SeverityThresholds,
) -> Result<ClinicalInterpretation> {
    let (tier, range_description, detail, guidance) = match mode.kind {
        InterpretationKind::Parasitemia => {
            let average = metrics.avg_parasites_per_image();
            let level = rules::parasitemia_table(&thresholds.parasitemia).evaluate(average);
            let detail = format!(
                "{} parasites detected across {} field(s), {:.2} per field on average.",
                metrics.parasite_total(),
                metrics.images_count,
                average
            );
            (
                SeverityTier::Parasitemia(level),
                parasitemia_range(level, &thresholds.parasitemia),
                detail,
                guidance::parasitemia(level),
            )
        }
        InterpretationKind::Thrombocytopenia => {
            let concentration = metrics.extrapolated_concentration.as_ref().ok_or_else(|| {
                HemoError::internal(format!(
                    "mode '{}' requires an extrapolated concentration",
                    mode.id
                ))
            })?;
            let level = rules::thrombocytopenia_table(&thresholds.thrombocytopenia)
                .evaluate(concentration.per_microliter);
            let detail = format!(
                "Estimated {} count {}/µL ({:.2} per field at {}, factor {}).",
                concentration.class,
                format_thousands(concentration.per_microliter),
                metrics.avg_for(concentration.class),
                concentration.magnification,
                format_thousands(concentration.conversion_factor)
            );
            (
                SeverityTier::Thrombocytopenia(level),
                thrombocytopenia_range(level, &thresholds.thrombocytopenia),
                detail,
                guidance::thrombocytopenia(level),
            )
        }
    };

    Ok(build(tier, range_description, detail, guidance, metrics, mode))
}

fn build(
    tier: SeverityTier,
    range_description: String,
    detail: String,
    guidance: &TierGuidance,
    metrics: &AggregationResult,
    mode: &AnalysisMode,
) -> ClinicalInterpretation {
    let per_class_breakdown = mode.is_multi_class().then(|| {
        mode.classes
            .iter()
            .map(|class| ClassTotal {
                class: *class,
                count: metrics.totals_by_class.get(*class),
            })
            .filter(|total| total.count > 0)
            .collect()
    });

    ClinicalInterpretation {
        severity_tier: tier,
        severity_rank: tier.rank(),
        status_label: guidance.status_label.to_string(),
        range_description,
        interpretation_text: format!("{} {}", guidance.interpretation, detail),
        recommendation_text: guidance.recommendation.to_string(),
        guidelines: guidance.guidelines.iter().map(|g| g.to_string()).collect(),
        per_class_breakdown,
    }
}

fn parasitemia_range(level: ParasitemiaLevel, thresholds: &ParasitemiaThresholds) -> String {
    let low = format_thousands(thresholds.low_max);
    let moderate = format_thousands(thresholds.moderate_max);
    match level {
        ParasitemiaLevel::Negative => "0 parasites per field".to_string(),
        ParasitemiaLevel::Low => format!("more than 0, up to {low} parasites per field"),
        ParasitemiaLevel::Moderate => {
            format!("more than {low}, up to {moderate} parasites per field")
        }
        ParasitemiaLevel::High => format!("more than {moderate} parasites per field"),
    }
}

fn thrombocytopenia_range(
    level: ThrombocytopeniaLevel,
    thresholds: &ThrombocytopeniaThresholds,
) -> String {
    let severe = format_thousands(thresholds.severe_below);
    let moderate = format_thousands(thresholds.moderate_below);
    let mild = format_thousands(thresholds.mild_below);
    match level {
        ThrombocytopeniaLevel::Normal => format!("{mild}/µL or more"),
        ThrombocytopeniaLevel::Mild => format!("{moderate} to below {mild}/µL"),
        ThrombocytopeniaLevel::Moderate => format!("{severe} to below {moderate}/µL"),
        ThrombocytopeniaLevel::Severe => format!("below {severe}/µL"),
    }
}

/// Formats a value rounded to a whole number with comma grouping (`150,000`).
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
