//! Aggregation of per-image counts into session metrics.
//!
//! Aggregation is a stateless fold over the image list. Addition commutes, so
//! the result does not depend on upload order.

use crate::config::{AnalysisMode, Magnification};
use crate::error::{HemoError, Result};
use crate::session::SessionSnapshot;
use crate::vocabulary::{CellClass, ClassCounts};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-volume estimate derived from the average count of one class per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concentration {
    pub class: CellClass,
    /// Estimated objects per microliter
    pub per_microliter: f64,
    pub magnification: String,
    pub conversion_factor: f64,
}

/// Metrics over all images of a session. Always recomputed, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub images_count: usize,
    /// Totals for every vocabulary class, zero-filled
    pub totals_by_class: ClassCounts,
    pub total_detections: u64,
    pub avg_per_image_by_class: BTreeMap<CellClass, f64>,
    pub avg_total_per_image: f64,
    /// Present when the mode extrapolates a concentration
    pub extrapolated_concentration: Option<Concentration>,
}

impl AggregationResult {
    /// Average count of `class` per image, zero for classes outside the vocabulary.
    pub fn avg_for(&self, class: CellClass) -> f64 {
        self.avg_per_image_by_class
            .get(&class)
            .copied()
            .unwrap_or(0.0)
    }

    /// Total of all parasite stages across the session.
    ///
    /// Bounded by `total_detections` for results built by [`aggregate`].
    pub fn parasite_total(&self) -> u64 {
        self.totals_by_class
            .iter()
            .filter(|(class, _)| class.is_parasite())
            .fold(0, |sum, (_, count)| sum.saturating_add(count))
    }

    pub fn avg_parasites_per_image(&self) -> f64 {
        self.parasite_total() as f64 / self.images_count as f64
    }
}

/// Folds `images` into session metrics.
///
/// # Arguments
///
/// * `images` - per-image counts, in any order
/// * `mode` - supplies the class vocabulary and the concentration target
/// * `magnification` - tag looked up in `magnifications` for extrapolation
///
/// # Errors
///
/// - `EmptyAggregation` when `images` is empty
/// - `UnknownMagnification` when extrapolation is needed and the tag is not in the table
/// - `CountOverflow` when a class total or the detection total exceeds `u64`
pub fn aggregate(
    images: &[ClassCounts],
    mode: &AnalysisMode,
    magnification: &str,
    magnifications: &[Magnification],
) -> Result<AggregationResult> {
    if images.is_empty() {
        return Err(HemoError::EmptyAggregation { session_id: None });
    }

    let mut totals = ClassCounts::zeroed(&mode.classes);
    for counts in images {
        for class in &mode.classes {
            totals.add(*class, counts.get(*class))?;
        }
    }

    let images_count = images.len();
    let divisor = images_count as f64;
    let total_detections = totals.total()?;
    let avg_per_image_by_class: BTreeMap<CellClass, f64> = totals
        .iter()
        .map(|(class, total)| (class, total as f64 / divisor))
        .collect();

    let extrapolated_concentration = match mode.concentration_target {
        Some(target) => {
            let entry = magnifications
                .iter()
                .find(|entry| entry.id == magnification)
                .ok_or_else(|| HemoError::unknown_magnification(magnification))?;
            let average = avg_per_image_by_class.get(&target).copied().unwrap_or(0.0);
            Some(Concentration {
                class: target,
                per_microliter: average * entry.conversion_factor,
                magnification: entry.id.clone(),
                conversion_factor: entry.conversion_factor,
            })
        }
        None => None,
    };

    Ok(AggregationResult {
        images_count,
        totals_by_class: totals,
        total_detections,
        avg_per_image_by_class,
        avg_total_per_image: total_detections as f64 / divisor,
        extrapolated_concentration,
    })
}

/// Aggregates a finalized session, attaching its id to any error.
pub fn aggregate_snapshot(
    snapshot: &SessionSnapshot,
    magnifications: &[Magnification],
) -> Result<AggregationResult> {
    aggregate(
        &snapshot.images,
        &snapshot.mode,
        &snapshot.magnification.id,
        magnifications,
    )
    .map_err(|err| match err {
        HemoError::EmptyAggregation { session_id: None } => {
            HemoError::empty_aggregation(&snapshot.session_id)
        }
        other => other,
    })
}
