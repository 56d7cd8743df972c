//! DTOs for the three session boundary operations.
//!
//! Field names are camelCase on the wire. Annotated images travel as
//! `data:image/png;base64,...` URIs. Averages are reported with two decimals
//! and concentrations as whole cells per microliter.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hemo_core::aggregation::{AggregationResult, Concentration};
use hemo_core::interpretation::{ClassTotal, ClinicalInterpretation, SeverityTier};
use hemo_core::vocabulary::{CellClass, ClassCounts};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";
const AVERAGE_DECIMALS: i32 = 2;

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Encodes image bytes as a PNG data URI.
pub fn png_data_uri(image: &[u8]) -> String {
    format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(image))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub session_id: String,
}

impl From<String> for StartResponse {
    fn from(session_id: String) -> Self {
        Self { session_id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub session_id: String,
    pub image_index: usize,
    pub counts_by_class: ClassCounts,
    /// PNG data URI of the detector's annotated image
    pub annotated_image: String,
}

impl UploadResponse {
    pub fn new(
        session_id: impl Into<String>,
        image_index: usize,
        counts_by_class: ClassCounts,
        annotated_image: &[u8],
    ) -> Self {
        Self {
            session_id: session_id.into(),
            image_index,
            counts_by_class,
            annotated_image: png_data_uri(annotated_image),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcentrationDto {
    pub class: CellClass,
    pub per_microliter: f64,
    pub magnification: String,
    pub conversion_factor: f64,
}

impl From<Concentration> for ConcentrationDto {
    fn from(concentration: Concentration) -> Self {
        Self {
            class: concentration.class,
            per_microliter: concentration.per_microliter.round(),
            magnification: concentration.magnification,
            conversion_factor: concentration.conversion_factor,
        }
    }
}

/// Aggregated metrics and clinical interpretation of a session, flattened
/// into one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub session_id: String,
    pub mode: String,
    pub magnification: String,
    pub images_count: usize,
    pub totals_by_class: ClassCounts,
    pub total_detections: u64,
    pub avg_per_image_by_class: BTreeMap<CellClass, f64>,
    pub avg_total_per_image: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrapolated_concentration: Option<ConcentrationDto>,
    pub severity_tier: SeverityTier,
    pub severity_rank: u8,
    pub status_label: String,
    pub range_description: String,
    pub interpretation_text: String,
    pub recommendation_text: String,
    pub guidelines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_class_breakdown: Option<Vec<ClassTotal>>,
}

impl FinalizeResponse {
    /// Flattens a session's aggregation and interpretation, rounding the
    /// averages for display.
    pub fn new(
        session_id: impl Into<String>,
        mode: impl Into<String>,
        magnification: impl Into<String>,
        aggregation: AggregationResult,
        interpretation: ClinicalInterpretation,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            mode: mode.into(),
            magnification: magnification.into(),
            images_count: aggregation.images_count,
            totals_by_class: aggregation.totals_by_class,
            total_detections: aggregation.total_detections,
            avg_per_image_by_class: aggregation
                .avg_per_image_by_class
                .into_iter()
                .map(|(class, avg)| (class, round_to(avg, AVERAGE_DECIMALS)))
                .collect(),
            avg_total_per_image: round_to(aggregation.avg_total_per_image, AVERAGE_DECIMALS),
            extrapolated_concentration: aggregation
                .extrapolated_concentration
                .map(ConcentrationDto::from),
            severity_tier: interpretation.severity_tier,
            severity_rank: interpretation.severity_rank,
            status_label: interpretation.status_label,
            range_description: interpretation.range_description,
            interpretation_text: interpretation.interpretation_text,
            recommendation_text: interpretation.recommendation_text,
            guidelines: interpretation.guidelines,
            per_class_breakdown: interpretation.per_class_breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hemo_core::aggregation::aggregate;
    use hemo_core::{EngineConfig, interpret};

    fn report(mode_id: &str, magnification: &str, images: &[ClassCounts]) -> FinalizeResponse {
        let config = EngineConfig::default();
        let mode = config.mode(mode_id).unwrap();
        let aggregation = aggregate(images, mode, magnification, &config.magnifications).unwrap();
        let interpretation = interpret(&aggregation, mode, &config.thresholds).unwrap();
        FinalizeResponse::new("s-1", &mode.id, magnification, aggregation, interpretation)
    }

    fn platelet_field(platelets: u64) -> ClassCounts {
        ClassCounts::new()
            .with(CellClass::WhiteBloodCell, 2)
            .with(CellClass::RedBloodCell, 150)
            .with(CellClass::Platelet, platelets)
    }

    #[test]
    fn test_png_data_uri() {
        assert_eq!(png_data_uri(b"png"), "data:image/png;base64,cG5n");
        assert_eq!(png_data_uri(&[]), "data:image/png;base64,");
    }

    #[test]
    fn test_upload_response_shape() {
        let response = UploadResponse::new(
            "s-1",
            3,
            ClassCounts::new().with(CellClass::Platelet, 8),
            b"png",
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["imageIndex"], 3);
        assert_eq!(json["countsByClass"]["Platelet"], 8);
        assert_eq!(json["annotatedImage"], "data:image/png;base64,cG5n");
    }

    #[test]
    fn test_finalize_response_is_flat() {
        let json = serde_json::to_value(report("platelet", "100x-oil", &vec![platelet_field(8); 10])).unwrap();

        assert_eq!(json["imagesCount"], 10);
        assert_eq!(json["totalsByClass"]["Platelet"], 80);
        assert_eq!(json["totalsByClass"]["RBC"], 1500);
        assert_eq!(json["totalDetections"], 1600);
        assert_eq!(json["avgPerImageByClass"]["Platelet"], 8.0);
        assert_eq!(json["extrapolatedConcentration"]["perMicroliter"], 120000.0);
        assert_eq!(json["severityTier"]["level"], "Mild");
        assert_eq!(json["severityRank"], 1);
        assert!(json["guidelines"].as_array().is_some_and(|g| !g.is_empty()));
        assert!(json.get("aggregation").is_none());
    }

    #[test]
    fn test_averages_and_concentration_are_rounded() {
        // 1 + 0 + 0 platelets over three fields: 1/3 per image
        let images = vec![platelet_field(1), platelet_field(0), platelet_field(0)];
        let json = serde_json::to_value(report("platelet", "100x-oil-fn22", &images)).unwrap();

        assert_eq!(json["avgPerImageByClass"]["Platelet"], 0.33);
        assert_eq!(json["avgPerImageByClass"]["WBC"], 2.0);
        assert_eq!(json["avgTotalPerImage"], 152.33);
        assert_eq!(json["extrapolatedConcentration"]["perMicroliter"], 6667.0);
        assert_eq!(json["totalDetections"], 457);
    }

    #[test]
    fn test_single_class_report_omits_optional_fields() {
        let json = serde_json::to_value(report("parasite-single", "100x-oil", &vec![ClassCounts::new(); 3]))
            .unwrap();
        assert!(json.get("extrapolatedConcentration").is_none());
        assert!(json.get("perClassBreakdown").is_none());
        assert_eq!(json["severityTier"]["level"], "Negative");
    }
}
