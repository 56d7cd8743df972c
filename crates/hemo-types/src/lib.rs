use hemo_core::HemoError;
use hemo_core::config::{AnalysisMode, InterpretationKind, Magnification};
use hemo_core::error::ErrorCategory;
use hemo_core::vocabulary::CellClass;
use serde::{Deserialize, Serialize};

pub mod session_dto;

pub use session_dto::{FinalizeResponse, StartResponse, UploadResponse};

/// Error body returned by every boundary operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine-readable variant name (e.g. `SessionNotFound`).
    pub code: String,
    pub category: ErrorCategory,
    /// Human-readable message.
    pub message: String,
}

impl From<&HemoError> for ErrorResponse {
    fn from(error: &HemoError) -> Self {
        let code = match error {
            HemoError::InvalidMode { .. } => "InvalidMode",
            HemoError::UnknownMagnification { .. } => "UnknownMagnification",
            HemoError::UnknownClass { .. } => "UnknownClass",
            HemoError::ModeMismatch { .. } => "ModeMismatch",
            HemoError::SessionNotFound { .. } => "SessionNotFound",
            HemoError::SessionFinalized { .. } => "SessionFinalized",
            HemoError::DetectionFailed { .. } => "DetectionFailed",
            HemoError::DetectionTimeout { .. } => "DetectionTimeout",
            HemoError::EmptyAggregation { .. } => "EmptyAggregation",
            HemoError::CountOverflow { .. } => "CountOverflow",
            HemoError::Config(_) => "Config",
            HemoError::Io { .. } => "Io",
            HemoError::Serialization { .. } => "Serialization",
            HemoError::Internal(_) => "Internal",
        };
        Self {
            code: code.to_string(),
            category: error.category(),
            message: error.to_string(),
        }
    }
}

/// One entry of the mode catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: InterpretationKind,
    /// Class vocabulary, in reporting order
    pub classes: Vec<CellClass>,
    pub multi_class: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concentration_target: Option<CellClass>,
}

impl From<&AnalysisMode> for ModeInfo {
    fn from(mode: &AnalysisMode) -> Self {
        Self {
            id: mode.id.clone(),
            name: mode.name.clone(),
            description: mode.description.clone(),
            kind: mode.kind,
            classes: mode.classes.clone(),
            multi_class: mode.is_multi_class(),
            concentration_target: mode.concentration_target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagnificationInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub conversion_factor: f64,
}

impl From<&Magnification> for MagnificationInfo {
    fn from(magnification: &Magnification) -> Self {
        Self {
            id: magnification.id.clone(),
            name: magnification.name.clone(),
            description: magnification.description.clone(),
            conversion_factor: magnification.conversion_factor,
        }
    }
}

/// Modes and magnifications a client may choose from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeCatalog {
    pub modes: Vec<ModeInfo>,
    pub magnifications: Vec<MagnificationInfo>,
    pub default_magnification: String,
}

impl ModeCatalog {
    pub fn new(
        modes: &[AnalysisMode],
        magnifications: &[Magnification],
        default_magnification: impl Into<String>,
    ) -> Self {
        Self {
            modes: modes.iter().map(ModeInfo::from).collect(),
            magnifications: magnifications.iter().map(MagnificationInfo::from).collect(),
            default_magnification: default_magnification.into(),
        }
    }
}
