//! Analysis mode definitions.

use crate::vocabulary::CellClass;
use serde::{Deserialize, Serialize};

/// Which rule table interprets a mode's aggregated counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpretationKind {
    /// Parasite counts per field graded Negative through High.
    Parasitemia,
    /// Platelet concentration graded Normal through Severe.
    Thrombocytopenia,
}

/// One analysis workflow: the class vocabulary a detector reports for it and
/// the rules used to interpret the totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMode {
    /// Stable identifier used by clients (e.g. `platelet`)
    pub id: String,
    /// Human-readable name
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: InterpretationKind,
    /// Fixed, ordered class vocabulary for this mode
    pub classes: Vec<CellClass>,
    /// Class whose per-field average is extrapolated to a concentration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration_target: Option<CellClass>,
    /// Model name the detection service expects; `id` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detector_mode: Option<String>,
}

impl AnalysisMode {
    /// Multi-class modes report a per-class breakdown with their interpretation.
    pub fn is_multi_class(&self) -> bool {
        self.classes.len() > 1
    }

    pub fn contains(&self, class: CellClass) -> bool {
        self.classes.contains(&class)
    }

    /// Value sent to the detection service to select its model.
    pub fn detector_mode(&self) -> &str {
        self.detector_mode.as_deref().unwrap_or(&self.id)
    }
}

pub(crate) fn default_modes() -> Vec<AnalysisMode> {
    let malaria_stages = vec![
        CellClass::RedBloodCell,
        CellClass::Trophozoite,
        CellClass::Difficult,
        CellClass::Ring,
        CellClass::Schizont,
        CellClass::Gametocyte,
        CellClass::WhiteBloodCell,
    ];

    vec![
        AnalysisMode {
            id: "parasite-single".to_string(),
            name: "Malaria Detection (Trophozoite)".to_string(),
            description: "Detects malaria trophozoite parasites in blood smear".to_string(),
            kind: InterpretationKind::Parasitemia,
            classes: vec![CellClass::Trophozoite],
            concentration_target: None,
            detector_mode: Some("malaria".to_string()),
        },
        AnalysisMode {
            id: "parasite-multi".to_string(),
            name: "Malaria Multi-Class Detection".to_string(),
            description: "Detects blood cells and all malaria parasite stages".to_string(),
            kind: InterpretationKind::Parasitemia,
            classes: malaria_stages.clone(),
            concentration_target: None,
            detector_mode: Some("malaria_multi".to_string()),
        },
        AnalysisMode {
            id: "parasite-advanced".to_string(),
            name: "Malaria Advanced Detection".to_string(),
            description: "Larger detector for malaria stages and leukocytes".to_string(),
            kind: InterpretationKind::Parasitemia,
            classes: malaria_stages,
            concentration_target: None,
            detector_mode: Some("malaria_advanced".to_string()),
        },
        AnalysisMode {
            id: "platelet".to_string(),
            name: "Dengue Analysis".to_string(),
            description: "Counts WBC, RBC and platelets for dengue risk assessment".to_string(),
            kind: InterpretationKind::Thrombocytopenia,
            classes: vec![
                CellClass::WhiteBloodCell,
                CellClass::RedBloodCell,
                CellClass::Platelet,
            ],
            concentration_target: Some(CellClass::Platelet),
            detector_mode: Some("dengue".to_string()),
        },
    ]
}
