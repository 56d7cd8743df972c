//! Fixed presentation text per severity tier.

use super::tier::{ParasitemiaLevel, ThrombocytopeniaLevel};

/// Prose attached to one tier. The same tier always yields the same text.
#[derive(Debug)]
pub struct TierGuidance {
    pub status_label: &'static str,
    pub interpretation: &'static str,
    pub recommendation: &'static str,
    pub guidelines: &'static [&'static str],
}

static PARASITEMIA_NEGATIVE: TierGuidance = TierGuidance {
    status_label: "No Malaria Parasites Detected",
    interpretation: "No parasites were detected in the analyzed fields.",
    recommendation: "If clinical suspicion persists, repeat smear examination every 12-24 hours for a total of three sets.",
    guidelines: &[
        "A single negative smear does not exclude malaria",
        "Confirm with a rapid diagnostic test (RDT) if available",
        "Have thick and thin smears reviewed by a trained microscopist",
    ],
};

static PARASITEMIA_LOW: TierGuidance = TierGuidance {
    status_label: "Low Parasitemia",
    interpretation: "Low parasite density consistent with uncomplicated malaria.",
    recommendation: "Start oral antimalarial treatment according to national guidelines.",
    guidelines: &[
        "Use an artemisinin-based combination therapy (ACT) as first line",
        "Identify the Plasmodium species to guide therapy",
        "Repeat the smear at 48-72 hours to confirm treatment response",
    ],
};

static PARASITEMIA_MODERATE: TierGuidance = TierGuidance {
    status_label: "Moderate Parasitemia",
    interpretation: "Moderate parasite density; risk of progression to severe malaria.",
    recommendation: "Treat promptly and assess for danger signs of severe malaria.",
    guidelines: &[
        "Begin ACT treatment without delay",
        "Monitor parasite density daily until clearance",
        "Consider admission if oral medication is not tolerated",
        "Check hemoglobin and blood glucose",
    ],
};

static PARASITEMIA_HIGH: TierGuidance = TierGuidance {
    status_label: "High Parasitemia - Severe Malaria Risk",
    interpretation: "High parasite density; manage as severe malaria.",
    recommendation: "Refer urgently for hospital care and parenteral treatment.",
    guidelines: &[
        "Give parenteral artesunate as first-line treatment",
        "Monitor consciousness, glucose, hemoglobin and renal function",
        "Repeat parasite counts every 12-24 hours",
        "Switch to oral ACT once the patient tolerates oral medication",
    ],
};

static PLATELETS_NORMAL: TierGuidance = TierGuidance {
    status_label: "Normal Platelet Count",
    interpretation: "Platelet count is within or above the normal reference range.",
    recommendation: "No platelet-related intervention needed; continue clinical monitoring if dengue is suspected.",
    guidelines: &[
        "Repeat the count if fever persists beyond 3 days",
        "Watch for warning signs: abdominal pain, persistent vomiting, mucosal bleeding",
        "Maintain adequate oral hydration",
    ],
};

static PLATELETS_MILD: TierGuidance = TierGuidance {
    status_label: "Mild Thrombocytopenia",
    interpretation: "Platelet count is mildly reduced.",
    recommendation: "Repeat the platelet count within 24 hours and monitor for warning signs.",
    guidelines: &[
        "Repeat platelet count and hematocrit within 24 hours",
        "Avoid NSAIDs and aspirin; use paracetamol for fever",
        "Encourage oral fluid intake",
    ],
};

static PLATELETS_MODERATE: TierGuidance = TierGuidance {
    status_label: "Moderate Thrombocytopenia",
    interpretation: "Platelet count is moderately reduced; dengue warning phase possible.",
    recommendation: "Monitor platelets and hematocrit daily and evaluate for warning signs.",
    guidelines: &[
        "Daily platelet count and hematocrit",
        "Avoid NSAIDs, aspirin and intramuscular injections",
        "Consider hospital observation if warning signs appear",
    ],
};

static PLATELETS_SEVERE: TierGuidance = TierGuidance {
    status_label: "Severe Thrombocytopenia",
    interpretation: "Platelet count is severely reduced with a significant bleeding risk.",
    recommendation: "Urgent clinical evaluation; consider hospital admission.",
    guidelines: &[
        "Monitor closely for bleeding manifestations",
        "Assess for plasma leakage and shock",
        "Platelet transfusion only for active bleeding, per clinical judgment",
        "Confirm the count with an automated hematology analyzer",
    ],
};

pub fn parasitemia(level: ParasitemiaLevel) -> &'static TierGuidance {
    match level {
        ParasitemiaLevel::Negative => &PARASITEMIA_NEGATIVE,
        ParasitemiaLevel::Low => &PARASITEMIA_LOW,
        ParasitemiaLevel::Moderate => &PARASITEMIA_MODERATE,
        ParasitemiaLevel::High => &PARASITEMIA_HIGH,
    }
}

pub fn thrombocytopenia(level: ThrombocytopeniaLevel) -> &'static TierGuidance {
    match level {
        ThrombocytopeniaLevel::Normal => &PLATELETS_NORMAL,
        ThrombocytopeniaLevel::Mild => &PLATELETS_MILD,
        ThrombocytopeniaLevel::Moderate => &PLATELETS_MODERATE,
        ThrombocytopeniaLevel::Severe => &PLATELETS_SEVERE,
    }
}
