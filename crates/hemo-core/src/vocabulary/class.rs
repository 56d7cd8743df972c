//! Cell classes a detector can report.

use crate::error::{HemoError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The closed set of object classes any analysis mode may count.
///
/// Detector labels are parsed into this enum so that a misspelled class name
/// fails loudly instead of opening a new bucket in the totals. Several
/// spellings map to one class ("WBC" and "Leukocyte" are the same cell).
/// Deserialization goes through [`CellClass::from_label`], so serialized
/// configs and detector responses accept the same spellings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum CellClass {
    #[serde(rename = "RBC")]
    #[strum(to_string = "RBC", serialize = "Red Blood Cell", serialize = "red_blood_cell")]
    RedBloodCell,
    #[serde(rename = "WBC")]
    #[strum(
        to_string = "WBC",
        serialize = "Leukocyte",
        serialize = "White Blood Cell",
        serialize = "white_blood_cell"
    )]
    WhiteBloodCell,
    Platelet,
    Trophozoite,
    Ring,
    Schizont,
    Gametocyte,
    /// Objects the annotators could not assign to a stage.
    Difficult,
}

impl CellClass {
    /// Parses a detector label, accepting the aliases listed on each variant.
    pub fn from_label(label: &str) -> Result<Self> {
        Self::from_str(label.trim()).map_err(|_| HemoError::UnknownClass {
            label: label.to_string(),
        })
    }

    /// Whether this class is a malaria parasite stage (not a host blood cell).
    pub fn is_parasite(self) -> bool {
        matches!(
            self,
            Self::Trophozoite | Self::Ring | Self::Schizont | Self::Gametocyte
        )
    }

    /// All parasite stages, in declaration order.
    pub fn parasites() -> impl Iterator<Item = CellClass> {
        Self::iter().filter(|class| class.is_parasite())
    }
}

impl TryFrom<String> for CellClass {
    type Error = HemoError;

    fn try_from(label: String) -> Result<Self> {
        Self::from_label(&label)
    }
}
