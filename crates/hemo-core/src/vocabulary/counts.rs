//! Per-image detection counts.

use super::class::CellClass;
use crate::error::{HemoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Count of detected objects per cell class for one microscope field.
///
/// A class that is absent from the map counts as zero; a field may
/// legitimately contain none of a class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassCounts(BTreeMap<CellClass, u64>);

impl ClassCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds counts from detector labels, rejecting labels that name no class.
    ///
    /// Labels that resolve to the same class (e.g. "WBC" and "Leukocyte") are summed.
    ///
    /// # Errors
    ///
    /// `UnknownClass` for an unparseable label, `CountOverflow` when summed
    /// aliases exceed `u64`.
    pub fn from_labels<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut counts = Self::new();
        for (label, count) in labels {
            counts.add(CellClass::from_label(label.as_ref())?, count)?;
        }
        Ok(counts)
    }

    /// Every class of `vocabulary` present with a zero count.
    pub fn zeroed(vocabulary: &[CellClass]) -> Self {
        Self(vocabulary.iter().map(|class| (*class, 0)).collect())
    }

    /// Returns the count for `class`, zero when absent.
    pub fn get(&self, class: CellClass) -> u64 {
        self.0.get(&class).copied().unwrap_or(0)
    }

    /// Adds `count` to the running value for `class`.
    ///
    /// # Errors
    ///
    /// `CountOverflow` if the sum exceeds `u64`; the stored value is unchanged.
    pub fn add(&mut self, class: CellClass, count: u64) -> Result<()> {
        let slot = self.0.entry(class).or_insert(0);
        *slot = slot
            .checked_add(count)
            .ok_or_else(|| HemoError::count_overflow(format!("total of class {class}")))?;
        Ok(())
    }

    /// Builder-style setter, replacing any previous count for `class`.
    pub fn with(mut self, class: CellClass, count: u64) -> Self {
        self.0.insert(class, count);
        self
    }

    /// Sum over all classes.
    ///
    /// # Errors
    ///
    /// `CountOverflow` when the sum exceeds `u64`.
    pub fn total(&self) -> Result<u64> {
        self.0
            .values()
            .try_fold(0u64, |sum, count| sum.checked_add(*count))
            .ok_or_else(|| HemoError::count_overflow("sum over all classes"))
    }

    /// Adds every count in `other` to `self`.
    ///
    /// Stops at the first overflowing class, leaving earlier classes merged.
    pub fn merge(&mut self, other: &ClassCounts) -> Result<()> {
        for (class, count) in other.iter() {
            self.add(class, count)?;
        }
        Ok(())
    }

    /// Iterates over the explicitly present classes in class order.
    pub fn iter(&self) -> impl Iterator<Item = (CellClass, u64)> + '_ {
        self.0.iter().map(|(class, count)| (*class, *count))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks that every class with a non-zero count belongs to `vocabulary`.
    ///
    /// Explicit zeros for foreign classes are tolerated; they cannot change any total.
    pub fn ensure_within(&self, vocabulary: &[CellClass]) -> Result<()> {
        match self
            .iter()
            .find(|(class, count)| *count > 0 && !vocabulary.contains(class))
        {
            Some((class, _)) => Err(HemoError::UnknownClass {
                label: class.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Returns a copy holding exactly the vocabulary classes, zero-filled.
    pub fn restricted_to(&self, vocabulary: &[CellClass]) -> ClassCounts {
        ClassCounts(
            vocabulary
                .iter()
                .map(|class| (*class, self.get(*class)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_class_is_zero() {
        let counts = ClassCounts::new().with(CellClass::Platelet, 3);
        assert_eq!(counts.get(CellClass::Platelet), 3);
        assert_eq!(counts.get(CellClass::Ring), 0);
        assert_eq!(counts.total().unwrap(), 3);
    }

    #[test]
    fn test_from_labels_sums_aliases() {
        let counts =
            ClassCounts::from_labels([("WBC", 2), ("Leukocyte", 1), ("RBC", 150)]).unwrap();
        assert_eq!(counts.get(CellClass::WhiteBloodCell), 3);
        assert_eq!(counts.get(CellClass::RedBloodCell), 150);
    }

    #[test]
    fn test_from_labels_overflowing_aliases() {
        let result = ClassCounts::from_labels([("WBC", u64::MAX), ("Leukocyte", 1)]);
        assert!(matches!(result, Err(HemoError::CountOverflow { .. })));
    }

    #[test]
    fn test_add_and_total_are_checked() {
        let mut counts = ClassCounts::new().with(CellClass::Platelet, u64::MAX);
        assert!(counts.add(CellClass::Platelet, 1).is_err());
        assert_eq!(counts.get(CellClass::Platelet), u64::MAX);

        counts.add(CellClass::RedBloodCell, 1).unwrap();
        assert!(matches!(
            counts.total(),
            Err(HemoError::CountOverflow { .. })
        ));
    }

    #[test]
    fn test_merge() {
        let mut counts = ClassCounts::new().with(CellClass::Ring, 2);
        counts
            .merge(&ClassCounts::new().with(CellClass::Ring, 3).with(CellClass::Schizont, 1))
            .unwrap();
        assert_eq!(counts.get(CellClass::Ring), 5);
        assert_eq!(counts.total().unwrap(), 6);
    }

    #[test]
    fn test_deserialize_accepts_label_spellings() {
        let counts: ClassCounts =
            serde_json::from_str(r#"{"red_blood_cell": 150, "white_blood_cell": 2, "platelet": 8}"#)
                .unwrap();
        assert_eq!(
            counts,
            ClassCounts::from_labels([("RBC", 150), ("WBC", 2), ("Platelet", 8)]).unwrap()
        );
        assert!(serde_json::from_str::<ClassCounts>(r#"{"Blob": 1}"#).is_err());
    }

    #[test]
    fn test_from_labels_rejects_unknown() {
        let result = ClassCounts::from_labels([("Platelet", 2), ("Blob", 1)]);
        assert!(matches!(result, Err(HemoError::UnknownClass { .. })));
    }

    #[test]
    fn test_ensure_within_vocabulary() {
        let vocabulary = [CellClass::Trophozoite];
        let ok = ClassCounts::new()
            .with(CellClass::Trophozoite, 4)
            .with(CellClass::Ring, 0);
        assert!(ok.ensure_within(&vocabulary).is_ok());

        let foreign = ClassCounts::new().with(CellClass::Platelet, 1);
        assert!(foreign.ensure_within(&vocabulary).is_err());
    }

    #[test]
    fn test_restricted_to_zero_fills() {
        let vocabulary = [CellClass::WhiteBloodCell, CellClass::RedBloodCell, CellClass::Platelet];
        let counts = ClassCounts::new().with(CellClass::Platelet, 8);
        let restricted = counts.restricted_to(&vocabulary);
        assert_eq!(restricted.iter().count(), 3);
        assert_eq!(restricted.get(CellClass::WhiteBloodCell), 0);
        assert_eq!(restricted.get(CellClass::Platelet), 8);
    }

    #[test]
    fn test_json_shape() {
        let counts = ClassCounts::new()
            .with(CellClass::WhiteBloodCell, 2)
            .with(CellClass::Platelet, 8);
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json, serde_json::json!({"WBC": 2, "Platelet": 8}));
    }
}
