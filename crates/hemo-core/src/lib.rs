//! Domain layer for HEMO.
//!
//! Pure types and functions for blood-smear session analysis: the cell-class
//! vocabulary, the engine configuration table, the session state machine,
//! aggregation of per-image counts and the clinical interpretation rules.
//! Nothing in this crate performs I/O.

pub mod aggregation;
pub mod config;
pub mod detector;
pub mod error;
pub mod interpretation;
pub mod session;
pub mod vocabulary;

// Re-export common error type
pub use error::{HemoError, Result};

pub use aggregation::{AggregationResult, aggregate};
pub use config::EngineConfig;
pub use detector::{Detection, Detector};
pub use interpretation::{ClinicalInterpretation, SeverityTier, interpret};
pub use vocabulary::{CellClass, ClassCounts};
