//! Application layer for HEMO.
//!
//! This crate provides the session store and the lifecycle use case that
//! coordinate the detector with the domain's aggregation and interpretation.

pub mod session;
pub mod session_lifecycle;

pub use session::{SessionStore, SessionSweeper};
pub use session_lifecycle::{SessionLifecycle, SessionReport, UploadOutcome};
