//! Detector port.
//!
//! The detector is an external collaborator: given raw image bytes and an
//! analysis mode it reports per-class counts and an annotated image. The
//! engine never looks inside it.

use crate::config::AnalysisMode;
use crate::vocabulary::ClassCounts;
use async_trait::async_trait;

/// Output of one detector call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub counts: ClassCounts,
    /// Encoded image with detections drawn on it, passed through untouched
    pub annotated_image: Vec<u8>,
}

/// Port for running object detection on one microscope field.
///
/// Implementations may be slow (seconds) and may fail; callers bound each
/// call with a timeout and never hold a session lock across it.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Detects objects in `image` using the model for `mode`.
    ///
    /// # Errors
    ///
    /// Any failure to produce counts (model unavailable, undecodable image,
    /// transport error) is reported as an error for this image only.
    async fn detect(&self, image: &[u8], mode: &AnalysisMode) -> anyhow::Result<Detection>;
}
