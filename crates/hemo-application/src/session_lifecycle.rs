//! Session lifecycle use case.
//!
//! This module provides the `SessionLifecycle` which orchestrates the
//! detector, the session store, aggregation and interpretation behind the
//! three boundary operations: start, upload and finalize.

use crate::session::SessionStore;
use hemo_core::aggregation::{AggregationResult, aggregate_snapshot};
use hemo_core::config::{AnalysisMode, Magnification};
use hemo_core::error::{HemoError, Result};
use hemo_core::interpretation::{ClinicalInterpretation, interpret};
use hemo_core::session::SessionStatus;
use hemo_core::vocabulary::ClassCounts;
use hemo_core::{Detector, EngineConfig};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub session_id: String,
    /// 1-based position of the image within the session
    pub image_index: usize,
    pub counts: ClassCounts,
    pub annotated_image: Vec<u8>,
}

/// Aggregated metrics and interpretation of a finalized session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub mode: String,
    pub magnification: String,
    pub aggregation: AggregationResult,
    pub interpretation: ClinicalInterpretation,
}

/// Use case coordinating a diagnostic session from start to report.
///
/// # Responsibilities
///
/// - Creating sessions with a validated mode and magnification
/// - Running the detector on each uploaded image without holding any lock,
///   bounded by the configured timeout
/// - Appending successful detections; failed images leave the session untouched
/// - Aggregating and interpreting the session on finalize
pub struct SessionLifecycle {
    config: Arc<EngineConfig>,
    store: Arc<SessionStore>,
    detector: Arc<dyn Detector>,
    detection_timeout: Duration,
}

impl SessionLifecycle {
    /// Creates a new `SessionLifecycle` instance.
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration table, shared read-only
    /// * `store` - Session store owning all live sessions
    /// * `detector` - Detector adapter invoked once per uploaded image
    pub fn new(
        config: Arc<EngineConfig>,
        store: Arc<SessionStore>,
        detector: Arc<dyn Detector>,
    ) -> Self {
        let detection_timeout = config.engine.detection_timeout();
        Self {
            config,
            store,
            detector,
            detection_timeout,
        }
    }

    /// Overrides the detector timeout taken from the configuration.
    pub fn with_detection_timeout(mut self, detection_timeout: Duration) -> Self {
        self.detection_timeout = detection_timeout;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Starts a session and returns its id.
    ///
    /// # Errors
    ///
    /// `InvalidMode` or `UnknownMagnification`.
    pub async fn start_session(&self, mode: &str, magnification: Option<&str>) -> Result<String> {
        let session_id = self.store.create(mode, magnification).await?;
        tracing::info!(
            "[SessionLifecycle] Started session {} (mode: {}, magnification: {})",
            session_id,
            mode,
            magnification.unwrap_or(&self.config.engine.default_magnification)
        );
        Ok(session_id)
    }

    /// Runs detection on one image and appends its counts to the session.
    ///
    /// # Arguments
    ///
    /// * `session_id` - Target session
    /// * `image` - Raw image bytes, passed to the detector untouched
    /// * `mode` - Mode named by the caller; must match the session's mode when given
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` / `SessionFinalized` for a missing or closed session
    /// - `ModeMismatch` when `mode` differs from the session's mode
    /// - `DetectionFailed` when the detector errors or reports foreign classes
    /// - `DetectionTimeout` when the detector exceeds the configured bound
    ///
    /// A failed upload never modifies the session; the caller may retry the
    /// image or skip it and continue the batch.
    pub async fn upload_image(
        &self,
        session_id: &str,
        image: &[u8],
        mode: Option<&str>,
    ) -> Result<UploadOutcome> {
        let session_mode = self.store.active_mode(session_id).await?;
        if let Some(requested) = mode
            && requested != session_mode.id
        {
            return Err(HemoError::ModeMismatch {
                session_id: session_id.to_string(),
                expected: session_mode.id.clone(),
                actual: requested.to_string(),
            });
        }

        let detection = self.detect(session_id, image, &session_mode).await?;
        detection
            .counts
            .ensure_within(&session_mode.classes)
            .map_err(|e| HemoError::detection_failed(session_id, e.to_string()))?;
        detection
            .counts
            .total()
            .map_err(|e| HemoError::detection_failed(session_id, e.to_string()))?;

        let image_index = self.store.append(session_id, &detection.counts).await?;
        tracing::debug!(
            "[SessionLifecycle] Session {} image #{}: {:?}",
            session_id,
            image_index,
            detection.counts
        );

        Ok(UploadOutcome {
            session_id: session_id.to_string(),
            image_index,
            counts: detection.counts,
            annotated_image: detection.annotated_image,
        })
    }

    /// Finalizes the session and returns its aggregated report.
    ///
    /// Finalizing an already finalized session returns the same report.
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, or `EmptyAggregation` when no image was uploaded.
    pub async fn finalize_session(&self, session_id: &str) -> Result<SessionReport> {
        let snapshot = self.store.finalize(session_id).await?;
        let aggregation = aggregate_snapshot(&snapshot, &self.config.magnifications)?;
        let interpretation = interpret(&aggregation, &snapshot.mode, &self.config.thresholds)?;

        tracing::info!(
            "[SessionLifecycle] Finalized session {}: {} image(s), {} detection(s), tier {}",
            session_id,
            aggregation.images_count,
            aggregation.total_detections,
            interpretation.severity_tier
        );

        Ok(SessionReport {
            session_id: snapshot.session_id,
            mode: snapshot.mode.id,
            magnification: snapshot.magnification.id,
            aggregation,
            interpretation,
        })
    }

    pub async fn session_status(&self, session_id: &str) -> Result<SessionStatus> {
        self.store.status(session_id).await
    }

    /// Configured analysis modes with their class vocabularies.
    pub fn available_modes(&self) -> &[AnalysisMode] {
        &self.config.modes
    }

    pub fn magnifications(&self) -> &[Magnification] {
        &self.config.magnifications
    }

    async fn detect(
        &self,
        session_id: &str,
        image: &[u8],
        mode: &AnalysisMode,
    ) -> Result<hemo_core::Detection> {
        match timeout(self.detection_timeout, self.detector.detect(image, mode)).await {
            Ok(Ok(detection)) => Ok(detection),
            Ok(Err(e)) => {
                tracing::warn!(
                    "[SessionLifecycle] Detection failed for session {}: {:#}",
                    session_id,
                    e
                );
                Err(HemoError::detection_failed(session_id, format!("{e:#}")))
            }
            Err(_) => {
                tracing::warn!(
                    "[SessionLifecycle] Detection timed out for session {} after {:?}",
                    session_id,
                    self.detection_timeout
                );
                Err(HemoError::DetectionTimeout {
                    session_id: session_id.to_string(),
                    timeout_ms: self.detection_timeout.as_millis() as u64,
                })
            }
        }
    }
}
