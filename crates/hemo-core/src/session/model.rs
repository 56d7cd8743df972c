//! Session domain model.
//!
//! A session is one diagnostic batch run: a fixed mode and magnification and
//! an append-only list of per-image counts.

use crate::config::{AnalysisMode, Magnification};
use crate::error::{HemoError, Result};
use crate::vocabulary::ClassCounts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Accepting uploads.
    Active,
    /// Closed for uploads; only re-finalization is allowed.
    Finalized,
}

/// Represents one diagnostic run held in memory.
///
/// The mode and magnification are fixed when the session is created. `images`
/// only ever grows, and only while the session is [`SessionState::Active`].
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    pub mode: AnalysisMode,
    pub magnification: Magnification,
    images: Vec<ClassCounts>,
    state: SessionState,
    /// Creation time, used for staleness eviction
    pub created_at: DateTime<Utc>,
    finalized_at: Option<DateTime<Utc>>,
}

/// Immutable copy of a finalized session, handed to aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub mode: AnalysisMode,
    pub magnification: Magnification,
    pub images: Vec<ClassCounts>,
    pub finalized_at: DateTime<Utc>,
}

/// Lightweight view of a session for status queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub mode_id: String,
    pub magnification_id: String,
    pub state: SessionState,
    pub images_count: usize,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        mode: AnalysisMode,
        magnification: Magnification,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            mode,
            magnification,
            images: Vec::new(),
            state: SessionState::Active,
            created_at,
            finalized_at: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn images(&self) -> &[ClassCounts] {
        &self.images
    }

    /// Fails with `SessionFinalized` unless the session still accepts uploads.
    pub fn ensure_active(&self) -> Result<()> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Finalized => Err(HemoError::session_finalized(&self.id)),
        }
    }

    /// Appends one image's counts and returns its 1-based position.
    ///
    /// The counts are stored zero-filled over the mode vocabulary.
    ///
    /// # Errors
    ///
    /// - `SessionFinalized` once the session is closed
    /// - `UnknownClass` if the counts name a class outside the mode vocabulary
    pub fn append(&mut self, counts: &ClassCounts) -> Result<usize> {
        self.ensure_active()?;
        counts.ensure_within(&self.mode.classes)?;
        self.images.push(counts.restricted_to(&self.mode.classes));
        Ok(self.images.len())
    }

    /// Closes the session and returns a snapshot of its images.
    ///
    /// Finalizing an already finalized session returns the same snapshot
    /// again; the images cannot have changed in between.
    ///
    /// # Errors
    ///
    /// Returns `EmptyAggregation` and leaves the session active when no image
    /// has been appended yet.
    pub fn finalize(&mut self, now: DateTime<Utc>) -> Result<SessionSnapshot> {
        if self.images.is_empty() {
            return Err(HemoError::empty_aggregation(&self.id));
        }
        let finalized_at = *self.finalized_at.get_or_insert(now);
        self.state = SessionState::Finalized;

        Ok(SessionSnapshot {
            session_id: self.id.clone(),
            mode: self.mode.clone(),
            magnification: self.magnification.clone(),
            images: self.images.clone(),
            finalized_at,
        })
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id.clone(),
            mode_id: self.mode.id.clone(),
            magnification_id: self.magnification.id.clone(),
            state: self.state,
            images_count: self.images.len(),
            created_at: self.created_at,
        }
    }
}
