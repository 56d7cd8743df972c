//! Error types for the HEMO engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad grouping of [`HemoError`] variants.
///
/// Callers use the category to decide whether to retry, skip, or report
/// a failure back to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Rejected before any mutation (bad mode, magnification, class label).
    InputValidation,
    /// Session does not exist or is in the wrong state.
    Lifecycle,
    /// The detector failed or timed out for a single image.
    Upstream,
    /// Aggregation could not produce a defined result.
    Computation,
    /// Configuration, I/O and other infrastructure failures.
    Infrastructure,
}

/// A shared error type for the entire HEMO engine.
///
/// Every variant carries enough context (session id, offending tag) for the
/// caller to react without parsing the message.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HemoError {
    /// The requested analysis mode is not in the configured vocabulary
    #[error("Invalid mode '{mode}'. Available modes: {available:?}")]
    InvalidMode { mode: String, available: Vec<String> },

    /// The magnification tag has no conversion factor
    #[error("Unknown magnification '{magnification}'")]
    UnknownMagnification { magnification: String },

    /// A detector label that does not name any known cell class
    #[error("Unknown cell class '{label}'")]
    UnknownClass { label: String },

    /// Upload mode does not match the mode the session was started with
    #[error("Session '{session_id}' runs mode '{expected}', got '{actual}'")]
    ModeMismatch {
        session_id: String,
        expected: String,
        actual: String,
    },

    /// No live session with this id
    #[error("Session not found: '{session_id}'")]
    SessionNotFound { session_id: String },

    /// The session no longer accepts uploads
    #[error("Session '{session_id}' is finalized and accepts no further images")]
    SessionFinalized { session_id: String },

    /// The detector reported a failure for one image
    #[error("Detection failed for session '{session_id}': {message}")]
    DetectionFailed { session_id: String, message: String },

    /// The detector did not answer within the configured bound
    #[error("Detection timed out for session '{session_id}' after {timeout_ms} ms")]
    DetectionTimeout { session_id: String, timeout_ms: u64 },

    /// Aggregation over zero images
    #[error(
        "Cannot aggregate zero images (session: {})",
        .session_id.as_deref().unwrap_or("-")
    )]
    EmptyAggregation { session_id: Option<String> },

    /// A count or sum of counts does not fit in `u64`
    #[error("Count overflow: {context}")]
    CountOverflow { context: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HemoError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidMode error listing the modes that would have been accepted
    pub fn invalid_mode<I, S>(mode: impl Into<String>, available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::InvalidMode {
            mode: mode.into(),
            available: available.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an UnknownMagnification error
    pub fn unknown_magnification(magnification: impl Into<String>) -> Self {
        Self::UnknownMagnification {
            magnification: magnification.into(),
        }
    }

    /// Creates a SessionNotFound error
    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Self::SessionNotFound {
            session_id: session_id.into(),
        }
    }

    /// Creates a SessionFinalized error
    pub fn session_finalized(session_id: impl Into<String>) -> Self {
        Self::SessionFinalized {
            session_id: session_id.into(),
        }
    }

    /// Creates a DetectionFailed error
    pub fn detection_failed(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DetectionFailed {
            session_id: session_id.into(),
            message: message.into(),
        }
    }

    /// Creates an EmptyAggregation error bound to a session
    pub fn empty_aggregation(session_id: impl Into<String>) -> Self {
        Self::EmptyAggregation {
            session_id: Some(session_id.into()),
        }
    }

    /// Creates a CountOverflow error
    pub fn count_overflow(context: impl Into<String>) -> Self {
        Self::CountOverflow {
            context: context.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Returns the category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidMode { .. }
            | Self::UnknownMagnification { .. }
            | Self::UnknownClass { .. }
            | Self::ModeMismatch { .. } => ErrorCategory::InputValidation,
            Self::SessionNotFound { .. } | Self::SessionFinalized { .. } => {
                ErrorCategory::Lifecycle
            }
            Self::DetectionFailed { .. } | Self::DetectionTimeout { .. } => {
                ErrorCategory::Upstream
            }
            Self::EmptyAggregation { .. } | Self::CountOverflow { .. } => {
                ErrorCategory::Computation
            }
            Self::Config(_) | Self::Io { .. } | Self::Serialization { .. } | Self::Internal(_) => {
                ErrorCategory::Infrastructure
            }
        }
    }

    /// Check if this is a SessionNotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound { .. })
    }

    /// Check if this error was reported for a single image by the detector.
    ///
    /// Upstream errors never abort a batch: the caller may retry the image or
    /// skip it and keep uploading.
    pub fn is_upstream(&self) -> bool {
        self.category() == ErrorCategory::Upstream
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for HemoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for HemoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HemoError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for HemoError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, HemoError>`.
pub type Result<T> = std::result::Result<T, HemoError>;
