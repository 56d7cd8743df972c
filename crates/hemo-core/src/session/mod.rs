//! Session domain module.
//!
//! - `model`: the [`Session`] entity, its [`SessionState`] and the
//!   [`SessionSnapshot`] produced on finalization
//!
//! Concurrent access to sessions lives in the application layer; this module
//! only holds the state transitions.

mod model;

pub use model::{Session, SessionSnapshot, SessionState, SessionStatus};

use chrono::{DateTime, Duration, Utc};

/// Generates a fresh, unguessable session identifier.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Whether a session created at `created_at` is older than `ttl` at `now`.
pub fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    now - created_at > ttl
}
