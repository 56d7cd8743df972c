use chrono::{DateTime, Utc};
use hemo_core::EngineConfig;
use hemo_core::config::AnalysisMode;
use hemo_core::error::{HemoError, Result};
use hemo_core::session::{Session, SessionSnapshot, SessionStatus, is_expired, new_session_id};
use hemo_core::vocabulary::ClassCounts;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// A stored session with its creation time kept outside the lock, so the
/// sweeper can judge staleness without waiting on an in-flight upload.
struct SessionSlot {
    created_at: DateTime<Utc>,
    session: Mutex<Session>,
}

/// In-memory store owning every live session.
///
/// The map lock is only held to look up, insert or remove an entry. Each
/// session has its own mutex, so appends and finalization on one session are
/// serialized while unrelated sessions never contend.
pub struct SessionStore {
    config: Arc<EngineConfig>,
    sessions: Arc<RwLock<HashMap<String, Arc<SessionSlot>>>>,
}

impl SessionStore {
    /// Creates an empty store validating modes and magnifications against `config`.
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a new active session and returns its id.
    ///
    /// # Arguments
    ///
    /// * `mode` - Analysis mode id; must be configured
    /// * `magnification` - Magnification tag, or `None` for the configured default
    ///
    /// # Errors
    ///
    /// Returns `InvalidMode` or `UnknownMagnification` before anything is inserted.
    pub async fn create(&self, mode: &str, magnification: Option<&str>) -> Result<String> {
        let mode = self.config.mode(mode)?.clone();
        let magnification = self.config.resolve_magnification(magnification)?.clone();

        let mut sessions = self.sessions.write().await;
        let mut session_id = new_session_id();
        while sessions.contains_key(&session_id) {
            session_id = new_session_id();
        }

        let created_at = Utc::now();
        let session = Session::new(session_id.clone(), mode, magnification, created_at);
        sessions.insert(
            session_id.clone(),
            Arc::new(SessionSlot {
                created_at,
                session: Mutex::new(session),
            }),
        );

        Ok(session_id)
    }

    /// Appends one image's counts and returns its 1-based index.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` for an unknown id
    /// - `SessionFinalized` once the session is closed
    /// - `UnknownClass` if the counts fall outside the mode vocabulary
    pub async fn append(&self, session_id: &str, counts: &ClassCounts) -> Result<usize> {
        let slot = self.slot(session_id).await?;
        let mut session = slot.session.lock().await;
        session.append(counts)
    }

    /// Finalizes the session and returns an immutable snapshot of its images.
    ///
    /// Re-finalizing returns the same snapshot again.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` for an unknown id
    /// - `EmptyAggregation` when nothing was uploaded; the session stays active
    pub async fn finalize(&self, session_id: &str) -> Result<SessionSnapshot> {
        let slot = self.slot(session_id).await?;
        let mut session = slot.session.lock().await;
        session.finalize(Utc::now())
    }

    /// Returns the mode of a session that still accepts uploads.
    pub async fn active_mode(&self, session_id: &str) -> Result<AnalysisMode> {
        let slot = self.slot(session_id).await?;
        let session = slot.session.lock().await;
        session.ensure_active()?;
        Ok(session.mode.clone())
    }

    pub async fn status(&self, session_id: &str) -> Result<SessionStatus> {
        let slot = self.slot(session_id).await?;
        let session = slot.session.lock().await;
        Ok(session.status())
    }

    /// Removes a session regardless of state. Returns whether it existed.
    pub async fn evict(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Removes every session created more than `ttl` before `now`.
    ///
    /// # Returns
    ///
    /// The ids of the evicted sessions.
    pub async fn evict_expired(&self, now: DateTime<Utc>, ttl: Duration) -> Result<Vec<String>> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| HemoError::config(format!("session TTL out of range: {e}")))?;

        let mut sessions = self.sessions.write().await;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, slot)| is_expired(slot.created_at, now, ttl))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            sessions.remove(id);
        }

        Ok(expired)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn slot(&self, session_id: &str) -> Result<Arc<SessionSlot>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| HemoError::session_not_found(session_id))
    }
}
