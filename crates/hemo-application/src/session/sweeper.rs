use super::store::SessionStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Background task evicting sessions older than a TTL.
///
/// The task stops when the sweeper is dropped.
pub struct SessionSweeper {
    handle: JoinHandle<()>,
}

impl SessionSweeper {
    /// Starts sweeping `store` every `every`, evicting sessions older than `ttl`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(store: Arc<SessionStore>, ttl: Duration, every: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(
                "[SessionSweeper] Started (ttl: {}s, interval: {}s)",
                ttl.as_secs(),
                every.as_secs()
            );

            loop {
                ticker.tick().await;
                match store.evict_expired(Utc::now(), ttl).await {
                    Ok(evicted) if !evicted.is_empty() => {
                        tracing::info!(
                            "[SessionSweeper] Evicted {} stale session(s): {:?}",
                            evicted.len(),
                            evicted
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!("[SessionSweeper] Sweep failed, stopping: {}", e);
                        break;
                    }
                }
            }
        });

        Self { handle }
    }

    /// Stops the background task.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for SessionSweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
