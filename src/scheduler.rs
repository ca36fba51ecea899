//! # Turn Scheduler
//!
//! Runs the bot's turns as delayed, cancellable background tasks. Each
//! session has at most one pending bot task; scheduling a new one replaces
//! the old, and any terminal transition cancels whatever is pending so a
//! stale bot move can never fire into a finished session.

use crate::session::SessionId;
use log::debug;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Bounds for the bot's artificial "thinking" delay, in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct ThinkDelay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for ThinkDelay {
    fn default() -> Self {
        Self {
            min_ms: 400,
            max_ms: 1600,
        }
    }
}

impl ThinkDelay {
    /// Zero delay, for tests that want the bot to move immediately.
    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }
}

/// Tracks the pending bot task per session.
pub struct TurnScheduler {
    tasks: Arc<Mutex<HashMap<SessionId, JoinHandle<()>>>>,
    delay: ThinkDelay,
}

impl TurnScheduler {
    pub fn new(delay: ThinkDelay) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            delay,
        }
    }

    /// Spawns `work` after the randomized think delay, replacing (and
    /// aborting) any task already pending for the session.
    ///
    /// The task deregisters itself once the delay elapses, before `work`
    /// runs: the work may finish the session and cancel this id, and must
    /// not abort itself mid-settlement. Cancellation therefore only ever
    /// lands on tasks that are still sleeping; anything past the sleep is
    /// discarded by the work's own re-validation instead.
    pub fn schedule<F>(&self, id: SessionId, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.think_delay();
        debug!("session {}: bot turn scheduled in {:?}", id, delay);
        let tasks = Arc::clone(&self.tasks);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tasks.lock().remove(&id);
            work.await;
        });
        let mut tasks = self.tasks.lock();
        if let Some(previous) = tasks.insert(id, handle) {
            previous.abort();
        }
        // A zero-delay task can already be done here; drop the spent handle.
        if tasks.get(&id).map_or(false, |h| h.is_finished()) {
            tasks.remove(&id);
        }
    }

    /// Aborts the pending bot task for the session, if any. Safe to call
    /// whether or not one exists or has already completed.
    pub fn cancel(&self, id: SessionId) {
        if let Some(handle) = self.tasks.lock().remove(&id) {
            handle.abort();
            debug!("session {}: pending bot turn cancelled", id);
        }
    }

    fn think_delay(&self) -> Duration {
        let ThinkDelay { min_ms, max_ms } = self.delay;
        let ms = if max_ms > min_ms {
            rand::thread_rng().gen_range(min_ms..=max_ms)
        } else {
            min_ms
        };
        Duration::from_millis(ms)
    }
}
