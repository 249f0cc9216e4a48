//! Deferred Recheck Scheduler: one more look after late packets land.
//!
//! Damage notifications can overtake the attack animation that caused them.
//! When the first attribution attempt finds nothing, the engine registers a
//! [`RecheckKey`] here and a one-shot timer re-runs attribution after a
//! fixed delay.
//!
//! ```text
//! RECEIVED ──attribute──▶ RESOLVED
//!     │
//!     └─none──▶ PENDING ──delay──▶ RECHECKED ──▶ RESOLVED | UNRESOLVED (dropped)
//! ```
//!
//! Each key fires at most once. Registering a key that is already pending
//! supersedes the earlier timer (it is aborted and never fires). Shutdown
//! aborts everything still pending.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::error::{HitmarkError, Result};
use crate::types::{EntityId, Timestamp};

/// Identity of one pending recheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecheckKey {
    /// When the unexplained damage was observed.
    pub damage_at: Timestamp,
    /// Who took the damage.
    pub victim: EntityId,
}

#[derive(Debug)]
struct PendingRecheck {
    generation: u64,
    timer: AbortHandle,
}

/// Whether a registration started fresh or replaced a pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// No recheck was pending for the key.
    New,
    /// An earlier recheck for the key was cancelled in favour of this one.
    Superseded,
}

/// One-shot delayed re-attribution timers.
#[derive(Debug)]
pub struct RecheckScheduler {
    pending: Arc<DashMap<RecheckKey, PendingRecheck>>,
    next_generation: AtomicU64,
    delay: Duration,
    shut_down: AtomicBool,
}

impl RecheckScheduler {
    /// Create a scheduler firing `delay` after each registration.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(0),
            delay,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Delay between registration and firing.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm a timer that runs `recheck` once, `delay` from now, unless the
    /// key is superseded or the scheduler is shut down first.
    ///
    /// Never blocks; the timer runs on the current tokio runtime.
    ///
    /// # Errors
    /// [`HitmarkError::SchedulerShutdown`] after [`shutdown`](Self::shutdown),
    /// [`HitmarkError::NoRuntime`] when called outside a tokio runtime.
    pub fn schedule<F>(&self, key: RecheckKey, recheck: F) -> Result<Scheduled>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(HitmarkError::SchedulerShutdown);
        }
        let runtime = Handle::try_current().map_err(|_| HitmarkError::NoRuntime)?;
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);
        let delay = self.delay;

        // The entry stays locked until the token is stored, so even a zero
        // delay cannot fire before its own registration exists.
        let slot = self.pending.entry(key);
        let timer = runtime
            .spawn(async move {
                tokio::time::sleep(delay).await;
                let still_ours = pending
                    .remove_if(&key, |_, token| token.generation == generation)
                    .is_some();
                if still_ours {
                    debug!(victim = %key.victim, damage_at = %key.damage_at, "Running deferred recheck");
                    recheck();
                }
            })
            .abort_handle();

        let token = PendingRecheck { generation, timer };
        let outcome = match slot {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.insert(token);
                previous.timer.abort();
                Scheduled::Superseded
            }
            Entry::Vacant(vacant) => {
                vacant.insert(token);
                Scheduled::New
            }
        };
        debug!(
            victim = %key.victim,
            damage_at = %key.damage_at,
            delay_ms = delay.as_millis(),
            ?outcome,
            "Recheck scheduled"
        );
        Ok(outcome)
    }

    /// Whether a recheck for `key` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, key: &RecheckKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Number of rechecks waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Abort every pending recheck and refuse new ones.
    ///
    /// Returns how many timers were cancelled.
    pub fn shutdown(&self) -> usize {
        self.shut_down.store(true, Ordering::Release);
        let mut cancelled = 0;
        self.pending.retain(|_, token| {
            token.timer.abort();
            cancelled += 1;
            false
        });
        if cancelled > 0 {
            debug!(cancelled, "Recheck scheduler shut down");
        }
        cancelled
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

impl Drop for RecheckScheduler {
    fn drop(&mut self) {
        for token in self.pending.iter() {
            token.timer.abort();
        }
    }
}
