//! Debounce + max-wait batch engine
//!
//! State machine:
//!
//! - **Idle**: nothing pending, no timer armed
//! - **Pending**: at least one fragment buffered. Each enqueue pushes the
//!   debounce deadline out; the max-wait deadline is fixed by the first
//!   fragment of the batch. The batch is due at the earlier of the two.
//! - **Flushing**: the pending buffer is swapped out under the lock and the
//!   engine is back to Idle before projection and the callback run, so
//!   producers enqueueing meanwhile start the next batch
//! - **Closed**: terminal, after one final flush
//!
//! A single timer is armed per batch. Because the due instant only ever
//! moves later, a timer that wakes early simply re-arms for the current
//! due instant. Each timer carries a token; a timer whose token no longer
//! matches the armed one belongs to a drained batch and does nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, info};

use super::batch::{EngineStats, FlushReason};
use super::config::ReceiverConfig;
use super::dispatch::FlushDispatcher;
use crate::error::{ReceiverError, Result};
use crate::fragment::Fragment;
use crate::ports::{BatchEngine, Scheduler, TimerHandle};

struct ArmedTimer {
    token: u64,
    handle: Box<dyn TimerHandle>,
}

#[derive(Default)]
struct EngineState {
    pending: Vec<Fragment>,
    debounce_deadline: Option<Instant>,
    max_wait_deadline: Option<Instant>,
    timer: Option<ArmedTimer>,
    next_token: u64,
    closed: bool,
}

impl EngineState {
    fn due_at(&self) -> Option<Instant> {
        match (self.debounce_deadline, self.max_wait_deadline) {
            (Some(debounce), Some(max_wait)) => Some(debounce.min(max_wait)),
            (debounce, max_wait) => debounce.or(max_wait),
        }
    }

    /// Detach the pending batch and return to Idle
    fn drain(&mut self) -> Vec<Fragment> {
        if let Some(timer) = self.timer.take() {
            timer.handle.cancel();
        }
        self.debounce_deadline = None;
        self.max_wait_deadline = None;
        std::mem::take(&mut self.pending)
    }
}

struct EngineInner<S> {
    config: ReceiverConfig,
    scheduler: S,
    dispatcher: FlushDispatcher,
    state: Mutex<EngineState>,
}

impl<S> EngineInner<S>
where
    S: Scheduler + 'static,
{
    // The lock is never held across user code, so a poisoned state is still consistent
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(self: &Arc<Self>, fragments: Vec<Fragment>) -> Result<()> {
        let overdue = {
            let mut state = self.lock();
            if state.closed {
                return Err(ReceiverError::EngineClosed);
            }
            if fragments.is_empty() {
                return Ok(());
            }

            let now = self.scheduler.now();
            state
                .pending
                .extend(fragments.into_iter().map(|fragment| fragment.received(now)));
            // A bound too large to represent on the clock is no bound at all
            if state.max_wait_deadline.is_none() {
                state.max_wait_deadline = now.checked_add(self.config.max_wait);
            }

            if state.max_wait_deadline.is_some_and(|deadline| now >= deadline) {
                Some(state.drain())
            } else {
                state.debounce_deadline = now.checked_add(self.config.debounce_interval);
                if state.timer.is_none() {
                    if let Some(due) = state.due_at() {
                        self.arm(&mut state, due);
                    }
                }
                None
            }
        };

        if let Some(batch) = overdue {
            self.dispatcher.dispatch(batch, FlushReason::Overdue);
        }
        Ok(())
    }

    fn arm(self: &Arc<Self>, state: &mut EngineState, deadline: Instant) {
        state.next_token = state.next_token.wrapping_add(1);
        let token = state.next_token;
        let engine = Arc::downgrade(self);
        let handle = self.scheduler.schedule(
            deadline,
            Box::new(move || {
                if let Some(engine) = engine.upgrade() {
                    engine.on_timer(token);
                }
            }),
        );
        state.timer = Some(ArmedTimer { token, handle });
    }

    fn on_timer(self: &Arc<Self>, token: u64) {
        let (batch, reason) = {
            let mut state = self.lock();
            if state.timer.as_ref().map(|timer| timer.token) != Some(token) {
                return;
            }
            state.timer = None;

            let Some(due) = state.due_at() else {
                return;
            };
            let now = self.scheduler.now();
            if now < due {
                self.arm(&mut state, due);
                return;
            }

            let reason = if state.max_wait_deadline.is_some_and(|max_wait| now >= max_wait) {
                FlushReason::MaxWait
            } else {
                FlushReason::Debounce
            };
            (state.drain(), reason)
        };

        self.dispatcher.dispatch(batch, reason);
    }

    fn flush(&self) -> Result<()> {
        let batch = {
            let mut state = self.lock();
            if state.closed {
                return Err(ReceiverError::EngineClosed);
            }
            state.drain()
        };

        self.dispatcher.dispatch(batch, FlushReason::Explicit);
        Ok(())
    }

    fn close(&self) {
        let batch = {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.drain()
        };

        info!(remaining = batch.len(), "Closing batch engine");
        self.dispatcher.dispatch(batch, FlushReason::Close);
    }
}

/// Thread-safe debounce + max-wait batch engine
///
/// The engine is generic over its [`Scheduler`], which supplies both the
/// clock and the timer. Dropping the engine closes it.
///
/// # Example
///
/// ```rust,ignore
/// let engine = EngineBuilder::new(ReceiverConfig::default())
///     .build_debounced(scheduler, |batch| {
///         for layer in batch.layers() {
///             renderer.update(&layer.layer_key, &layer.fragments)?;
///         }
///         Ok(())
///     })?;
///
/// engine.enqueue(fragment)?;
/// ```
pub struct DebouncedBatchEngine<S>
where
    S: Scheduler + 'static,
{
    inner: Arc<EngineInner<S>>,
}

impl<S> DebouncedBatchEngine<S>
where
    S: Scheduler + 'static,
{
    pub(crate) fn new(config: ReceiverConfig, scheduler: S, dispatcher: FlushDispatcher) -> Self {
        info!(
            debounce_ms = config.debounce_interval.as_millis() as u64,
            max_wait_ms = config.max_wait.as_millis() as u64,
            grouping = ?config.grouping_dimensions,
            "Created debounced batch engine"
        );

        Self {
            inner: Arc::new(EngineInner {
                config,
                scheduler,
                dispatcher,
                state: Mutex::new(EngineState::default()),
            }),
        }
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.inner.config
    }

    /// Number of fragments waiting for the next flush
    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn stats(&self) -> EngineStats {
        self.inner.dispatcher.stats()
    }
}

impl<S> BatchEngine for DebouncedBatchEngine<S>
where
    S: Scheduler + 'static,
{
    fn enqueue(&self, fragment: Fragment) -> Result<()> {
        self.inner.enqueue(vec![fragment])
    }

    fn enqueue_many(&self, fragments: Vec<Fragment>) -> Result<()> {
        debug!(count = fragments.len(), "Enqueueing fragments");
        self.inner.enqueue(fragments)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn close(&self) {
        self.inner.close()
    }
}

impl<S> Drop for DebouncedBatchEngine<S>
where
    S: Scheduler + 'static,
{
    fn drop(&mut self) {
        self.inner.close();
    }
}
