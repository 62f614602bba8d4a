//! Ports (trait definitions) for the receiver kernel
//!
//! Callers depend on these contracts, never on a concrete engine or
//! projector, so a synchronous engine or a projection over a different
//! dimension set can be swapped in without touching them. The timer is a
//! port as well: the debounce logic only needs "run this at that instant",
//! and the infrastructure layer decides whether that is a tokio task, a
//! thread or an event-loop alarm.

use std::time::Instant;

use crate::error::{ProjectionError, Result};
use crate::fragment::Fragment;
use crate::projection::GroupedWindowItems;

/// Port for batching engines
///
/// Implementations must be safe to share between producer threads: every
/// method takes `&self`.
pub trait BatchEngine: Send + Sync {
    /// Queue one fragment and schedule its delivery
    ///
    /// # Errors
    ///
    /// Returns `ReceiverError::EngineClosed` once `close` has been called
    fn enqueue(&self, fragment: Fragment) -> Result<()>;

    /// Queue several fragments under a single critical section
    ///
    /// # Errors
    ///
    /// Returns `ReceiverError::EngineClosed` once `close` has been called
    fn enqueue_many(&self, fragments: Vec<Fragment>) -> Result<()> {
        for fragment in fragments {
            self.enqueue(fragment)?;
        }
        Ok(())
    }

    /// Deliver whatever is pending right now; a no-op when nothing is pending
    ///
    /// # Errors
    ///
    /// Returns `ReceiverError::EngineClosed` once `close` has been called
    fn flush(&self) -> Result<()>;

    /// Deliver the remaining fragments and refuse further use
    ///
    /// Idempotent: only the first call flushes.
    fn close(&self);
}

/// Port for window projections
///
/// A projection is a pure function of its input: no shared state, no side
/// effects, and the same input ordering always yields the same output.
pub trait WindowProjection: Send + Sync {
    /// Group an ordered batch of fragments into windows
    ///
    /// # Errors
    ///
    /// Returns `ProjectionError` when a fragment's addressing cannot be keyed
    fn project(
        &self,
        fragments: Vec<Fragment>,
    ) -> std::result::Result<GroupedWindowItems, ProjectionError>;
}

/// Handle to an armed timer
pub trait TimerHandle: Send {
    /// Disarm the timer; a timer that already fired is unaffected
    fn cancel(self: Box<Self>);
}

/// A scheduled-callback primitive, also acting as the engine's clock
///
/// `now` and `schedule` must share a time base so that deadlines computed
/// from `now` fire at the right moment, including under virtual time.
pub trait Scheduler: Send + Sync {
    /// Current monotonic instant
    fn now(&self) -> Instant;

    /// Run `task` once, at or after `deadline`
    ///
    /// The task must not run inside this call: engines arm timers while
    /// holding their state lock, and the task takes that same lock.
    fn schedule(
        &self,
        deadline: Instant,
        task: Box<dyn FnOnce() + Send + 'static>,
    ) -> Box<dyn TimerHandle>;
}
