//! Tokio implementation of the Scheduler port
//!
//! Each armed timer is a task sleeping until its deadline; cancelling the
//! timer aborts the task. The clock is read through the runtime so that a
//! paused (virtual) clock in tests drives both `now` and the timers, even
//! when `now` is called from a thread outside the runtime.

use polystream_domain::{ReceiverError, Scheduler, TimerHandle};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace};

/// Scheduler backed by a tokio runtime handle
///
/// Timer tasks run the engine's flush on a runtime worker. Callbacks doing
/// heavy rendering work should hand it off (e.g. `spawn_blocking`) rather
/// than occupy the worker.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Create a scheduler spawning timers on `handle`
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use polystream_tokio::infrastructure::TokioScheduler;
    ///
    /// let runtime = tokio::runtime::Runtime::new().unwrap();
    /// let scheduler = TokioScheduler::new(runtime.handle().clone());
    /// ```
    pub fn new(handle: Handle) -> Self {
        debug!("Initializing TokioScheduler");
        Self { handle }
    }

    /// Bind to the runtime the caller is running in
    ///
    /// # Errors
    ///
    /// Returns `ReceiverError::Config` when called outside a tokio runtime
    pub fn current() -> Result<Self, ReceiverError> {
        Handle::try_current().map(Self::new).map_err(|err| {
            ReceiverError::config_error(format!("no tokio runtime available: {}", err))
        })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Instant {
        let _runtime = self.handle.enter();
        tokio::time::Instant::now().into_std()
    }

    #[instrument(skip(self, task))]
    fn schedule(
        &self,
        deadline: Instant,
        task: Box<dyn FnOnce() + Send + 'static>,
    ) -> Box<dyn TimerHandle> {
        let deadline = tokio::time::Instant::from_std(deadline);
        let join = self.handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            trace!("Timer fired");
            task();
        });
        Box::new(TokioTimer { join })
    }
}

struct TokioTimer {
    join: JoinHandle<()>,
}

impl TimerHandle for TokioTimer {
    fn cancel(self: Box<Self>) {
        self.join.abort();
    }
}
