//! Synchronous engine without debouncing
//!
//! Every enqueue is projected and delivered on the caller's thread. Useful
//! for tests and for viewers that want each fragment as soon as it lands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use super::batch::{EngineStats, FlushReason};
use super::dispatch::FlushDispatcher;
use crate::error::{ReceiverError, Result};
use crate::fragment::Fragment;
use crate::ports::BatchEngine;

pub struct ImmediateBatchEngine {
    dispatcher: FlushDispatcher,
    closed: AtomicBool,
}

impl ImmediateBatchEngine {
    pub(crate) fn new(dispatcher: FlushDispatcher) -> Self {
        Self {
            dispatcher,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> EngineStats {
        self.dispatcher.stats()
    }
}

impl BatchEngine for ImmediateBatchEngine {
    fn enqueue(&self, fragment: Fragment) -> Result<()> {
        self.enqueue_many(vec![fragment])
    }

    fn enqueue_many(&self, fragments: Vec<Fragment>) -> Result<()> {
        if self.is_closed() {
            return Err(ReceiverError::EngineClosed);
        }
        let now = Instant::now();
        let batch = fragments
            .into_iter()
            .map(|fragment| fragment.received(now))
            .collect();
        self.dispatcher.dispatch(batch, FlushReason::Immediate);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if self.is_closed() {
            return Err(ReceiverError::EngineClosed);
        }
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
