//! Flush boundary shared by every engine
//!
//! Runs the projector and the flush callback on a batch that has already
//! been detached from the engine state. Errors and panics from either are
//! caught here, counted, logged and handed to the error hook; the batch is
//! then considered drained.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, error};

use super::batch::{EngineStats, FlushBatch, FlushReason};
use crate::error::ReceiverError;
use crate::fragment::{BatchId, Fragment};
use crate::ports::WindowProjection;

/// Renderer callback receiving each projected batch
pub type FlushFn = Arc<dyn Fn(&FlushBatch) -> anyhow::Result<()> + Send + Sync>;

/// Hook receiving faults raised at the flush boundary
pub type ErrorFn = Arc<dyn Fn(&ReceiverError) + Send + Sync>;

pub(crate) struct FlushDispatcher {
    projector: Arc<dyn WindowProjection>,
    on_flush: FlushFn,
    on_error: Option<ErrorFn>,
    batches_flushed: AtomicU64,
    fragments_flushed: AtomicU64,
    faults: AtomicU64,
}

impl FlushDispatcher {
    pub(crate) fn new(
        projector: Arc<dyn WindowProjection>,
            on_flush: FlushFn,
        on_error: Option<ErrorFn>,
    ) -> Self {
        Self {
            projector,
            on_flush,
            on_error,
            batches_flushed: AtomicU64::new(0),
            fragments_flushed: AtomicU64::new(0),
            faults: AtomicU64::new(0),
        }
    }

    /// Project and deliver one detached batch; empty batches are ignored
    pub(crate) fn dispatch(&self, fragments: Vec<Fragment>, reason: FlushReason) {
        if fragments.is_empty() {
            return;
        }
        let batch_id = BatchId::new();
        let count = fragments.len();

        let projector = &self.projector;
        let items = match panic::catch_unwind(AssertUnwindSafe(|| projector.project(fragments))) {
            Ok(Ok(items)) => items,
            Ok(Err(err)) => return self.fault(batch_id, count, err.into()),
            Err(payload) => {
                return self.fault(
                    batch_id,
                    count,
                    ReceiverError::ProjectionPanicked(panic_message(payload.as_ref())),
                )
            }
        };

        debug!(
            batch_id = %batch_id,
            reason = %reason,
            fragments = count,
            groups = items.len(),
            "Flushing batch"
        );

        let batch = FlushBatch::new(batch_id, reason, items);
        let on_flush = &self.on_flush;
        match panic::catch_unwind(AssertUnwindSafe(|| on_flush(&batch))) {
            Ok(Ok(())) => {
                self.batches_flushed.fetch_add(1, Ordering::Relaxed);
                self.fragments_flushed
                    .fetch_add(count as u64, Ordering::Relaxed);
            }
            Ok(Err(err)) => self.fault(batch_id, count, ReceiverError::callback(&err)),
            Err(payload) => self.fault(
                batch_id,
                count,
                ReceiverError::CallbackPanicked(panic_message(payload.as_ref())),
            ),
        }
    }

    fn fault(&self, batch_id: BatchId, fragments: usize, err: ReceiverError) {
        self.faults.fetch_add(1, Ordering::Relaxed);
        error!(batch_id = %batch_id, fragments, error = %err, "Batch dropped");

        if let Some(on_error) = &self.on_error {
            if panic::catch_unwind(AssertUnwindSafe(|| on_error(&err))).is_err() {
                error!(batch_id = %batch_id, "Error hook panicked");
            }
        }
    }

    pub(crate) fn stats(&self) -> EngineStats {
        EngineStats {
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            fragments_flushed: self.fragments_flushed.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
