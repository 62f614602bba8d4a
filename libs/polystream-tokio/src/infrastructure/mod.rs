//! Infrastructure adapters backed by the tokio runtime

mod tokio_scheduler;

pub use tokio_scheduler::TokioScheduler;
