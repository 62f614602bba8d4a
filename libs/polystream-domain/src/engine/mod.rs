//! Batch engine module
//!
//! Decides when buffered fragments are delivered and hands each flushed
//! batch, projected and keyed, to the renderer callback.

mod batch;
mod builder;
mod config;
mod debounced;
mod dispatch;
mod immediate;

pub use batch::{EngineStats, FlushBatch, FlushReason, LayerBatch};
pub use builder::EngineBuilder;
pub use config::ReceiverConfig;
pub use debounced::DebouncedBatchEngine;
pub use dispatch::{ErrorFn, FlushFn};
pub use immediate::ImmediateBatchEngine;
