//! # Polystream Domain Layer
//!
//! The streaming receiver projection kernel. Fragments pushed by a transport
//! are coalesced under debounce and max-wait timing rules, regrouped into
//! ordered window groups, and labelled with canonical layer keys so a
//! renderer can update the right visual layer.
//!
//! - **Entities**: [`Fragment`] and its addressing
//! - **Ports**: [`BatchEngine`], [`WindowProjection`], [`Scheduler`]
//! - **Services**: [`DebouncedBatchEngine`], [`ImmediateBatchEngine`],
//!   [`WindowProjector`], [`LayerKeyBuilder`]
//!
//! ## Architecture
//!
//! This layer has no async runtime dependency. Timers are reached through
//! the [`Scheduler`] port; adapter crates implement it.
//!
//! ## Example
//!
//! ```rust
//! use polystream_domain::{
//!     Addressing, BatchEngine, DataType, Dimension, EngineBuilder, Fragment, ReceiverConfig,
//! };
//!
//! let engine = EngineBuilder::new(ReceiverConfig::default())
//!     .build_immediate(|batch| {
//!         for layer in batch.layers() {
//!             println!("{} -> {} fragments", layer.layer_key, layer.fragments.len());
//!         }
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let addressing = Addressing::new()
//!     .with(Dimension::Window, "roi-1")
//!     .with(Dimension::Slice, 3);
//! engine
//!     .enqueue(Fragment::new(addressing, DataType::Image, vec![0u8; 16]))
//!     .unwrap();
//! ```

pub mod engine;
pub mod error;
pub mod fragment;
pub mod layer_key;
pub mod ports;
pub mod projection;

// Re-export commonly used types
pub use engine::{
    DebouncedBatchEngine, EngineBuilder, EngineStats, FlushBatch, FlushReason,
    ImmediateBatchEngine, LayerBatch, ReceiverConfig,
};
pub use error::{ProjectionError, ReceiverError, Result};
pub use fragment::{
    Addressing, BatchId, Coordinate, DataType, Dimension, Fragment, FragmentId, Payload,
};
pub use layer_key::{LayerKey, LayerKeyBuilder};
pub use ports::{BatchEngine, Scheduler, TimerHandle, WindowProjection};
pub use projection::{
    CoordinateNormalizer, GroupKey, GroupedWindowItems, SourceDirNormalizer, WindowGroup,
    WindowProjector,
};
