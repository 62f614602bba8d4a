//! # Polystream Tokio Adapter
//!
//! Implements the domain's `Scheduler` port on a tokio runtime, so the
//! debounced batch engine can arm its debounce and max-wait timers as
//! tokio tasks.
//!
//! ## Example
//!
//! ```rust,no_run
//! use polystream_domain::{EngineBuilder, ReceiverConfig};
//! use polystream_tokio::infrastructure::TokioScheduler;
//!
//! # async fn example() -> polystream_domain::Result<()> {
//! let engine = EngineBuilder::new(ReceiverConfig::default())
//!     .build_debounced(TokioScheduler::current()?, |batch| {
//!         println!("{} fragments", batch.fragment_count());
//!         Ok(())
//!     })?;
//! # Ok(())
//! # }
//! ```

pub mod infrastructure;

pub use infrastructure::TokioScheduler;
