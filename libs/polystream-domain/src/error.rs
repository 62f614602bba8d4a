//! Domain errors for the receiver kernel
//!
//! Configuration errors fail at construction. Everything that can go wrong
//! during a flush is caught at the flush boundary and reported through the
//! engine's error hook; none of it leaves the engine wedged.

use thiserror::Error;

use crate::fragment::{Dimension, FragmentId};

/// Errors raised by a window projection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// A fragment's addressing cannot be keyed unambiguously
    #[error("Malformed addressing on fragment {fragment} ({dimension}): {reason}")]
    MalformedAddressing {
        fragment: FragmentId,
        dimension: Dimension,
        reason: String,
    },

    /// Any other projector failure
    #[error("Projection failed: {0}")]
    Internal(String),
}

impl ProjectionError {
    pub fn malformed(
        fragment: FragmentId,
        dimension: Dimension,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedAddressing {
            fragment,
            dimension,
            reason: reason.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Errors surfaced by batch engines
#[derive(Error, Debug)]
pub enum ReceiverError {
    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The engine was closed; no further enqueue or flush is accepted
    #[error("Batch engine is closed")]
    EngineClosed,

    /// The projector rejected a batch; the batch was discarded
    #[error("Projection fault: {0}")]
    Projection(#[from] ProjectionError),

    /// The projector panicked; the batch was discarded
    #[error("Projection panicked: {0}")]
    ProjectionPanicked(String),

    /// The flush callback returned an error
    #[error("Flush callback failed: {0}")]
    Callback(String),

    /// The flush callback panicked
    #[error("Flush callback panicked: {0}")]
    CallbackPanicked(String),
}

impl ReceiverError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn callback(err: &anyhow::Error) -> Self {
        Self::Callback(format!("{:#}", err))
    }

    /// True for faults raised while flushing, as opposed to call-site errors
    pub fn is_flush_fault(&self) -> bool {
        matches!(
            self,
            Self::Projection(_)
                | Self::ProjectionPanicked(_)
                | Self::Callback(_)
                | Self::CallbackPanicked(_)
        )
    }
}

/// Result type alias for receiver operations
pub type Result<T> = std::result::Result<T, ReceiverError>;
