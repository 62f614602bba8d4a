//! The Fragment entity
//!
//! A Fragment is one addressed unit of streamed data handed over by the
//! transport. The kernel treats it as a value object: addressing and data
//! type are fixed at construction and the payload is never inspected.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use super::addressing::{Addressing, Coordinate, Dimension};
use super::ids::FragmentId;

/// Semantic kind of a fragment's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[serde(alias = "intensity")]
    Image,
    Mask,
    Shapes,
    Points,
    Rois,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Image => "image",
            DataType::Mask => "mask",
            DataType::Shapes => "shapes",
            DataType::Points => "points",
            DataType::Rois => "rois",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque payload reference; cloning shares the underlying buffer
pub type Payload = Bytes;

/// One unit of streamed data
#[derive(Debug, Clone)]
pub struct Fragment {
    id: FragmentId,
    addressing: Addressing,
    data_type: DataType,
    payload: Payload,
    /// Set by the batch engine when the fragment is enqueued
    received_at: Option<Instant>,
}

impl Fragment {
    /// Create a new, not yet received, fragment
    pub fn new(addressing: Addressing, data_type: DataType, payload: impl Into<Payload>) -> Self {
        Self {
            id: FragmentId::new(),
            addressing,
            data_type,
            payload: payload.into(),
            received_at: None,
        }
    }

    /// Stamp the arrival instant, consuming and returning the fragment
    pub fn received(mut self, at: Instant) -> Self {
        self.received_at = Some(at);
        self
    }

    pub fn id(&self) -> &FragmentId {
        &self.id
    }

    pub fn addressing(&self) -> &Addressing {
        &self.addressing
    }

    pub fn coordinate(&self, dimension: Dimension) -> Option<&Coordinate> {
        self.addressing.get(dimension)
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn received_at(&self) -> Option<Instant> {
        self.received_at
    }
}
