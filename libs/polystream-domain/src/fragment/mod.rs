//! Fragment domain module
//!
//! Defines what a streamed Fragment is and how it is addressed.

mod addressing;
mod entity;
mod ids;

pub use addressing::{Addressing, Coordinate, Dimension};
pub use entity::{DataType, Fragment, Payload};
pub use ids::{BatchId, FragmentId};
