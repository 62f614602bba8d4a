//! Window projection module
//!
//! Regroups a flat batch of fragments into ordered window groups.

mod grouped;
mod normalizer;
mod window;

pub use grouped::{GroupKey, GroupedWindowItems, WindowGroup};
pub use normalizer::{CoordinateNormalizer, IdentityNormalizer, SourceDirNormalizer};
pub use window::WindowProjector;
