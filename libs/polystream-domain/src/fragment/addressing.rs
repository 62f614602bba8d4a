//! Addressing dimensions and coordinates
//!
//! A fragment is located inside a multi-dimensional dataset by up to four
//! named axes. The declaration order of [`Dimension`] is the canonical order
//! used by group keys, layer keys and ordering tie-breaks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ReceiverError;

/// A named addressing axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Window,
    Channel,
    Slice,
    Frame,
}

impl Dimension {
    /// Every dimension, in canonical order
    pub const ALL: [Dimension; 4] = [
        Dimension::Window,
        Dimension::Channel,
        Dimension::Slice,
        Dimension::Frame,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Window => "window",
            Dimension::Channel => "channel",
            Dimension::Slice => "slice",
            Dimension::Frame => "frame",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = ReceiverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "window" => Ok(Dimension::Window),
            "channel" => Ok(Dimension::Channel),
            "slice" => Ok(Dimension::Slice),
            "frame" => Ok(Dimension::Frame),
            other => Err(ReceiverError::config_error(format!(
                "unknown addressing dimension '{}'",
                other
            ))),
        }
    }
}

/// A position along one dimension
///
/// Integer coordinates order before text coordinates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Index(i64),
    Label(String),
}

impl Coordinate {
    /// Text coordinates that are empty or only whitespace cannot be told
    /// apart from an absent coordinate once rendered into a key.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Coordinate::Label(label) if label.trim().is_empty())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Index(index) => write!(f, "{}", index),
            Coordinate::Label(label) => f.write_str(label),
        }
    }
}

impl From<i64> for Coordinate {
    fn from(value: i64) -> Self {
        Coordinate::Index(value)
    }
}

impl From<i32> for Coordinate {
    fn from(value: i32) -> Self {
        Coordinate::Index(value.into())
    }
}

impl From<u32> for Coordinate {
    fn from(value: u32) -> Self {
        Coordinate::Index(value.into())
    }
}

impl From<&str> for Coordinate {
    fn from(value: &str) -> Self {
        Coordinate::Label(value.to_string())
    }
}

impl From<String> for Coordinate {
    fn from(value: String) -> Self {
        Coordinate::Label(value)
    }
}

/// Mapping from dimension to coordinate, always iterated in canonical order
///
/// Absent dimensions are not errors: they stand for a single implicit
/// coordinate along that axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Addressing(BTreeMap<Dimension, Coordinate>);

impl Addressing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, dimension: Dimension, coordinate: impl Into<Coordinate>) -> Self {
        self.0.insert(dimension, coordinate.into());
        self
    }

    pub fn get(&self, dimension: Dimension) -> Option<&Coordinate> {
        self.0.get(&dimension)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &Coordinate)> {
        self.0.iter().map(|(dimension, coordinate)| (*dimension, coordinate))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Coordinates of `dimensions`, in the order given, with `None` for absent ones
    pub fn project(&self, dimensions: &[Dimension]) -> Vec<Option<&Coordinate>> {
        dimensions.iter().map(|dimension| self.get(*dimension)).collect()
    }
}

impl FromIterator<(Dimension, Coordinate)> for Addressing {
    fn from_iter<I: IntoIterator<Item = (Dimension, Coordinate)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
