//! Canonical layer keys
//!
//! A renderer keeps one visual layer per LayerKey. The key is built from the
//! slice-mode coordinates of a fragment (every dimension not used for
//! grouping) plus its data type, always in canonical dimension order, so two
//! fragments describing the same layer produce equal keys no matter which
//! window or channel they belong to or how their addressing was populated.

use std::fmt;

use crate::fragment::{Addressing, Coordinate, DataType, Dimension, Fragment};

/// Stable identifier of a renderer layer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerKey {
    coordinates: Vec<(Dimension, Coordinate)>,
    data_type: DataType,
}

impl LayerKey {
    pub fn coordinates(&self) -> &[(Dimension, Coordinate)] {
        &self.coordinates
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// Renders as `slice_2_frame_5`, or `default_layer` when no slice-mode
/// coordinate is present, followed by `_<type>` for non-image payloads.
impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coordinates.is_empty() {
            f.write_str("default_layer")?;
        } else {
            for (i, (dimension, coordinate)) in self.coordinates.iter().enumerate() {
                if i > 0 {
                    f.write_str("_")?;
                }
                write!(f, "{}_{}", dimension, coordinate)?;
            }
        }

        match self.data_type {
            DataType::Image => Ok(()),
            other => write!(f, "_{}", other),
        }
    }
}

/// Builds [`LayerKey`]s from the slice-mode dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerKeyBuilder {
    slice_dimensions: Vec<Dimension>,
}

impl LayerKeyBuilder {
    /// Use exactly `slice_dimensions`, normalized to canonical order
    pub fn new(slice_dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        let mut slice_dimensions: Vec<Dimension> = slice_dimensions.into_iter().collect();
        slice_dimensions.sort();
        slice_dimensions.dedup();
        Self { slice_dimensions }
    }

    /// Slice-mode dimensions are the complement of the grouping dimensions
    pub fn for_grouping(grouping_dimensions: &[Dimension]) -> Self {
        Self::new(
            Dimension::ALL
                .into_iter()
                .filter(|dimension| !grouping_dimensions.contains(dimension)),
        )
    }

    pub fn slice_dimensions(&self) -> &[Dimension] {
        &self.slice_dimensions
    }

    pub fn build(&self, fragment: &Fragment) -> LayerKey {
        self.build_from(fragment.addressing(), fragment.data_type())
    }

    /// Absent slice-mode dimensions are left out of the key
    pub fn build_from(&self, addressing: &Addressing, data_type: DataType) -> LayerKey {
        let coordinates = self
            .slice_dimensions
            .iter()
            .filter_map(|dimension| {
                addressing
                    .get(*dimension)
                    .map(|coordinate| (*dimension, coordinate.clone()))
            })
            .collect();

        LayerKey {
            coordinates,
            data_type,
        }
    }
}

impl Default for LayerKeyBuilder {
    fn default() -> Self {
        Self::for_grouping(&[Dimension::Window, Dimension::Channel])
    }
}
