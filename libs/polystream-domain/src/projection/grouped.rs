//! Projection output types

use std::fmt;
use std::time::Instant;

use crate::fragment::{Coordinate, Dimension, Fragment};

/// Coordinates of the grouping dimensions shared by every fragment of a group
///
/// `None` marks a dimension the fragments did not carry; all such fragments
/// share one implicit bucket along that axis.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey(Vec<(Dimension, Option<Coordinate>)>);

impl GroupKey {
    pub fn new(parts: Vec<(Dimension, Option<Coordinate>)>) -> Self {
        Self(parts)
    }

    pub fn coordinate(&self, dimension: Dimension) -> Option<&Coordinate> {
        self.0
            .iter()
            .find(|(dim, _)| *dim == dimension)
            .and_then(|(_, coordinate)| coordinate.as_ref())
    }

    /// Explicit (dimension, coordinate) labels, implicit parts left out
    pub fn labels(&self) -> Vec<(Dimension, &Coordinate)> {
        self.0
            .iter()
            .filter_map(|(dim, coordinate)| coordinate.as_ref().map(|c| (*dim, c)))
            .collect()
    }

    pub fn is_default(&self) -> bool {
        self.0.iter().all(|(_, coordinate)| coordinate.is_none())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = self.labels();
        if labels.is_empty() {
            return f.write_str("default_window");
        }
        for (i, (dimension, coordinate)) in labels.iter().enumerate() {
            if i > 0 {
                f.write_str("_")?;
            }
            write!(f, "{}_{}", dimension, coordinate)?;
        }
        Ok(())
    }
}

/// Fragments sharing one [`GroupKey`], in delivery order
#[derive(Debug, Clone)]
pub struct WindowGroup {
    key: GroupKey,
    fragments: Vec<Fragment>,
}

impl WindowGroup {
    pub fn new(key: GroupKey, fragments: Vec<Fragment>) -> Self {
        Self { key, fragments }
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub(crate) fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub(crate) fn fragments_mut(&mut self) -> &mut Vec<Fragment> {
        &mut self.fragments
    }

    /// Earliest arrival among the group's fragments
    pub fn first_received(&self) -> Option<Instant> {
        self.fragments.iter().filter_map(Fragment::received_at).min()
    }
}

/// Result of projecting one batch
#[derive(Debug, Clone)]
pub struct GroupedWindowItems {
    grouping_dimensions: Vec<Dimension>,
    slice_dimensions: Vec<Dimension>,
    groups: Vec<WindowGroup>,
}

impl GroupedWindowItems {
    /// Slice dimensions are derived as the complement of `grouping_dimensions`
    pub fn new(grouping_dimensions: Vec<Dimension>, groups: Vec<WindowGroup>) -> Self {
        let slice_dimensions = Dimension::ALL
            .into_iter()
            .filter(|dimension| !grouping_dimensions.contains(dimension))
            .collect();
        Self {
            grouping_dimensions,
            slice_dimensions,
            groups,
        }
    }

    pub fn grouping_dimensions(&self) -> &[Dimension] {
        &self.grouping_dimensions
    }

    pub fn slice_dimensions(&self) -> &[Dimension] {
        &self.slice_dimensions
    }

    pub fn groups(&self) -> &[WindowGroup] {
        &self.groups
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WindowGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn fragment_count(&self) -> usize {
        self.groups.iter().map(WindowGroup::len).sum()
    }
}

impl<'a> IntoIterator for &'a GroupedWindowItems {
    type Item = &'a WindowGroup;
    type IntoIter = std::slice::Iter<'a, WindowGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_display() {
        let key = GroupKey::new(vec![
            (Dimension::Window, Some(Coordinate::from("step_1"))),
            (Dimension::Channel, Some(Coordinate::from(2))),
        ]);
        assert_eq!(key.to_string(), "window_step_1_channel_2");

        let partial = GroupKey::new(vec![
            (Dimension::Window, None),
            (Dimension::Channel, Some(Coordinate::from(0))),
        ]);
        assert_eq!(partial.to_string(), "channel_0");
        assert!(!partial.is_default());

        let implicit = GroupKey::new(vec![(Dimension::Window, None), (Dimension::Channel, None)]);
        assert_eq!(implicit.to_string(), "default_window");
        assert!(implicit.is_default());
    }

    #[test]
    fn test_slice_dimensions_are_complement() {
        let items = GroupedWindowItems::new(vec![Dimension::Channel], Vec::new());

        assert_eq!(
            items.slice_dimensions(),
            &[Dimension::Window, Dimension::Slice, Dimension::Frame]
        );
        assert!(items.is_empty());
        assert_eq!(items.fragment_count(), 0);
    }
}
