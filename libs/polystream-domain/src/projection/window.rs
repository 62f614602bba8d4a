//! Default window projection
//!
//! Fragments are partitioned by the coordinates of the grouping dimensions.
//! Groups appear in order of first arrival; within a group fragments are
//! ordered by arrival, then by the remaining dimensions in canonical order,
//! then by data type and id. The result depends only on the fragments
//! themselves, never on the order concurrent producers happened to win the
//! enqueue lock in.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use super::grouped::{GroupKey, GroupedWindowItems, WindowGroup};
use super::normalizer::{CoordinateNormalizer, IdentityNormalizer};
use crate::error::ProjectionError;
use crate::fragment::{Dimension, Fragment};
use crate::ports::WindowProjection;

/// Groups fragments by a configurable set of dimensions
#[derive(Clone)]
pub struct WindowProjector {
    grouping_dimensions: Vec<Dimension>,
    /// Complement of the grouping dimensions, canonical order
    ordering_dimensions: Vec<Dimension>,
    normalizer: Arc<dyn CoordinateNormalizer>,
}

impl WindowProjector {
    /// Group by `grouping_dimensions`, in the order given; repeats are ignored
    pub fn new(grouping_dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        let mut grouping: Vec<Dimension> = Vec::new();
        for dimension in grouping_dimensions {
            if !grouping.contains(&dimension) {
                grouping.push(dimension);
            }
        }
        let ordering_dimensions = Dimension::ALL
            .into_iter()
            .filter(|dimension| !grouping.contains(dimension))
            .collect();

        Self {
            grouping_dimensions: grouping,
            ordering_dimensions,
            normalizer: Arc::new(IdentityNormalizer),
        }
    }

    pub fn with_normalizer(mut self, normalizer: impl CoordinateNormalizer + 'static) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    pub fn grouping_dimensions(&self) -> &[Dimension] {
        &self.grouping_dimensions
    }

    fn group_key(&self, fragment: &Fragment) -> GroupKey {
        GroupKey::new(
            self.grouping_dimensions
                .iter()
                .map(|dimension| {
                    let coordinate = fragment
                        .coordinate(*dimension)
                        .map(|c| self.normalizer.normalize(*dimension, c, fragment));
                    (*dimension, coordinate)
                })
                .collect(),
        )
    }

    fn compare(&self, a: &Fragment, b: &Fragment) -> Ordering {
        a.received_at()
            .cmp(&b.received_at())
            .then_with(|| {
                for dimension in &self.ordering_dimensions {
                    match a.coordinate(*dimension).cmp(&b.coordinate(*dimension)) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                Ordering::Equal
            })
            .then_with(|| a.data_type().cmp(&b.data_type()))
            .then_with(|| a.id().cmp(b.id()))
    }
}

impl Default for WindowProjector {
    fn default() -> Self {
        Self::new([Dimension::Window, Dimension::Channel])
    }
}

impl std::fmt::Debug for WindowProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowProjector")
            .field("grouping_dimensions", &self.grouping_dimensions)
            .finish_non_exhaustive()
    }
}

fn validate(fragment: &Fragment) -> Result<(), ProjectionError> {
    for (dimension, coordinate) in fragment.addressing().iter() {
        if coordinate.is_ambiguous() {
            return Err(ProjectionError::malformed(
                *fragment.id(),
                dimension,
                "empty text coordinate",
            ));
        }
    }
    Ok(())
}

impl WindowProjection for WindowProjector {
    fn project(&self, fragments: Vec<Fragment>) -> Result<GroupedWindowItems, ProjectionError> {
        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut groups: Vec<WindowGroup> = Vec::new();

        for fragment in fragments {
            validate(&fragment)?;
            let key = self.group_key(&fragment);
            match index.get(&key) {
                Some(&slot) => groups[slot].push(fragment),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(WindowGroup::new(key, vec![fragment]));
                }
            }
        }

        for group in &mut groups {
            group.fragments_mut().sort_by(|a, b| self.compare(a, b));
        }
        // Stable: groups whose first arrival ties keep their first-seen order
        groups.sort_by_key(WindowGroup::first_received);

        Ok(GroupedWindowItems::new(self.grouping_dimensions.clone(), groups))
    }
}
