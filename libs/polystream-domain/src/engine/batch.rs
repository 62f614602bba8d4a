//! What a flush hands to the renderer

use std::fmt;

use crate::fragment::{BatchId, Fragment};
use crate::layer_key::{LayerKey, LayerKeyBuilder};
use crate::projection::{GroupedWindowItems, WindowGroup};

/// Why a batch was flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushReason {
    /// No enqueue for a full debounce interval
    Debounce,
    /// The batch reached its max-wait bound under continuous traffic
    MaxWait,
    /// An enqueue found the max-wait bound already passed
    Overdue,
    /// `flush()` was called
    Explicit,
    /// Final flush performed by `close()`
    Close,
    /// Delivered without batching
    Immediate,
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlushReason::Debounce => "debounce",
            FlushReason::MaxWait => "max_wait",
            FlushReason::Overdue => "overdue",
            FlushReason::Explicit => "explicit",
            FlushReason::Close => "close",
            FlushReason::Immediate => "immediate",
        };
        f.write_str(name)
    }
}

/// One projected batch
#[derive(Debug, Clone)]
pub struct FlushBatch {
    id: BatchId,
    reason: FlushReason,
    items: GroupedWindowItems,
    layer_keys: LayerKeyBuilder,
}

impl FlushBatch {
    /// Layer keys use the slice dimensions the projection reports, so a
    /// substituted projector with its own grouping is keyed consistently
    pub fn new(id: BatchId, reason: FlushReason, items: GroupedWindowItems) -> Self {
        let layer_keys = LayerKeyBuilder::new(items.slice_dimensions().iter().copied());
        Self {
            id,
            reason,
            items,
            layer_keys,
        }
    }

    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn reason(&self) -> FlushReason {
        self.reason
    }

    pub fn items(&self) -> &GroupedWindowItems {
        &self.items
    }

    pub fn fragment_count(&self) -> usize {
        self.items.fragment_count()
    }

    /// Iterate over every fragment, group by group
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.items.iter().flat_map(|group| group.fragments().iter())
    }

    /// Each group split by layer key, in order of first appearance
    ///
    /// This is the dispatch surface for renderers: look the key up in the
    /// layer registry, create the layer on first sight, update it otherwise.
    pub fn layers(&self) -> Vec<LayerBatch<'_>> {
        let mut layers: Vec<LayerBatch<'_>> = Vec::new();
        for group in self.items.iter() {
            let start = layers.len();
            for fragment in group.fragments() {
                let key = self.layer_keys.build(fragment);
                match layers[start..]
                    .iter()
                    .position(|layer| layer.layer_key == key)
                {
                    Some(offset) => layers[start + offset].fragments.push(fragment),
                    None => layers.push(LayerBatch {
                        group,
                        layer_key: key,
                        fragments: vec![fragment],
                    }),
                }
            }
        }
        layers
    }
}

/// Fragments of one group that share a layer key
#[derive(Debug, Clone)]
pub struct LayerBatch<'a> {
    pub group: &'a WindowGroup,
    pub layer_key: LayerKey,
    pub fragments: Vec<&'a Fragment>,
}

/// Running totals for an engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub batches_flushed: u64,
    pub fragments_flushed: u64,
    pub faults: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{Addressing, DataType, Dimension};
    use crate::ports::WindowProjection;
    use crate::projection::WindowProjector;
    use std::time::{Duration, Instant};

    #[test]
    fn test_layers_split_groups_by_key() {
        let base = Instant::now();
        let make = |window: &str, slice: i64, data_type: DataType, ms: u64| {
            Fragment::new(
                Addressing::new()
                    .with(Dimension::Window, window)
                    .with(Dimension::Slice, slice),
                data_type,
                Vec::<u8>::new(),
            )
            .received(base + Duration::from_millis(ms))
        };
        let fragments = vec![
            make("a", 0, DataType::Image, 0),
            make("a", 1, DataType::Image, 1),
            make("a", 0, DataType::Image, 2),
            make("a", 0, DataType::Points, 3),
            make("b", 0, DataType::Image, 4),
        ];
        let items = WindowProjector::default().project(fragments).unwrap();
        let batch = FlushBatch::new(BatchId::new(), FlushReason::Explicit, items);

        let layers = batch.layers();
        let summary: Vec<(String, String, usize)> = layers
            .iter()
            .map(|l| (l.group.key().to_string(), l.layer_key.to_string(), l.fragments.len()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("window_a".to_string(), "slice_0".to_string(), 2),
                ("window_a".to_string(), "slice_1".to_string(), 1),
                ("window_a".to_string(), "slice_0_points".to_string(), 1),
                ("window_b".to_string(), "slice_0".to_string(), 1),
            ]
        );
        assert_eq!(batch.fragment_count(), 5);
        assert_eq!(batch.fragments().count(), 5);
    }

    #[test]
    fn test_layer_keys_follow_projection_grouping() {
        let base = Instant::now();
        let fragments = [0i64, 1]
            .into_iter()
            .map(|channel| {
                Fragment::new(
                    Addressing::new()
                        .with(Dimension::Window, "a")
                        .with(Dimension::Channel, channel)
                        .with(Dimension::Slice, 1),
                    DataType::Image,
                    Vec::<u8>::new(),
                )
                .received(base)
            })
            .collect();
        let items = WindowProjector::new([Dimension::Window]).project(fragments).unwrap();
        let batch = FlushBatch::new(BatchId::new(), FlushReason::Explicit, items);

        let keys: Vec<String> = batch.layers().iter().map(|l| l.layer_key.to_string()).collect();
        assert_eq!(keys, vec!["channel_0_slice_1", "channel_1_slice_1"]);
    }

    #[test]
    fn test_flush_reason_display() {
        assert_eq!(FlushReason::MaxWait.to_string(), "max_wait");
        assert_eq!(FlushReason::Close.to_string(), "close");
    }
}
