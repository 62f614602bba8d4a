use std::time::Duration;

use crate::error::{ReceiverError, Result};
use crate::fragment::Dimension;

/// Configuration for batch engines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverConfig {
    /// Quiet period after the most recent enqueue before a flush (default: 1s)
    pub debounce_interval: Duration,
    /// Hard bound on latency from the first fragment of a batch (default: 5s)
    ///
    /// `Duration::MAX` disables the bound; so does any value the clock
    /// cannot add to the current instant.
    pub max_wait: Duration,
    /// Dimensions a batch is grouped by (default: window, channel)
    pub grouping_dimensions: Vec<Dimension>,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            debounce_interval: Duration::from_millis(1000),
            max_wait: Duration::from_millis(5000),
            grouping_dimensions: vec![Dimension::Window, Dimension::Channel],
        }
    }
}

impl ReceiverConfig {
    pub fn new(debounce_interval: Duration, max_wait: Duration) -> Self {
        Self {
            debounce_interval,
            max_wait,
            ..Self::default()
        }
    }

    pub fn with_grouping(
        mut self,
        grouping_dimensions: impl IntoIterator<Item = Dimension>,
    ) -> Self {
        self.grouping_dimensions = grouping_dimensions.into_iter().collect();
        self
    }

    /// Check the timer values and grouping dimensions
    ///
    /// # Errors
    ///
    /// Returns `ReceiverError::Config` if either interval is zero, if
    /// `max_wait` is shorter than `debounce_interval`, or if a grouping
    /// dimension is listed twice
    pub fn validate(&self) -> Result<()> {
        if self.debounce_interval.is_zero() {
            return Err(ReceiverError::config_error(
                "debounce_interval must be greater than zero",
            ));
        }
        if self.max_wait.is_zero() {
            return Err(ReceiverError::config_error(
                "max_wait must be greater than zero",
            ));
        }
        if self.max_wait < self.debounce_interval {
            return Err(ReceiverError::config_error(format!(
                "max_wait ({}ms) must be >= debounce_interval ({}ms)",
                self.max_wait.as_millis(),
                self.debounce_interval.as_millis()
            )));
        }
        for (i, dimension) in self.grouping_dimensions.iter().enumerate() {
            if self.grouping_dimensions[..i].contains(dimension) {
                return Err(ReceiverError::config_error(format!(
                    "grouping dimension '{}' listed more than once",
                    dimension
                )));
            }
        }
        Ok(())
    }
}
