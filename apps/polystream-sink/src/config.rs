//! Environment-driven settings for the sink

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use polystream_domain::{Dimension, ReceiverConfig};
use tracing::info;

pub const DEBOUNCE_VAR: &str = "POLYSTREAM_DEBOUNCE_MS";
pub const MAX_WAIT_VAR: &str = "POLYSTREAM_MAX_WAIT_MS";
pub const GROUPING_VAR: &str = "POLYSTREAM_GROUPING";
pub const IMAGES_DIR_VAR: &str = "POLYSTREAM_IMAGES_DIR";

#[derive(Debug, Clone)]
pub struct SinkSettings {
    pub receiver: ReceiverConfig,
    /// Enables folding ROI results paths onto this directory's window
    pub images_dir: Option<PathBuf>,
}

impl SinkSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any variable source; unset variables keep defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut receiver = ReceiverConfig::default();

        if let Some(value) = lookup(DEBOUNCE_VAR) {
            receiver.debounce_interval = parse_millis(DEBOUNCE_VAR, &value)?;
        }
        if let Some(value) = lookup(MAX_WAIT_VAR) {
            receiver.max_wait = parse_millis(MAX_WAIT_VAR, &value)?;
        }
        if let Some(value) = lookup(GROUPING_VAR) {
            let grouping = value
                .split(',')
                .filter(|part| !part.trim().is_empty())
                .map(|part| part.parse::<Dimension>())
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("invalid {}", GROUPING_VAR))?;
            receiver = receiver.with_grouping(grouping);
        }

        receiver.validate().context("invalid receiver configuration")?;

        let images_dir = lookup(IMAGES_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        info!(
            debounce_ms = receiver.debounce_interval.as_millis() as u64,
            max_wait_ms = receiver.max_wait.as_millis() as u64,
            grouping = ?receiver.grouping_dimensions,
            images_dir = ?images_dir,
            "Loaded receiver settings"
        );

        Ok(Self { receiver, images_dir })
    }
}

fn parse_millis(name: &str, value: &str) -> Result<Duration> {
    let millis: u64 = value.trim().parse().with_context(|| {
        format!("{} must be a whole number of milliseconds, got '{}'", name, value)
    })?;
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<SinkSettings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SinkSettings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_without_variables() {
        let settings = settings(&[]).unwrap();

        assert_eq!(settings.receiver.debounce_interval, Duration::from_millis(1000));
        assert_eq!(settings.receiver.max_wait, Duration::from_millis(5000));
        assert_eq!(
            settings.receiver.grouping_dimensions,
            vec![Dimension::Window, Dimension::Channel]
        );
        assert!(settings.images_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            (DEBOUNCE_VAR, "250"),
            (MAX_WAIT_VAR, "2000"),
            (GROUPING_VAR, "window, frame"),
            (IMAGES_DIR_VAR, "/data/plate/images"),
        ])
        .unwrap();

        assert_eq!(settings.receiver.debounce_interval, Duration::from_millis(250));
        assert_eq!(settings.receiver.max_wait, Duration::from_millis(2000));
        assert_eq!(
            settings.receiver.grouping_dimensions,
            vec![Dimension::Window, Dimension::Frame]
        );
        assert_eq!(settings.images_dir, Some(PathBuf::from("/data/plate/images")));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(settings(&[(DEBOUNCE_VAR, "soon")]).is_err());
        assert!(settings(&[(GROUPING_VAR, "window,depth")]).is_err());
        assert!(settings(&[(DEBOUNCE_VAR, "3000"), (MAX_WAIT_VAR, "1000")]).is_err());
        assert!(settings(&[(MAX_WAIT_VAR, "0")]).is_err());
    }
}
