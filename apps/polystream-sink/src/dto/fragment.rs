//! DTOs for the newline-delimited fragment stream

use bytes::Bytes;
use polystream_domain::{Addressing, DataType, Fragment};
use serde::Deserialize;

/// One line of the input stream
///
/// ```json
/// {"addressing": {"window": "roi-1", "slice": 3}, "data_type": "mask", "payload": [1, 2, 3]}
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentRecord {
    /// Dimension name to coordinate; absent dimensions are implicit
    #[serde(default)]
    pub addressing: Addressing,
    pub data_type: DataType,
    /// Raw payload bytes, never decoded
    #[serde(default)]
    pub payload: Vec<u8>,
}

impl FragmentRecord {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

impl From<FragmentRecord> for Fragment {
    fn from(record: FragmentRecord) -> Self {
        Fragment::new(record.addressing, record.data_type, Bytes::from(record.payload))
    }
}
