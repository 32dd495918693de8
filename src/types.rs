use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage class identifier used when none has been selected
pub const DEFAULT_STORAGE_CLASS: &str = "default";

/// Attributes of a stored object as reported by a HEAD request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

/// Request for listing objects
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub max_results: Option<i32>,
    pub continue_from: Option<String>,
}

/// Response from a List operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub objects: Vec<ObjectInfo>,
    pub common_prefixes: Vec<String>,
    pub next_token: Option<String>,
    pub truncated: bool,
}

/// Byte range of a ranged GET. `limit: None` reads to the end of the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteRange {
    pub offset: u64,
    pub limit: Option<u64>,
}

impl ByteRange {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn new(offset: u64, limit: Option<u64>) -> Self {
        Self { offset, limit }
    }

    /// Value for the `Range` header, or `None` when the whole object is wanted.
    ///
    /// A range whose last byte would lie past `u64::MAX` reads to the end.
    pub fn header_value(&self) -> Option<String> {
        let end = self
            .limit
            .and_then(|limit| self.offset.checked_add(limit.saturating_sub(1)));
        match (self.limit, end) {
            (None, _) if self.offset == 0 => None,
            (_, Some(end)) => Some(format!("bytes={}-{}", self.offset, end)),
            (_, None) => Some(format!("bytes={}-", self.offset)),
        }
    }
}
