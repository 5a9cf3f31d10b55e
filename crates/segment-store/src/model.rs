use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// On-disk shape of one origin's store: a single JSON document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreDocument {
    pub version: u32,
    pub entries: BTreeMap<String, SegmentRecord>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}
