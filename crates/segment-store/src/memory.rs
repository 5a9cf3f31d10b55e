use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::errors::StoreError;
use crate::SegmentStore;

/// Map-backed store for tests and hosts without durable storage.
#[derive(Default)]
pub struct MemorySegmentStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(entries: &[(&str, &str)]) -> Self {
        let map = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }
}

impl SegmentStore for MemorySegmentStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
