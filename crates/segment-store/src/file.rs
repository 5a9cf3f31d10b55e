use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::warn;

use crate::config::StoreConfig;
use crate::errors::{StoreErrKind, StoreError};
use crate::model::{SegmentRecord, StoreDocument};
use crate::SegmentStore;

/// One JSON document per origin, rewritten atomically on every put.
///
/// A missing or corrupt document degrades to an empty store: losing a stale
/// segments value only means one page load without targeting, which the
/// failure policy prefers over surfacing an error to the host.
pub struct FileSegmentStore {
    path: PathBuf,
    state: Mutex<StoreDocument>,
}

impl FileSegmentStore {
    pub fn open(cfg: &StoreConfig) -> Self {
        let path = cfg.document_path();
        let state = Mutex::new(load_document(&path));
        Self { path, state }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SegmentStore for FileSegmentStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let state = self.state.lock();
        Ok(state.entries.get(key).map(|record| record.value.clone()))
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.entries.insert(
            key.to_string(),
            SegmentRecord {
                value: value.to_string(),
                updated_at: Utc::now(),
            },
        );
        let data = serde_json::to_vec_pretty(&*state)
            .map_err(|err| StoreErrKind::SerializeFailed(err.to_string()))?;
        write_atomic(&self.path, &data)
            .map_err(|err| StoreErrKind::IoFailed(err.to_string()))?;
        Ok(())
    }
}

fn load_document(path: &PathBuf) -> StoreDocument {
    if !path.exists() {
        return StoreDocument::default();
    }
    match fs::read(path) {
        Ok(raw) => match serde_json::from_slice(&raw) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(target: "segment-store", path = %path.display(), %err, "corrupt store document, starting empty");
                StoreDocument::default()
            }
        },
        Err(err) => {
            warn!(target: "segment-store", path = %path.display(), %err, "unreadable store document, starting empty");
            StoreDocument::default()
        }
    }
}

fn write_atomic(path: &PathBuf, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(tmp, path)?;
    Ok(())
}
