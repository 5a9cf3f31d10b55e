use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use adweave_core_types::WeaveError;
use segment_store::SegmentStore;

use crate::ports::ClientIdProvider;

/// Store key holding the visitor id, beside the segments value.
pub const CLIENT_ID_KEY: &str = "audience.client-id";

/// Get-or-create visitor id persisted in the segment store, for hosts
/// without their own client-id service.
pub struct StoredClientId {
    store: Arc<dyn SegmentStore>,
}

impl StoredClientId {
    pub fn new(store: Arc<dyn SegmentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ClientIdProvider for StoredClientId {
    async fn client_id(&self) -> Result<String, WeaveError> {
        if let Some(existing) = self.store.get(CLIENT_ID_KEY)? {
            return Ok(existing);
        }
        let fresh = Uuid::new_v4().to_string();
        self.store.put(CLIENT_ID_KEY, &fresh)?;
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segment_store::MemorySegmentStore;

    #[tokio::test]
    async fn id_is_created_once_and_stable() {
        let store = Arc::new(MemorySegmentStore::new());
        let provider = StoredClientId::new(store.clone());

        let first = provider.client_id().await.expect("client id");
        let second = provider.client_id().await.expect("client id");
        assert_eq!(first, second);
        assert_eq!(store.get(CLIENT_ID_KEY).expect("get"), Some(first));
    }
}
