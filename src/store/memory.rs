//! In-memory player store.

use super::{PlayerRecord, PlayerStore, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory [`PlayerStore`] implementation.
///
/// Keeps records by canonical id with a username index kept in sync on
/// every write. Used by the test suite and by hosts that do not need
/// durable storage.
#[derive(Default)]
pub struct MemoryPlayerStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    by_id: HashMap<Uuid, PlayerRecord>,
    by_username: HashMap<String, Uuid>,
}

impl MemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_id.is_empty()
    }
}

#[async_trait]
impl PlayerStore for MemoryPlayerStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<PlayerRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_username
            .get(&username.to_lowercase())
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<PlayerRecord>> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn upsert(&self, mut record: PlayerRecord) -> StoreResult<()> {
        record.username = record.username.to_lowercase();
        let mut inner = self.inner.write().await;
        // Drop the old username index entry if this id is being renamed.
        let stale = inner
            .by_id
            .get(&record.id)
            .filter(|previous| previous.username != record.username)
            .map(|previous| previous.username.clone());
        if let Some(stale) = stale {
            inner.by_username.remove(&stale);
        }
        inner.by_username.insert(record.username.clone(), record.id);
        inner.by_id.insert(record.id, record);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.by_id.remove(&id) {
            inner.by_username.remove(&record.username);
        }
        Ok(())
    }

    async fn usernames_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let prefix = prefix.to_lowercase();
        let inner = self.inner.read().await;
        let mut usernames: Vec<String> = inner
            .by_username
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .cloned()
            .collect();
        usernames.sort();
        Ok(usernames)
    }
}
