//! In-process fingerprint store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::FingerprintStore;
use crate::error::{Error, Result};
use crate::models::{EntryId, SyncRecord};

/// `FingerprintStore` kept in memory; records are lost when it is dropped
#[derive(Debug, Default)]
pub struct MemoryFingerprintStore {
    records: RwLock<HashMap<EntryId, SyncRecord>>,
}

impl MemoryFingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl FingerprintStore for MemoryFingerprintStore {
    async fn find(&self, entry_id: EntryId) -> Result<Option<SyncRecord>> {
        Ok(self.records.read().await.get(&entry_id).cloned())
    }

    async fn upsert(&self, record: &SyncRecord) -> Result<()> {
        let mut records = self.records.write().await;
        let taken = records.values().any(|existing| {
            existing.remote_post_id == record.remote_post_id
                && existing.entry_id != record.entry_id
        });
        if taken {
            return Err(Error::InvalidInput(format!(
                "remote post {} already belongs to another entry",
                record.remote_post_id
            )));
        }

        records.insert(record.entry_id, record.clone());
        Ok(())
    }

    async fn remove_by_remote_id(&self, remote_post_id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.remote_post_id != remote_post_id);
        Ok(records.len() != before)
    }
}
