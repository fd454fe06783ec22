//! Fingerprint store implementation

use async_trait::async_trait;
use libsql::params;

use super::Database;
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::models::{EntryId, SyncRecord};

/// Trait for sync record storage operations.
///
/// Implementations must allow concurrent calls; each write is atomic for its key.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// Get the record of an entry
    async fn find(&self, entry_id: EntryId) -> Result<Option<SyncRecord>>;

    /// Insert the record, or overwrite the one with the same entry id
    async fn upsert(&self, record: &SyncRecord) -> Result<()>;

    /// Delete the record pointing at a remote post.
    ///
    /// Returns `false` when no record matched.
    async fn remove_by_remote_id(&self, remote_post_id: &str) -> Result<bool>;
}

/// libSQL implementation of `FingerprintStore`
pub struct LibSqlFingerprintStore {
    db: Database,
}

impl LibSqlFingerprintStore {
    /// Create a new store backed by the given database
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Parse a record from a database row
    fn parse_record(row: &libsql::Row) -> Result<SyncRecord> {
        Ok(SyncRecord {
            entry_id: row.get(0)?,
            remote_post_id: row.get(1)?,
            fingerprint: Fingerprint::from_stored(row.get::<String>(2)?),
            synced_at: row.get(3)?,
        })
    }
}

#[async_trait]
impl FingerprintStore for LibSqlFingerprintStore {
    async fn find(&self, entry_id: EntryId) -> Result<Option<SyncRecord>> {
        let mut rows = self
            .db
            .connection()
            .query(
                "SELECT entry_id, remote_post_id, fingerprint, synced_at
                 FROM sync_records
                 WHERE entry_id = ?",
                params![entry_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, record: &SyncRecord) -> Result<()> {
        self.db
            .connection()
            .execute(
                "INSERT INTO sync_records (entry_id, remote_post_id, fingerprint, synced_at)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(entry_id) DO UPDATE SET
                     remote_post_id = excluded.remote_post_id,
                     fingerprint = excluded.fingerprint,
                     synced_at = excluded.synced_at",
                params![
                    record.entry_id,
                    record.remote_post_id.clone(),
                    record.fingerprint.as_str().to_string(),
                    record.synced_at
                ],
            )
            .await?;

        tracing::debug!(
            entry_id = record.entry_id,
            remote_post_id = %record.remote_post_id,
            "Stored sync record"
        );
        Ok(())
    }

    async fn remove_by_remote_id(&self, remote_post_id: &str) -> Result<bool> {
        let rows = self
            .db
            .connection()
            .execute(
                "DELETE FROM sync_records WHERE remote_post_id = ?",
                [remote_post_id],
            )
            .await?;

        Ok(rows > 0)
    }
}
