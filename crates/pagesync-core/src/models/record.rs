//! Sync record model

use serde::{Deserialize, Serialize};

use super::EntryId;
use crate::fingerprint::Fingerprint;

/// Last successful post of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Entry the post belongs to (unique)
    pub entry_id: EntryId,
    /// Identifier of the post on the remote page
    pub remote_post_id: String,
    /// Fingerprint of the payload that was posted
    pub fingerprint: Fingerprint,
    /// When the record was written (Unix ms)
    pub synced_at: i64,
}

impl SyncRecord {
    /// Create a record stamped with the current time
    #[must_use]
    pub fn new(entry_id: EntryId, remote_post_id: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            entry_id,
            remote_post_id: remote_post_id.into(),
            fingerprint,
            synced_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
