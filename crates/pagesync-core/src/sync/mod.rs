//! Entry to page post reconciliation.
//!
//! [`SyncReconciler::sync`] decides whether an entry is new, changed or
//! unchanged since its last successful post and issues at most one remote
//! write accordingly. Syncs of the same entry are serialized; the stored
//! record is only written after the remote write succeeded.

mod locks;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::auth::{Credential, TokenProvider};
use crate::config::SyncSettings;
use crate::db::FingerprintStore;
use crate::fingerprint::Fingerprint;
use crate::graph::{GraphError, RemoteApiClient};
use crate::models::{Entry, EntryId, PostPayload, SyncRecord};

pub use locks::{EntryGuard, EntryLocks};

/// Tracing target for events that need a human to act
pub const OPERATOR_TARGET: &str = "pagesync::operator";

/// Remote write a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Create,
    Update,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update => f.write_str("update"),
        }
    }
}

/// Successful result of a sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Entry is not flagged for posting
    Skipped,
    /// First post of the entry
    Created { remote_post_id: String },
    /// Existing post edited
    Updated { remote_post_id: String },
    /// Nothing changed since the last post
    Unchanged { remote_post_id: String },
}

impl SyncOutcome {
    pub fn remote_post_id(&self) -> Option<&str> {
        match self {
            Self::Skipped => None,
            Self::Created { remote_post_id }
            | Self::Updated { remote_post_id }
            | Self::Unchanged { remote_post_id } => Some(remote_post_id),
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => f.write_str("skipped (not flagged for posting)"),
            Self::Created { remote_post_id } => write!(f, "created post {remote_post_id}"),
            Self::Updated { remote_post_id } => write!(f, "updated post {remote_post_id}"),
            Self::Unchanged { remote_post_id } => write!(f, "unchanged (post {remote_post_id})"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// No usable access token; nothing was sent or stored
    #[error("No valid access token: {0}")]
    CredentialUnavailable(String),

    /// The remote API refused the write; the store holds no stale record
    #[error("Remote {action} for entry {entry_id} was rejected: {source}")]
    RemoteRejected {
        action: SyncAction,
        entry_id: EntryId,
        #[source]
        source: GraphError,
    },

    /// The store failed before anything was sent
    #[error("Sync record store failed: {0}")]
    Store(#[from] crate::Error),

    /// The remote write succeeded but its record could not be stored
    #[error("Post {remote_post_id} for entry {entry_id} was published but not recorded: {source}")]
    Unrecorded {
        entry_id: EntryId,
        remote_post_id: String,
        #[source]
        source: crate::Error,
    },
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Publishes entries to the configured page
pub struct SyncReconciler {
    tokens: Arc<dyn TokenProvider>,
    remote: Arc<dyn RemoteApiClient>,
    store: Arc<dyn FingerprintStore>,
    settings: SyncSettings,
    locks: EntryLocks,
}

impl SyncReconciler {
    pub fn new(
        tokens: Arc<dyn TokenProvider>,
        remote: Arc<dyn RemoteApiClient>,
        store: Arc<dyn FingerprintStore>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            tokens,
            remote,
            store,
            settings,
            locks: EntryLocks::new(),
        }
    }

    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Bring the page post of `entry` in line with its current content
    pub async fn sync(&self, entry: &Entry) -> SyncResult<SyncOutcome> {
        let credential = self.load_credential(entry.id).await?;

        let payload = PostPayload::from_entry(entry, &self.settings.site_base_url);
        if !payload.should_post {
            tracing::debug!(entry_id = entry.id, "Entry is not flagged for posting");
            return Ok(SyncOutcome::Skipped);
        }
        let fingerprint = payload.fingerprint();

        let _guard = self.locks.lock(entry.id).await;
        match self.store.find(entry.id).await? {
            None => self.create(&payload, fingerprint, &credential).await,
            Some(record) if record.fingerprint == fingerprint => {
                tracing::debug!(
                    entry_id = entry.id,
                    remote_post_id = %record.remote_post_id,
                    "Entry unchanged since last post"
                );
                Ok(SyncOutcome::Unchanged {
                    remote_post_id: record.remote_post_id,
                })
            }
            Some(record) => self.update(&payload, fingerprint, record, &credential).await,
        }
    }

    async fn load_credential(&self, entry_id: EntryId) -> SyncResult<Credential> {
        match self.tokens.load_valid_token().await {
            Ok(Some(credential)) => Ok(credential),
            Ok(None) => {
                tracing::warn!(
                    target: OPERATOR_TARGET,
                    entry_id,
                    "No valid access token; entry not synced. Re-authorize the page connection."
                );
                Err(SyncError::CredentialUnavailable(
                    "no access token is configured or it has expired".to_string(),
                ))
            }
            Err(error) => {
                tracing::warn!(
                    target: OPERATOR_TARGET,
                    entry_id,
                    %error,
                    "Loading the access token failed; entry not synced"
                );
                Err(SyncError::CredentialUnavailable(error.to_string()))
            }
        }
    }

    async fn page_credential(&self, credential: &Credential) -> SyncResult<Credential> {
        self.tokens
            .exchange_page_token(credential)
            .await
            .map_err(|error| SyncError::CredentialUnavailable(error.to_string()))
    }

    async fn create(
        &self,
        payload: &PostPayload,
        fingerprint: Fingerprint,
        credential: &Credential,
    ) -> SyncResult<SyncOutcome> {
        let entry_id = payload.entry_id;
        let page_credential = self.page_credential(credential).await?;
        let endpoint = self.settings.feed_endpoint();

        let response = self
            .remote
            .post(&endpoint, &payload.publish_params(), &page_credential)
            .await
            .and_then(|response| {
                response.id.ok_or_else(|| {
                    GraphError::InvalidPayload("create response did not include an id".to_string())
                })
            });

        let remote_post_id = match response {
            Ok(remote_post_id) => remote_post_id,
            Err(source) => {
                tracing::warn!(entry_id, error = %source, "Creating page post failed");
                return Err(SyncError::RemoteRejected {
                    action: SyncAction::Create,
                    entry_id,
                    source,
                });
            }
        };

        tracing::info!(entry_id, remote_post_id = %remote_post_id, "Created page post");
        let record = SyncRecord::new(entry_id, remote_post_id.clone(), fingerprint);
        if let Err(source) = self.store.upsert(&record).await {
            // The upsert is atomic; any row already holding this id belongs to another entry
            return Err(self.unrecorded(entry_id, remote_post_id, source));
        }

        Ok(SyncOutcome::Created { remote_post_id })
    }

    async fn update(
        &self,
        payload: &PostPayload,
        fingerprint: Fingerprint,
        record: SyncRecord,
        credential: &Credential,
    ) -> SyncResult<SyncOutcome> {
        let entry_id = payload.entry_id;
        let page_credential = self.page_credential(credential).await?;

        if let Err(source) = self
            .remote
            .post(
                &record.remote_post_id,
                &payload.update_params(),
                &page_credential,
            )
            .await
        {
            if source.is_missing_object() {
                // Post is gone; the next sync publishes afresh
                self.discard(&record.remote_post_id).await;
            }
            tracing::error!(
                target: OPERATOR_TARGET,
                entry_id,
                remote_post_id = %record.remote_post_id,
                error = %source,
                "Updating page post failed; the page shows outdated content"
            );
            return Err(SyncError::RemoteRejected {
                action: SyncAction::Update,
                entry_id,
                source,
            });
        }

        tracing::info!(entry_id, remote_post_id = %record.remote_post_id, "Updated page post");
        let remote_post_id = record.remote_post_id;
        let updated = SyncRecord::new(entry_id, remote_post_id.clone(), fingerprint);
        if let Err(source) = self.store.upsert(&updated).await {
            return Err(self.unrecorded(entry_id, remote_post_id, source));
        }

        Ok(SyncOutcome::Updated { remote_post_id })
    }

    async fn discard(&self, remote_post_id: &str) {
        match self.store.remove_by_remote_id(remote_post_id).await {
            Ok(removed) => {
                tracing::debug!(remote_post_id, removed, "Discarded sync record");
            }
            Err(error) => {
                tracing::error!(
                    target: OPERATOR_TARGET,
                    remote_post_id,
                    %error,
                    "Discarding sync record failed"
                );
            }
        }
    }

    fn unrecorded(&self, entry_id: EntryId, remote_post_id: String, source: crate::Error) -> SyncError {
        tracing::error!(
            target: OPERATOR_TARGET,
            entry_id,
            remote_post_id = %remote_post_id,
            page_id = %self.settings.page_id,
            error = %source,
            "Page post was published but its sync record was not stored; reconcile manually"
        );
        SyncError::Unrecorded {
            entry_id,
            remote_post_id,
            source,
        }
    }
}
