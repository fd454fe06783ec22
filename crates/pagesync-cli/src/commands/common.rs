use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pagesync_core::auth::{Credential, StaticTokenProvider, TokenProvider};
use pagesync_core::db::{Database, FingerprintStore, LibSqlFingerprintStore};
use pagesync_core::graph::GraphApiClient;
use pagesync_core::{Entry, SyncOutcome, SyncReconciler, SyncRecord};
use serde::Serialize;

use crate::config::{CliConfig, TokenKind};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct RecordItem {
    pub entry_id: i64,
    pub remote_post_id: String,
    pub fingerprint: String,
    pub synced_at: i64,
    pub synced_at_iso: String,
}

#[derive(Debug, Serialize)]
pub struct SyncItem {
    pub entry_id: i64,
    pub outcome: &'static str,
    pub remote_post_id: Option<String>,
}

pub async fn open_store(db_path: &Path) -> Result<LibSqlFingerprintStore, CliError> {
    let db = Database::open(db_path).await?;
    Ok(LibSqlFingerprintStore::new(db))
}

/// Read an entry from a JSON file, or from stdin when `source` is `-`
pub fn read_entry(source: &Path) -> Result<Entry, CliError> {
    let raw = if source.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(source)?
    };
    parse_entry(&raw)
}

pub fn parse_entry(raw: &str) -> Result<Entry, CliError> {
    Ok(serde_json::from_str(raw)?)
}

pub fn build_reconciler(
    config: &CliConfig,
    store: Arc<dyn FingerprintStore>,
    credential: Option<Credential>,
) -> Result<SyncReconciler, CliError> {
    let settings = config.sync_settings()?;
    let client = GraphApiClient::from_settings(&settings)?;

    let tokens: Arc<dyn TokenProvider> = match config.token_kind {
        TokenKind::Page => Arc::new(StaticTokenProvider::page_token(credential)),
        TokenKind::User => Arc::new(StaticTokenProvider::user_token(
            credential,
            client.clone(),
            settings.page_id.clone(),
        )?),
    };

    Ok(SyncReconciler::new(tokens, Arc::new(client), store, settings))
}

pub fn record_to_item(record: &SyncRecord) -> RecordItem {
    RecordItem {
        entry_id: record.entry_id,
        remote_post_id: record.remote_post_id.clone(),
        fingerprint: record.fingerprint.to_string(),
        synced_at: record.synced_at,
        synced_at_iso: format_synced_at(record.synced_at),
    }
}

pub fn outcome_to_item(entry_id: i64, outcome: &SyncOutcome) -> SyncItem {
    let label = match outcome {
        SyncOutcome::Skipped => "skipped",
        SyncOutcome::Created { .. } => "created",
        SyncOutcome::Updated { .. } => "updated",
        SyncOutcome::Unchanged { .. } => "unchanged",
    };
    SyncItem {
        entry_id,
        outcome: label,
        remote_post_id: outcome.remote_post_id().map(str::to_string),
    }
}

pub fn format_record_lines(record: &SyncRecord) -> Vec<String> {
    vec![
        format!("entry:       {}", record.entry_id),
        format!("remote post: {}", record.remote_post_id),
        format!("fingerprint: {}", record.fingerprint),
        format!("synced at:   {}", format_synced_at(record.synced_at)),
    ]
}

pub fn format_synced_at(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map_or_else(
            || timestamp_ms.to_string(),
            |value| value.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
}
