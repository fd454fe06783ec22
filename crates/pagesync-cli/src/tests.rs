use std::path::PathBuf;
use std::sync::Arc;

use pagesync_core::auth::Credential;
use pagesync_core::db::FingerprintStore;
use pagesync_core::{Fingerprint, SyncError, SyncOutcome, SyncRecord};
use pretty_assertions::assert_eq;

use crate::commands::common::{
    build_reconciler, format_record_lines, format_synced_at, open_store, outcome_to_item,
    parse_entry, read_entry, record_to_item,
};
use crate::commands::forget::{normalize_remote_post_id, run_forget};
use crate::commands::show::run_show;
use crate::commands::sync::run_sync;
use crate::config::{CliConfig, TokenKind};
use crate::error::CliError;

fn configured() -> CliConfig {
    CliConfig {
        page_id: Some("1234".to_string()),
        site_base_url: Some("https://example.com".to_string()),
        ..CliConfig::default()
    }
}

fn record(entry_id: i64, remote_post_id: &str) -> SyncRecord {
    SyncRecord {
        entry_id,
        remote_post_id: remote_post_id.to_string(),
        fingerprint: Fingerprint::from_stored("abc123"),
        synced_at: 1_700_000_000_000,
    }
}

async fn seeded_db(records: &[SyncRecord]) -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("nested").join("pagesync.db");
    let store = open_store(&db_path).await.unwrap();
    for record in records {
        store.upsert(record).await.unwrap();
    }
    (tmp, db_path)
}

#[test]
fn parse_entry_applies_defaults() {
    let entry = parse_entry(r#"{ "id": 5, "url": "https://example.com/a" }"#).unwrap();
    assert_eq!(entry.id, 5);
    assert!(!entry.post_on_page);
    assert!(entry.image_path.is_none());
    assert_eq!(entry.subtitle, "");
}

#[test]
fn parse_entry_rejects_missing_url() {
    assert!(matches!(
        parse_entry(r#"{ "id": 5 }"#),
        Err(CliError::Serialization(_))
    ));
}

#[test]
fn read_entry_loads_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("entry.json");
    std::fs::write(
        &path,
        r#"{ "id": 9, "post_on_page": true, "subtitle": "Hi", "url": "https://example.com/hi", "image_path": "/img/hi.jpg" }"#,
    )
    .unwrap();

    let entry = read_entry(&path).unwrap();
    assert_eq!(entry.id, 9);
    assert!(entry.post_on_page);
    assert_eq!(entry.image_path.as_deref(), Some("/img/hi.jpg"));
}

#[test]
fn read_entry_reports_missing_file() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(matches!(
        read_entry(&tmp.path().join("missing.json")),
        Err(CliError::Io(_))
    ));
}

#[test]
fn normalize_remote_post_id_trims_and_rejects_empty() {
    assert_eq!(normalize_remote_post_id("  1_2 ").unwrap(), "1_2");
    assert!(matches!(
        normalize_remote_post_id(" \t "),
        Err(CliError::EmptyRemotePostId)
    ));
}

#[test]
fn format_synced_at_renders_utc() {
    assert_eq!(format_synced_at(0), "1970-01-01 00:00:00 UTC");
    assert_eq!(format_synced_at(1_700_000_000_000), "2023-11-14 22:13:20 UTC");
}

#[test]
fn record_lines_include_remote_post() {
    let lines = format_record_lines(&record(3, "1234_99"));
    assert_eq!(lines.len(), 4);
    assert!(lines[0].ends_with('3'));
    assert!(lines[1].ends_with("1234_99"));
    assert!(lines[2].ends_with("abc123"));
    assert!(lines[3].ends_with("UTC"));
}

#[test]
fn record_item_serializes_fingerprint_as_string() {
    let value = serde_json::to_value(record_to_item(&record(3, "1234_99"))).unwrap();
    assert_eq!(value["fingerprint"], "abc123");
    assert_eq!(value["remote_post_id"], "1234_99");
    assert_eq!(value["synced_at"], 1_700_000_000_000_i64);
}

#[test]
fn outcome_item_labels_each_outcome() {
    let created = outcome_to_item(
        1,
        &SyncOutcome::Created {
            remote_post_id: "p".to_string(),
        },
    );
    assert_eq!(created.outcome, "created");
    assert_eq!(created.remote_post_id.as_deref(), Some("p"));

    let skipped = outcome_to_item(1, &SyncOutcome::Skipped);
    assert_eq!(skipped.outcome, "skipped");
    assert!(skipped.remote_post_id.is_none());
}

#[test]
fn build_reconciler_requires_configured_page() {
    let result = build_reconciler(&CliConfig::default(), Arc::new(NoStore), None);
    assert!(matches!(result, Err(CliError::Config(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn reconciler_without_credential_reports_unavailable() {
    let (_tmp, db_path) = seeded_db(&[]).await;
    let store = open_store(&db_path).await.unwrap();
    let reconciler = build_reconciler(&configured(), Arc::new(store), None).unwrap();
    assert_eq!(reconciler.settings().page_id, "1234");
    assert_eq!(reconciler.settings().site_base_url, "https://example.com");

    let entry = parse_entry(r#"{ "id": 1, "post_on_page": true, "url": "https://example.com/a" }"#)
        .unwrap();
    let result = reconciler.sync(&entry).await;
    assert!(matches!(result, Err(SyncError::CredentialUnavailable(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn user_token_reconciler_without_credential_reports_unavailable() {
    let (_tmp, db_path) = seeded_db(&[]).await;
    let store = open_store(&db_path).await.unwrap();
    let config = CliConfig {
        token_kind: TokenKind::User,
        ..configured()
    };
    let reconciler = build_reconciler(&config, Arc::new(store), None).unwrap();

    let entry = parse_entry(r#"{ "id": 1, "post_on_page": true, "url": "https://example.com/a" }"#)
        .unwrap();
    assert!(matches!(
        reconciler.sync(&entry).await,
        Err(SyncError::CredentialUnavailable(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_sync_skips_unflagged_entry_without_recording() {
    let (tmp, db_path) = seeded_db(&[]).await;
    let entry_path = tmp.path().join("entry.json");
    std::fs::write(
        &entry_path,
        r#"{ "id": 4, "post_on_page": false, "url": "https://example.com/a" }"#,
    )
    .unwrap();

    run_sync(
        &entry_path,
        true,
        &configured(),
        Some(Credential::new("page-token", None)),
        &db_path,
    )
    .await
    .unwrap();

    let store = open_store(&db_path).await.unwrap();
    assert!(store.find(4).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn run_sync_surfaces_missing_credential() {
    let (tmp, db_path) = seeded_db(&[]).await;
    let entry_path = tmp.path().join("entry.json");
    std::fs::write(
        &entry_path,
        r#"{ "id": 4, "post_on_page": true, "url": "https://example.com/a" }"#,
    )
    .unwrap();

    let result = run_sync(&entry_path, false, &configured(), None, &db_path).await;
    assert!(matches!(
        result,
        Err(CliError::Sync(SyncError::CredentialUnavailable(_)))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_show_reports_missing_record() {
    let (_tmp, db_path) = seeded_db(&[record(1, "1234_1")]).await;

    run_show(1, false, &db_path).await.unwrap();
    run_show(1, true, &db_path).await.unwrap();
    assert!(matches!(
        run_show(2, false, &db_path).await,
        Err(CliError::RecordNotFound(2))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_forget_removes_record_by_remote_id() {
    let (_tmp, db_path) = seeded_db(&[record(1, "1234_1"), record(2, "1234_2")]).await;

    run_forget(" 1234_1 ", &db_path).await.unwrap();

    let store = open_store(&db_path).await.unwrap();
    assert!(store.find(1).await.unwrap().is_none());
    assert_eq!(store.find(2).await.unwrap(), Some(record(2, "1234_2")));

    assert!(matches!(
        run_forget("1234_1", &db_path).await,
        Err(CliError::RemotePostNotFound(id)) if id == "1234_1"
    ));
    assert!(matches!(
        run_forget("", &db_path).await,
        Err(CliError::EmptyRemotePostId)
    ));
}

struct NoStore;

#[async_trait::async_trait]
impl FingerprintStore for NoStore {
    async fn find(&self, _entry_id: i64) -> pagesync_core::Result<Option<SyncRecord>> {
        Ok(None)
    }

    async fn upsert(&self, _record: &SyncRecord) -> pagesync_core::Result<()> {
        Ok(())
    }

    async fn remove_by_remote_id(&self, _remote_post_id: &str) -> pagesync_core::Result<bool> {
        Ok(false)
    }
}
