use std::path::Path;

use pagesync_core::db::FingerprintStore;
use pagesync_core::util::normalize_text_option;

use crate::commands::common::open_store;
use crate::error::CliError;

pub fn normalize_remote_post_id(raw: &str) -> Result<String, CliError> {
    normalize_text_option(Some(raw.to_string())).ok_or(CliError::EmptyRemotePostId)
}

pub async fn run_forget(remote_post_id: &str, db_path: &Path) -> Result<(), CliError> {
    let remote_post_id = normalize_remote_post_id(remote_post_id)?;
    let store = open_store(db_path).await?;

    if !store.remove_by_remote_id(&remote_post_id).await? {
        return Err(CliError::RemotePostNotFound(remote_post_id));
    }
    tracing::info!(remote_post_id = %remote_post_id, "Forgot sync record");
    println!("{remote_post_id}");
    Ok(())
}
