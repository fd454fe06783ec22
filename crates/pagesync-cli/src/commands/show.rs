use std::path::Path;

use pagesync_core::db::FingerprintStore;

use crate::commands::common::{format_record_lines, open_store, record_to_item};
use crate::error::CliError;

pub async fn run_show(entry_id: i64, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let store = open_store(db_path).await?;
    let record = store
        .find(entry_id)
        .await?
        .ok_or(CliError::RecordNotFound(entry_id))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&record_to_item(&record))?);
    } else {
        for line in format_record_lines(&record) {
            println!("{line}");
        }
    }
    Ok(())
}
