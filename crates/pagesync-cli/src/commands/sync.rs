use std::path::Path;
use std::sync::Arc;

use pagesync_core::auth::Credential;

use crate::commands::common::{build_reconciler, open_store, outcome_to_item, read_entry};
use crate::config::CliConfig;
use crate::error::CliError;

pub async fn run_sync(
    source: &Path,
    as_json: bool,
    config: &CliConfig,
    credential: Option<Credential>,
    db_path: &Path,
) -> Result<(), CliError> {
    let entry = read_entry(source)?;
    let store = open_store(db_path).await?;
    let reconciler = build_reconciler(config, Arc::new(store), credential)?;

    tracing::debug!(
        entry_id = entry.id,
        page_id = %reconciler.settings().page_id,
        "Syncing entry"
    );
    let outcome = reconciler.sync(&entry).await?;
    if as_json {
        let item = outcome_to_item(entry.id, &outcome);
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!("Entry {}: {outcome}", entry.id);
    }
    Ok(())
}
