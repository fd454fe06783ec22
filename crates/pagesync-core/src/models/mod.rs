//! Data models for pagesync

mod entry;
mod payload;
mod record;

pub use entry::{Entry, EntryId};
pub use payload::{PostPayload, UPDATABLE_FIELDS};
pub use record::SyncRecord;
