//! pagesync-core - Core library for pagesync
//!
//! Posts CMS entries to a social media page and keeps them up to date.
//! Each entry is fingerprinted; the fingerprint of the last successful post
//! is stored locally so unchanged entries are never posted twice.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod graph;
pub mod models;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use fingerprint::Fingerprint;
pub use models::{Entry, PostPayload, SyncRecord};
pub use sync::{SyncAction, SyncError, SyncOutcome, SyncReconciler};
