//! Database layer for pagesync

mod connection;
mod memory;
mod migrations;
mod store;

pub use connection::Database;
pub use memory::MemoryFingerprintStore;
pub use store::{FingerprintStore, LibSqlFingerprintStore};
