pub mod common;
pub mod forget;
pub mod show;
pub mod sync;
