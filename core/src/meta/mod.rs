//! Metadata tables and per-patient lookup
//!
//! Loads the two CSV tables (`scan_meta.csv`, `nodule_meta.csv`) produced by
//! the data preparation step and serves per-patient views over them.

mod record;
mod store;

pub use record::{NoduleRecord, ScanRecord};
pub use store::MetaStore;
