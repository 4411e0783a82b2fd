pub mod app;
pub mod cache;
pub mod cli;
pub mod error;
pub mod layout;
pub mod meta;
pub mod render;
pub mod types;
pub mod volume;

pub use cli::report::PatientReport;
pub use error::{PulmoError, Result};
pub use layout::DataLayout;
pub use meta::{MetaStore, NoduleRecord, ScanRecord};
pub use types::*;
pub use volume::VolumeStore;
