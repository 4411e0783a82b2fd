use crate::error::{PulmoError, Result};
use crate::layout::DataLayout;
use crate::meta::record::{NoduleRecord, ScanRecord};
use log::info;
use std::path::Path;

/// In-memory metadata tables with per-patient lookup
///
/// Both CSV tables are loaded once at startup and never mutated. Missing
/// tables are fatal: the viewer cannot do anything useful without them.
#[derive(Debug, Clone)]
pub struct MetaStore {
    scans: Vec<ScanRecord>,
    nodules: Vec<NoduleRecord>,
}

impl MetaStore {
    /// Loads both metadata tables from the data directory
    ///
    /// # Errors
    ///
    /// Returns [`PulmoError::MissingMetadata`] if either CSV is absent, and
    /// a metadata error if a row fails to parse.
    pub fn load(layout: &DataLayout) -> Result<Self> {
        let scans = read_table::<ScanRecord>(&layout.scan_meta_path())?;
        let nodules = read_table::<NoduleRecord>(&layout.nodule_meta_path())?;

        info!(
            "Loaded metadata: {} scans, {} nodules",
            scans.len(),
            nodules.len()
        );

        Ok(Self { scans, nodules })
    }

    /// Builds a store from already-parsed records (tests, fixtures)
    pub fn from_records(scans: Vec<ScanRecord>, nodules: Vec<NoduleRecord>) -> Self {
        Self { scans, nodules }
    }

    /// Returns unique patient identifiers in first-appearance order
    pub fn patients(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.scans
            .iter()
            .map(|scan| scan.patient_id.as_str())
            .filter(|pid| seen.insert(*pid))
            .collect()
    }

    /// Returns the scan record for a patient, if present
    pub fn scan_for(&self, pid: &str) -> Option<&ScanRecord> {
        self.scans.iter().find(|scan| scan.patient_id == pid)
    }

    /// Returns a patient's nodule records in table order
    pub fn nodules_for(&self, pid: &str) -> Vec<&NoduleRecord> {
        self.nodules
            .iter()
            .filter(|nodule| nodule.patient_id == pid)
            .collect()
    }

    /// Returns the number of scan records
    pub fn scan_count(&self) -> usize {
        self.scans.len()
    }

    /// Returns the number of nodule records
    pub fn nodule_count(&self) -> usize {
        self.nodules.len()
    }
}

/// Reads one CSV table into records, failing fast on a missing file
fn read_table<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(PulmoError::MissingMetadata(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
