//! On-disk layout of the precomputed dataset
//!
//! The data directory is produced by an external preparation step and is
//! treated as read-only:
//!
//! ```text
//! <root>/scan_meta.csv
//! <root>/nodule_meta.csv
//! <root>/<PatientID>/scan.npy
//! <root>/<PatientID>/*_mask.npy
//! <root>/<PatientID>/nodule_<NoduleID:02>_vol.npy
//! ```

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Resolves every path in the dataset directory
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Creates a layout rooted at the given data directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the data directory root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the per-scan metadata table
    pub fn scan_meta_path(&self) -> PathBuf {
        self.root.join("scan_meta.csv")
    }

    /// Path of the per-nodule metadata table
    pub fn nodule_meta_path(&self) -> PathBuf {
        self.root.join("nodule_meta.csv")
    }

    /// Directory holding one patient's volumes
    pub fn patient_dir(&self, pid: &str) -> PathBuf {
        self.root.join(pid)
    }

    /// Path of a patient's CT volume
    pub fn ct_volume_path(&self, pid: &str) -> PathBuf {
        self.patient_dir(pid).join("scan.npy")
    }

    /// Path of one nodule sub-volume (`nodule_<id:02>_vol.npy`)
    pub fn nodule_volume_path(&self, pid: &str, nodule_id: u32) -> PathBuf {
        self.patient_dir(pid)
            .join(format!("nodule_{:02}_vol.npy", nodule_id))
    }

    /// Lists a patient's nodule mask files, sorted by filename
    ///
    /// Files are matched on the `*_mask.npy` suffix; everything else in the
    /// patient directory is ignored. A missing patient directory yields an
    /// empty list, the same as a patient without annotations.
    pub fn mask_paths(&self, pid: &str) -> Vec<PathBuf> {
        let dir = self.patient_dir(pid);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(is_mask_filename)
            })
            .collect();

        // Filename order keeps mask combination deterministic
        paths.sort();
        paths
    }
}

/// Checks whether a filename names a nodule mask volume
pub fn is_mask_filename(name: &str) -> bool {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| Regex::new(r"_mask\.npy$").expect("Failed to compile regex"));
    re.is_match(name)
}

/// Returns the default data directory
///
/// `data/` beside the executable when the executable path is resolvable,
/// otherwise `data/` in the working directory. The viewer takes no CLI
/// arguments, so this mirrors the original "data next to the program"
/// convention.
pub fn default_data_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("data")))
        .filter(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from("data"))
}
