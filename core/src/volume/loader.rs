//! Loading CT, mask, and nodule volumes from `.npy` files

use crate::cache::Memo;
use crate::error::{PulmoError, Result};
use crate::layout::DataLayout;
use crate::volume::{combine_masks, DEFAULT_MASK_SHAPE, NODULE_SHAPE};
use log::{debug, info, warn};
use ndarray::Array3;
use ndarray_npy::ReadNpyExt;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Reads a 3-D numeric volume, converting integer and double payloads to f32
///
/// Scan exports are written as f32, but some sources store raw Hounsfield
/// units as i16 or full-precision f64. Each dtype is tried against a fresh
/// reader; the f32 error is reported if none match.
fn read_numeric_volume(path: &Path) -> Result<Array3<f32>> {
    match Array3::<f32>::read_npy(File::open(path)?) {
        Ok(volume) => Ok(volume),
        Err(f32_err) => {
            if let Ok(volume) = Array3::<i16>::read_npy(File::open(path)?) {
                debug!("Converted i16 volume to f32: {}", path.display());
                return Ok(volume.mapv(f32::from));
            }
            if let Ok(volume) = Array3::<f64>::read_npy(File::open(path)?) {
                debug!("Converted f64 volume to f32: {}", path.display());
                return Ok(volume.mapv(|v| v as f32));
            }
            Err(f32_err.into())
        }
    }
}

fn read_mask_file(path: &Path) -> Result<Array3<bool>> {
    Ok(Array3::<bool>::read_npy(File::open(path)?)?)
}

/// Loads the full CT volume for a patient
///
/// A missing file is fatal for the patient: the viewer cannot show anything
/// without the scan, so this returns [`PulmoError::MissingCtVolume`] rather
/// than a placeholder.
pub fn load_ct_volume(layout: &DataLayout, patient_id: &str) -> Result<Array3<f32>> {
    let path = layout.ct_volume_path(patient_id);
    if !path.exists() {
        return Err(PulmoError::MissingCtVolume(patient_id.to_string()));
    }
    let volume = read_numeric_volume(&path)?;
    info!(
        "Loaded CT volume for patient '{}' with shape {:?}",
        patient_id,
        volume.dim()
    );
    Ok(volume)
}

/// Loads and combines every annotation mask for a patient
///
/// Mask files are discovered by [`DataLayout::mask_paths`] and OR-ed in
/// sorted filename order. Masks are decorative, so degraded data never
/// aborts: missing or unreadable files produce warnings and the result
/// falls back to an all-false volume when nothing loads.
pub fn load_mask_volume(layout: &DataLayout, patient_id: &str) -> Array3<bool> {
    let paths = layout.mask_paths(patient_id);
    if paths.is_empty() {
        warn!("No mask files found for patient '{}'", patient_id);
        return Array3::from_elem(DEFAULT_MASK_SHAPE, false);
    }

    let mut masks = Vec::with_capacity(paths.len());
    for path in &paths {
        match read_mask_file(path) {
            Ok(mask) => masks.push(mask),
            Err(e) => warn!("Skipping unreadable mask {}: {}", path.display(), e),
        }
    }
    if masks.is_empty() {
        warn!(
            "No readable mask files for patient '{}' ({} found)",
            patient_id,
            paths.len()
        );
        return Array3::from_elem(DEFAULT_MASK_SHAPE, false);
    }
    debug!(
        "Combined {} mask file(s) for patient '{}'",
        masks.len(),
        patient_id
    );
    combine_masks(masks)
}

/// Loads the cropped sub-volume around one nodule
///
/// Nodule crops are auxiliary detail views; a missing or unreadable file
/// yields an all-zero cube and a warning instead of an error.
pub fn load_nodule_volume(layout: &DataLayout, patient_id: &str, nodule_id: u32) -> Array3<f32> {
    let path = layout.nodule_volume_path(patient_id, nodule_id);
    if !path.exists() {
        warn!(
            "Nodule volume not found for patient '{}' nodule {}: {}",
            patient_id,
            nodule_id,
            path.display()
        );
        return Array3::zeros(NODULE_SHAPE);
    }
    match read_numeric_volume(&path) {
        Ok(volume) => volume,
        Err(e) => {
            warn!(
                "Could not read nodule volume {}: {}",
                path.display(),
                e
            );
            Array3::zeros(NODULE_SHAPE)
        }
    }
}

/// Session-lifetime volume cache
///
/// Wraps the loader functions with [`Memo`] maps so each patient's CT,
/// combined mask, and nodule crops hit the filesystem once. Failed CT loads
/// are not cached and will retry on the next request.
#[derive(Debug)]
pub struct VolumeStore {
    layout: DataLayout,
    ct: Memo<String, Array3<f32>>,
    masks: Memo<String, Array3<bool>>,
    nodules: Memo<(String, u32), Array3<f32>>,
}

impl VolumeStore {
    /// Creates a store reading from the given layout
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            ct: Memo::new(),
            masks: Memo::new(),
            nodules: Memo::new(),
        }
    }

    /// Returns the layout this store reads from
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Returns the CT volume for a patient, loading it on first access
    pub fn ct_volume(&mut self, patient_id: &str) -> Result<Arc<Array3<f32>>> {
        let layout = &self.layout;
        self.ct
            .try_get_or_insert_with(patient_id.to_string(), || {
                load_ct_volume(layout, patient_id)
            })
    }

    /// Returns the combined annotation mask for a patient
    pub fn mask_volume(&mut self, patient_id: &str) -> Arc<Array3<bool>> {
        let layout = &self.layout;
        self.masks
            .get_or_insert_with(patient_id.to_string(), || {
                load_mask_volume(layout, patient_id)
            })
    }

    /// Returns the cropped volume for one nodule of a patient
    pub fn nodule_volume(&mut self, patient_id: &str, nodule_id: u32) -> Arc<Array3<f32>> {
        let layout = &self.layout;
        self.nodules
            .get_or_insert_with((patient_id.to_string(), nodule_id), || {
                load_nodule_volume(layout, patient_id, nodule_id)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_npy::WriteNpyExt;
    use std::fs;
    use tempfile::TempDir;

    fn write_npy_f32(path: &Path, volume: &Array3<f32>) {
        volume.write_npy(File::create(path).unwrap()).unwrap();
    }

    fn write_npy_bool(path: &Path, volume: &Array3<bool>) {
        volume.write_npy(File::create(path).unwrap()).unwrap();
    }

    fn patient_fixture(root: &Path, patient_id: &str) -> std::path::PathBuf {
        let dir = root.join(patient_id);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_ct_volume_f32() {
        let tmp = TempDir::new().unwrap();
        let dir = patient_fixture(tmp.path(), "P1");
        let volume = Array3::from_shape_fn((4, 4, 3), |(r, c, z)| (r + c + z) as f32);
        write_npy_f32(&dir.join("scan.npy"), &volume);

        let layout = DataLayout::new(tmp.path());
        let loaded = load_ct_volume(&layout, "P1").unwrap();
        assert_eq!(loaded, volume);
    }

    #[test]
    fn test_load_ct_volume_converts_i16() {
        let tmp = TempDir::new().unwrap();
        let dir = patient_fixture(tmp.path(), "P1");
        let volume = Array3::<i16>::from_shape_fn((2, 2, 2), |(r, c, z)| {
            (r as i16) * 100 + (c as i16) * 10 + z as i16 - 600
        });
        volume
            .write_npy(File::create(dir.join("scan.npy")).unwrap())
            .unwrap();

        let layout = DataLayout::new(tmp.path());
        let loaded = load_ct_volume(&layout, "P1").unwrap();
        assert_eq!(loaded[[0, 0, 0]], -600.0);
        assert_eq!(loaded[[1, 1, 1]], -489.0);
    }

    #[test]
    fn test_load_ct_volume_converts_f64() {
        let tmp = TempDir::new().unwrap();
        let dir = patient_fixture(tmp.path(), "P1");
        let volume =
            Array3::<f64>::from_shape_fn((2, 2, 2), |(r, c, z)| (r + c + z) as f64 * 0.5 - 600.0);
        volume
            .write_npy(File::create(dir.join("scan.npy")).unwrap())
            .unwrap();

        let layout = DataLayout::new(tmp.path());
        let loaded = load_ct_volume(&layout, "P1").unwrap();
        assert_eq!(loaded[[0, 0, 0]], -600.0);
        assert_eq!(loaded[[1, 1, 1]], -598.5);
    }

    #[test]
    fn test_load_ct_volume_missing_is_fatal() {
        let tmp = TempDir::new().unwrap();
        patient_fixture(tmp.path(), "P1");

        let layout = DataLayout::new(tmp.path());
        let result = load_ct_volume(&layout, "P1");
        assert!(matches!(result, Err(PulmoError::MissingCtVolume(ref p)) if p == "P1"));
    }

    #[test]
    fn test_load_mask_volume_missing_defaults_all_false() {
        let tmp = TempDir::new().unwrap();
        patient_fixture(tmp.path(), "P1");

        let layout = DataLayout::new(tmp.path());
        let mask = load_mask_volume(&layout, "P1");
        assert_eq!(mask.dim(), DEFAULT_MASK_SHAPE);
        assert!(mask.iter().all(|&v| !v));
    }

    #[test]
    fn test_load_mask_volume_unions_files() {
        let tmp = TempDir::new().unwrap();
        let dir = patient_fixture(tmp.path(), "P1");
        let mut a = Array3::from_elem((2, 2, 2), false);
        a[[0, 0, 0]] = true;
        let mut b = Array3::from_elem((2, 2, 2), false);
        b[[1, 1, 0]] = true;
        write_npy_bool(&dir.join("nodule_00_mask.npy"), &a);
        write_npy_bool(&dir.join("nodule_01_mask.npy"), &b);

        let layout = DataLayout::new(tmp.path());
        let mask = load_mask_volume(&layout, "P1");
        assert!(mask[[0, 0, 0]]);
        assert!(mask[[1, 1, 0]]);
        assert_eq!(mask.iter().filter(|&&v| v).count(), 2);
    }

    #[test]
    fn test_load_nodule_volume_missing_defaults_zeros() {
        let tmp = TempDir::new().unwrap();
        patient_fixture(tmp.path(), "P1");

        let layout = DataLayout::new(tmp.path());
        let volume = load_nodule_volume(&layout, "P1", 3);
        assert_eq!(volume.dim(), NODULE_SHAPE);
        assert!(volume.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_load_nodule_volume_reads_crop() {
        let tmp = TempDir::new().unwrap();
        let dir = patient_fixture(tmp.path(), "P1");
        let volume = Array3::from_elem((3, 3, 3), 7.5f32);
        write_npy_f32(&dir.join("nodule_02_vol.npy"), &volume);

        let layout = DataLayout::new(tmp.path());
        let loaded = load_nodule_volume(&layout, "P1", 2);
        assert_eq!(loaded, volume);
    }

    #[test]
    fn test_volume_store_caches_ct() {
        let tmp = TempDir::new().unwrap();
        let dir = patient_fixture(tmp.path(), "P1");
        write_npy_f32(&dir.join("scan.npy"), &Array3::from_elem((2, 2, 2), 1.0));

        let mut store = VolumeStore::new(DataLayout::new(tmp.path()));
        let first = store.ct_volume("P1").unwrap();

        // Removing the file must not matter once the volume is cached
        fs::remove_file(dir.join("scan.npy")).unwrap();
        let second = store.ct_volume("P1").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_volume_store_retries_failed_ct() {
        let tmp = TempDir::new().unwrap();
        let dir = patient_fixture(tmp.path(), "P1");

        let mut store = VolumeStore::new(DataLayout::new(tmp.path()));
        assert!(store.ct_volume("P1").is_err());

        write_npy_f32(&dir.join("scan.npy"), &Array3::from_elem((2, 2, 2), 2.0));
        assert!(store.ct_volume("P1").is_ok());
    }
}
