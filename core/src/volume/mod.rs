//! Volume loading and caching
//!
//! Scans, annotation masks, and nodule crops all arrive as NumPy `.npy`
//! arrays indexed `[row, column, slice]`. This module reads them into
//! [`ndarray`] arrays, substitutes documented defaults for missing
//! non-essential files, and caches everything per session through
//! [`VolumeStore`].

mod loader;
mod masks;

pub use loader::{load_ct_volume, load_mask_volume, load_nodule_volume, VolumeStore};
pub use masks::combine_masks;

/// Shape of the fallback mask when a patient has no mask files
pub const DEFAULT_MASK_SHAPE: (usize, usize, usize) = (512, 512, 100);

/// Shape of the fallback cube when a nodule crop is missing
pub const NODULE_SHAPE: (usize, usize, usize) = (64, 64, 64);
