//! Combining per-structure boolean masks into one overlay mask

use super::DEFAULT_MASK_SHAPE;
use log::warn;
use ndarray::{Array3, Zip};

/// Folds a set of boolean masks into a single mask via elementwise OR
///
/// The first mask fixes the expected shape; any later mask with a different
/// shape is skipped with a warning rather than aborting the whole overlay.
/// An empty input yields an all-false mask of the default scan shape so the
/// viewer can still composite (to no visible effect).
pub fn combine_masks(masks: Vec<Array3<bool>>) -> Array3<bool> {
    let mut iter = masks.into_iter();
    let Some(mut combined) = iter.next() else {
        return Array3::from_elem(DEFAULT_MASK_SHAPE, false);
    };
    for mask in iter {
        if mask.dim() != combined.dim() {
            warn!(
                "Skipping mask with shape {:?}, expected {:?}",
                mask.dim(),
                combined.dim()
            );
            continue;
        }
        Zip::from(&mut combined)
            .and(&mask)
            .for_each(|acc, &m| *acc = *acc || m);
    }
    combined
}
