//! Windowed grayscale rendering of axial slices

use crate::error::{PulmoError, Result};
use crate::types::Window;
use image::{Rgba, RgbaImage};
use ndarray::{s, Array3};

/// Gray value used when the windowed volume has no intensity range
const FLAT_GRAY: u8 = 128;

/// Renders one axial slice of a volume as an opaque grayscale image
///
/// The windowing pipeline matches the clinical convention: every voxel is
/// clipped to the window bounds, and the chosen plane is then normalized by
/// the clipped volume's global minimum and maximum so slice brightness stays
/// comparable while scrolling. Since clipping is monotonic, those extremes
/// are the clamped volume extremes and the clipped copy is never
/// materialized.
///
/// Array axes are `[row, column, slice]`; image axes are `(x = column,
/// y = row)`. A volume whose clipped range collapses (uniform data or a
/// degenerate window) renders as mid-gray instead of dividing by zero.
pub fn render_slice(volume: &Array3<f32>, z: usize, window: Window) -> Result<RgbaImage> {
    let (rows, cols, depth) = volume.dim();
    if z >= depth {
        return Err(PulmoError::SliceOutOfBounds { index: z, depth });
    }

    let (lo, hi) = window.bounds();
    let (vol_min, vol_max) = volume.iter().fold(
        (f32::INFINITY, f32::NEG_INFINITY),
        |(min_acc, max_acc), &v| (min_acc.min(v), max_acc.max(v)),
    );
    let clipped_min = vol_min.clamp(lo, hi);
    let clipped_max = vol_max.clamp(lo, hi);
    let range = clipped_max - clipped_min;

    let plane = volume.slice(s![.., .., z]);
    let image = RgbaImage::from_fn(cols as u32, rows as u32, |x, y| {
        let value = plane[[y as usize, x as usize]];
        let gray = if range > 0.0 {
            let t = (value.clamp(lo, hi) - clipped_min) / range;
            (t * 255.0).round() as u8
        } else {
            FLAT_GRAY
        };
        Rgba([gray, gray, gray, 255])
    });
    Ok(image)
}
