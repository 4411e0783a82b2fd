//! Translucent nodule overlay compositing

use image::{GrayImage, Luma, Rgba, RgbaImage};
use log::warn;
use ndarray::{s, Array3};

/// Per-pixel blend factor where the mask marks a nodule
pub const MASK_ALPHA: u8 = 96;

/// Half-transparent green painted over masked pixels
pub const OVERLAY_COLOR: Rgba<u8> = Rgba([0, 128, 0, 128]);

/// Extracts one mask plane as a grayscale blend-factor image
///
/// Marked voxels become [`MASK_ALPHA`], everything else 0. Axes follow the
/// slice renderer: `(x = column, y = row)`. Callers must keep `z` within
/// the mask depth.
pub fn mask_alpha_plane(mask: &Array3<bool>, z: usize) -> GrayImage {
    let (rows, cols, _) = mask.dim();
    let plane = mask.slice(s![.., .., z]);
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        if plane[[y as usize, x as usize]] {
            Luma([MASK_ALPHA])
        } else {
            Luma([0])
        }
    })
}

/// Builds the solid green overlay layer at the given dimensions
pub fn overlay_layer(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, OVERLAY_COLOR)
}

/// Blends an overlay onto a base image through a grayscale factor image
///
/// All four channels interpolate linearly: with factor `t = alpha / 255`,
/// each output channel is `overlay * t + base * (1 - t)`. A factor of 0
/// leaves the base pixel untouched. All three images must share dimensions.
pub fn composite(overlay: &RgbaImage, base: &RgbaImage, alpha: &GrayImage) -> RgbaImage {
    debug_assert_eq!(base.dimensions(), overlay.dimensions());
    debug_assert_eq!(base.dimensions(), alpha.dimensions());
    RgbaImage::from_fn(base.width(), base.height(), |x, y| {
        let t = f32::from(alpha.get_pixel(x, y)[0]) / 255.0;
        let over = overlay.get_pixel(x, y);
        let under = base.get_pixel(x, y);
        let mut blended = [0u8; 4];
        for c in 0..4 {
            let mixed = f32::from(over[c]) * t + f32::from(under[c]) * (1.0 - t);
            blended[c] = mixed.round() as u8;
        }
        Rgba(blended)
    })
}

/// Paints the nodule overlay for one slice onto a rendered base image
///
/// When the mask does not line up with the base (different plane size, or a
/// slice the mask does not cover) the overlay is skipped with a warning and
/// the base comes back unchanged. The overlay is decoration; it never takes
/// the scan down with it.
pub fn overlay_nodules(base: &RgbaImage, mask: &Array3<bool>, z: usize) -> RgbaImage {
    let (rows, cols, depth) = mask.dim();
    if z >= depth || (cols as u32, rows as u32) != base.dimensions() {
        warn!(
            "Mask shape {:?} does not cover slice {} of a {}x{} image, overlay skipped",
            mask.dim(),
            z,
            base.width(),
            base.height()
        );
        return base.clone();
    }
    let alpha = mask_alpha_plane(mask, z);
    let overlay = overlay_layer(base.width(), base.height());
    composite(&overlay, base, &alpha)
}
