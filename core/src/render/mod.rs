//! Slice rendering and overlay compositing
//!
//! Turns in-memory volumes into displayable RGBA images: windowed
//! grayscale slices plus an optional translucent green nodule overlay.

mod overlay;
mod slice;

pub use overlay::{
    composite, mask_alpha_plane, overlay_layer, overlay_nodules, MASK_ALPHA, OVERLAY_COLOR,
};
pub use slice::render_slice;
