use crate::types::{Window, DEFAULT_WINDOW};

/// Interactive controls of the viewer
///
/// The slice number is 1-based to match the on-screen slider; rendering
/// converts with [`ViewerState::slice_index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerState {
    /// Currently selected patient
    pub patient_id: String,
    /// 1-based slice number shown in the slider
    pub slice: usize,
    /// Intensity window for the slice renderer
    pub window: Window,
    /// Whether the green nodule overlay is composited in
    pub show_overlay: bool,
}

impl ViewerState {
    /// Creates the startup state for a patient
    ///
    /// The overlay starts enabled and the window at the lung default. The
    /// slice starts at 1 until the volume depth is known.
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            slice: 1,
            window: DEFAULT_WINDOW,
            show_overlay: true,
        }
    }

    /// Default 1-based slice for a freshly selected volume
    pub fn mid_slice(depth: usize) -> usize {
        (depth / 2).max(1)
    }

    /// Moves the slider to the middle of a newly loaded volume
    pub fn reset_for_depth(&mut self, depth: usize) {
        self.slice = Self::mid_slice(depth);
    }

    /// Keeps the slider inside `1..=depth`
    pub fn clamp_slice(&mut self, depth: usize) {
        self.slice = self.slice.clamp(1, depth.max(1));
    }

    /// 0-based slice index for array access
    pub fn slice_index(&self) -> usize {
        self.slice.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = ViewerState::new("P1");
        assert_eq!(state.patient_id, "P1");
        assert_eq!(state.slice, 1);
        assert_eq!(state.window, DEFAULT_WINDOW);
        assert!(state.show_overlay);
    }

    #[test]
    fn test_mid_slice_is_half_depth() {
        assert_eq!(ViewerState::mid_slice(100), 50);
        assert_eq!(ViewerState::mid_slice(101), 50);
        assert_eq!(ViewerState::mid_slice(64), 32);
    }

    #[test]
    fn test_mid_slice_never_below_one() {
        assert_eq!(ViewerState::mid_slice(1), 1);
        assert_eq!(ViewerState::mid_slice(0), 1);
    }

    #[test]
    fn test_reset_for_depth_recenters() {
        let mut state = ViewerState::new("P1");
        state.slice = 93;
        state.reset_for_depth(100);
        assert_eq!(state.slice, 50);
    }

    #[test]
    fn test_clamp_slice() {
        let mut state = ViewerState::new("P1");
        state.slice = 120;
        state.clamp_slice(100);
        assert_eq!(state.slice, 100);

        state.slice = 0;
        state.clamp_slice(100);
        assert_eq!(state.slice, 1);
    }

    #[test]
    fn test_slice_index_is_zero_based() {
        let mut state = ViewerState::new("P1");
        state.slice = 50;
        assert_eq!(state.slice_index(), 49);

        state.slice = 1;
        assert_eq!(state.slice_index(), 0);
    }
}
