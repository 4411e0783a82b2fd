use std::fmt;

/// CT intensity window combining level and width
///
/// A window selects the Hounsfield sub-range
/// `[level - width/2, level + width/2]` that gets stretched onto the full
/// display range, emphasizing a tissue density band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    pub level: i32,
    pub width: i32,
}

impl Window {
    /// Creates a new Window
    pub fn new(level: i32, width: i32) -> Self {
        Self { level, width }
    }

    /// Returns the clip bounds `(lo, hi)` with `lo <= hi`
    ///
    /// Bounds are computed in f32 so odd widths keep their half-unit. A
    /// negative width is treated like its magnitude rather than producing
    /// an inverted range.
    pub fn bounds(&self) -> (f32, f32) {
        let half = self.width as f32 / 2.0;
        let lo = self.level as f32 - half;
        let hi = self.level as f32 + half;
        if lo <= hi {
            (lo, hi)
        } else {
            (hi, lo)
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        DEFAULT_WINDOW
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{} / W{}", self.level, self.width)
    }
}

/// Default lung window (level -600 HU, width 1500 HU)
pub const DEFAULT_WINDOW: Window = Window {
    level: -600,
    width: 1500,
};
