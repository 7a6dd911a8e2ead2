//! REDRAW vs RESIZE decision

use std::fmt;

/// What an update cycle does with the spread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Re-select pages, rebuild elements and request images at the new reduce
    Redraw,
    /// Recompute geometry only; the current rasters are rescaled
    Resize,
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateMode::Redraw => f.write_str("redraw"),
            UpdateMode::Resize => f.write_str("resize"),
        }
    }
}

/// True when the applied raster is coarser than the new geometry needs.
///
/// Equal factors keep the cheap resize path.
pub fn should_redraw_spread(applied_reduce: f64, ideal_reduce: f64) -> bool {
    applied_reduce > ideal_reduce
}

pub fn select_mode(force_redraw: bool, applied_reduce: f64, ideal_reduce: f64) -> UpdateMode {
    if force_redraw || should_redraw_spread(applied_reduce, ideal_reduce) {
        UpdateMode::Redraw
    } else {
        UpdateMode::Resize
    }
}
