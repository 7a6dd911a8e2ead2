//! Viewer state owned by the two-page controller

use super::layout::SpreadGeometry;
use super::types::{ContainerSize, DisplayedIndices, SpreadSlots};
use super::zoom::Zoom;

/// Single source of truth for the two-page view.
///
/// Only [`TwoPageView`](super::TwoPageView) mutates it; everything else gets a
/// shared reference.
#[derive(Debug, Clone, Default)]
pub struct ViewerState {
    /// Last measured client size of the container
    pub container: ContainerSize,
    pub zoom: Zoom,
    /// Position the next page selection starts from
    pub current_index: isize,
    pub slots: SpreadSlots,
    pub displayed: DisplayedIndices,
    pub geometry: SpreadGeometry,
    /// Whether a spread has been drawn since construction
    pub drawn: bool,
}

impl ViewerState {
    pub fn applied_reduce(&self) -> f64 {
        self.zoom.reduce
    }
}
