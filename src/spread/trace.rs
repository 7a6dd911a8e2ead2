//! Journal of the steps one public call performed

use log::trace;

use super::prefetch::PrefetchScope;
use super::redraw::UpdateMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    StopFlipAnimations,
    DrawLeafs,
    CalculateSpreadSize,
    PruneUnusedImgs,
    Prefetch(PrefetchScope),
    /// One page offered to the prefetcher during a pass
    PrefetchImg(usize),
    BindGestures,
    CenterView,
    PreparePopUp,
    UpdateBrClasses,
    ResizeContainer,
    ResizeSpread,
}

/// Steps of the most recent top-level call, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cycle {
    mode: Option<UpdateMode>,
    steps: Vec<Step>,
}

impl Cycle {
    pub fn mode(&self) -> Option<UpdateMode> {
        self.mode
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn count(&self, step: Step) -> usize {
        self.steps.iter().filter(|s| **s == step).count()
    }

    /// Prefetch passes regardless of scope
    pub fn prefetch_passes(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Prefetch(_)))
            .count()
    }

    /// Pages offered to the prefetcher, in order
    pub fn prefetch_img_calls(&self) -> Vec<usize> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                Step::PrefetchImg(index) => Some(*index),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn restart(&mut self) {
        self.mode = None;
        self.steps.clear();
    }

    pub(crate) fn set_mode(&mut self, mode: UpdateMode) {
        self.mode = Some(mode);
    }

    pub(crate) fn record(&mut self, step: Step) {
        trace!("step {step:?}");
        self.steps.push(step);
    }
}
