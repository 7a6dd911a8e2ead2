//! Interfaces of the collaborators the two-page view drives
//!
//! The controller never touches a concrete UI. Each concern is its own small
//! trait; anything implementing all of them is a [`ViewerHost`].

use std::ops::RangeInclusive;

use super::style::{BoxStyle, SpreadElement};
use super::types::{ContainerSize, DisplayedIndices, ViewCenter};

/// Applies box descriptors to on-screen elements
pub trait StyleSink {
    fn apply_style(&mut self, element: SpreadElement, style: &BoxStyle);
}

/// Owns the scrollable container the spread lives in
pub trait ContainerHost {
    /// Current client size, without changing anything
    fn container_size(&self) -> ContainerSize;

    /// Re-lay out the container for the current chrome and return its new
    /// client size
    fn resize_container(&mut self) -> ContainerSize;

    /// Centre of the visible area as fractions of the spread's size
    fn view_center(&self) -> ViewCenter;

    fn scroll_to(&mut self, left: i64, top: i64);
}

/// A leaf element to (re)build; `index` is `None` for an absent side
#[derive(Debug, Clone, PartialEq)]
pub struct LeafElement {
    pub index: Option<usize>,
    pub uri: Option<String>,
    pub loaded: bool,
}

/// Creates, repaints and removes page image elements
pub trait LeafSurface {
    fn build_leaves(&mut self, left: &LeafElement, right: &LeafElement);

    /// A load finished for a page that may be on screen
    fn repaint_leaf(&mut self, _index: usize) {}

    /// Remove elements for indices outside `keep` (displayed leaves are
    /// always kept)
    fn prune_unused_imgs(&mut self, displayed: DisplayedIndices, keep: RangeInclusive<isize>);
}

pub trait InteractionBinder {
    fn bind_gestures(&mut self);
}

pub trait PopUpSurface {
    fn prepare_pop_up(&mut self, displayed: DisplayedIndices);
}

pub trait FlipAnimator {
    fn stop_flip_animations(&mut self);
}

/// Container-level state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeClasses {
    pub two_page: bool,
    pub zoomed: bool,
    pub at_start: bool,
    pub at_end: bool,
}

impl ModeClasses {
    pub fn class_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.two_page {
            names.push("BRmode2up");
        }
        if self.zoomed {
            names.push("BRzoomed");
        }
        if self.at_start {
            names.push("BRatStart");
        }
        if self.at_end {
            names.push("BRatEnd");
        }
        names
    }
}

pub trait StateClassSink {
    fn update_br_classes(&mut self, classes: ModeClasses);
}

pub trait ViewerHost:
    StyleSink
    + ContainerHost
    + LeafSurface
    + InteractionBinder
    + PopUpSurface
    + FlipAnimator
    + StateClassSink
{
}

impl<T> ViewerHost for T where
    T: StyleSink
        + ContainerHost
        + LeafSurface
        + InteractionBinder
        + PopUpSurface
        + FlipAnimator
        + StateClassSink
{
}
