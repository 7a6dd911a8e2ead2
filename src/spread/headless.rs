//! Host without a screen: keeps the last style of every element and the
//! scroll position so a spread can be inspected or printed

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use log::trace;
use serde::Serialize;

use super::host::{
    ContainerHost, FlipAnimator, InteractionBinder, LeafElement, LeafSurface, ModeClasses,
    PopUpSurface, StateClassSink, StyleSink,
};
use super::style::{BoxStyle, SpreadElement};
use super::types::{ContainerSize, DisplayedIndices, ViewCenter};

#[derive(Debug, Clone, Default, Serialize)]
pub struct HeadlessHost {
    container: ContainerSize,
    styles: BTreeMap<&'static str, BoxStyle>,
    scroll: (i64, i64),
    leaves: Vec<Option<String>>,
    classes: Vec<&'static str>,
}

impl HeadlessHost {
    pub fn new(container: ContainerSize) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    /// Change the size reported on the next measurement
    pub fn set_container(&mut self, container: ContainerSize) {
        self.container = container;
    }

    pub fn style(&self, element: SpreadElement) -> Option<&BoxStyle> {
        self.styles.get(element.as_str())
    }

    pub fn styles(&self) -> impl Iterator<Item = (&'static str, &BoxStyle)> {
        self.styles.iter().map(|(name, style)| (*name, style))
    }

    pub fn scroll(&self) -> (i64, i64) {
        self.scroll
    }

    /// URIs of the leaves built last, left first
    pub fn leaves(&self) -> &[Option<String>] {
        &self.leaves
    }

    pub fn classes(&self) -> &[&'static str] {
        &self.classes
    }
}

impl StyleSink for HeadlessHost {
    fn apply_style(&mut self, element: SpreadElement, style: &BoxStyle) {
        self.styles.insert(element.as_str(), style.clone());
    }
}

impl ContainerHost for HeadlessHost {
    fn container_size(&self) -> ContainerSize {
        self.container
    }

    fn resize_container(&mut self) -> ContainerSize {
        self.container
    }

    fn view_center(&self) -> ViewCenter {
        ViewCenter::default()
    }

    fn scroll_to(&mut self, left: i64, top: i64) {
        self.scroll = (left, top);
    }
}

impl LeafSurface for HeadlessHost {
    fn build_leaves(&mut self, left: &LeafElement, right: &LeafElement) {
        self.leaves = vec![left.uri.clone(), right.uri.clone()];
    }

    fn prune_unused_imgs(&mut self, displayed: DisplayedIndices, keep: RangeInclusive<isize>) {
        trace!("prune around {:?}, keeping {keep:?}", displayed.as_array());
    }
}

impl InteractionBinder for HeadlessHost {
    fn bind_gestures(&mut self) {}
}

impl PopUpSurface for HeadlessHost {
    fn prepare_pop_up(&mut self, _displayed: DisplayedIndices) {}
}

impl FlipAnimator for HeadlessHost {
    fn stop_flip_animations(&mut self) {}
}

impl StateClassSink for HeadlessHost {
    fn update_br_classes(&mut self, classes: ModeClasses) {
        self.classes = classes.class_names();
    }
}
