//! Two-page view controller
//!
//! Every public entry point runs one synchronous update cycle: it stops any
//! page-flip animation, decides between REDRAW and RESIZE, and drives layout,
//! prefetching and the host collaborators. The steps taken are journaled in
//! [`Cycle`] so callers can inspect what the last call did.

use log::{debug, info, warn};

use super::host::{LeafElement, ModeClasses, ViewerHost};
use super::layout::{LayoutConfig, SpreadGeometry, SpreadLayoutEngine, SpreadSize};
use super::prefetch::{ImageLoader, PrefetchPass, PrefetchScheduler, PrefetchScope, PrefetchWindow};
use super::redraw::{self, UpdateMode};
use super::state::ViewerState;
use super::style::{SpreadElement, SpreadStyles};
use super::trace::{Cycle, Step};
use super::types::{DisplayedIndices, SpreadSlots, ViewCenter};
use super::zoom::{self, ZoomDirection};
use crate::book::Book;
use crate::error::{Result, ViewerError};

#[derive(Debug, Clone, PartialEq)]
pub struct TwoPageConfig {
    pub layout: LayoutConfig,
    /// Viewable pages prefetched on each side of the spread
    pub prefetch_radius: usize,
    /// Image elements further than this from the spread are pruned
    pub prune_margin: isize,
    pub reduction_factors: Vec<f64>,
}

impl Default for TwoPageConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            prefetch_radius: 2,
            prune_margin: 4,
            reduction_factors: vec![0.5, 1.0, 2.0, 3.0, 4.0, 6.0],
        }
    }
}

pub struct TwoPageView<H, L> {
    book: Book,
    state: ViewerState,
    engine: SpreadLayoutEngine,
    scheduler: PrefetchScheduler,
    reduction_factors: Vec<f64>,
    prune_margin: isize,
    styles: Option<SpreadStyles>,
    cycle: Cycle,
    host: H,
    loader: L,
}

impl<H: ViewerHost, L: ImageLoader> TwoPageView<H, L> {
    pub fn new(book: Book, config: TwoPageConfig, host: H, loader: L) -> Self {
        Self {
            book,
            state: ViewerState::default(),
            engine: SpreadLayoutEngine::new(config.layout),
            scheduler: PrefetchScheduler::new(config.prefetch_radius),
            reduction_factors: config.reduction_factors,
            prune_margin: config.prune_margin.max(0),
            styles: None,
            cycle: Cycle::default(),
            host,
            loader,
        }
    }

    /// Measure the container and draw the first spread.
    ///
    /// A container without a usable size is a setup error.
    pub fn init(&mut self) -> Result<()> {
        let size = self.host.resize_container();
        if !size.is_usable() {
            return Err(ViewerError::MissingContainer {
                width: size.width,
                height: size.height,
            });
        }
        self.state.container = size;
        self.state.current_index = self.book.first_displayable_index().max(0);
        info!(
            "Two-page view: {} pages, container {}x{}",
            self.book.num_leafs(),
            size.width,
            size.height
        );
        self.prepare_two_page_view(None, None, true);
        Ok(())
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn displayed_indices(&self) -> DisplayedIndices {
        self.state.displayed
    }

    /// Overwrite the displayed pair without validation. The next
    /// [`draw_leafs`](Self::draw_leafs) replaces it.
    pub fn force_displayed_indices(&mut self, raw: [isize; 2]) {
        self.state.displayed = DisplayedIndices::from_raw(raw);
    }

    pub fn geometry(&self) -> &SpreadGeometry {
        &self.state.geometry
    }

    /// Descriptors from the last geometry computation
    pub fn styles(&self) -> Option<&SpreadStyles> {
        self.styles.as_ref()
    }

    pub fn prefetch_window(&self) -> &PrefetchWindow {
        self.scheduler.window()
    }

    pub fn last_cycle(&self) -> &Cycle {
        &self.cycle
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    /// Run one update cycle.
    ///
    /// `left_index`/`right_index` move the position the next page selection
    /// starts from; they take effect on the REDRAW path only.
    pub fn prepare_two_page_view(
        &mut self,
        left_index: Option<isize>,
        right_index: Option<isize>,
        force_redraw: bool,
    ) -> UpdateMode {
        self.cycle.restart();
        self.stop_flip_animations();

        let ideal = self.get_ideal_spread_size();
        let applied = self.state.applied_reduce();
        let mode = redraw::select_mode(force_redraw, applied, ideal.reduce);
        debug!(
            "prepare two-page view: {mode} (applied reduce {applied}, ideal {}, forced {force_redraw})",
            ideal.reduce
        );
        self.cycle.set_mode(mode);

        match mode {
            UpdateMode::Redraw => {
                if let Some(anchor) = left_index.or(right_index) {
                    self.state.current_index = anchor;
                }
                self.draw_leafs_inner(None)
            }
            UpdateMode::Resize => self.resize_spread_inner(),
        }
        mode
    }

    /// Whether the applied raster is too coarse for the current container
    pub fn should_redraw_spread(&self) -> bool {
        redraw::should_redraw_spread(
            self.state.applied_reduce(),
            self.get_ideal_spread_size().reduce,
        )
    }

    /// Geometry the current spread would get at autofit, without applying it
    pub fn get_ideal_spread_size(&self) -> SpreadSize {
        self.engine
            .ideal_spread_size(&self.book, self.state.slots, self.state.container)
    }

    /// Step the zoom level and redraw.
    ///
    /// Zoom always takes the REDRAW path so the leaves are refetched at the
    /// new resolution; the view centre is preserved.
    pub fn zoom(&mut self, direction: ZoomDirection) -> UpdateMode {
        self.cycle.restart();
        self.stop_flip_animations();

        let ideal = self.get_ideal_spread_size();
        let factors = zoom::reduction_factors(&self.reduction_factors, ideal.reduce);
        let next = zoom::next_reduce(self.state.zoom.reduce, direction, &factors);
        let center = self.host.view_center();
        debug!(
            "zoom {direction:?}: reduce {} -> {} (autofit {:?})",
            self.state.zoom.reduce, next.reduce, next.autofit
        );
        self.state.zoom.apply(next);

        self.cycle.set_mode(UpdateMode::Redraw);
        self.draw_leafs_inner(Some(center));
        UpdateMode::Redraw
    }

    /// Navigate to a page; out-of-range indices are clamped
    pub fn jump_to_index(&mut self, index: isize) -> UpdateMode {
        self.cycle.restart();
        self.stop_flip_animations();
        self.state.current_index = self.book.clamp_index(index);
        self.cycle.set_mode(UpdateMode::Redraw);
        self.draw_leafs_inner(None);
        UpdateMode::Redraw
    }

    pub fn next_spread(&mut self) -> UpdateMode {
        self.jump_to_index(self.state.slots.high() + 1)
    }

    pub fn prev_spread(&mut self) -> UpdateMode {
        self.jump_to_index(self.state.slots.low() - 1)
    }

    /// React to a container size change reported by the host
    pub fn handle_resize(&mut self) -> UpdateMode {
        let size = self.host.container_size();
        if size.is_usable() {
            self.state.container = size;
        } else {
            warn!(
                "Ignoring unusable container size {}x{}",
                size.width, size.height
            );
        }
        self.prepare_two_page_view(None, None, false)
    }

    /// Select pages for the current position and rebuild the spread
    pub fn draw_leafs(&mut self) {
        self.cycle.restart();
        self.draw_leafs_inner(None);
    }

    /// Recompute geometry for the current pages and re-centre, keeping the
    /// page set and its images
    pub fn resize_spread(&mut self) {
        self.cycle.restart();
        self.resize_spread_inner();
    }

    /// Compute and apply the spread geometry, storing the applied reduce
    pub fn calculate_spread_size(&mut self) {
        self.cycle.restart();
        self.calculate_spread_size_inner();
    }

    /// One prefetch pass in both directions
    pub fn prefetch(&mut self) -> PrefetchPass {
        self.cycle.restart();
        self.prefetch_pass(PrefetchScope::Both)
    }

    pub fn prefetch_img(&mut self, index: usize) -> bool {
        self.scheduler.prefetch_img(
            &mut self.book,
            index,
            self.state.zoom.reduce,
            &mut self.loader,
        )
    }

    /// Apply finished image loads. Layout and page selection are untouched.
    pub fn drain_completions(&mut self) -> usize {
        let events = self.scheduler.drain_completions();
        let count = events.len();
        for event in events {
            match event.outcome {
                Ok(()) => {
                    self.book.mark_loaded(event.index);
                    if self.state.displayed.contains(event.index) {
                        self.host.repaint_leaf(event.index);
                    }
                }
                Err(e) => warn!("Image for page {} failed to load: {e}", event.index),
            }
        }
        count
    }

    fn stop_flip_animations(&mut self) {
        self.cycle.record(Step::StopFlipAnimations);
        self.host.stop_flip_animations();
    }

    fn draw_leafs_inner(&mut self, center: Option<ViewCenter>) {
        self.cycle.record(Step::DrawLeafs);

        let target = self.book.clamp_index(self.state.current_index);
        let [left, right] = self.book.spread_indices(target);
        let slots = SpreadSlots::new(left, right);
        self.state.current_index = target;
        self.state.slots = slots;
        self.state.displayed = DisplayedIndices::from_slots(slots, &self.book);
        self.state.drawn = true;
        debug!(
            "draw leafs at {target}: displayed {:?}",
            self.state.displayed.as_array()
        );

        self.calculate_spread_size_inner();

        let reduce = self.state.zoom.reduce;
        let displayed = self.state.displayed;
        for index in [displayed.left(), displayed.right()].into_iter().flatten() {
            self.scheduler
                .request_display(&mut self.book, index, reduce, &mut self.loader);
        }
        let left_leaf = self.leaf_element(displayed.left());
        let right_leaf = self.leaf_element(displayed.right());
        self.host.build_leaves(&left_leaf, &right_leaf);

        self.prefetch_pass(PrefetchScope::Backward);
        self.prefetch_pass(PrefetchScope::Forward);

        self.cycle.record(Step::PruneUnusedImgs);
        let keep = (slots.low() - self.prune_margin)..=(slots.high() + self.prune_margin);
        self.host.prune_unused_imgs(displayed, keep);

        self.cycle.record(Step::BindGestures);
        self.host.bind_gestures();

        self.center_view(center);

        self.cycle.record(Step::PreparePopUp);
        self.host.prepare_pop_up(displayed);

        self.cycle.record(Step::UpdateBrClasses);
        let classes = ModeClasses {
            two_page: true,
            zoomed: !self.state.zoom.is_autofit(),
            at_start: slots.low() <= self.book.first_displayable_index(),
            at_end: slots.high() >= self.book.last_displayable_index(),
        };
        self.host.update_br_classes(classes);
    }

    fn resize_spread_inner(&mut self) {
        self.cycle.record(Step::ResizeSpread);
        self.resize_container();
        self.calculate_spread_size_inner();
        self.center_view(None);
    }

    fn resize_container(&mut self) {
        self.cycle.record(Step::ResizeContainer);
        let size = self.host.resize_container();
        if size.is_usable() {
            self.state.container = size;
        } else {
            warn!(
                "Container reported {}x{}, keeping {}x{}",
                size.width, size.height, self.state.container.width, self.state.container.height
            );
        }
    }

    fn calculate_spread_size_inner(&mut self) {
        self.cycle.record(Step::CalculateSpreadSize);
        let geometry = self.engine.calculate(
            &self.book,
            self.state.slots,
            self.state.container,
            self.state.zoom.autofit,
            self.state.zoom.reduce,
        );
        self.state.geometry = geometry;
        self.state.zoom.reduce = geometry.reduce;

        let styles = SpreadStyles::from_geometry(&geometry, self.engine.config());
        for element in SpreadElement::ALL {
            self.host.apply_style(element, styles.for_element(element));
        }
        self.styles = Some(styles);
    }

    /// Scroll so that `center` (fractions of the spread) sits mid-container
    fn center_view(&mut self, center: Option<ViewCenter>) {
        self.cycle.record(Step::CenterView);
        let center = center.unwrap_or_default();
        let geometry = &self.state.geometry;
        let container = self.state.container;

        let into_view_x = center.x * geometry.total_width as f64 - f64::from(container.width) / 2.0;
        let into_view_y =
            center.y * geometry.total_height as f64 - f64::from(container.height) / 2.0;
        self.host
            .scroll_to(into_view_x.max(0.0).floor() as i64, into_view_y.max(0.0).floor() as i64);
    }

    fn prefetch_pass(&mut self, scope: PrefetchScope) -> PrefetchPass {
        self.cycle.record(Step::Prefetch(scope));
        let pass = self.scheduler.prefetch(
            &mut self.book,
            self.state.slots,
            scope,
            self.state.zoom.reduce,
            &mut self.loader,
        );
        for &index in &pass.attempted {
            self.cycle.record(Step::PrefetchImg(index));
        }
        pass
    }

    fn leaf_element(&self, index: Option<usize>) -> LeafElement {
        let page = index.and_then(|i| self.book.page(i as isize));
        LeafElement {
            index,
            uri: page.map(|p| p.uri.clone()),
            loaded: page.is_some_and(|p| p.is_loaded()),
        }
    }
}
