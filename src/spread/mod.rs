//! Two-page spread view: layout, redraw policy, prefetching and the
//! controller tying them to a host

mod controller;
mod headless;
mod host;
mod layout;
mod loader;
mod prefetch;
mod redraw;
mod state;
mod style;
mod trace;
mod types;
mod zoom;

pub use controller::{TwoPageConfig, TwoPageView};
pub use headless::HeadlessHost;
pub use host::{
    ContainerHost, FlipAnimator, InteractionBinder, LeafElement, LeafSurface, ModeClasses,
    PopUpSurface, StateClassSink, StyleSink, ViewerHost,
};
pub use layout::{
    LayoutConfig, MIN_REDUCE, SpreadGeometry, SpreadLayoutEngine, SpreadSize, gutter_offset,
    leaf_edge_width,
};
pub use loader::{FileResolver, Resolver, ThreadedLoader};
pub use prefetch::{
    ImageLoader, ImageRequest, LoadError, LoadEvent, LoadTicket, PrefetchPass, PrefetchScheduler,
    PrefetchScope, PrefetchWindow, RequestKind,
};
pub use redraw::{UpdateMode, select_mode, should_redraw_spread};
pub use state::ViewerState;
pub use style::{BoxStyle, SpreadElement, SpreadStyles, StyleValue};
pub use trace::{Cycle, Step};
pub use types::{ABSENT, ContainerSize, DisplayedIndices, SpreadSlots, ViewCenter};
pub use zoom::{Autofit, ReductionFactor, Zoom, ZoomDirection, next_reduce, reduction_factors};
