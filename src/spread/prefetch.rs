//! Predictive image loading around the current spread
//!
//! Requests are fire-and-forget. A page is marked prefetched the moment its
//! request is issued, so a later pass never issues it again no matter when
//! (or whether) the load completes. Completions travel back over a channel
//! and are applied by the controller between update cycles.

use std::collections::BTreeMap;

use flume::{Receiver, Sender};
use log::{debug, trace};

use super::types::SpreadSlots;
use crate::book::Book;

/// Why the image is wanted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A leaf of the spread being drawn (high priority)
    Display,
    /// A neighbour that may be shown soon (low priority)
    Prefetch,
}

/// One page image at one logical resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub index: usize,
    /// Source locator, passed through unchanged
    pub uri: String,
    pub reduce: f64,
    pub kind: RequestKind,
}

impl ImageRequest {
    /// Power-of-two downscale bucket servers use to pick a rendition
    pub fn scale(&self) -> u32 {
        let reduce = self.reduce.max(1.0);
        2u32.pow(reduce.log2().floor() as u32)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("cannot decode {uri}: {detail}")]
    Undecodable { uri: String, detail: String },

    #[error("loader stopped before the request finished")]
    Disconnected,
}

/// Result of a finished load for one page
#[derive(Debug, Clone, PartialEq)]
pub struct LoadEvent {
    pub index: usize,
    pub outcome: Result<(), LoadError>,
}

/// Handle a loader uses to report a finished request.
///
/// Dropping it without completing simply means the completion never arrives.
#[derive(Debug)]
pub struct LoadTicket {
    index: usize,
    tx: Sender<LoadEvent>,
}

impl LoadTicket {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn complete(self, outcome: Result<(), LoadError>) {
        // Receiver gone means the viewer was torn down; nothing to notify.
        let _ = self.tx.send(LoadEvent {
            index: self.index,
            outcome,
        });
    }
}

/// Asynchronous image source
pub trait ImageLoader {
    /// Start loading; must not block on the load itself
    fn load(&mut self, request: ImageRequest, ticket: LoadTicket);
}

/// Part of the neighbourhood a prefetch pass walks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefetchScope {
    /// The lower visible position and the pages before it
    Backward,
    /// The higher visible position and the pages after it
    Forward,
    Both,
}

/// Indices requests were issued for, with the finest reduce requested.
/// Entries are never removed.
#[derive(Debug, Clone, Default)]
pub struct PrefetchWindow {
    issued: BTreeMap<usize, f64>,
}

impl PrefetchWindow {
    pub fn contains(&self, index: usize) -> bool {
        self.issued.contains_key(&index)
    }

    pub fn requested_reduce(&self, index: usize) -> Option<f64> {
        self.issued.get(&index).copied()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.issued.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    fn record(&mut self, index: usize, reduce: f64) {
        let entry = self.issued.entry(index).or_insert(reduce);
        if reduce < *entry {
            *entry = reduce;
        }
    }
}

/// What one prefetch pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchPass {
    /// Indices offered to `prefetch_img`, in walk order
    pub attempted: Vec<usize>,
    /// Requests actually issued
    pub issued: usize,
}

impl PrefetchPass {
    fn extend(&mut self, other: PrefetchPass) {
        self.attempted.extend(other.attempted);
        self.issued += other.issued;
    }
}

pub struct PrefetchScheduler {
    radius: usize,
    window: PrefetchWindow,
    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
}

impl PrefetchScheduler {
    /// `radius` is the number of viewable pages fetched on each side of the
    /// spread; non-viewable pages are stepped over without counting.
    pub fn new(radius: usize) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            radius: radius.max(1),
            window: PrefetchWindow::default(),
            tx,
            rx,
        }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn window(&self) -> &PrefetchWindow {
        &self.window
    }

    /// Issue a low-priority load for one page.
    ///
    /// Returns `false` without issuing when the index is out of range,
    /// non-viewable, already prefetched or already loaded.
    pub fn prefetch_img(
        &mut self,
        book: &mut Book,
        index: usize,
        reduce: f64,
        loader: &mut dyn ImageLoader,
    ) -> bool {
        let Some(page) = book.viewable_page(index as isize) else {
            return false;
        };
        if page.is_prefetched() || page.is_loaded() || self.window.contains(index) {
            return false;
        }
        let uri = page.uri.clone();
        self.issue(book, index, uri, reduce, RequestKind::Prefetch, loader);
        true
    }

    /// Request a displayed leaf at `reduce`.
    ///
    /// Issues unless the page was already requested at the same or a finer
    /// resolution.
    pub fn request_display(
        &mut self,
        book: &mut Book,
        index: usize,
        reduce: f64,
        loader: &mut dyn ImageLoader,
    ) -> bool {
        let Some(page) = book.viewable_page(index as isize) else {
            return false;
        };
        if matches!(self.window.requested_reduce(index), Some(prev) if prev <= reduce) {
            return false;
        }
        let uri = page.uri.clone();
        self.issue(book, index, uri, reduce, RequestKind::Display, loader);
        true
    }

    /// Walk outward from the spread and issue loads for the nearest viewable
    /// pages.
    pub fn prefetch(
        &mut self,
        book: &mut Book,
        slots: SpreadSlots,
        scope: PrefetchScope,
        reduce: f64,
        loader: &mut dyn ImageLoader,
    ) -> PrefetchPass {
        let pass = match scope {
            PrefetchScope::Backward => self.walk(book, backward_positions(slots), reduce, loader),
            PrefetchScope::Forward => {
                let positions = forward_positions(slots, book.num_leafs());
                self.walk(book, positions, reduce, loader)
            }
            PrefetchScope::Both => {
                let mut pass = self.walk(book, backward_positions(slots), reduce, loader);
                let positions = forward_positions(slots, book.num_leafs());
                pass.extend(self.walk(book, positions, reduce, loader));
                pass
            }
        };
        debug!(
            "prefetch {:?} around [{}, {}]: tried {:?}, issued {}, window {}",
            scope,
            slots.left,
            slots.right,
            pass.attempted,
            pass.issued,
            self.window.len()
        );
        pass
    }

    /// Finished loads since the last call, in arrival order
    pub fn drain_completions(&self) -> Vec<LoadEvent> {
        self.rx.try_iter().collect()
    }

    /// The visible position comes first and does not count toward the
    /// radius; then up to `radius` viewable neighbours.
    fn walk(
        &mut self,
        book: &mut Book,
        (visible, neighbours): (isize, Vec<isize>),
        reduce: f64,
        loader: &mut dyn ImageLoader,
    ) -> PrefetchPass {
        let mut pass = PrefetchPass::default();
        if let Ok(index) = usize::try_from(visible) {
            pass.attempted.push(index);
            if self.prefetch_img(book, index, reduce, loader) {
                pass.issued += 1;
            }
        }

        let mut counted = 0;
        for pos in neighbours {
            if counted >= self.radius {
                break;
            }
            let Some(index) = book.viewable_page(pos).map(|p| p.index) else {
                trace!("prefetch skips position {pos}");
                continue;
            };
            counted += 1;
            pass.attempted.push(index);
            if self.prefetch_img(book, index, reduce, loader) {
                pass.issued += 1;
            }
        }
        pass
    }

    fn issue(
        &mut self,
        book: &mut Book,
        index: usize,
        uri: String,
        reduce: f64,
        kind: RequestKind,
        loader: &mut dyn ImageLoader,
    ) {
        book.mark_prefetched(index);
        self.window.record(index, reduce);
        trace!("request {kind:?} page {index} at reduce {reduce}");
        let ticket = LoadTicket {
            index,
            tx: self.tx.clone(),
        };
        loader.load(
            ImageRequest {
                index,
                uri,
                reduce,
                kind,
            },
            ticket,
        );
    }
}

fn backward_positions(slots: SpreadSlots) -> (isize, Vec<isize>) {
    let low = slots.low();
    (low, (0..low).rev().collect())
}

fn forward_positions(slots: SpreadSlots, num_leafs: usize) -> (isize, Vec<isize>) {
    let high = slots.high();
    let start = (high + 1).max(0);
    (high, (start..num_leafs as isize).collect())
}
