//! Spread geometry
//!
//! Pure functions from (book, spread slots, container, zoom) to pixel boxes.
//! Nothing here touches viewer state; the controller stores the results.

use serde::Serialize;

use super::types::{ContainerSize, SpreadSlots};
use super::zoom::Autofit;
use crate::book::{Book, PageProgression, PageSide};

/// Aspect ratio (height / width) of a typical scanned book page
const CANONICAL_PAGE_RATIO: f64 = 1.5;
const WIDTH_FUDGE: i64 = 10;
const HEIGHT_FUDGE: i64 = 15;
/// Smallest reduce factor ever applied
pub const MIN_REDUCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub cover_internal_padding: i64,
    pub cover_external_padding: i64,
    pub spine_width: i64,
    /// Leaf-edge pixels contributed by every page in the book
    pub leaf_edge_per_page: f64,
    /// Upper bound of the combined leaf edges as a fraction of container width
    pub max_leaf_edge_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cover_internal_padding: 0,
            cover_external_padding: 0,
            spine_width: 64,
            leaf_edge_per_page: 0.1,
            max_leaf_edge_ratio: 0.1,
        }
    }
}

/// Page size shared by both leaves plus the reduce factor that produces it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpreadSize {
    pub width: i64,
    pub height: i64,
    pub total_leaf_edge_width: i64,
    pub reduce: f64,
}

/// Every measurement needed to place the elements of a spread
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SpreadGeometry {
    pub height: i64,
    pub width: i64,
    pub scaled_wl: i64,
    pub scaled_wr: i64,
    pub edge_width: i64,
    pub leaf_edge_width_l: i64,
    pub leaf_edge_width_r: i64,
    pub cover_width: i64,
    pub cover_height: i64,
    pub cover_left: i64,
    pub cover_top: i64,
    pub total_width: i64,
    pub total_height: i64,
    pub middle: i64,
    pub gutter: i64,
    pub spine_width: i64,
    pub spine_height: i64,
    pub spine_left: i64,
    pub spine_top: i64,
    pub reduce: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SpreadLayoutEngine {
    config: LayoutConfig,
}

impl SpreadLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Size that fits both pages into the container.
    ///
    /// The page whose aspect ratio is closest to a typical book page decides
    /// the shared height, so foldouts and odd scans are shown smaller rather
    /// than distorting the spread.
    pub fn ideal_spread_size(
        &self,
        book: &Book,
        slots: SpreadSlots,
        container: ContainerSize,
    ) -> SpreadSize {
        let (w1, h1) = page_dims(book, slots.left, slots.right);
        let (w2, h2) = page_dims(book, slots.right, slots.left);

        let ratio1 = h1 / w1;
        let ratio2 = h2 / w2;
        let ratio = if (ratio1 - CANONICAL_PAGE_RATIO).abs()
            < (ratio2 - CANONICAL_PAGE_RATIO).abs()
        {
            ratio1
        } else {
            ratio2
        };

        let total_leaf_edge_width = self.total_leaf_edge_width(book, container);
        let padding = 2 * (self.config.cover_internal_padding + self.config.cover_external_padding);
        let width_outside_pages = padding + total_leaf_edge_width;

        let mut width = (i64::from(container.width) - width_outside_pages).div_euclid(2);
        width = if width > WIDTH_FUDGE { width - WIDTH_FUDGE } else { 1 };
        let mut height = i64::from(container.height) - padding;
        height = if height > HEIGHT_FUDGE { height - HEIGHT_FUDGE } else { 1 };

        if height as f64 / ratio <= width as f64 {
            width = ((height as f64 / ratio).floor() as i64).max(1);
        } else {
            height = ((width as f64 * ratio).floor() as i64).max(1);
        }

        SpreadSize {
            width,
            height,
            total_leaf_edge_width,
            reduce: quantize_reduce(((h1 + h2) / 2.0) / height as f64),
        }
    }

    /// Size implied by an explicit reduce factor (autofit off)
    pub fn spread_size_from_reduce(
        &self,
        book: &Book,
        slots: SpreadSlots,
        container: ContainerSize,
        reduce: f64,
    ) -> SpreadSize {
        let reduce = reduce.max(MIN_REDUCE);
        let (w1, h1) = page_dims(book, slots.left, slots.right);
        let (w2, h2) = page_dims(book, slots.right, slots.left);

        SpreadSize {
            width: (((w1 + w2) / 2.0) / reduce).floor() as i64,
            height: (((h1 + h2) / 2.0) / reduce).floor() as i64,
            total_leaf_edge_width: self.total_leaf_edge_width(book, container),
            reduce,
        }
    }

    /// Combined thickness of both leaf edges, bounded by the container width
    pub fn total_leaf_edge_width(&self, book: &Book, container: ContainerSize) -> i64 {
        let by_pages = (book.num_leafs() as f64 * self.config.leaf_edge_per_page).floor();
        let bound = (f64::from(container.width) * self.config.max_leaf_edge_ratio).floor();
        by_pages.min(bound).max(0.0) as i64
    }

    pub fn calculate(
        &self,
        book: &Book,
        slots: SpreadSlots,
        container: ContainerSize,
        autofit: Option<Autofit>,
        reduce: f64,
    ) -> SpreadGeometry {
        let size = match autofit {
            Some(_) => self.ideal_spread_size(book, slots, container),
            None => self.spread_size_from_reduce(book, slots, container, reduce),
        };
        let internal = self.config.cover_internal_padding;
        let external = self.config.cover_external_padding;

        let height = size.height;
        let scaled_wl = scaled_page_width(book, slots.left, slots.right, height);
        let scaled_wr = scaled_page_width(book, slots.right, slots.left, height);

        let edge_width = size.total_leaf_edge_width;
        let leaf_edge_width_l = leaf_edge_width(book, slots.left, edge_width);
        let leaf_edge_width_r = edge_width - leaf_edge_width_l;

        let left_gutter_offset = gutter_offset(book, slots.left, edge_width);
        let left_from_center = scaled_wl - left_gutter_offset + leaf_edge_width_l;
        let right_from_center = scaled_wr + left_gutter_offset + leaf_edge_width_r;
        let largest_from_center = left_from_center.max(right_from_center);

        let total_width = 2 * (largest_from_center + internal + external);
        let total_height = height + 2 * (internal + external);
        let middle = total_width.div_euclid(2);
        let gutter = middle + left_gutter_offset;
        let cover_top = external;

        SpreadGeometry {
            height,
            width: size.width,
            scaled_wl,
            scaled_wr,
            edge_width,
            leaf_edge_width_l,
            leaf_edge_width_r,
            cover_width: scaled_wl + scaled_wr + edge_width + 2 * internal,
            cover_height: height + 2 * internal,
            cover_left: gutter - scaled_wl - leaf_edge_width_l - internal,
            cover_top,
            total_width,
            total_height,
            middle,
            gutter,
            spine_width: self.config.spine_width,
            spine_height: height + 2 * internal,
            spine_left: middle - self.config.spine_width.div_euclid(2),
            spine_top: cover_top,
            reduce: size.reduce,
        }
    }
}

/// Native size of the page at `pos`, standing in the opposite side's page
/// when `pos` is absent so the spread stays balanced
fn page_dims(book: &Book, pos: isize, opposite: isize) -> (f64, f64) {
    let page = book
        .page(pos)
        .or_else(|| book.page(opposite))
        .or_else(|| book.pages().first());
    match page {
        Some(p) => (f64::from(p.width), f64::from(p.height)),
        None => (1.0, 1.0),
    }
}

fn scaled_page_width(book: &Book, pos: isize, opposite: isize, height: i64) -> i64 {
    let (w, h) = page_dims(book, pos, opposite);
    (height as f64 * w / h).floor() as i64
}

/// Offset of the gutter from the middle of the spread: pages meet left of
/// centre early in the book and right of it late in the book
pub fn gutter_offset(book: &Book, pos: isize, edge_width: i64) -> i64 {
    let fraction = pos as f64 / book.num_leafs() as f64;
    let offset = ((fraction - 0.5) * edge_width as f64).floor() as i64;
    match book.progression() {
        PageProgression::Rl => -offset,
        PageProgression::Lr => offset,
    }
}

/// Thickness of the stack of leaves behind the page at `pos`
pub fn leaf_edge_width(book: &Book, pos: isize, edge_width: i64) -> i64 {
    let fraction = pos as f64 / book.num_leafs() as f64;
    let stacked = if book.page_side(pos) == PageSide::Left
        && book.progression() != PageProgression::Rl
    {
        fraction
    } else {
        1.0 - fraction
    };
    ((stacked * edge_width as f64 + 0.5).floor() as i64).clamp(0, edge_width)
}

fn quantize_reduce(reduce: f64) -> f64 {
    if !reduce.is_finite() {
        return 1.0;
    }
    ((reduce * 100.0).round() / 100.0).max(MIN_REDUCE)
}
