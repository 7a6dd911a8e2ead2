//! Small value types shared by the spread modules

use serde::Serialize;

use crate::book::Book;

/// Position value meaning "no page on this side"
pub const ABSENT: isize = -1;

/// Positions selected for the current spread.
///
/// Either position may lie outside the book (`-1` before the first page, `n`
/// past the last); geometry still uses them for gutter and leaf-edge
/// placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpreadSlots {
    pub left: isize,
    pub right: isize,
}

impl SpreadSlots {
    pub fn new(left: isize, right: isize) -> Self {
        Self { left, right }
    }

    pub fn low(&self) -> isize {
        self.left.min(self.right)
    }

    pub fn high(&self) -> isize {
        self.left.max(self.right)
    }
}

impl Default for SpreadSlots {
    fn default() -> Self {
        Self::new(ABSENT, 0)
    }
}

/// The `[left, right]` pair of rendered page indices, `-1` for an absent side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayedIndices([isize; 2]);

impl DisplayedIndices {
    /// Derive the rendered pair from spread slots: positions outside the book
    /// and non-viewable pages both become [`ABSENT`].
    pub fn from_slots(slots: SpreadSlots, book: &Book) -> Self {
        let side = |pos: isize| {
            book.viewable_page(pos)
                .map(|p| p.index as isize)
                .unwrap_or(ABSENT)
        };
        Self([side(slots.left), side(slots.right)])
    }

    /// Unchecked pair, as external code may set it
    pub fn from_raw(raw: [isize; 2]) -> Self {
        Self(raw)
    }

    pub fn as_array(&self) -> [isize; 2] {
        self.0
    }

    pub fn left(&self) -> Option<usize> {
        usize::try_from(self.0[0]).ok()
    }

    pub fn right(&self) -> Option<usize> {
        usize::try_from(self.0[1]).ok()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.left() == Some(index) || self.right() == Some(index)
    }
}

impl Default for DisplayedIndices {
    fn default() -> Self {
        Self([ABSENT, 0])
    }
}

impl PartialEq<[isize; 2]> for DisplayedIndices {
    fn eq(&self, other: &[isize; 2]) -> bool {
        self.0 == *other
    }
}

/// Client size of the viewer container in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ContainerSize {
    pub width: u32,
    pub height: u32,
}

impl ContainerSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Point of the spread kept in the middle of the container, as fractions of
/// the spread's total width and height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCenter {
    pub x: f64,
    pub y: f64,
}

impl Default for ViewCenter {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}
