//! Page records and the book they belong to
//!
//! A [`Book`] owns the ordered pages and answers the positional questions the
//! two-page view asks: which side a page sits on, which pair of positions
//! forms the spread around an index, and how far navigation may go.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Which half of a spread a page is printed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSide {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

/// Reading direction of the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageProgression {
    #[default]
    Lr,
    Rl,
}

/// A page record as it appears in a book manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub width: u32,
    pub height: u32,
    pub uri: String,
    #[serde(rename = "pageNum", default, skip_serializing_if = "Option::is_none")]
    pub page_num: Option<String>,
    #[serde(default = "default_true")]
    pub viewable: bool,
    #[serde(rename = "pageSide", default, skip_serializing_if = "Option::is_none")]
    pub page_side: Option<PageSide>,
}

fn default_true() -> bool {
    true
}

/// Manifest file layout: the page data grouped by spread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "pageProgression")]
    pub page_progression: PageProgression,
    pub data: Vec<Vec<PageRecord>>,
}

/// Per-page metadata plus the two mutable load flags
#[derive(Debug, Clone)]
pub struct Page {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub uri: String,
    pub page_num: Option<String>,
    pub viewable: bool,
    side: Option<PageSide>,
    loaded: bool,
    prefetched: bool,
}

impl Page {
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_prefetched(&self) -> bool {
        self.prefetched
    }
}

/// The reader's page collection
#[derive(Debug, Clone)]
pub struct Book {
    pages: Vec<Page>,
    progression: PageProgression,
}

impl Book {
    /// Build a book from page data grouped by spread.
    ///
    /// Zero-sized pages are a configuration error and are rejected here so
    /// geometry never has to divide by zero later.
    pub fn from_spreads(data: Vec<Vec<PageRecord>>, progression: PageProgression) -> Result<Self> {
        let pages: Vec<Page> = data
            .into_iter()
            .flatten()
            .enumerate()
            .map(|(index, record)| Page {
                index,
                width: record.width,
                height: record.height,
                uri: record.uri,
                page_num: record.page_num,
                viewable: record.viewable,
                side: record.page_side,
                loaded: false,
                prefetched: false,
            })
            .collect();

        if pages.is_empty() {
            return Err(ViewerError::EmptyBook);
        }

        if let Some(page) = pages.iter().find(|p| p.width == 0 || p.height == 0) {
            return Err(ViewerError::InvalidPageDimensions {
                index: page.index,
                width: page.width,
                height: page.height,
            });
        }

        Ok(Self { pages, progression })
    }

    pub fn from_manifest(manifest: Manifest) -> Result<Self> {
        Self::from_spreads(manifest.data, manifest.page_progression)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)?;
        Self::from_manifest(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn num_leafs(&self) -> usize {
        self.pages.len()
    }

    pub fn progression(&self) -> PageProgression {
        self.progression
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Page at a signed position; sentinels and out-of-range positions are `None`
    pub fn page(&self, index: isize) -> Option<&Page> {
        usize::try_from(index).ok().and_then(|i| self.pages.get(i))
    }

    /// Like [`Book::page`] but also `None` for non-viewable pages
    pub fn viewable_page(&self, index: isize) -> Option<&Page> {
        self.page(index).filter(|p| p.viewable)
    }

    pub fn page_side(&self, index: isize) -> PageSide {
        if let Some(side) = self.page(index).and_then(|p| p.side) {
            return side;
        }
        if index.rem_euclid(2) == 0 {
            PageSide::Right
        } else {
            PageSide::Left
        }
    }

    /// The pair of positions `[left, right]` shown when `index` is current.
    ///
    /// Positions may fall outside the book (e.g. `-1` before the first page);
    /// those render as an absent side.
    pub fn spread_indices(&self, index: isize) -> [isize; 2] {
        let side = self.page_side(index);
        match self.progression {
            PageProgression::Lr => match side {
                PageSide::Left => [index, index + 1],
                PageSide::Right => [index - 1, index],
            },
            PageProgression::Rl => match side {
                PageSide::Right => [index + 1, index],
                PageSide::Left => [index, index - 1],
            },
        }
    }

    pub fn first_displayable_index(&self) -> isize {
        let opening = match self.progression {
            PageProgression::Lr => PageSide::Left,
            PageProgression::Rl => PageSide::Right,
        };
        if self.page_side(0) == opening { 0 } else { -1 }
    }

    pub fn last_displayable_index(&self) -> isize {
        let last = self.pages.len() as isize - 1;
        let closing = match self.progression {
            PageProgression::Lr => PageSide::Right,
            PageProgression::Rl => PageSide::Left,
        };
        if self.page_side(last) == closing { last } else { last + 1 }
    }

    pub fn clamp_index(&self, index: isize) -> isize {
        index.clamp(self.first_displayable_index(), self.last_displayable_index())
    }

    pub(crate) fn mark_prefetched(&mut self, index: usize) {
        if let Some(page) = self.pages.get_mut(index) {
            page.prefetched = true;
        }
    }

    pub(crate) fn mark_loaded(&mut self, index: usize) {
        if let Some(page) = self.pages.get_mut(index) {
            page.loaded = true;
        }
    }
}
