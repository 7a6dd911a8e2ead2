pub mod book;
pub mod error;
pub mod panic_handler;
pub mod settings;
pub mod spread;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use book::{Book, Manifest, Page, PageProgression, PageRecord, PageSide};
pub use error::{Result, ViewerError};
pub use settings::Settings;
pub use spread::{TwoPageConfig, TwoPageView, UpdateMode, ZoomDirection};
