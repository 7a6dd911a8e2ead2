//! Error types for the two-page viewer core

/// Configuration and initialisation failures.
///
/// Per-cycle operations never return these: navigation is clamped and image
/// load failures are reported through the completion channel instead.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("book has no pages")]
    EmptyBook,

    #[error("page {index} has invalid dimensions {width}x{height}")]
    InvalidPageDimensions { index: usize, width: u32, height: u32 },

    #[error("container has no usable size ({width}x{height})")]
    MissingContainer { width: u32, height: u32 },

    #[error("manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("settings: {0}")]
    Settings(#[from] serde_yaml::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
