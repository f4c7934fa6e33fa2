//! Error types for the portfolio shelf.

use thiserror::Error;

/// Result type alias using ShelfError.
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Main error type for geometry, content and export operations.
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Box parameters would produce overlapping or inverted corners.
    #[error("Invalid box spec: {0}")]
    InvalidBoxSpec(String),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read an image's header.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Language tag with no matching translation bundle.
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    /// Book index outside the shelf.
    #[error("Book not found: {0}")]
    BookNotFound(usize),

    /// A gallery image could not be resolved.
    #[error("Asset unavailable: {0}")]
    AssetUnavailable(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// Failed to export mesh.
    #[error("Export error: {0}")]
    Export(String),
}
