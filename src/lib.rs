//! # Portfolio Shelf
//!
//! Geometry and state for an interactive 3D portfolio: a shelf of books,
//! each opening into a horizontally scrolling image gallery.
//!
//! ## Overview
//!
//! The crate builds the rounded-edge book mesh, lays out gallery images,
//! tracks which book and image are selected, and turns pointer and keyboard
//! input into animation targets. Rendering, interpolation and image loading
//! are left to the host, which plugs in through [`Animator`],
//! [`ContentCatalog`] and [`AssetResolver`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use portfolio_shelf::{load_catalog, SnapAnimator, Viewer, ViewerConfig, ImageFileResolver};
//!
//! let catalog = load_catalog("public/locales")?;
//! let mut viewer = Viewer::new(ViewerConfig::default(), catalog, SnapAnimator::new())?;
//!
//! // Shared geometry for every book
//! let mesh = viewer.book_mesh()?;
//!
//! // Open the first book and resolve its images from disk
//! viewer.select_book(0);
//! viewer.resolve_pending(&mut ImageFileResolver::new("public", "/"));
//!
//! // Each frame
//! viewer.advance();
//! let frame = viewer.frame();
//! ```
//!
//! ## Geometry only
//!
//! ```ignore
//! use portfolio_shelf::{build_rounded_box, export_glb, BoxSpec};
//!
//! let mesh = build_rounded_box(&BoxSpec::new(1.28, 1.71, 0.1, 0.3, 10))?;
//! let glb_bytes = export_glb(&mesh)?;
//! ```

pub mod error;
pub mod types;
pub mod geometry;
pub mod layout;
pub mod selection;
pub mod animation;
pub mod interaction;
pub mod content;
pub mod config;
pub mod viewer;
pub mod export;

// Re-export main types for convenience
pub use error::{ShelfError, Result};
pub use types::{BoxSpec, BoundingBox, Dimensions, GalleryItem, MIN_CORNER_RADIUS};
pub use geometry::{build_rounded_box, GeometryCache, MaterialGroup, MaterialSlot, Mesh};
pub use layout::{compute_positions, LayoutResult};
pub use selection::{ClosingView, Phase, SelectionMachine, SelectionState};
pub use animation::{AnimKey, AnimValue, Animator, SnapAnimator, SpringConfig};
pub use interaction::{Action, Camera, Control, HitTarget, InteractionController, PointerEvent};
pub use content::{
    AssetResolver, Book, BookContent, ContentCatalog, ImageFileResolver, Language,
    StaticResolver, TranslationCatalog, Translations,
};
pub use config::{AssetConfig, GalleryConfig, ShelfConfig, ViewerConfig};
pub use viewer::{Frame, GalleryView, InputEvent, ShelfView, View, Viewer};
pub use export::gltf::export_glb;
pub use export::obj::{export_obj, ObjExport};

/// Load translation bundles from a directory of `{language}.json` files.
pub fn load_catalog<P: AsRef<std::path::Path>>(dir: P) -> Result<TranslationCatalog> {
    content::loader::load_from_directory(dir)
}

/// Parse translation bundles from one JSON object keyed by language code.
pub fn load_catalog_from_str(json: &str) -> Result<TranslationCatalog> {
    content::loader::catalog_from_json_str(json)
}

#[cfg(feature = "wasm")]
pub mod wasm;
