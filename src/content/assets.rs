//! Image dimension lookup.
//!
//! Layout needs every image's intrinsic size before it can place anything.
//! How that size is obtained depends on the host: a browser waits for image
//! decode, a CLI reads file headers. Both sit behind [`AssetResolver`].

use crate::error::{Result, ShelfError};
use crate::types::Dimensions;
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolves an asset path to the image's intrinsic size.
pub trait AssetResolver {
    fn resolve(&mut self, path: &str) -> Result<Dimensions>;
}

/// Reads image headers from disk.
///
/// Asset paths are expected to start with `base_url`; the prefix is
/// replaced by `root` to find the file.
#[derive(Debug, Clone)]
pub struct ImageFileResolver {
    root: PathBuf,
    base_url: String,
}

impl ImageFileResolver {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// File an asset path maps to.
    pub fn file_path(&self, path: &str) -> PathBuf {
        let relative = path.strip_prefix(self.base_url.as_str()).unwrap_or(path);
        self.root.join(relative.trim_start_matches('/'))
    }
}

impl AssetResolver for ImageFileResolver {
    fn resolve(&mut self, path: &str) -> Result<Dimensions> {
        let file = self.file_path(path);
        if !file.is_file() {
            return Err(ShelfError::AssetUnavailable(path.to_string()));
        }
        let (width, height) = image::image_dimensions(&file)?;
        Ok(Dimensions::new(width, height))
    }
}

/// In-memory table of known sizes.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    sizes: HashMap<String, Dimensions>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, dimensions: Dimensions) {
        self.sizes.insert(path.into(), dimensions);
    }

    pub fn with(mut self, path: impl Into<String>, width: u32, height: u32) -> Self {
        self.insert(path, Dimensions::new(width, height));
        self
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl AssetResolver for StaticResolver {
    fn resolve(&mut self, path: &str) -> Result<Dimensions> {
        self.sizes
            .get(path)
            .copied()
            .ok_or_else(|| ShelfError::AssetUnavailable(path.to_string()))
    }
}
