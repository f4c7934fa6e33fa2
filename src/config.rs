//! Viewer configuration.
//!
//! Every field has a default matching the shipped portfolio, so a config file
//! only needs to list what it overrides.

use crate::animation::SpringConfig;
use crate::error::{Result, ShelfError};
use crate::types::BoxSpec;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::path::Path;

/// Gallery strip parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Display height every image is scaled to.
    pub target_height: f32,
    /// Gap between neighbouring image edges.
    pub gap: f32,
    /// Height of the strip above the floor.
    pub row_height: f32,
    /// Depth offset of the current image while it is not inspect-locked.
    pub current_depth_offset: f32,
    /// Scale of the current image while inspect-locked.
    pub inspect_scale: f32,
    /// Thickness of an image tile.
    pub tile_thickness: f32,
    pub backdrop_opacity: f32,
    pub backdrop_height: f32,
    /// Suggested length of the close fade for hosts that time it themselves.
    pub fade_ms: u32,
    /// Spring of the caption fade, replayed on every image change.
    pub caption_spring: SpringConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            target_height: 1.8,
            gap: 0.6,
            row_height: 0.6,
            current_depth_offset: -0.2,
            inspect_scale: 1.5,
            tile_thickness: 0.01,
            backdrop_opacity: 0.6,
            backdrop_height: 0.5,
            fade_ms: 300,
            caption_spring: SpringConfig {
                tension: 120.0,
                friction: 14.0,
                mass: 1.0,
            },
        }
    }
}

/// Shelf parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    /// Distance between neighbouring book centers along x.
    pub spacing: f32,
    /// Resting height of a book above the floor.
    pub rest_height: f32,
    /// Pitch of a resting book; -pi/2 lies it flat.
    pub rest_pitch: f32,
    /// Lift applied to a hovered book.
    pub hover_lift: f32,
    pub hover_scale: f32,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            spacing: 1.6,
            rest_height: 0.1,
            rest_pitch: -FRAC_PI_2,
            hover_lift: 0.2,
            hover_scale: 1.05,
        }
    }
}

/// Where gallery images live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Prefix of every asset path, with trailing slash.
    pub base_url: String,
    /// Extension appended to each content entry's image name.
    pub image_extension: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_url: "/".to_string(),
            image_extension: "jpg".to_string(),
        }
    }
}

impl AssetConfig {
    /// `{base_url}images/{name}.{ext}`
    pub fn image_path(&self, name: &str) -> String {
        format!("{}images/{}.{}", self.base_url, name, self.image_extension)
    }
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Shape shared by every book on the shelf.
    pub book: BoxSpec,
    pub shelf: ShelfConfig,
    pub gallery: GalleryConfig,
    pub spring: SpringConfig,
    pub assets: AssetConfig,
    /// Language used until the host picks another.
    pub default_language: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            book: BoxSpec::new(1.28, 1.71, 0.1, 0.3, 10),
            shelf: ShelfConfig::default(),
            gallery: GalleryConfig::default(),
            spring: SpringConfig::default(),
            assets: AssetConfig::default(),
            default_language: "en".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Parse a JSON config, filling unspecified fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Create config with a different book shape.
    pub fn with_book(mut self, book: BoxSpec) -> Self {
        self.book = book;
        self
    }

    /// Create config with a different starting language.
    pub fn with_language(mut self, language: &str) -> Self {
        self.default_language = language.to_string();
        self
    }

    /// Create config with a different asset base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.assets.base_url = base_url.to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.book.validate()?;
        let gallery = &self.gallery;
        if !(gallery.target_height.is_finite() && gallery.target_height > 0.0) {
            return Err(ShelfError::Config(format!(
                "gallery.target_height must be positive, got {}",
                gallery.target_height
            )));
        }
        if !(gallery.gap.is_finite() && gallery.gap >= 0.0) {
            return Err(ShelfError::Config(format!(
                "gallery.gap must not be negative, got {}",
                gallery.gap
            )));
        }
        if self.spring.mass <= 0.0 {
            return Err(ShelfError::Config(format!(
                "spring.mass must be positive, got {}",
                self.spring.mass
            )));
        }
        if gallery.caption_spring.mass <= 0.0 {
            return Err(ShelfError::Config(format!(
                "gallery.caption_spring.mass must be positive, got {}",
                gallery.caption_spring.mass
            )));
        }
        Ok(())
    }
}
