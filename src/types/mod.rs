//! Shared types used throughout the library.

use crate::error::{Result, ShelfError};
use serde::{Deserialize, Serialize};

/// Smallest corner radius the builder will emit.
///
/// A zero radius is replaced by this value so the rim still has a defined
/// arc to follow; it is small enough to read as a sharp corner.
pub const MIN_CORNER_RADIUS: f32 = 1e-3;

/// Parameters of a rounded-edge box.
///
/// Width runs along x, height along y and thickness along z. Corners are
/// rounded in the xy plane only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub width: f32,
    pub height: f32,
    pub thickness: f32,
    pub corner_radius: f32,
    /// Wedges per rounded corner.
    pub smoothness: u32,
}

impl BoxSpec {
    pub fn new(width: f32, height: f32, thickness: f32, corner_radius: f32, smoothness: u32) -> Self {
        Self {
            width,
            height,
            thickness,
            corner_radius,
            smoothness,
        }
    }

    /// Check the invariants the builder relies on.
    ///
    /// A radius of exactly zero passes; see [`BoxSpec::effective_radius`].
    pub fn validate(&self) -> Result<()> {
        let values = [self.width, self.height, self.thickness, self.corner_radius];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ShelfError::InvalidBoxSpec(format!(
                "non-finite dimension in {:?}",
                self
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 || self.thickness <= 0.0 {
            return Err(ShelfError::InvalidBoxSpec(format!(
                "width, height and thickness must be positive (got {} x {} x {})",
                self.width, self.height, self.thickness
            )));
        }
        if self.corner_radius < 0.0 {
            return Err(ShelfError::InvalidBoxSpec(format!(
                "negative corner radius {}",
                self.corner_radius
            )));
        }
        if self.smoothness == 0 {
            return Err(ShelfError::InvalidBoxSpec(
                "smoothness must be at least 1".to_string(),
            ));
        }
        let limit = self.max_radius();
        if self.effective_radius() >= limit {
            return Err(ShelfError::InvalidBoxSpec(format!(
                "corner radius {} must be below half the shorter side ({})",
                self.corner_radius, limit
            )));
        }
        Ok(())
    }

    /// Half of the shorter side; radii at or above this overlap.
    pub fn max_radius(&self) -> f32 {
        self.width.min(self.height) / 2.0
    }

    /// Radius actually used for geometry. Zero falls back to [`MIN_CORNER_RADIUS`].
    pub fn effective_radius(&self) -> f32 {
        if self.corner_radius == 0.0 {
            MIN_CORNER_RADIUS
        } else {
            self.corner_radius
        }
    }

    /// Copy with radius and smoothness pulled into the valid range.
    ///
    /// For callers that prefer clamping over rejection. Dimensions are not
    /// touched, so a non-positive width or height still fails validation.
    pub fn clamped(self) -> Self {
        let upper = self.max_radius() * 0.99;
        let radius = if self.corner_radius.is_finite() {
            self.corner_radius.max(MIN_CORNER_RADIUS).min(upper)
        } else {
            MIN_CORNER_RADIUS
        };
        Self {
            corner_radius: radius,
            smoothness: self.smoothness.max(1),
            ..self
        }
    }

    /// Triangles in the built mesh: `6 + 4s` per face and `8 + 8s` on the rim.
    pub fn triangle_count(&self) -> usize {
        let s = self.smoothness as usize;
        2 * Self::face_triangle_count(s) + Self::rim_triangle_count(s)
    }

    pub(crate) fn face_triangle_count(smoothness: usize) -> usize {
        6 + 4 * smoothness
    }

    pub(crate) fn rim_triangle_count(smoothness: usize) -> usize {
        8 + 8 * smoothness
    }

    /// Bitwise identity of the parameters, used as a memoization key.
    pub(crate) fn key(&self) -> [u32; 5] {
        [
            self.width.to_bits(),
            self.height.to_bits(),
            self.thickness.to_bits(),
            self.corner_radius.to_bits(),
            self.smoothness,
        ]
    }
}

/// Intrinsic pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, or `None` for a degenerate image.
    pub fn aspect_ratio(&self) -> Option<f32> {
        (self.width > 0 && self.height > 0).then(|| self.width as f32 / self.height as f32)
    }
}

/// One image in a gallery strip.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    /// Path or URL of the image.
    pub source_ref: String,
    pub intrinsic_width: f32,
    pub intrinsic_height: f32,
}

impl GalleryItem {
    pub fn new(source_ref: impl Into<String>, intrinsic_width: f32, intrinsic_height: f32) -> Self {
        Self {
            source_ref: source_ref.into(),
            intrinsic_width,
            intrinsic_height,
        }
    }

    pub fn from_dimensions(source_ref: impl Into<String>, dimensions: Dimensions) -> Self {
        Self::new(source_ref, dimensions.width as f32, dimensions.height as f32)
    }

    /// Width when scaled to `target_height`, preserving aspect ratio.
    pub fn display_width(&self, target_height: f32) -> f32 {
        target_height * (self.intrinsic_width / self.intrinsic_height)
    }

    /// Whether the item can take part in layout.
    pub fn has_valid_size(&self) -> bool {
        self.intrinsic_width.is_finite()
            && self.intrinsic_height.is_finite()
            && self.intrinsic_width > 0.0
            && self.intrinsic_height > 0.0
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl Iterator<Item = [f32; 3]>) -> Option<Self> {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut has_points = false;

        for p in points {
            has_points = true;
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub fn dimensions(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_spec_rejects_oversized_radius() {
        let spec = BoxSpec::new(1.0, 2.0, 0.1, 0.5, 4);
        assert!(matches!(spec.validate(), Err(ShelfError::InvalidBoxSpec(_))));

        let spec = BoxSpec::new(1.0, 2.0, 0.1, 0.49, 4);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_box_spec_rejects_bad_values() {
        assert!(BoxSpec::new(1.0, 1.0, 0.1, 0.1, 0).validate().is_err());
        assert!(BoxSpec::new(1.0, 1.0, 0.0, 0.1, 2).validate().is_err());
        assert!(BoxSpec::new(-1.0, 1.0, 0.1, 0.1, 2).validate().is_err());
        assert!(BoxSpec::new(1.0, f32::NAN, 0.1, 0.1, 2).validate().is_err());
        assert!(BoxSpec::new(1.0, 1.0, 0.1, -0.1, 2).validate().is_err());
    }

    #[test]
    fn test_zero_radius_falls_back() {
        let spec = BoxSpec::new(1.0, 1.0, 0.1, 0.0, 3);
        assert!(spec.validate().is_ok());
        assert_eq!(spec.effective_radius(), MIN_CORNER_RADIUS);
    }

    #[test]
    fn test_clamped_spec_is_valid() {
        let spec = BoxSpec::new(1.28, 1.71, 0.1, 5.0, 0).clamped();
        assert!(spec.validate().is_ok());
        assert!(spec.corner_radius < 0.64);
        assert_eq!(spec.smoothness, 1);
    }

    #[test]
    fn test_triangle_count_formula() {
        assert_eq!(BoxSpec::new(1.0, 1.0, 0.1, 0.1, 1).triangle_count(), 36);
        assert_eq!(BoxSpec::new(1.0, 1.0, 0.1, 0.1, 10).triangle_count(), 180);
    }

    #[test]
    fn test_display_width() {
        let item = GalleryItem::new("a.jpg", 300.0, 200.0);
        assert!((item.display_width(1.8) - 2.7).abs() < 1e-6);
        assert!(item.has_valid_size());
        assert!(!GalleryItem::new("b.jpg", 0.0, 200.0).has_valid_size());
    }

    #[test]
    fn test_dimensions_aspect_ratio() {
        assert_eq!(Dimensions::new(400, 200).aspect_ratio(), Some(2.0));
        assert_eq!(Dimensions::new(0, 200).aspect_ratio(), None);
    }

    #[test]
    fn test_bounding_box_from_points() {
        let bounds = BoundingBox::from_points(
            [[-1.0, 0.0, 2.0], [1.0, 3.0, -2.0]].into_iter(),
        )
        .unwrap();
        assert_eq!(bounds.dimensions(), [2.0, 3.0, 4.0]);
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }
}
