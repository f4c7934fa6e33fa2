//! Horizontal gallery layout.
//!
//! Images are scaled to a common display height and laid out left to right
//! with a uniform gap between neighbouring edges, whatever their aspect
//! ratios. The first image is centered on the origin.

use crate::types::GalleryItem;

/// Centerlines and display widths of a laid-out gallery strip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    centers: Vec<f32>,
    widths: Vec<f32>,
}

impl LayoutResult {
    /// Raw centerlines, first item at 0.
    pub fn centers(&self) -> &[f32] {
        &self.centers
    }

    /// Display widths in layout order.
    pub fn widths(&self) -> &[f32] {
        &self.widths
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn center(&self, index: usize) -> Option<f32> {
        self.centers.get(index).copied()
    }

    pub fn width(&self, index: usize) -> Option<f32> {
        self.widths.get(index).copied()
    }

    /// Centerlines translated so item `current` sits at the origin.
    ///
    /// `current` is clamped into range. The raw positions are reused, only
    /// shifted, so `recentered(k)[k]` is exactly `0.0`.
    pub fn recentered(&self, current: usize) -> Vec<f32> {
        let Some(last) = self.centers.len().checked_sub(1) else {
            return Vec::new();
        };
        let origin = self.centers[current.min(last)];
        self.centers.iter().map(|c| c - origin).collect()
    }
}

/// Lay out `items` at `target_height` with `gap` between neighbouring edges.
///
/// Every item must have positive, finite intrinsic dimensions (see
/// [`GalleryItem::has_valid_size`]); callers drop the rest before layout.
/// The result depends on nothing but the arguments.
pub fn compute_positions(items: &[GalleryItem], target_height: f32, gap: f32) -> LayoutResult {
    let mut centers = Vec::with_capacity(items.len());
    let mut widths = Vec::with_capacity(items.len());
    let mut extent = 0.0f32;

    for (index, item) in items.iter().enumerate() {
        let width = item.display_width(target_height);
        if index == 0 {
            centers.push(0.0);
            extent += width / 2.0 + gap;
        } else {
            centers.push(extent + width / 2.0);
            extent += width + gap;
        }
        widths.push(width);
    }

    LayoutResult { centers, widths }
}
