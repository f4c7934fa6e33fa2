//! Interface to the external animation collaborator.
//!
//! The core never advances time itself. It hands target values to an
//! [`Animator`] whenever state changes and reads back whatever interpolated
//! value the animator currently holds when describing a frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Spring parameters passed along with every target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub tension: f32,
    pub friction: f32,
    pub mass: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            tension: 170.0,
            friction: 26.0,
            mass: 1.0,
        }
    }
}

/// Identifies one animated property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimKey {
    BookPosition(usize),
    BookRotation(usize),
    BookScale(usize),
    /// Label opacity above a shelf book.
    BookLabel(usize),
    /// Horizontal offset of a gallery tile.
    TileX(usize),
    /// Depth offset of a gallery tile.
    TileDepth(usize),
    TileScale(usize),
    /// Opacity of the prev/next overlay.
    ControlsOpacity,
    /// Opacity of the caption under the current tile.
    CaptionOpacity,
    /// Opacity of the whole gallery; its completion ends a close.
    GalleryFade,
}

impl AnimKey {
    /// Stable name of the animated property, without its index.
    pub fn name(self) -> &'static str {
        match self {
            AnimKey::BookPosition(_) => "bookPosition",
            AnimKey::BookRotation(_) => "bookRotation",
            AnimKey::BookScale(_) => "bookScale",
            AnimKey::BookLabel(_) => "bookLabel",
            AnimKey::TileX(_) => "tileX",
            AnimKey::TileDepth(_) => "tileDepth",
            AnimKey::TileScale(_) => "tileScale",
            AnimKey::ControlsOpacity => "controlsOpacity",
            AnimKey::CaptionOpacity => "captionOpacity",
            AnimKey::GalleryFade => "galleryFade",
        }
    }

    /// Book or tile index for per-item keys.
    pub fn index(self) -> Option<usize> {
        match self {
            AnimKey::BookPosition(i)
            | AnimKey::BookRotation(i)
            | AnimKey::BookScale(i)
            | AnimKey::BookLabel(i)
            | AnimKey::TileX(i)
            | AnimKey::TileDepth(i)
            | AnimKey::TileScale(i) => Some(i),
            AnimKey::ControlsOpacity | AnimKey::CaptionOpacity | AnimKey::GalleryFade => None,
        }
    }

    /// Inverse of [`AnimKey::name`] and [`AnimKey::index`].
    pub fn from_parts(name: &str, index: Option<usize>) -> Option<AnimKey> {
        let key = match (name, index) {
            ("bookPosition", Some(i)) => AnimKey::BookPosition(i),
            ("bookRotation", Some(i)) => AnimKey::BookRotation(i),
            ("bookScale", Some(i)) => AnimKey::BookScale(i),
            ("bookLabel", Some(i)) => AnimKey::BookLabel(i),
            ("tileX", Some(i)) => AnimKey::TileX(i),
            ("tileDepth", Some(i)) => AnimKey::TileDepth(i),
            ("tileScale", Some(i)) => AnimKey::TileScale(i),
            ("controlsOpacity", None) => AnimKey::ControlsOpacity,
            ("captionOpacity", None) => AnimKey::CaptionOpacity,
            ("galleryFade", None) => AnimKey::GalleryFade,
            _ => return None,
        };
        Some(key)
    }
}

/// A scalar or vector animation target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimValue {
    Scalar(f32),
    Vector(Vec3),
}

impl AnimValue {
    pub fn as_scalar(self) -> Option<f32> {
        match self {
            AnimValue::Scalar(v) => Some(v),
            AnimValue::Vector(_) => None,
        }
    }

    pub fn as_vector(self) -> Option<Vec3> {
        match self {
            AnimValue::Vector(v) => Some(v),
            AnimValue::Scalar(_) => None,
        }
    }
}

/// Interpolation engine supplied by the host.
pub trait Animator {
    /// Start (or retarget) the animation of `key` towards `target`.
    fn animate(&mut self, key: AnimKey, target: AnimValue, spring: SpringConfig);

    /// Set `key` to `value` at once, dropping any animation in flight.
    fn jump(&mut self, key: AnimKey, value: AnimValue);

    /// Current interpolated value of `key`, if it has ever been animated.
    fn value(&self, key: AnimKey) -> Option<AnimValue>;

    /// Keys whose animation came to rest since the last call.
    fn drain_finished(&mut self) -> Vec<AnimKey>;
}

/// Animator that jumps straight to every target and reports it finished.
///
/// Useful for headless hosts and tests where only end states matter.
#[derive(Debug, Default)]
pub struct SnapAnimator {
    values: HashMap<AnimKey, AnimValue>,
    finished: Vec<AnimKey>,
}

impl SnapAnimator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Animator for SnapAnimator {
    fn animate(&mut self, key: AnimKey, target: AnimValue, _spring: SpringConfig) {
        self.values.insert(key, target);
        if !self.finished.contains(&key) {
            self.finished.push(key);
        }
    }

    fn jump(&mut self, key: AnimKey, value: AnimValue) {
        self.values.insert(key, value);
    }

    fn value(&self, key: AnimKey) -> Option<AnimValue> {
        self.values.get(&key).copied()
    }

    fn drain_finished(&mut self) -> Vec<AnimKey> {
        std::mem::take(&mut self.finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_animator_jumps_to_target() {
        let mut animator = SnapAnimator::new();
        assert_eq!(animator.value(AnimKey::ControlsOpacity), None);

        animator.animate(AnimKey::ControlsOpacity, AnimValue::Scalar(0.0), SpringConfig::default());
        assert_eq!(animator.value(AnimKey::ControlsOpacity), Some(AnimValue::Scalar(0.0)));
    }

    #[test]
    fn test_snap_animator_reports_each_key_once() {
        let mut animator = SnapAnimator::new();
        let spring = SpringConfig::default();
        animator.animate(AnimKey::GalleryFade, AnimValue::Scalar(0.0), spring);
        animator.animate(AnimKey::GalleryFade, AnimValue::Scalar(1.0), spring);
        animator.animate(AnimKey::TileX(0), AnimValue::Scalar(2.0), spring);

        assert_eq!(animator.drain_finished(), vec![AnimKey::GalleryFade, AnimKey::TileX(0)]);
        assert!(animator.drain_finished().is_empty());
    }

    #[test]
    fn test_snap_animator_jump_not_reported() {
        let mut animator = SnapAnimator::new();
        animator.jump(AnimKey::CaptionOpacity, AnimValue::Scalar(0.0));

        assert_eq!(animator.value(AnimKey::CaptionOpacity), Some(AnimValue::Scalar(0.0)));
        assert!(animator.drain_finished().is_empty());
    }

    #[test]
    fn test_key_parts() {
        for key in [AnimKey::TileX(3), AnimKey::BookLabel(0), AnimKey::GalleryFade] {
            assert_eq!(AnimKey::from_parts(key.name(), key.index()), Some(key));
        }
        assert_eq!(AnimKey::from_parts("tileX", None), None);
        assert_eq!(AnimKey::from_parts("galleryFade", Some(1)), None);
        assert_eq!(AnimKey::from_parts("spin", None), None);
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(AnimValue::Scalar(1.5).as_scalar(), Some(1.5));
        assert_eq!(AnimValue::Scalar(1.5).as_vector(), None);
        assert_eq!(AnimValue::Vector(Vec3::ONE).as_vector(), Some(Vec3::ONE));
    }
}
