//! Pointer and keyboard handling for shelf books and gallery images.
//!
//! Hover is ephemeral presentation state: it lives here rather than in
//! [`SelectionState`], and it is dropped as soon as the hovered item stops
//! being interactive.

use crate::config::{GalleryConfig, ShelfConfig};
use crate::selection::SelectionState;
use glam::{Mat4, Vec3};
use log::debug;

/// Right-handed perspective camera.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    /// Slightly tilted top-down view onto the shelf.
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.5, 0.2),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy_radians: 80f32.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

impl Camera {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Unit view direction, or `-Z` when eye and target coincide.
    pub fn forward(&self) -> Vec3 {
        let f = (self.target - self.eye).normalize_or_zero();
        if f == Vec3::ZERO {
            Vec3::NEG_Z
        } else {
            f
        }
    }

    /// Rotation about x that turns a `+z`-facing plane towards the camera.
    pub fn pitch(&self) -> f32 {
        let f = self.forward();
        f.y.atan2(-f.z)
    }

    /// Euler rotation for camera-facing items. Pitch only.
    pub fn billboard_rotation(&self) -> Vec3 {
        Vec3::new(self.pitch(), 0.0, 0.0)
    }
}

/// What the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Book(usize),
    /// Gallery image by layout index.
    Image(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Enter(HitTarget),
    Leave(HitTarget),
    Click(HitTarget),
}

impl PointerEvent {
    pub fn target(self) -> HitTarget {
        match self {
            PointerEvent::Enter(t) | PointerEvent::Leave(t) | PointerEvent::Click(t) => t,
        }
    }
}

/// Selection transition requested by a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Select(usize),
    ToggleInspect,
}

/// Keyboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Previous,
    Next,
    Escape,
}

/// Map a `KeyboardEvent.code` to a command.
#[inline]
pub fn control_for_key(code: &str) -> Option<Control> {
    match code {
        "ArrowLeft" | "KeyA" => Some(Control::Previous),
        "ArrowRight" | "KeyD" => Some(Control::Next),
        "Escape" => Some(Control::Escape),
        _ => None,
    }
}

/// Animation targets for one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Euler angles, XYZ order.
    pub rotation: Vec3,
    pub scale: f32,
}

/// Resting position of book `index` out of `count`, centered on x = 0.
pub fn book_rest_position(index: usize, count: usize, shelf: &ShelfConfig) -> Vec3 {
    let offset = index as f32 - (count.saturating_sub(1)) as f32 / 2.0;
    Vec3::new(offset * shelf.spacing, shelf.rest_height, 0.0)
}

/// Pose of a gallery tile.
///
/// `x` is the tile's recentered centerline. Only the current tile moves in
/// depth or scale: forward while browsing, enlarged while inspect-locked.
pub fn image_pose(
    x: f32,
    is_current: bool,
    inspect_locked: bool,
    camera: &Camera,
    gallery: &GalleryConfig,
) -> Pose {
    let depth = if is_current && !inspect_locked {
        gallery.current_depth_offset
    } else {
        0.0
    };
    let scale = if is_current && inspect_locked {
        gallery.inspect_scale
    } else {
        1.0
    };
    Pose {
        position: Vec3::new(x, gallery.row_height, depth),
        rotation: camera.billboard_rotation(),
        scale,
    }
}

/// Opacity of the prev/next overlay.
pub fn controls_opacity(inspect_locked: bool) -> f32 {
    if inspect_locked {
        0.0
    } else {
        1.0
    }
}

/// Hover tracking and click dispatch.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    hovered_book: Option<usize>,
    hovered_image: Option<usize>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered_book(&self) -> Option<usize> {
        self.hovered_book
    }

    pub fn hovered_image(&self) -> Option<usize> {
        self.hovered_image
    }

    /// Whether the host should show a pointer cursor.
    pub fn wants_pointer_cursor(&self) -> bool {
        self.hovered_book.is_some() || self.hovered_image.is_some()
    }

    /// Books accept pointer input only on the shelf.
    fn book_interactive(state: &SelectionState) -> bool {
        state.selected_book().is_none()
    }

    /// Hover is tracked on the current image only, and not while locked.
    fn image_hoverable(state: &SelectionState, index: usize) -> bool {
        state.selected_book().is_some()
            && index == state.current_image()
            && !state.inspect_locked()
    }

    /// Drop hover on items that are no longer interactive. Returns whether
    /// anything changed.
    pub fn sync(&mut self, state: &SelectionState) -> bool {
        let mut changed = false;
        if self.hovered_book.is_some() && !Self::book_interactive(state) {
            self.hovered_book = None;
            changed = true;
        }
        if let Some(index) = self.hovered_image {
            if !Self::image_hoverable(state, index) {
                self.hovered_image = None;
                changed = true;
            }
        }
        changed
    }

    /// Apply a pointer event. Clicks that should change the selection come
    /// back as an [`Action`] for the caller to execute.
    pub fn pointer(&mut self, event: PointerEvent, state: &SelectionState) -> Option<Action> {
        match event {
            PointerEvent::Enter(HitTarget::Book(i)) => {
                if Self::book_interactive(state) {
                    self.hovered_book = Some(i);
                }
                None
            }
            PointerEvent::Leave(HitTarget::Book(i)) => {
                if self.hovered_book == Some(i) {
                    self.hovered_book = None;
                }
                None
            }
            PointerEvent::Click(HitTarget::Book(i)) => {
                if !Self::book_interactive(state) {
                    debug!("click on book {} ignored in gallery", i);
                    return None;
                }
                self.hovered_book = None;
                Some(Action::Select(i))
            }
            PointerEvent::Enter(HitTarget::Image(i)) => {
                if Self::image_hoverable(state, i) {
                    self.hovered_image = Some(i);
                }
                None
            }
            PointerEvent::Leave(HitTarget::Image(i)) => {
                if self.hovered_image == Some(i) {
                    self.hovered_image = None;
                }
                None
            }
            PointerEvent::Click(HitTarget::Image(i)) => {
                // Clicking the current image also unlocks it, so the lock
                // does not gate clicks.
                if state.selected_book().is_none() || i != state.current_image() {
                    debug!("click on non-current image {} ignored", i);
                    return None;
                }
                Some(Action::ToggleInspect)
            }
        }
    }

    /// Pose targets for a shelf book.
    pub fn book_pose(&self, index: usize, rest: Vec3, camera: &Camera, shelf: &ShelfConfig) -> Pose {
        if self.hovered_book == Some(index) {
            Pose {
                position: rest + Vec3::Y * shelf.hover_lift,
                rotation: camera.billboard_rotation(),
                scale: shelf.hover_scale,
            }
        } else {
            Pose {
                position: rest,
                rotation: Vec3::new(shelf.rest_pitch, 0.0, 0.0),
                scale: 1.0,
            }
        }
    }

    /// Opacity of the label above a shelf book.
    pub fn label_opacity(&self, index: usize) -> f32 {
        if self.hovered_book == Some(index) {
            1.0
        } else {
            0.0
        }
    }
}
