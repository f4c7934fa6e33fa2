//! The viewer: owns selection, hover, geometry and gallery state and turns
//! them into animation targets and per-frame view descriptions.
//!
//! Hosts feed it input events and asset callbacks, let their [`Animator`]
//! run, call [`Viewer::advance`] once per frame and draw [`Viewer::frame`].

use crate::animation::{AnimKey, AnimValue, Animator};
use crate::config::{AssetConfig, GalleryConfig, ViewerConfig};
use crate::content::{AssetResolver, Book, BookContent, ContentCatalog, Language};
use crate::error::{Result, ShelfError};
use crate::geometry::{GeometryCache, Mesh};
use crate::interaction::{
    book_rest_position, control_for_key, controls_opacity, image_pose, Action, Camera, Control,
    HitTarget, InteractionController, PointerEvent,
};
use crate::layout::{compute_positions, LayoutResult};
use crate::selection::{Phase, SelectionMachine, SelectionState};
use crate::types::{Dimensions, GalleryItem};
use glam::Vec3;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolution state of one gallery image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    Ready(Dimensions),
    Unavailable,
}

/// Input the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Control(Control),
}

#[derive(Debug, Clone)]
struct Slot {
    /// Index into the book's content list.
    content_index: usize,
    path: String,
    status: ItemStatus,
}

#[derive(Debug, Clone)]
struct Gallery {
    book: usize,
    slots: Vec<Slot>,
    layout: LayoutResult,
    /// Slot index of each laid-out item.
    items: Vec<usize>,
}

impl Gallery {
    fn from_content(book: usize, content: &[BookContent], assets: &AssetConfig) -> Self {
        let slots = content
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.has_image())
            .map(|(content_index, entry)| Slot {
                content_index,
                path: assets.image_path(&entry.image_path),
                status: ItemStatus::Pending,
            })
            .collect();
        Self {
            book,
            slots,
            layout: LayoutResult::default(),
            items: Vec::new(),
        }
    }

    fn is_loading(&self) -> bool {
        self.slots.iter().any(|s| s.status == ItemStatus::Pending)
    }

    fn pending_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for slot in self.slots.iter().filter(|s| s.status == ItemStatus::Pending) {
            if !paths.contains(&slot.path) {
                paths.push(slot.path.clone());
            }
        }
        paths
    }

    /// Set the status of every pending slot loading `path`.
    fn mark(&mut self, path: &str, status: ItemStatus) -> usize {
        let mut marked = 0;
        for slot in self
            .slots
            .iter_mut()
            .filter(|s| s.path == path && s.status == ItemStatus::Pending)
        {
            slot.status = status;
            marked += 1;
        }
        marked
    }

    /// Reuse statuses already known for the same paths.
    fn carry_statuses(&mut self, previous: &Gallery) {
        let known: HashMap<&str, ItemStatus> = previous
            .slots
            .iter()
            .filter(|s| s.status != ItemStatus::Pending)
            .map(|s| (s.path.as_str(), s.status))
            .collect();
        for slot in &mut self.slots {
            if let Some(status) = known.get(slot.path.as_str()) {
                slot.status = *status;
            }
        }
    }

    /// Lay out every ready item. Does nothing while any item is pending.
    fn relayout(&mut self, config: &GalleryConfig) -> bool {
        if self.is_loading() {
            return false;
        }
        let mut items = Vec::new();
        let mut slot_indices = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let ItemStatus::Ready(dimensions) = slot.status else {
                continue;
            };
            let item = GalleryItem::from_dimensions(slot.path.clone(), dimensions);
            if item.has_valid_size() {
                items.push(item);
                slot_indices.push(index);
            }
        }
        self.layout = compute_positions(&items, config.target_height, config.gap);
        self.items = slot_indices;
        true
    }

    fn slot_for_item(&self, item: usize) -> Option<&Slot> {
        self.items.get(item).and_then(|&i| self.slots.get(i))
    }
}

/// Text shown under the current image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Caption {
    pub title: String,
    pub date: String,
    pub technique: String,
    pub size: String,
}

impl From<&BookContent> for Caption {
    fn from(content: &BookContent) -> Self {
        Self {
            title: content.title.clone(),
            date: content.date.clone(),
            technique: content.technique.clone(),
            size: content.size.clone(),
        }
    }
}

/// A book as it should be drawn this frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookView {
    pub index: usize,
    pub title: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
    pub label_opacity: f32,
    pub hovered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShelfView {
    pub books: Vec<BookView>,
}

/// A gallery image tile as it should be drawn this frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileView {
    pub source_ref: String,
    pub width: f32,
    pub height: f32,
    pub thickness: f32,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
    pub current: bool,
    pub hovered: bool,
}

/// Translucent plane drawn between the shelf and the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Backdrop {
    pub opacity: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryView {
    pub book: usize,
    pub title: String,
    pub tiles: Vec<TileView>,
    pub current: usize,
    pub inspect_locked: bool,
    pub caption: Option<Caption>,
    pub caption_opacity: f32,
    /// Opacity of the prev/next buttons.
    pub controls_opacity: f32,
    pub close_label: String,
    /// Nothing to show: the book has no available images.
    pub placeholder: bool,
    /// Some images are still being resolved.
    pub loading: bool,
    pub backdrop: Backdrop,
    pub opacity: f32,
    pub fade_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum View {
    Shelf(ShelfView),
    Gallery(GalleryView),
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub camera_pitch: f32,
    pub pointer_cursor: bool,
    pub view: View,
    /// A closed gallery still fading out on top of the shelf.
    pub closing: Option<GalleryView>,
}

/// Composition root.
pub struct Viewer<C: ContentCatalog, A: Animator> {
    config: ViewerConfig,
    catalog: C,
    animator: A,
    selection: SelectionMachine,
    interaction: InteractionController,
    geometry: GeometryCache,
    camera: Camera,
    gallery: Option<Gallery>,
    closing_gallery: Option<Gallery>,
    /// Last target sent per key, so unchanged targets are not re-sent.
    targets: HashMap<AnimKey, AnimValue>,
}

impl<C: ContentCatalog, A: Animator> Viewer<C, A> {
    pub fn new(config: ViewerConfig, mut catalog: C, animator: A) -> Result<Self> {
        config.validate()?;
        let language = Language::from_tag(&config.default_language).unwrap_or_else(|| {
            warn!(
                "unsupported language '{}', using '{}'",
                config.default_language,
                Language::FALLBACK
            );
            Language::FALLBACK
        });
        catalog.set_language(language);
        let selection = SelectionMachine::new(catalog.book_count());

        let mut viewer = Self {
            config,
            catalog,
            animator,
            selection,
            interaction: InteractionController::new(),
            geometry: GeometryCache::new(),
            camera: Camera::default(),
            gallery: None,
            closing_gallery: None,
            targets: HashMap::new(),
        };
        viewer.push_targets();
        Ok(viewer)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    /// Mutable access for hosts that step their animator directly.
    pub fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    pub fn state(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn phase(&self) -> Phase {
        self.selection.phase()
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Replace the camera. Billboard targets follow the new pitch.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.push_targets();
    }

    pub fn book_count(&self) -> usize {
        self.selection.book_count()
    }

    pub fn book(&self, index: usize) -> Result<&Book> {
        self.catalog.book(index).ok_or(ShelfError::BookNotFound(index))
    }

    /// Shared mesh for every book on the shelf.
    pub fn book_mesh(&mut self) -> Result<Arc<Mesh>> {
        self.geometry.get_or_build(&self.config.book)
    }

    pub fn is_animating_out(&self) -> bool {
        self.selection.is_animating_out()
    }

    /// Dispatch an input event. Returns whether the selection changed.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Pointer(pointer) => {
                let leaving = matches!(pointer, PointerEvent::Leave(_));
                if !leaving && !self.hit_exists(pointer.target()) {
                    debug!("pointer event for missing {:?}", pointer.target());
                    return false;
                }
                let action = self.interaction.pointer(pointer, self.selection.state());
                let changed = match action {
                    Some(Action::Select(book)) => self.select_book(book),
                    Some(Action::ToggleInspect) => self.toggle_inspect(),
                    None => false,
                };
                if !changed {
                    // Hover-only change.
                    self.push_targets();
                }
                changed
            }
            InputEvent::Control(Control::Previous) => self.previous(),
            InputEvent::Control(Control::Next) => self.next(),
            InputEvent::Control(Control::Escape) => self.close(),
        }
    }

    fn hit_exists(&self, target: HitTarget) -> bool {
        match target {
            HitTarget::Book(index) => index < self.selection.book_count(),
            HitTarget::Image(index) => self
                .gallery
                .as_ref()
                .is_some_and(|g| index < g.layout.len()),
        }
    }

    /// Dispatch a `KeyboardEvent.code`. Unmapped keys are ignored.
    pub fn key(&mut self, code: &str) -> bool {
        match control_for_key(code) {
            Some(control) => self.handle(InputEvent::Control(control)),
            None => false,
        }
    }

    /// Open `book`'s gallery. Its images start out pending; see
    /// [`Viewer::pending_assets`].
    pub fn select_book(&mut self, book: usize) -> bool {
        if !self.selection.select(book) {
            return false;
        }
        self.closing_gallery = None;
        let content = self
            .catalog
            .book(book)
            .map(|b| b.content.as_slice())
            .unwrap_or(&[]);
        let gallery = Gallery::from_content(book, content, &self.config.assets);
        info!("opened book {} with {} images", book, gallery.slots.len());
        self.install_gallery(gallery);
        true
    }

    /// Step to the next image. Refused while the gallery is loading.
    pub fn next(&mut self) -> bool {
        let changed = self.selection.next();
        if changed {
            self.image_changed();
        }
        changed
    }

    pub fn previous(&mut self) -> bool {
        let changed = self.selection.previous();
        if changed {
            self.image_changed();
        }
        changed
    }

    /// The caption fades in again for every new image.
    fn image_changed(&mut self) {
        self.targets.remove(&AnimKey::CaptionOpacity);
        self.animator
            .jump(AnimKey::CaptionOpacity, AnimValue::Scalar(0.0));
        self.after_change();
    }

    pub fn toggle_inspect(&mut self) -> bool {
        let changed = self.selection.toggle_inspect();
        if changed {
            self.after_change();
        }
        changed
    }

    /// Return to the shelf. The gallery keeps being drawn until its fade
    /// completes.
    pub fn close(&mut self) -> bool {
        if !self.selection.close() {
            return false;
        }
        self.closing_gallery = self.gallery.take();
        self.after_change();
        true
    }

    /// Completion callback of the close fade, for hosts that time it
    /// themselves instead of reporting through [`Animator::drain_finished`].
    pub fn close_animation_finished(&mut self) -> bool {
        if !self.selection.finish_close() {
            return false;
        }
        self.closing_gallery = None;
        true
    }

    /// Process finished animations. Call once per frame after the animator
    /// has stepped.
    pub fn advance(&mut self) -> bool {
        let finished = self.animator.drain_finished();
        if finished.contains(&AnimKey::GalleryFade) && self.selection.is_animating_out() {
            return self.close_animation_finished();
        }
        false
    }

    /// Asset paths of the open gallery still waiting for dimensions.
    pub fn pending_assets(&self) -> Vec<String> {
        self.gallery
            .as_ref()
            .map(Gallery::pending_paths)
            .unwrap_or_default()
    }

    /// Whether the open gallery is still waiting on assets.
    pub fn is_loading(&self) -> bool {
        self.gallery.as_ref().is_some_and(Gallery::is_loading)
    }

    /// Report the outcome of resolving `path`. Failed or degenerate images
    /// are left out of the layout. Layout runs once nothing is pending.
    pub fn asset_resolved(&mut self, path: &str, result: Result<Dimensions>) -> bool {
        let Some(gallery) = self.gallery.as_mut() else {
            debug!("asset {} resolved with no gallery open", path);
            return false;
        };
        let status = match result {
            Ok(dimensions) if dimensions.aspect_ratio().is_some() => ItemStatus::Ready(dimensions),
            Ok(dimensions) => {
                warn!(
                    "image {} has degenerate size {}x{}",
                    path, dimensions.width, dimensions.height
                );
                ItemStatus::Unavailable
            }
            Err(e) => {
                warn!("image {} unavailable: {}", path, e);
                ItemStatus::Unavailable
            }
        };
        if gallery.mark(path, status) == 0 {
            debug!("no pending image {}", path);
            return false;
        }
        if !gallery.is_loading() {
            self.refresh_layout();
        }
        true
    }

    /// Resolve every pending asset synchronously.
    pub fn resolve_pending<R: AssetResolver + ?Sized>(&mut self, resolver: &mut R) {
        for path in self.pending_assets() {
            let result = resolver.resolve(&path);
            self.asset_resolved(&path, result);
        }
    }

    /// Switch language. The shelf and any open gallery are rebuilt from the
    /// new content; image sizes already known are kept.
    pub fn set_language(&mut self, language: Language) {
        if self.catalog.language() == language {
            return;
        }
        self.catalog.set_language(language);
        info!("language set to {}", language);
        self.selection.set_book_count(self.catalog.book_count());

        let Some(book) = self.selection.state().selected_book() else {
            self.push_targets();
            return;
        };
        let Some(content) = self.catalog.book(book).map(|b| b.content.as_slice()) else {
            warn!("book {} missing after language change, closing", book);
            self.close();
            return;
        };
        let mut gallery = Gallery::from_content(book, content, &self.config.assets);
        if let Some(previous) = &self.gallery {
            gallery.carry_statuses(previous);
        }
        self.install_gallery(gallery);
    }

    fn install_gallery(&mut self, gallery: Gallery) {
        let loading = gallery.is_loading();
        self.gallery = Some(gallery);
        if loading {
            self.selection.invalidate_item_count();
            self.after_change();
        } else {
            self.refresh_layout();
        }
    }

    fn refresh_layout(&mut self) {
        let Some(gallery) = self.gallery.as_mut() else {
            return;
        };
        if gallery.relayout(&self.config.gallery) {
            debug!(
                "book {} laid out {} of {} images",
                gallery.book,
                gallery.layout.len(),
                gallery.slots.len()
            );
            self.selection.set_item_count(gallery.layout.len());
        }
        self.after_change();
    }

    fn after_change(&mut self) {
        self.interaction.sync(self.selection.state());
        self.push_targets();
    }

    fn animate(&mut self, key: AnimKey, target: AnimValue) {
        if self.targets.get(&key) == Some(&target) {
            return;
        }
        self.targets.insert(key, target);
        let spring = match key {
            AnimKey::CaptionOpacity => self.config.gallery.caption_spring,
            _ => self.config.spring,
        };
        self.animator.animate(key, target, spring);
    }

    fn push_targets(&mut self) {
        let count = self.selection.book_count();
        for index in 0..count {
            let rest = book_rest_position(index, count, &self.config.shelf);
            let pose = self
                .interaction
                .book_pose(index, rest, &self.camera, &self.config.shelf);
            let label = self.interaction.label_opacity(index);
            self.animate(AnimKey::BookPosition(index), AnimValue::Vector(pose.position));
            self.animate(AnimKey::BookRotation(index), AnimValue::Vector(pose.rotation));
            self.animate(AnimKey::BookScale(index), AnimValue::Scalar(pose.scale));
            self.animate(AnimKey::BookLabel(index), AnimValue::Scalar(label));
        }

        let state = *self.selection.state();
        let Some(gallery) = &self.gallery else {
            self.animate(AnimKey::GalleryFade, AnimValue::Scalar(0.0));
            self.animate(AnimKey::CaptionOpacity, AnimValue::Scalar(0.0));
            return;
        };

        let current = state.current_image();
        let locked = state.inspect_locked();
        let poses: Vec<_> = gallery
            .layout
            .recentered(current)
            .into_iter()
            .enumerate()
            .map(|(i, x)| image_pose(x, i == current, locked, &self.camera, &self.config.gallery))
            .collect();
        let has_caption = !poses.is_empty();

        for (i, pose) in poses.into_iter().enumerate() {
            self.animate(AnimKey::TileX(i), AnimValue::Scalar(pose.position.x));
            self.animate(AnimKey::TileDepth(i), AnimValue::Scalar(pose.position.z));
            self.animate(AnimKey::TileScale(i), AnimValue::Scalar(pose.scale));
        }
        self.animate(
            AnimKey::ControlsOpacity,
            AnimValue::Scalar(controls_opacity(locked)),
        );
        self.animate(
            AnimKey::CaptionOpacity,
            AnimValue::Scalar(if has_caption { 1.0 } else { 0.0 }),
        );
        self.animate(AnimKey::GalleryFade, AnimValue::Scalar(1.0));
    }

    /// Current animated scalar, or the last target if the animator has none.
    fn scalar(&self, key: AnimKey, fallback: f32) -> f32 {
        self.animator
            .value(key)
            .or_else(|| self.targets.get(&key).copied())
            .and_then(AnimValue::as_scalar)
            .unwrap_or(fallback)
    }

    fn vector(&self, key: AnimKey, fallback: Vec3) -> Vec3 {
        self.animator
            .value(key)
            .or_else(|| self.targets.get(&key).copied())
            .and_then(AnimValue::as_vector)
            .unwrap_or(fallback)
    }

    fn shelf_view(&self) -> ShelfView {
        let count = self.selection.book_count();
        let books = (0..count)
            .map(|index| {
                let rest = book_rest_position(index, count, &self.config.shelf);
                BookView {
                    index,
                    title: self
                        .catalog
                        .book(index)
                        .map(|b| b.title.clone())
                        .unwrap_or_default(),
                    position: self.vector(AnimKey::BookPosition(index), rest),
                    rotation: self.vector(
                        AnimKey::BookRotation(index),
                        Vec3::new(self.config.shelf.rest_pitch, 0.0, 0.0),
                    ),
                    scale: self.scalar(AnimKey::BookScale(index), 1.0),
                    label_opacity: self.scalar(AnimKey::BookLabel(index), 0.0),
                    hovered: self.interaction.hovered_book() == Some(index),
                }
            })
            .collect();
        ShelfView { books }
    }

    fn gallery_view(&self, gallery: &Gallery, current: usize, locked: bool) -> GalleryView {
        let config = &self.config.gallery;
        let book = self.catalog.book(gallery.book);
        let rotation = self.camera.billboard_rotation();

        let tiles = gallery
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, &slot)| {
                let slot = gallery.slots.get(slot)?;
                let width = gallery.layout.width(i)?;
                Some(TileView {
                    source_ref: slot.path.clone(),
                    width,
                    height: config.target_height,
                    thickness: config.tile_thickness,
                    position: Vec3::new(
                        self.scalar(AnimKey::TileX(i), 0.0),
                        config.row_height,
                        self.scalar(AnimKey::TileDepth(i), 0.0),
                    ),
                    rotation,
                    scale: self.scalar(AnimKey::TileScale(i), 1.0),
                    current: i == current,
                    hovered: self.interaction.hovered_image() == Some(i),
                })
            })
            .collect::<Vec<_>>();

        let caption = gallery
            .slot_for_item(current)
            .and_then(|slot| book?.content.get(slot.content_index))
            .map(Caption::from);
        let loading = gallery.is_loading();

        GalleryView {
            book: gallery.book,
            title: book.map(|b| b.title.clone()).unwrap_or_default(),
            placeholder: !loading && tiles.is_empty(),
            tiles,
            current,
            inspect_locked: locked,
            caption,
            caption_opacity: self.scalar(AnimKey::CaptionOpacity, 0.0),
            controls_opacity: self.scalar(AnimKey::ControlsOpacity, 1.0),
            close_label: self.catalog.text("close").unwrap_or("close").to_uppercase(),
            loading,
            backdrop: Backdrop {
                opacity: config.backdrop_opacity,
                height: config.backdrop_height,
            },
            opacity: self.scalar(AnimKey::GalleryFade, 0.0),
            fade_ms: config.fade_ms,
        }
    }

    /// Describe the scene as it should be drawn now.
    pub fn frame(&self) -> Frame {
        let state = self.selection.state();
        let view = match &self.gallery {
            Some(gallery) => View::Gallery(self.gallery_view(
                gallery,
                state.current_image(),
                state.inspect_locked(),
            )),
            None => View::Shelf(self.shelf_view()),
        };
        let closing = self.selection.closing().and_then(|closing| {
            let gallery = self.closing_gallery.as_ref()?;
            Some(self.gallery_view(gallery, closing.image, closing.inspect_locked))
        });
        Frame {
            camera_pitch: self.camera.pitch(),
            pointer_cursor: self.interaction.wants_pointer_cursor(),
            view,
            closing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{SnapAnimator, SpringConfig};
    use crate::content::tests::sample_catalog;
    use crate::content::{StaticResolver, TranslationCatalog};
    use crate::interaction::HitTarget;

    type TestViewer = Viewer<TranslationCatalog, SnapAnimator>;

    fn viewer() -> TestViewer {
        Viewer::new(ViewerConfig::default(), sample_catalog(), SnapAnimator::new()).unwrap()
    }

    fn resolver() -> StaticResolver {
        StaticResolver::new()
            .with("/images/pintura/0.jpg", 1000, 1000)
            .with("/images/pintura/1.jpg", 1500, 1000)
            .with("/images/pintura/2.jpg", 800, 1000)
    }

    fn gallery(view: &TestViewer) -> GalleryView {
        match view.frame().view {
            View::Gallery(g) => g,
            View::Shelf(_) => panic!("expected gallery view"),
        }
    }

    fn opened() -> TestViewer {
        let mut v = viewer();
        assert!(v.select_book(0));
        v.resolve_pending(&mut resolver());
        v
    }

    fn tile_xs(view: &GalleryView) -> Vec<f32> {
        view.tiles.iter().map(|t| t.position.x).collect()
    }

    #[test]
    fn test_initial_frame_is_shelf() {
        let v = viewer();
        let frame = v.frame();
        let View::Shelf(shelf) = frame.view else {
            panic!("expected shelf");
        };
        assert_eq!(shelf.books.len(), 3);
        assert_eq!(shelf.books[0].title, "Painting");
        assert_eq!(shelf.books[1].position, book_rest_position(1, 3, &v.config().shelf));
        assert_eq!(shelf.books[1].scale, 1.0);
        assert!(frame.closing.is_none());
        assert!(!frame.pointer_cursor);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ViewerConfig::default().with_book(crate::types::BoxSpec::new(1.0, 1.0, 0.1, 0.6, 4));
        assert!(Viewer::new(config, sample_catalog(), SnapAnimator::new()).is_err());
    }

    #[test]
    fn test_book_mesh_shared() {
        let mut v = viewer();
        let a = v.book_mesh().unwrap();
        let b = v.book_mesh().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.triangle_count(), v.config().book.triangle_count());
    }

    #[test]
    fn test_select_reports_pending_assets() {
        let mut v = viewer();
        assert!(v.select_book(0));

        // The entry without an image is skipped.
        assert_eq!(
            v.pending_assets(),
            vec![
                "/images/pintura/0.jpg",
                "/images/pintura/1.jpg",
                "/images/pintura/2.jpg"
            ]
        );
        let view = gallery(&v);
        assert!(view.loading);
        assert!(!view.placeholder);
        assert!(view.tiles.is_empty());
    }

    #[test]
    fn test_layout_waits_for_all_assets() {
        let mut v = viewer();
        v.select_book(0);
        v.asset_resolved("/images/pintura/0.jpg", Ok(Dimensions::new(1000, 1000)));
        assert!(v.is_loading());
        assert!(gallery(&v).tiles.is_empty());

        v.asset_resolved("/images/pintura/1.jpg", Ok(Dimensions::new(1500, 1000)));
        v.asset_resolved("/images/pintura/2.jpg", Ok(Dimensions::new(800, 1000)));
        assert!(!v.is_loading());
        assert_eq!(gallery(&v).tiles.len(), 3);
    }

    #[test]
    fn test_opened_gallery() {
        let v = opened();
        let view = gallery(&v);

        let xs = tile_xs(&view);
        assert_eq!(xs[0], 0.0);
        assert!((xs[1] - 2.85).abs() < 1e-5);
        assert!((xs[2] - 5.52).abs() < 1e-5);
        assert_eq!(view.tiles[0].position.z, -0.2);
        assert_eq!(view.tiles[1].position.z, 0.0);
        assert!((view.tiles[1].width - 2.7).abs() < 1e-5);
        assert_eq!(view.tiles[0].height, 1.8);
        assert_eq!(view.caption.as_ref().unwrap().title, "Dawn");
        assert_eq!(view.controls_opacity, 1.0);
        assert_eq!(view.close_label, "CLOSE");
        assert_eq!(view.backdrop.opacity, 0.6);
        assert_eq!(view.opacity, 1.0);
    }

    #[test]
    fn test_navigation_recenters() {
        let mut v = opened();
        assert!(v.key("ArrowRight"));

        let view = gallery(&v);
        let xs = tile_xs(&view);
        assert_eq!(xs[1], 0.0);
        assert!((xs[0] + 2.85).abs() < 1e-5);
        assert!(view.tiles[1].current);
        assert_eq!(view.tiles[1].position.z, -0.2);
        assert_eq!(view.tiles[0].position.z, 0.0);
        assert_eq!(view.caption.unwrap().title, "Dusk");

        assert!(v.key("KeyD"));
        // The content entry without an image does not shift captions.
        assert_eq!(gallery(&v).caption.unwrap().title, "Noon");
        assert!(!v.key("ArrowRight"));
        assert!(v.key("KeyA"));
        assert_eq!(v.state().current_image(), 1);
    }

    #[test]
    fn test_inspect_lock_via_click() {
        let mut v = opened();
        assert!(v.handle(InputEvent::Pointer(PointerEvent::Click(HitTarget::Image(0)))));
        assert!(v.state().inspect_locked());

        let view = gallery(&v);
        assert_eq!(view.controls_opacity, 0.0);
        assert_eq!(view.tiles[0].scale, 1.5);
        assert_eq!(view.tiles[0].position.z, 0.0);
        assert!(!v.key("ArrowRight"));

        assert!(v.handle(InputEvent::Pointer(PointerEvent::Click(HitTarget::Image(0)))));
        assert!(!v.state().inspect_locked());
        assert!(v.key("ArrowRight"));
    }

    #[test]
    fn test_unavailable_image_excluded() {
        let mut v = viewer();
        v.select_book(0);
        let mut partial = StaticResolver::new()
            .with("/images/pintura/0.jpg", 1000, 1000)
            .with("/images/pintura/2.jpg", 800, 1000);
        v.resolve_pending(&mut partial);

        let view = gallery(&v);
        assert_eq!(view.tiles.len(), 2);
        assert!((view.tiles[1].position.x - (0.9 + 0.6 + 0.72)).abs() < 1e-5);
        v.next();
        assert_eq!(gallery(&v).caption.unwrap().title, "Noon");
    }

    #[test]
    fn test_degenerate_image_excluded() {
        let mut v = viewer();
        v.select_book(2);
        v.asset_resolved("/images/gravat/0.jpg", Ok(Dimensions::new(0, 10)));

        let view = gallery(&v);
        assert!(view.placeholder);
        assert!(view.caption.is_none());
    }

    #[test]
    fn test_all_assets_failing_shows_placeholder() {
        let mut v = viewer();
        v.select_book(0);
        v.resolve_pending(&mut StaticResolver::new());

        let view = gallery(&v);
        assert!(view.placeholder);
        assert!(!view.loading);
        assert!(!v.key("ArrowRight"));
    }

    #[test]
    fn test_empty_book_shows_placeholder() {
        let mut v = viewer();
        assert!(v.select_book(1));
        assert!(v.pending_assets().is_empty());

        let view = gallery(&v);
        assert!(view.placeholder);
        assert_eq!(view.title, "Drawing");
        assert_eq!(view.caption_opacity, 0.0);
    }

    #[test]
    fn test_close_animates_out() {
        let mut v = opened();
        v.next();
        assert!(v.key("Escape"));

        let frame = v.frame();
        assert!(matches!(frame.view, View::Shelf(_)));
        let closing = frame.closing.unwrap();
        assert_eq!(closing.book, 0);
        assert_eq!(closing.current, 1);
        assert_eq!(closing.opacity, 0.0);
        assert_eq!(*v.state(), SelectionState::default());

        assert!(v.advance());
        assert!(v.frame().closing.is_none());
        assert!(!v.is_animating_out());
    }

    #[test]
    fn test_close_while_locked_keeps_inspected_tile() {
        let mut v = opened();
        v.toggle_inspect();
        v.close();

        let closing = v.frame().closing.unwrap();
        assert!(closing.inspect_locked);
        assert_eq!(closing.tiles[0].scale, 1.5);
        assert_eq!(closing.controls_opacity, 0.0);
    }

    /// Records every call on top of a [`SnapAnimator`].
    #[derive(Default)]
    struct RecordingAnimator {
        inner: SnapAnimator,
        calls: Vec<(AnimKey, AnimValue, Option<SpringConfig>)>,
    }

    impl Animator for RecordingAnimator {
        fn animate(&mut self, key: AnimKey, target: AnimValue, spring: SpringConfig) {
            self.calls.push((key, target, Some(spring)));
            self.inner.animate(key, target, spring);
        }

        fn jump(&mut self, key: AnimKey, value: AnimValue) {
            self.calls.push((key, value, None));
            self.inner.jump(key, value);
        }

        fn value(&self, key: AnimKey) -> Option<AnimValue> {
            self.inner.value(key)
        }

        fn drain_finished(&mut self) -> Vec<AnimKey> {
            self.inner.drain_finished()
        }
    }

    #[test]
    fn test_caption_fades_in_on_every_image() {
        let mut v = Viewer::new(
            ViewerConfig::default(),
            sample_catalog(),
            RecordingAnimator::default(),
        )
        .unwrap();
        v.select_book(0);
        v.resolve_pending(&mut resolver());
        v.animator_mut().calls.clear();

        assert!(v.next());
        let caption: Vec<_> = v
            .animator()
            .calls
            .iter()
            .filter(|(key, _, _)| *key == AnimKey::CaptionOpacity)
            .collect();
        let spring = ViewerConfig::default().gallery.caption_spring;
        assert_eq!(
            caption,
            vec![
                &(AnimKey::CaptionOpacity, AnimValue::Scalar(0.0), None),
                &(AnimKey::CaptionOpacity, AnimValue::Scalar(1.0), Some(spring)),
            ]
        );

        // Hover changes do not replay it.
        v.animator_mut().calls.clear();
        v.handle(InputEvent::Pointer(PointerEvent::Enter(HitTarget::Image(1))));
        assert!(v
            .animator()
            .calls
            .iter()
            .all(|(key, _, _)| *key != AnimKey::CaptionOpacity));
    }

    #[test]
    fn test_pointer_on_missing_item_ignored() {
        let mut v = viewer();
        assert!(!v.handle(InputEvent::Pointer(PointerEvent::Enter(HitTarget::Book(99)))));
        assert_eq!(v.interaction().hovered_book(), None);
        assert!(!v.frame().pointer_cursor);
        assert!(!v.handle(InputEvent::Pointer(PointerEvent::Click(HitTarget::Book(3)))));
        assert_eq!(*v.state(), SelectionState::default());

        let mut v = opened();
        assert!(!v.handle(InputEvent::Pointer(PointerEvent::Click(HitTarget::Image(7)))));
        assert!(!v.state().inspect_locked());
    }

    #[test]
    fn test_advance_ignores_fade_in() {
        let mut v = opened();
        assert!(!v.advance());
        assert!(matches!(v.phase(), Phase::Gallery { .. }));
    }

    #[test]
    fn test_select_supersedes_close() {
        let mut v = opened();
        v.close();
        assert!(v.select_book(2));

        assert!(!v.is_animating_out());
        assert!(v.frame().closing.is_none());
        assert_eq!(v.pending_assets(), vec!["/images/gravat/0.jpg"]);
        assert!(!v.close_animation_finished());
    }

    #[test]
    fn test_explicit_close_callback() {
        let mut v = opened();
        v.close();
        assert!(v.close_animation_finished());
        assert!(!v.close_animation_finished());
    }

    #[test]
    fn test_late_asset_ignored() {
        let mut v = viewer();
        v.select_book(0);
        v.close();
        assert!(!v.asset_resolved("/images/pintura/0.jpg", Ok(Dimensions::new(1, 1))));
    }

    #[test]
    fn test_unknown_asset_ignored() {
        let mut v = viewer();
        v.select_book(0);
        assert!(!v.asset_resolved("/images/other.jpg", Ok(Dimensions::new(1, 1))));
        assert!(v.is_loading());
    }

    #[test]
    fn test_book_hover_and_click() {
        let mut v = viewer();
        assert!(!v.handle(InputEvent::Pointer(PointerEvent::Enter(HitTarget::Book(2)))));

        let frame = v.frame();
        assert!(frame.pointer_cursor);
        let View::Shelf(shelf) = frame.view else {
            panic!("expected shelf");
        };
        let rest = book_rest_position(2, 3, &v.config().shelf);
        assert!((shelf.books[2].position.y - (rest.y + 0.2)).abs() < 1e-6);
        assert_eq!(shelf.books[2].scale, 1.05);
        assert_eq!(shelf.books[2].label_opacity, 1.0);
        assert_eq!(shelf.books[2].rotation.x, v.camera().pitch());

        assert!(v.handle(InputEvent::Pointer(PointerEvent::Click(HitTarget::Book(2)))));
        assert_eq!(v.state().selected_book(), Some(2));
        assert_eq!(v.interaction().hovered_book(), None);
    }

    #[test]
    fn test_camera_change_updates_billboards() {
        let mut v = opened();
        let camera = Camera {
            eye: Vec3::new(0.0, 1.0, 5.0),
            target: Vec3::new(0.0, 1.0, 0.0),
            ..Camera::default()
        };
        v.set_camera(camera);
        let view = gallery(&v);
        assert!(view.tiles[0].rotation.x.abs() < 1e-6);
        assert!(v.frame().camera_pitch.abs() < 1e-6);
    }

    #[test]
    fn test_language_change_rebuilds_gallery() {
        let mut v = opened();
        v.next();
        v.next();
        v.set_language(Language::Es);

        // Spanish content lists two images, both already resolved.
        assert!(!v.is_loading());
        let view = gallery(&v);
        assert_eq!(view.tiles.len(), 2);
        assert_eq!(v.state().current_image(), 1);
        assert_eq!(view.caption.unwrap().title, "Ocaso");
        assert_eq!(view.title, "Pintura");
        assert_eq!(view.close_label, "CERRAR");
    }

    #[test]
    fn test_navigation_waits_for_relocalized_gallery() {
        let catalog = crate::load_catalog_from_str(
            r#"{
                "en": { "books": [ { "title": "Prints", "content": [
                    { "title": "A", "imagePath": "a" },
                    { "title": "B", "imagePath": "b" },
                    { "title": "C", "imagePath": "c" }
                ] } ] },
                "es": { "books": [ { "title": "Grabados", "content": [
                    { "title": "A", "imagePath": "a" },
                    { "title": "D", "imagePath": "d" }
                ] } ] }
            }"#,
        )
        .unwrap();
        let mut v = Viewer::new(ViewerConfig::default(), catalog, SnapAnimator::new()).unwrap();
        v.select_book(0);
        v.resolve_pending(
            &mut StaticResolver::new()
                .with("/images/a.jpg", 100, 100)
                .with("/images/b.jpg", 100, 100)
                .with("/images/c.jpg", 100, 100),
        );
        assert!(v.next());
        assert!(v.next());

        v.set_language(Language::Es);
        assert!(v.is_loading());
        assert_eq!(v.pending_assets(), vec!["/images/d.jpg".to_string()]);
        assert!(!v.next());
        assert!(!v.previous());
        assert!(!v.key("ArrowLeft"));

        v.asset_resolved("/images/d.jpg", Ok(Dimensions::new(100, 200)));
        let view = gallery(&v);
        assert_eq!(view.tiles.len(), 2);
        assert_eq!(v.state().current_image(), 1);
        assert!(view.tiles[1].current);
        assert!(v.previous());
    }

    #[test]
    fn test_language_change_on_shelf() {
        let mut v = viewer();
        v.set_language(Language::Es);
        let View::Shelf(shelf) = v.frame().view else {
            panic!("expected shelf");
        };
        assert_eq!(shelf.books[0].title, "Pintura");
        assert_eq!(shelf.books[2].title, "Etching");
    }

    #[test]
    fn test_unknown_default_language_falls_back() {
        let config = ViewerConfig::default().with_language("de");
        let v = Viewer::new(config, sample_catalog(), SnapAnimator::new()).unwrap();
        assert_eq!(v.catalog().language(), Language::En);
    }

    #[test]
    fn test_frame_serializes() {
        let mut v = opened();
        let json = serde_json::to_value(v.frame()).unwrap();
        assert_eq!(json["view"]["kind"], "gallery");
        assert_eq!(json["view"]["tiles"].as_array().unwrap().len(), 3);
        assert_eq!(json["view"]["caption"]["title"], "Dawn");

        v.close();
        let json = serde_json::to_value(v.frame()).unwrap();
        assert_eq!(json["view"]["kind"], "shelf");
        assert_eq!(json["closing"]["book"], 0);
    }

    #[test]
    fn test_book_lookup() {
        let v = viewer();
        assert_eq!(v.book(0).unwrap().title, "Painting");
        assert!(matches!(v.book(7), Err(ShelfError::BookNotFound(7))));
    }
}
