//! WASM bindings for portfolio-shelf.
//!
//! This module provides JavaScript-friendly APIs for use in the browser. The
//! page keeps its own springs: it pulls animation targets from the viewer,
//! interpolates them, and reports back when a property comes to rest.

use crate::animation::{AnimKey, AnimValue, Animator, SpringConfig};
use crate::content::TranslationCatalog;
use crate::interaction::{HitTarget, PointerEvent};
use crate::types::Dimensions;
use crate::viewer::{InputEvent, Viewer};
use crate::{BoxSpec, ShelfError, ViewerConfig};
use js_sys::{Float32Array, Uint32Array};
use serde::Serialize;
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

fn js_error(e: ShelfError) -> JsError {
    JsError::new(&e.to_string())
}

/// Flat attribute arrays of a rounded box, ready for a BufferGeometry.
#[wasm_bindgen]
pub struct BookGeometry {
    mesh: std::sync::Arc<crate::Mesh>,
}

#[wasm_bindgen]
impl BookGeometry {
    /// Build a rounded box.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: f32,
        height: f32,
        thickness: f32,
        corner_radius: f32,
        smoothness: u32,
    ) -> Result<BookGeometry, JsError> {
        let spec = BoxSpec::new(width, height, thickness, corner_radius, smoothness);
        let mesh = crate::build_rounded_box(&spec).map_err(js_error)?;
        Ok(BookGeometry {
            mesh: std::sync::Arc::new(mesh),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> Float32Array {
        Float32Array::from(self.mesh.positions.as_slice())
    }

    #[wasm_bindgen(getter)]
    pub fn uvs(&self) -> Float32Array {
        Float32Array::from(self.mesh.uvs.as_slice())
    }

    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> Float32Array {
        Float32Array::from(self.mesh.normals.as_slice())
    }

    /// `[start, count, materialIndex]` per group, with start and count in
    /// vertices as `BufferGeometry.addGroup` expects.
    #[wasm_bindgen(getter)]
    pub fn groups(&self) -> Uint32Array {
        let flat: Vec<u32> = self
            .mesh
            .groups
            .iter()
            .flat_map(|g| [g.start as u32, g.vertex_count() as u32, g.slot.index() as u32])
            .collect();
        Uint32Array::from(flat.as_slice())
    }

    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    /// Get the GLB binary data.
    pub fn to_glb(&self) -> Result<Vec<u8>, JsError> {
        crate::export_glb(&self.mesh).map_err(js_error)
    }
}

#[derive(Serialize)]
struct TargetUpdate {
    key: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    value: Vec<f32>,
    tension: f32,
    friction: f32,
    mass: f32,
    /// Set the value without animating.
    immediate: bool,
}

fn flatten(value: AnimValue) -> Vec<f32> {
    match value {
        AnimValue::Scalar(v) => vec![v],
        AnimValue::Vector(v) => v.to_array().to_vec(),
    }
}

/// Animator whose interpolation happens in JavaScript.
///
/// Reported values are the latest targets; the page reads the in-flight
/// values from its own springs.
#[derive(Default)]
struct PageAnimator {
    values: HashMap<AnimKey, AnimValue>,
    queued: Vec<TargetUpdate>,
    finished: Vec<AnimKey>,
}

impl Animator for PageAnimator {
    fn animate(&mut self, key: AnimKey, target: AnimValue, spring: SpringConfig) {
        self.values.insert(key, target);
        self.queued.push(TargetUpdate {
            key: key.name(),
            index: key.index(),
            value: flatten(target),
            tension: spring.tension,
            friction: spring.friction,
            mass: spring.mass,
            immediate: false,
        });
    }

    fn jump(&mut self, key: AnimKey, value: AnimValue) {
        let spring = SpringConfig::default();
        self.values.insert(key, value);
        self.queued.push(TargetUpdate {
            key: key.name(),
            index: key.index(),
            value: flatten(value),
            tension: spring.tension,
            friction: spring.friction,
            mass: spring.mass,
            immediate: true,
        });
    }

    fn value(&self, key: AnimKey) -> Option<AnimValue> {
        self.values.get(&key).copied()
    }

    fn drain_finished(&mut self) -> Vec<AnimKey> {
        std::mem::take(&mut self.finished)
    }
}

fn hit_target(kind: &str, index: usize) -> Result<HitTarget, JsError> {
    match kind {
        "book" => Ok(HitTarget::Book(index)),
        "image" => Ok(HitTarget::Image(index)),
        other => Err(JsError::new(&format!("Unknown target kind: {}", other))),
    }
}

/// Shelf and gallery state for one page.
#[wasm_bindgen]
pub struct ViewerHandle {
    inner: Viewer<TranslationCatalog, PageAnimator>,
}

#[wasm_bindgen]
impl ViewerHandle {
    /// Create a viewer from translation bundles (one JSON object keyed by
    /// language code) and an optional config JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(content_json: &str, config_json: Option<String>) -> Result<ViewerHandle, JsError> {
        let config = match config_json {
            Some(json) => ViewerConfig::from_json_str(&json).map_err(js_error)?,
            None => ViewerConfig::default(),
        };
        let catalog = crate::load_catalog_from_str(content_json).map_err(js_error)?;
        let inner = Viewer::new(config, catalog, PageAnimator::default()).map_err(js_error)?;
        Ok(ViewerHandle { inner })
    }

    /// Geometry shared by every book.
    pub fn book_geometry(&mut self) -> Result<BookGeometry, JsError> {
        let mesh = self.inner.book_mesh().map_err(js_error)?;
        Ok(BookGeometry { mesh })
    }

    #[wasm_bindgen(getter)]
    pub fn book_count(&self) -> usize {
        self.inner.book_count()
    }

    pub fn set_language(&mut self, tag: &str) {
        self.inner
            .set_language(crate::Language::from_tag_or_fallback(tag));
    }

    pub fn pointer_enter(&mut self, kind: &str, index: usize) -> Result<bool, JsError> {
        let target = hit_target(kind, index)?;
        Ok(self.inner.handle(InputEvent::Pointer(PointerEvent::Enter(target))))
    }

    pub fn pointer_leave(&mut self, kind: &str, index: usize) -> Result<bool, JsError> {
        let target = hit_target(kind, index)?;
        Ok(self.inner.handle(InputEvent::Pointer(PointerEvent::Leave(target))))
    }

    pub fn click(&mut self, kind: &str, index: usize) -> Result<bool, JsError> {
        let target = hit_target(kind, index)?;
        Ok(self.inner.handle(InputEvent::Pointer(PointerEvent::Click(target))))
    }

    /// Handle a `KeyboardEvent.code`.
    pub fn key(&mut self, code: &str) -> bool {
        self.inner.key(code)
    }

    pub fn next(&mut self) -> bool {
        self.inner.next()
    }

    pub fn previous(&mut self) -> bool {
        self.inner.previous()
    }

    pub fn close(&mut self) -> bool {
        self.inner.close()
    }

    /// Image URLs the page should load before the gallery can be laid out.
    pub fn pending_assets(&self) -> Vec<String> {
        self.inner.pending_assets()
    }

    pub fn image_loaded(&mut self, path: &str, width: u32, height: u32) -> bool {
        self.inner
            .asset_resolved(path, Ok(Dimensions::new(width, height)))
    }

    pub fn image_failed(&mut self, path: &str) -> bool {
        self.inner
            .asset_resolved(path, Err(ShelfError::AssetUnavailable(path.to_string())))
    }

    /// Report that a spring came to rest.
    pub fn animation_finished(&mut self, key: &str, index: Option<usize>) -> Result<(), JsError> {
        let key = AnimKey::from_parts(key, index)
            .ok_or_else(|| JsError::new(&format!("Unknown animation key: {}", key)))?;
        self.inner.animator_mut().finished.push(key);
        self.inner.advance();
        Ok(())
    }

    /// Animation targets queued since the last call, as JSON.
    pub fn take_targets(&mut self) -> Result<String, JsError> {
        let queued = std::mem::take(&mut self.inner.animator_mut().queued);
        serde_json::to_string(&queued).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Current frame description, as JSON.
    pub fn frame(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.inner.frame()).map_err(|e| JsError::new(&e.to_string()))
    }
}
