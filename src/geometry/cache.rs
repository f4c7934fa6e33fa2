//! Memoized geometry.
//!
//! Every shelf instance using the same box shares one mesh. Specs are keyed by
//! the bit patterns of their parameters, so `0.1` and `0.1000001` are distinct
//! shapes while two specs built from the same literals always hit.

use super::{build_rounded_box, Mesh};
use crate::error::Result;
use crate::types::BoxSpec;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache of built rounded-box meshes.
#[derive(Debug, Default)]
pub struct GeometryCache {
    meshes: HashMap<[u32; 5], Arc<Mesh>>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the mesh for `spec`, building it on first use.
    ///
    /// Invalid specs are not cached; the error is returned on every call.
    pub fn get_or_build(&mut self, spec: &BoxSpec) -> Result<Arc<Mesh>> {
        let key = spec.key();
        if let Some(mesh) = self.meshes.get(&key) {
            return Ok(Arc::clone(mesh));
        }

        let mesh = Arc::new(build_rounded_box(spec)?);
        debug!(
            "built rounded box {}x{}x{} r={} s={} ({} triangles)",
            spec.width,
            spec.height,
            spec.thickness,
            spec.corner_radius,
            spec.smoothness,
            mesh.triangle_count()
        );
        self.meshes.insert(key, Arc::clone(&mesh));
        Ok(mesh)
    }

    /// Number of distinct shapes built so far.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
