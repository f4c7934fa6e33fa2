//! Mesh geometry types and the rounded-box builder.
//!
//! Meshes are non-indexed: every triangle owns its three vertices, so flat
//! normals fall out of the face geometry and material groups are plain
//! vertex ranges a renderer can draw without per-triangle lookups.

pub mod cache;
pub mod rounded_box;

pub use cache::GeometryCache;
pub use rounded_box::build_rounded_box;

use crate::types::BoundingBox;
use glam::Vec3;
use std::mem;

/// Material slot a triangle range is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialSlot {
    /// Cover at `+thickness/2`.
    Front,
    /// Cover at `-thickness/2`.
    Back,
    /// Side surface joining the two covers.
    Rim,
}

impl MaterialSlot {
    /// All slots in emission order.
    pub const ALL: [MaterialSlot; 3] = [MaterialSlot::Front, MaterialSlot::Back, MaterialSlot::Rim];

    /// Material index as used by the renderer's material array.
    pub fn index(self) -> usize {
        match self {
            MaterialSlot::Front => 0,
            MaterialSlot::Back => 1,
            MaterialSlot::Rim => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MaterialSlot::Front => "front",
            MaterialSlot::Back => "back",
            MaterialSlot::Rim => "rim",
        }
    }
}

/// A contiguous triangle range sharing one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialGroup {
    /// Index of the first vertex in the range.
    pub start: usize,
    pub triangle_count: usize,
    pub slot: MaterialSlot,
}

impl MaterialGroup {
    pub fn vertex_count(&self) -> usize {
        self.triangle_count * 3
    }

    /// One past the last vertex of the range.
    pub fn end(&self) -> usize {
        self.start + self.vertex_count()
    }
}

/// A non-indexed triangle mesh with flat attribute arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// xyz triples, three vertices per triangle.
    pub positions: Vec<f32>,
    /// uv pairs, one per vertex.
    pub uvs: Vec<f32>,
    /// xyz triples, filled by [`Mesh::compute_vertex_normals`].
    pub normals: Vec<f32>,
    pub groups: Vec<MaterialGroup>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the attribute arrays for `triangles` triangles.
    pub fn with_triangle_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * 9),
            uvs: Vec::with_capacity(triangles * 6),
            normals: Vec::new(),
            groups: Vec::with_capacity(MaterialSlot::ALL.len()),
        }
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Check if the mesh is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Append one triangle with its texture coordinates.
    pub fn add_triangle(&mut self, positions: [[f32; 3]; 3], uvs: [[f32; 2]; 3]) {
        for p in positions {
            self.positions.extend_from_slice(&p);
        }
        for uv in uvs {
            self.uvs.extend_from_slice(&uv);
        }
    }

    /// Close a material group covering every vertex from `start` to the end.
    pub fn push_group(&mut self, slot: MaterialSlot, start: usize) {
        let triangle_count = (self.vertex_count() - start) / 3;
        self.groups.push(MaterialGroup {
            start,
            triangle_count,
            slot,
        });
    }

    /// The group drawn with `slot`, if any.
    pub fn group(&self, slot: MaterialSlot) -> Option<&MaterialGroup> {
        self.groups.iter().find(|g| g.slot == slot)
    }

    pub fn position(&self, vertex: usize) -> [f32; 3] {
        let i = vertex * 3;
        [self.positions[i], self.positions[i + 1], self.positions[i + 2]]
    }

    pub fn uv(&self, vertex: usize) -> [f32; 2] {
        let i = vertex * 2;
        [self.uvs[i], self.uvs[i + 1]]
    }

    pub fn normal(&self, vertex: usize) -> Option<[f32; 3]> {
        let i = vertex * 3;
        self.normals.get(i..i + 3).map(|n| [n[0], n[1], n[2]])
    }

    /// Derive flat normals from each triangle's winding.
    ///
    /// Degenerate triangles get a zero normal.
    pub fn compute_vertex_normals(&mut self) {
        self.normals.clear();
        self.normals.reserve(self.positions.len());
        for tri in self.positions.chunks_exact(9) {
            let a = Vec3::new(tri[0], tri[1], tri[2]);
            let b = Vec3::new(tri[3], tri[4], tri[5]);
            let c = Vec3::new(tri[6], tri[7], tri[8]);
            let n = (b - a).cross(c - a).normalize_or_zero();
            for _ in 0..3 {
                self.normals.extend_from_slice(&n.to_array());
            }
        }
    }

    /// Axis-aligned bounds of all positions.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]))
    }

    /// Raw bytes of the positions array. Zero-allocation view.
    pub fn positions_bytes(&self) -> &[u8] {
        cast_slice(&self.positions)
    }

    /// Raw bytes of the normals array. Zero-allocation view.
    pub fn normals_bytes(&self) -> &[u8] {
        cast_slice(&self.normals)
    }

    /// Raw bytes of the UVs array. Zero-allocation view.
    pub fn uvs_bytes(&self) -> &[u8] {
        cast_slice(&self.uvs)
    }
}

/// Cast a slice of `T` to a byte slice without allocation.
pub(crate) fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    let ptr = slice.as_ptr() as *const u8;
    let len = slice.len() * mem::size_of::<T>();
    // SAFETY: f32 and u32 are plain data with no padding.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}
