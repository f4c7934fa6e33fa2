//! Wavefront OBJ export.
//!
//! Vertices are written once in global pools; each material group gets a
//! `usemtl` block referencing a material in the companion MTL file.

use super::slot_linear_color;
use crate::error::{Result, ShelfError};
use crate::geometry::{MaterialSlot, Mesh};
use std::fmt::Write;
use std::path::Path;

/// Export a mesh to OBJ format.
/// Returns (obj_content, mtl_content) as strings.
pub fn export_obj(mesh: &Mesh, name: &str) -> Result<(String, String)> {
    if mesh.is_empty() {
        return Err(ShelfError::Export("Cannot export empty mesh".to_string()));
    }

    // ~60 bytes per vertex line (v/vt/vn) and ~40 per face
    let mut obj = String::with_capacity(256 + mesh.vertex_count() * 180 + mesh.triangle_count() * 40);
    let mut mtl = String::with_capacity(512);

    write_obj(&mut obj, mesh, name).map_err(format_error)?;
    write_mtl(&mut mtl, name).map_err(format_error)?;

    Ok((obj, mtl))
}

fn format_error(e: std::fmt::Error) -> ShelfError {
    ShelfError::Export(format!("Failed to format OBJ: {}", e))
}

fn material_name(name: &str, slot: MaterialSlot) -> String {
    format!("{}_{}", name, slot.name())
}

fn write_obj(obj: &mut String, mesh: &Mesh, name: &str) -> std::fmt::Result {
    writeln!(obj, "# Portfolio Shelf OBJ Export")?;
    writeln!(obj, "# Vertices: {}", mesh.vertex_count())?;
    writeln!(obj, "# Triangles: {}", mesh.triangle_count())?;
    writeln!(obj)?;

    writeln!(obj, "mtllib {}.mtl", name)?;
    writeln!(obj)?;
    writeln!(obj, "o {}", name)?;
    writeln!(obj)?;

    for p in mesh.positions.chunks_exact(3) {
        writeln!(obj, "v {} {} {}", p[0], p[1], p[2])?;
    }
    writeln!(obj)?;

    for uv in mesh.uvs.chunks_exact(2) {
        writeln!(obj, "vt {} {}", uv[0], uv[1])?;
    }
    writeln!(obj)?;

    for n in mesh.normals.chunks_exact(3) {
        writeln!(obj, "vn {} {} {}", n[0], n[1], n[2])?;
    }

    // Non-indexed geometry: face k uses vertices 3k, 3k+1, 3k+2 (1-based in OBJ)
    for group in &mesh.groups {
        writeln!(obj)?;
        writeln!(obj, "g {}", group.slot.name())?;
        writeln!(obj, "usemtl {}", material_name(name, group.slot))?;
        for first in (group.start..group.end()).step_by(3) {
            let (i0, i1, i2) = (first + 1, first + 2, first + 3);
            writeln!(
                obj,
                "f {}/{}/{} {}/{}/{} {}/{}/{}",
                i0, i0, i0, i1, i1, i1, i2, i2, i2
            )?;
        }
    }

    Ok(())
}

fn write_mtl(mtl: &mut String, name: &str) -> std::fmt::Result {
    writeln!(mtl, "# Portfolio Shelf Material")?;
    for slot in MaterialSlot::ALL {
        let [r, g, b] = slot_linear_color(slot);
        writeln!(mtl)?;
        writeln!(mtl, "newmtl {}", material_name(name, slot))?;
        writeln!(mtl, "Ka {} {} {}", r, g, b)?;
        writeln!(mtl, "Kd {} {} {}", r, g, b)?;
        writeln!(mtl, "Ks 0.0 0.0 0.0")?;
        writeln!(mtl, "Ns 10.0")?;
        writeln!(mtl, "d 1.0")?;
        writeln!(mtl, "illum 1")?;
    }
    Ok(())
}

/// OBJ and MTL text ready to be written side by side.
pub struct ObjExport {
    pub name: String,
    pub obj: String,
    pub mtl: String,
}

impl ObjExport {
    pub fn from_mesh(mesh: &Mesh, name: &str) -> Result<Self> {
        let (obj, mtl) = export_obj(mesh, name)?;
        Ok(Self {
            name: name.to_string(),
            obj,
            mtl,
        })
    }

    /// Write `{name}.obj` and `{name}.mtl` into `dir`.
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::write(dir.join(format!("{}.obj", self.name)), &self.obj)?;
        std::fs::write(dir.join(format!("{}.mtl", self.name)), &self.mtl)?;
        Ok(())
    }
}
