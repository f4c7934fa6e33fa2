//! glTF/GLB export.

use super::{slot_double_sided, slot_linear_color};
use crate::error::{Result, ShelfError};
use crate::geometry::{cast_slice, MaterialSlot, Mesh};
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;

/// Export a mesh to GLB format (binary glTF).
///
/// Vertex attributes are written once and shared; each material group
/// becomes its own primitive with an index range into them.
pub fn export_glb(mesh: &Mesh) -> Result<Vec<u8>> {
    if mesh.is_empty() {
        return Err(ShelfError::Export("Cannot export empty mesh".to_string()));
    }

    let mut buffer_data: Vec<u8> = Vec::new();

    let pos_offset = buffer_data.len();
    buffer_data.extend_from_slice(mesh.positions_bytes());
    let norm_offset = buffer_data.len();
    buffer_data.extend_from_slice(mesh.normals_bytes());
    let uv_offset = buffer_data.len();
    buffer_data.extend_from_slice(mesh.uvs_bytes());

    // One index range per group, in group order
    let mut index_ranges = Vec::with_capacity(mesh.groups.len());
    for group in &mesh.groups {
        let indices: Vec<u32> = (group.start as u32..group.end() as u32).collect();
        let offset = buffer_data.len();
        buffer_data.extend_from_slice(cast_slice(&indices));
        index_ranges.push((offset, indices.len(), group.slot));
    }

    let total_buffer_size = buffer_data.len();
    let vertex_count = mesh.vertex_count();
    let (min, max) = mesh
        .bounds()
        .map(|b| (b.min, b.max))
        .unwrap_or(([0.0; 3], [0.0; 3]));

    let mut buffer_views = vec![
        create_buffer_view(pos_offset, norm_offset - pos_offset, json::buffer::Target::ArrayBuffer),
        create_buffer_view(norm_offset, uv_offset - norm_offset, json::buffer::Target::ArrayBuffer),
        create_buffer_view(
            uv_offset,
            index_ranges.first().map_or(total_buffer_size, |r| r.0) - uv_offset,
            json::buffer::Target::ArrayBuffer,
        ),
    ];
    let mut accessors = vec![
        create_accessor(0, vertex_count, json::accessor::Type::Vec3, json::accessor::ComponentType::F32, Some(min), Some(max)),
        create_accessor(1, vertex_count, json::accessor::Type::Vec3, json::accessor::ComponentType::F32, None, None),
        create_accessor(2, vertex_count, json::accessor::Type::Vec2, json::accessor::ComponentType::F32, None, None),
    ];

    let materials: Vec<json::Material> = MaterialSlot::ALL.iter().map(|&slot| create_material(slot)).collect();

    let mut primitives = Vec::with_capacity(index_ranges.len());
    for (offset, count, slot) in index_ranges {
        let view = buffer_views.len() as u32;
        buffer_views.push(create_buffer_view(offset, count * 4, json::buffer::Target::ElementArrayBuffer));
        let accessor = accessors.len() as u32;
        accessors.push(create_accessor(view, count, json::accessor::Type::Scalar, json::accessor::ComponentType::U32, None, None));
        primitives.push(create_primitive(accessor, slot.index() as u32));
    }

    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(total_buffer_size as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        materials,
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives,
            weights: None,
        }],
        nodes: vec![json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(0)),
            rotation: None,
            scale: None,
            translation: None,
            skin: None,
            weights: None,
        }],
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| ShelfError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;

    Ok(write_glb(json_string.as_bytes(), &buffer_data))
}

/// Assemble the GLB container: header, JSON chunk, BIN chunk.
fn write_glb(json_bytes: &[u8], buffer_data: &[u8]) -> Vec<u8> {
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;

    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + // GLB header
        8 + padded_json_len + // JSON chunk
        8 + padded_buffer_len; // BIN chunk

    let mut glb = Vec::with_capacity(total_size);

    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // JSON
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat(0x20u8).take(json_padding));

    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes()); // BIN
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat(0u8).take(buffer_padding));

    glb
}

fn create_buffer_view(offset: usize, size: usize, target: json::buffer::Target) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: Some(Valid(target)),
    }
}

fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min: Option<[f32; 3]>,
    max: Option<[f32; 3]>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(|m| json::Value::from(m.to_vec())),
        max: max.map(|m| json::Value::from(m.to_vec())),
        normalized: false,
        sparse: None,
    }
}

/// Primitive over the shared attributes (accessors 0..3) with its own indices.
fn create_primitive(indices_accessor: u32, material: u32) -> json::mesh::Primitive {
    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(Valid(json::mesh::Semantic::Positions), json::Index::new(0));
    attributes.insert(Valid(json::mesh::Semantic::Normals), json::Index::new(1));
    attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), json::Index::new(2));

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(indices_accessor)),
        material: Some(json::Index::new(material)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

fn create_material(slot: MaterialSlot) -> json::Material {
    let [r, g, b] = slot_linear_color(slot);
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: None,
            base_color_factor: json::material::PbrBaseColorFactor([r, g, b, 1.0]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(json::material::AlphaMode::Opaque),
        alpha_cutoff: None,
        double_sided: slot_double_sided(slot),
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::build_rounded_box;
    use crate::types::BoxSpec;

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn json_chunk(glb: &[u8]) -> serde_json::Value {
        let len = read_u32(glb, 12) as usize;
        serde_json::from_slice(&glb[20..20 + len]).unwrap()
    }

    #[test]
    fn test_export_rounded_box() {
        let mesh = build_rounded_box(&BoxSpec::new(1.28, 1.71, 0.1, 0.3, 4)).unwrap();
        let glb = export_glb(&mesh).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(read_u32(&glb, 4), 2);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());
        assert_eq!(glb.len() % 4, 0);
    }

    #[test]
    fn test_one_primitive_per_group() {
        let mesh = build_rounded_box(&BoxSpec::new(1.0, 1.0, 0.1, 0.2, 3)).unwrap();
        let root = json_chunk(&export_glb(&mesh).unwrap());

        let primitives = root["meshes"][0]["primitives"].as_array().unwrap();
        assert_eq!(primitives.len(), 3);
        for (primitive, group) in primitives.iter().zip(&mesh.groups) {
            assert_eq!(primitive["material"], group.slot.index());
            let accessor = &root["accessors"][primitive["indices"].as_u64().unwrap() as usize];
            assert_eq!(accessor["count"], group.vertex_count());
        }

        let materials = root["materials"].as_array().unwrap();
        assert_eq!(materials.len(), 3);
        let back = materials[1]["pbrMetallicRoughness"]["baseColorFactor"][0].as_f64().unwrap();
        assert!(back < 0.01);
        assert_ne!(materials[2]["doubleSided"], true);
        assert_eq!(materials[0]["doubleSided"], true);
        assert_eq!(root["accessors"][0]["count"], mesh.vertex_count());
    }

    #[test]
    fn test_export_empty_mesh_fails() {
        assert!(matches!(export_glb(&Mesh::new()), Err(ShelfError::Export(_))));
    }
}
