//! Mesh export formats.
//!
//! Exporters write one material per [`MaterialSlot`] using the shelf's
//! palette: white covers and rim, with a near-black back cover.

pub mod gltf;
pub mod obj;

pub use gltf::export_glb;
pub use obj::{export_obj, ObjExport};

use crate::geometry::MaterialSlot;

/// sRGB color of each material slot.
pub fn slot_color(slot: MaterialSlot) -> [u8; 3] {
    match slot {
        MaterialSlot::Front | MaterialSlot::Rim => [0xff, 0xff, 0xff],
        MaterialSlot::Back => [0x11, 0x11, 0x11],
    }
}

/// Whether the slot should render both faces.
pub fn slot_double_sided(slot: MaterialSlot) -> bool {
    !matches!(slot, MaterialSlot::Rim)
}

/// Linear-space RGB of a slot, as glTF and MTL expect.
pub fn slot_linear_color(slot: MaterialSlot) -> [f32; 3] {
    slot_color(slot).map(|c| srgb_to_linear(c as f32 / 255.0))
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
