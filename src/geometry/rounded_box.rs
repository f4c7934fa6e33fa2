//! Procedural rounded-edge box.
//!
//! The box is built in three contiguous bands: the front cover at
//! `z = +thickness/2`, the back cover at `z = -thickness/2` and the rim that
//! joins them. Each cover is a cross of three rectangles plus four fans of
//! `smoothness` wedges; the rim is four straight quads plus `smoothness`
//! quads per corner sharing the covers' arc points exactly.

use super::{MaterialSlot, Mesh};
use crate::error::Result;
use crate::types::BoxSpec;
use log::warn;
use std::f32::consts::{PI, TAU};

/// Build the mesh for a rounded-edge box.
///
/// Triangles are emitted front cover first, back cover second and rim last,
/// each recorded as a [`MaterialGroup`](super::MaterialGroup). A zero corner
/// radius is replaced by [`MIN_CORNER_RADIUS`](crate::types::MIN_CORNER_RADIUS);
/// any other spec that fails [`BoxSpec::validate`] is rejected.
pub fn build_rounded_box(spec: &BoxSpec) -> Result<Mesh> {
    spec.validate()?;
    if spec.corner_radius == 0.0 {
        warn!(
            "zero corner radius on {}x{} box, using {}",
            spec.width,
            spec.height,
            spec.effective_radius()
        );
    }

    let extents = Extents::new(spec);
    let smoothness = spec.smoothness as usize;
    let mut mesh = Mesh::with_triangle_capacity(spec.triangle_count());

    emit_cover(&mut mesh, &extents, smoothness, &Cover::front(&extents));
    mesh.push_group(MaterialSlot::Front, 0);

    let start = mesh.vertex_count();
    emit_cover(&mut mesh, &extents, smoothness, &Cover::back(&extents));
    mesh.push_group(MaterialSlot::Back, start);

    let start = mesh.vertex_count();
    emit_rim(&mut mesh, &extents, smoothness);
    mesh.push_group(MaterialSlot::Rim, start);

    mesh.compute_vertex_normals();
    Ok(mesh)
}

/// Derived half-extents and UV insets shared by every pass.
struct Extents {
    radius: f32,
    /// Half width of the flat span between corner centers.
    wi: f32,
    /// Half height of the flat span between corner centers.
    hi: f32,
    w2: f32,
    h2: f32,
    t2: f32,
    /// Radius as a fraction of width.
    ul: f32,
    ur: f32,
    /// Radius as a fraction of height.
    vl: f32,
    vh: f32,
}

impl Extents {
    fn new(spec: &BoxSpec) -> Self {
        let radius = spec.effective_radius();
        Self {
            radius,
            wi: spec.width / 2.0 - radius,
            hi: spec.height / 2.0 - radius,
            w2: spec.width / 2.0,
            h2: spec.height / 2.0,
            t2: spec.thickness / 2.0,
            ul: radius / spec.width,
            ur: (spec.width - radius) / spec.width,
            vl: radius / spec.height,
            vh: (spec.height - radius) / spec.height,
        }
    }

    /// Arc center of the corner a wedge belongs to.
    ///
    /// Wedges sweep counter-clockwise from +x: quadrant 0 is top-right,
    /// 1 top-left, 2 bottom-left, 3 bottom-right.
    fn corner_center(&self, quadrant: usize) -> [f32; 2] {
        let x = if quadrant == 0 || quadrant == 3 { self.wi } else { -self.wi };
        let y = if quadrant < 2 { self.hi } else { -self.hi };
        [x, y]
    }

    /// Point on a corner arc. Both covers and the rim go through here so
    /// seams line up bit for bit.
    fn arc_point(&self, center: [f32; 2], angle: f32) -> [f32; 2] {
        [
            center[0] + self.radius * angle.cos(),
            center[1] + self.radius * angle.sin(),
        ]
    }
}

/// Angle of the `step`th arc point around the whole perimeter.
fn arc_angle(step: usize, smoothness: usize) -> f32 {
    TAU * step as f32 / (4 * smoothness) as f32
}

/// Per-cover parameters. The back cover swaps the u bounds and flips the
/// arc u direction so its texture reads the right way round from behind,
/// and reverses winding so its normals face -z.
struct Cover {
    z: f32,
    /// u at the left and right edges of the central band.
    u_inner: [f32; 2],
    /// u at the left and right outer edges.
    u_outer: [f32; 2],
    sign: f32,
    flip: bool,
}

impl Cover {
    fn front(e: &Extents) -> Self {
        Self {
            z: e.t2,
            u_inner: [e.ul, e.ur],
            u_outer: [0.0, 1.0],
            sign: 1.0,
            flip: false,
        }
    }

    fn back(e: &Extents) -> Self {
        Self {
            z: -e.t2,
            u_inner: [e.ur, e.ul],
            u_outer: [1.0, 0.0],
            sign: -1.0,
            flip: true,
        }
    }
}

fn emit_triangle(mesh: &mut Mesh, flip: bool, p: [[f32; 3]; 3], uv: [[f32; 2]; 3]) {
    if flip {
        mesh.add_triangle([p[0], p[2], p[1]], [uv[0], uv[2], uv[1]]);
    } else {
        mesh.add_triangle(p, uv);
    }
}

/// Two triangles `(0, 1, 2)` and `(0, 2, 3)`.
fn emit_quad(mesh: &mut Mesh, flip: bool, p: [[f32; 3]; 4], uv: [[f32; 2]; 4]) {
    emit_triangle(mesh, flip, [p[0], p[1], p[2]], [uv[0], uv[1], uv[2]]);
    emit_triangle(mesh, flip, [p[0], p[2], p[3]], [uv[0], uv[2], uv[3]]);
}

fn emit_cover(mesh: &mut Mesh, e: &Extents, smoothness: usize, cover: &Cover) {
    let z = cover.z;
    let [u0, u1] = cover.u_inner;
    let [u2, u3] = cover.u_outer;
    let (wi, hi, w2, h2) = (e.wi, e.hi, e.w2, e.h2);

    // Central band, full height.
    emit_quad(
        mesh,
        cover.flip,
        [[-wi, -h2, z], [wi, -h2, z], [wi, h2, z], [-wi, h2, z]],
        [[u0, 0.0], [u1, 0.0], [u1, 1.0], [u0, 1.0]],
    );
    // Left strip between the corners.
    emit_quad(
        mesh,
        cover.flip,
        [[-w2, -hi, z], [-wi, -hi, z], [-wi, hi, z], [-w2, hi, z]],
        [[u2, e.vl], [u0, e.vl], [u0, e.vh], [u2, e.vh]],
    );
    // Right strip.
    emit_quad(
        mesh,
        cover.flip,
        [[wi, -hi, z], [w2, -hi, z], [w2, hi, z], [wi, hi, z]],
        [[u1, e.vl], [u3, e.vl], [u3, e.vh], [u1, e.vh]],
    );

    for i in 0..smoothness * 4 {
        let quadrant = i / smoothness;
        let center = e.corner_center(quadrant);
        let (phi_a, phi_b) = (arc_angle(i, smoothness), arc_angle(i + 1, smoothness));
        let a = e.arc_point(center, phi_a);
        let b = e.arc_point(center, phi_b);

        let uc = if quadrant == 0 || quadrant == 3 { u1 } else { u0 };
        let vc = if quadrant < 2 { e.vh } else { e.vl };
        let arc_uv = |phi: f32| [uc + cover.sign * e.ul * phi.cos(), vc + e.vl * phi.sin()];

        emit_triangle(
            mesh,
            cover.flip,
            [[center[0], center[1], z], [a[0], a[1], z], [b[0], b[1], z]],
            [[uc, vc], arc_uv(phi_a), arc_uv(phi_b)],
        );
    }
}

/// Rim quad from boundary point `a` to `b`, front edge at v = 1.
fn emit_rim_quad(mesh: &mut Mesh, t2: f32, a: [f32; 2], b: [f32; 2], ua: f32, ub: f32) {
    emit_quad(
        mesh,
        false,
        [[a[0], a[1], t2], [a[0], a[1], -t2], [b[0], b[1], -t2], [b[0], b[1], t2]],
        [[ua, 1.0], [ua, 0.0], [ub, 0.0], [ub, 1.0]],
    );
}

fn emit_rim(mesh: &mut Mesh, e: &Extents, smoothness: usize) {
    let (wi, hi, w2, h2, t2) = (e.wi, e.hi, e.w2, e.h2, e.t2);

    // The strip is unwrapped counter-clockwise starting at the bottom edge;
    // every corner takes a quarter circumference.
    let perimeter = 2.0 * (2.0 * w2 + 2.0 * h2 - 4.0 * e.radius + PI * e.radius);
    let corner = (PI * e.radius) / 2.0 / perimeter;
    let u0 = 0.0;
    let u1 = (2.0 * wi) / perimeter;
    let u2 = u1 + corner;
    let u3 = u2 + (2.0 * hi) / perimeter;
    let u4 = u3 + corner;
    let u5 = u4 + (2.0 * wi) / perimeter;
    let u6 = u5 + corner;
    let u7 = u6 + (2.0 * hi) / perimeter;

    emit_rim_quad(mesh, t2, [-wi, -h2], [wi, -h2], u0, u1);
    emit_rim_quad(mesh, t2, [w2, -hi], [w2, hi], u2, u3);
    emit_rim_quad(mesh, t2, [wi, h2], [-wi, h2], u4, u5);
    emit_rim_quad(mesh, t2, [-w2, hi], [-w2, -hi], u6, u7);

    let wedge = corner / smoothness as f32;
    for i in 0..smoothness * 4 {
        let quadrant = i / smoothness;
        let center = e.corner_center(quadrant);
        let a = e.arc_point(center, arc_angle(i, smoothness));
        let b = e.arc_point(center, arc_angle(i + 1, smoothness));

        let base = match quadrant {
            0 => u3,
            1 => u5,
            2 => u7,
            _ => u1,
        };
        let j = i % smoothness;
        emit_rim_quad(
            mesh,
            t2,
            a,
            b,
            base + j as f32 * wedge,
            base + (j + 1) as f32 * wedge,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShelfError;
    use crate::geometry::MaterialGroup;
    use crate::types::MIN_CORNER_RADIUS;
    use std::collections::HashSet;

    fn book() -> BoxSpec {
        BoxSpec::new(1.28, 1.71, 0.1, 0.1, 10)
    }

    fn group_vertices(group: &MaterialGroup) -> std::ops::Range<usize> {
        group.start..group.end()
    }

    fn assert_normal(actual: Option<[f32; 3]>, expected: [f32; 3]) {
        let n = actual.expect("normals computed");
        for i in 0..3 {
            assert!((n[i] - expected[i]).abs() < 1e-6, "{:?} vs {:?}", n, expected);
        }
    }

    fn triangle_area(mesh: &Mesh, first_vertex: usize) -> f32 {
        let a = glam::Vec3::from(mesh.position(first_vertex));
        let b = glam::Vec3::from(mesh.position(first_vertex + 1));
        let c = glam::Vec3::from(mesh.position(first_vertex + 2));
        (b - a).cross(c - a).length() / 2.0
    }

    #[test]
    fn test_book_scenario_groups() {
        let mesh = build_rounded_box(&book()).unwrap();

        assert_eq!(mesh.groups.len(), 3);
        let slots: Vec<_> = mesh.groups.iter().map(|g| g.slot).collect();
        assert_eq!(slots, MaterialSlot::ALL.to_vec());

        let front = mesh.group(MaterialSlot::Front).unwrap();
        let back = mesh.group(MaterialSlot::Back).unwrap();
        let rim = mesh.group(MaterialSlot::Rim).unwrap();
        assert_eq!(front.triangle_count, back.triangle_count);
        assert_eq!(
            rim.triangle_count,
            mesh.triangle_count() - front.triangle_count - back.triangle_count
        );
    }

    #[test]
    fn test_triangle_count_per_smoothness() {
        for s in 1..=16u32 {
            let spec = BoxSpec::new(2.0, 3.0, 0.2, 0.4, s);
            let mesh = build_rounded_box(&spec).unwrap();
            let s = s as usize;

            assert_eq!(mesh.triangle_count(), 20 + 16 * s);
            assert_eq!(mesh.triangle_count(), spec.triangle_count());
            assert_eq!(mesh.groups[0].triangle_count, 6 + 4 * s);
            assert_eq!(mesh.groups[1].triangle_count, 6 + 4 * s);
            assert_eq!(mesh.groups[2].triangle_count, 8 + 8 * s);
        }
    }

    #[test]
    fn test_groups_partition_all_triangles() {
        for s in [1, 2, 5, 10] {
            let mesh = build_rounded_box(&BoxSpec::new(1.0, 0.7, 0.05, 0.2, s)).unwrap();

            assert_eq!(mesh.groups[0].start, 0);
            for pair in mesh.groups.windows(2) {
                assert_eq!(pair[0].end(), pair[1].start);
            }
            assert_eq!(mesh.groups.last().unwrap().end(), mesh.vertex_count());
            let total: usize = mesh.groups.iter().map(|g| g.triangle_count).sum();
            assert_eq!(total, mesh.triangle_count());
        }
    }

    #[test]
    fn test_attribute_lengths_align() {
        let mesh = build_rounded_box(&book()).unwrap();
        assert_eq!(mesh.positions.len() / 3, mesh.uvs.len() / 2);
        assert_eq!(mesh.positions.len(), mesh.uvs.len() * 3 / 2);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn test_bounds_match_spec() {
        let spec = book();
        let bounds = build_rounded_box(&spec).unwrap().bounds().unwrap();
        let [w, h, t] = bounds.dimensions();

        assert!((w - spec.width).abs() < 1e-5);
        assert!((h - spec.height).abs() < 1e-5);
        assert!((t - spec.thickness).abs() < 1e-6);
        assert!((bounds.min[2] + 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_cover_planes_and_normals() {
        let spec = book();
        let mesh = build_rounded_box(&spec).unwrap();

        let front = *mesh.group(MaterialSlot::Front).unwrap();
        for v in group_vertices(&front) {
            assert_eq!(mesh.position(v)[2], 0.05);
            assert_normal(mesh.normal(v), [0.0, 0.0, 1.0]);
        }

        let back = *mesh.group(MaterialSlot::Back).unwrap();
        for v in group_vertices(&back) {
            assert_eq!(mesh.position(v)[2], -0.05);
            assert_normal(mesh.normal(v), [0.0, 0.0, -1.0]);
        }
    }

    #[test]
    fn test_rim_normals_point_outward() {
        let mesh = build_rounded_box(&book()).unwrap();
        let rim = *mesh.group(MaterialSlot::Rim).unwrap();

        for v in group_vertices(&rim) {
            let n = mesh.normal(v).unwrap();
            let p = mesh.position(v);
            assert!(n[2].abs() < 1e-6);
            assert!(((n[0] * n[0] + n[1] * n[1]).sqrt() - 1.0).abs() < 1e-4);
            // Outward: same half-plane as the vertex itself.
            assert!(n[0] * p[0] + n[1] * p[1] > 0.0);
        }
    }

    #[test]
    fn test_rim_seams_meet_cover_boundary() {
        let mesh = build_rounded_box(&book()).unwrap();
        let front = *mesh.group(MaterialSlot::Front).unwrap();
        let rim = *mesh.group(MaterialSlot::Rim).unwrap();

        let cover_points: HashSet<(u32, u32)> = group_vertices(&front)
            .map(|v| {
                let p = mesh.position(v);
                (p[0].to_bits(), p[1].to_bits())
            })
            .collect();

        for v in group_vertices(&rim) {
            let p = mesh.position(v);
            assert!(
                cover_points.contains(&(p[0].to_bits(), p[1].to_bits())),
                "rim vertex {:?} is off the cover outline",
                p
            );
        }
    }

    #[test]
    fn test_cover_area_matches_fan_geometry() {
        let spec = BoxSpec::new(2.0, 3.0, 0.2, 0.4, 6);
        let mesh = build_rounded_box(&spec).unwrap();
        let front = *mesh.group(MaterialSlot::Front).unwrap();

        let area: f32 = (0..front.triangle_count)
            .map(|t| triangle_area(&mesh, front.start + t * 3))
            .sum();

        let r = spec.corner_radius;
        let (wi, hi) = (spec.width / 2.0 - r, spec.height / 2.0 - r);
        let step = (PI / 2.0) / 6.0;
        let expected = 2.0 * wi * spec.height + 2.0 * r * 2.0 * hi + 4.0 * 6.0 * 0.5 * r * r * step.sin();
        assert!((area - expected).abs() < 1e-3, "area {} vs {}", area, expected);
    }

    #[test]
    fn test_rim_uv_strip_spans_unit_range() {
        let mesh = build_rounded_box(&book()).unwrap();
        let rim = *mesh.group(MaterialSlot::Rim).unwrap();

        let (mut min_u, mut max_u) = (f32::MAX, f32::MIN);
        for v in group_vertices(&rim) {
            let [u, v_coord] = mesh.uv(v);
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            assert!(v_coord == 0.0 || v_coord == 1.0);
            let z = mesh.position(v)[2];
            assert_eq!(v_coord == 1.0, z > 0.0);
        }
        assert_eq!(min_u, 0.0);
        assert!((max_u - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_cover_uvs_stay_in_unit_square() {
        let mesh = build_rounded_box(&BoxSpec::new(1.0, 1.5, 0.1, 0.3, 8)).unwrap();
        let back_end = mesh.group(MaterialSlot::Back).unwrap().end();

        for v in 0..back_end {
            let [u, v_coord] = mesh.uv(v);
            assert!((-1e-5..=1.0 + 1e-5).contains(&u));
            assert!((-1e-5..=1.0 + 1e-5).contains(&v_coord));
        }
    }

    #[test]
    fn test_back_cover_texture_not_mirrored() {
        // Seen from behind, the back cover's left edge is at +x, so u must
        // grow as x shrinks.
        let mesh = build_rounded_box(&book()).unwrap();
        let back = *mesh.group(MaterialSlot::Back).unwrap();

        for v in group_vertices(&back) {
            let x = mesh.position(v)[0];
            let u = mesh.uv(v)[0];
            let expected = 0.5 - x / 1.28;
            assert!((u - expected).abs() < 1e-4, "x {} u {}", x, u);
        }
    }

    #[test]
    fn test_smoothness_one_is_chamfer() {
        let spec = BoxSpec::new(1.0, 1.0, 0.1, 0.2, 1);
        let mesh = build_rounded_box(&spec).unwrap();
        let front = mesh.group(MaterialSlot::Front).unwrap();
        assert_eq!(front.triangle_count, 10);

        // First wedge joins the top of the right strip to the right end of
        // the top band.
        let first_wedge = 6 * 3;
        let a = mesh.position(first_wedge + 1);
        let b = mesh.position(first_wedge + 2);
        assert!((a[0] - 0.5).abs() < 1e-6 && (a[1] - 0.3).abs() < 1e-6);
        assert!((b[0] - 0.3).abs() < 1e-6 && (b[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_oversized_radius() {
        let result = build_rounded_box(&BoxSpec::new(1.28, 1.71, 0.1, 0.64, 10));
        assert!(matches!(result, Err(ShelfError::InvalidBoxSpec(_))));
    }

    #[test]
    fn test_zero_radius_uses_minimum() {
        let mesh = build_rounded_box(&BoxSpec::new(1.0, 1.0, 0.1, 0.0, 4)).unwrap();
        let bounds = mesh.bounds().unwrap();
        assert!((bounds.max[0] - 0.5).abs() < 1e-6);

        // The corner fan sits MIN_CORNER_RADIUS inside the outline.
        let first_wedge_center = mesh.position(6 * 3);
        assert!((first_wedge_center[0] - (0.5 - MIN_CORNER_RADIUS)).abs() < 1e-6);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = build_rounded_box(&book()).unwrap();
        let b = build_rounded_box(&book()).unwrap();
        assert_eq!(a, b);
    }
}
