//! CPU-side geometry and procedural primitives.
//!
//! [`RawGeometry`] is the intermediate representation every mesh goes through before
//! it reaches the GPU: primitives are generated here, loaded models are decoded into
//! it, and the renderer uploads it lazily the first time an entity using it is drawn.
//!
//! Primitives follow the conventions of common scene libraries so scene descriptions
//! read naturally:
//!
//! | Primitive | Orientation |
//! |-----------|-------------|
//! | [`RawGeometry::plane`] | XY plane, facing +Z |
//! | [`RawGeometry::cuboid`] | centered, optional per-face grid segments |
//! | [`RawGeometry::sphere`] | centered, poles on ±Y |
//! | [`RawGeometry::cylinder`] / [`RawGeometry::cone`] | centered, axis on Y |
//! | [`RawGeometry::torus`] | ring in the XY plane |
//! | [`RawGeometry::wall_with_arch`] | XY plane, facing +Z, opening at the bottom |
//!
//! Texture coordinates put `v = 0` at the top edge of the image.
//!
//! ```
//! use tableau::{RawGeometry, Vec3};
//!
//! let mut tower = RawGeometry::cylinder(0.5, 0.5, 3.0, 12);
//! tower.append(&RawGeometry::cone(0.8, 1.0, 12).translated(Vec3::new(0.0, 2.0, 0.0)));
//! assert!(tower.triangle_count() > 0);
//! ```

use std::collections::HashSet;
use std::f32::consts::{PI, TAU};

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::mesh::Vertex3d;

/// Raw geometry data before GPU upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawGeometry {
    /// Vertex positions, normals, and UVs.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.len() < 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Computes the axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        let (min, max) = self.bounds();
        max - min
    }

    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) + offset).into();
        }
    }

    pub fn translated(mut self, offset: Vec3) -> Self {
        self.translate(offset);
        self
    }

    /// Scales all vertices uniformly around the origin.
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) * factor).into();
        }
    }

    /// Rotates all vertices and normals.
    pub fn rotate(&mut self, rotation: Quat) {
        for v in &mut self.vertices {
            v.position = (rotation * Vec3::from(v.position)).into();
            v.normal = (rotation * Vec3::from(v.normal)).into();
        }
    }

    /// Applies an affine transform, using its inverse transpose for normals.
    pub fn transform(&mut self, matrix: Mat4) {
        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
        for v in &mut self.vertices {
            v.position = matrix.transform_point3(Vec3::from(v.position)).into();
            v.normal = (normal_matrix * Vec3::from(v.normal))
                .normalize_or_zero()
                .into();
        }
        // A mirroring transform flips triangle winding.
        if matrix.determinant() < 0.0 {
            for tri in self.indices.chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
        }
    }

    /// Centers the geometry at the origin.
    pub fn recenter(&mut self) {
        let center = self.center();
        self.translate(-center);
    }

    /// Centers on X/Z and drops the geometry so its lowest point sits on y = 0.
    pub fn settle_on_ground(&mut self) {
        if self.vertices.is_empty() {
            return;
        }
        let (min, max) = self.bounds();
        let center = (min + max) * 0.5;
        self.translate(Vec3::new(-center.x, -min.y, -center.z));
    }

    /// Appends another geometry, rebasing its indices.
    pub fn append(&mut self, other: &RawGeometry) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Recalculates smooth vertex normals by averaging area-weighted face normals.
    pub fn recalculate_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = [0.0, 0.0, 0.0];
        }

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);
            let face_normal = (p1 - p0).cross(p2 - p0);

            for i in [i0, i1, i2] {
                let n = Vec3::from(self.vertices[i].normal) + face_normal;
                self.vertices[i].normal = n.into();
            }
        }

        for v in &mut self.vertices {
            v.normal = Vec3::from(v.normal).normalize_or_zero().into();
        }
    }

    /// Every unique triangle edge as a line-list index buffer, for wireframe drawing.
    pub fn edges(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut lines = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = if a < b { (a, b) } else { (b, a) };
                if seen.insert(key) {
                    lines.extend_from_slice(&[a, b]);
                }
            }
        }
        lines
    }

    // ------------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------------

    /// A `width × height` rectangle in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let mut geometry = Self::default();
        geometry.push_grid(
            Vec3::new(-width * 0.5, -height * 0.5, 0.0),
            Vec3::new(width, 0.0, 0.0),
            Vec3::new(0.0, height, 0.0),
            1,
            1,
        );
        geometry
    }

    /// A box centered at the origin. Each face is split into `segments × segments`
    /// quads, which only matters for wireframe rendering.
    pub fn cuboid(width: f32, height: f32, depth: f32, segments: u32) -> Self {
        let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
        let s = segments.max(1);
        let mut geometry = Self::default();

        // (origin, u, v) with u × v pointing out of the face
        let faces = [
            // +Z
            (Vec3::new(-hx, -hy, hz), Vec3::new(width, 0.0, 0.0), Vec3::new(0.0, height, 0.0)),
            // -Z
            (Vec3::new(hx, -hy, -hz), Vec3::new(-width, 0.0, 0.0), Vec3::new(0.0, height, 0.0)),
            // +X
            (Vec3::new(hx, -hy, hz), Vec3::new(0.0, 0.0, -depth), Vec3::new(0.0, height, 0.0)),
            // -X
            (Vec3::new(-hx, -hy, -hz), Vec3::new(0.0, 0.0, depth), Vec3::new(0.0, height, 0.0)),
            // +Y
            (Vec3::new(-hx, hy, hz), Vec3::new(width, 0.0, 0.0), Vec3::new(0.0, 0.0, -depth)),
            // -Y
            (Vec3::new(-hx, -hy, -hz), Vec3::new(width, 0.0, 0.0), Vec3::new(0.0, 0.0, depth)),
        ];

        for (origin, u, v) in faces {
            geometry.push_grid(origin, u, v, s, s);
        }
        geometry
    }

    /// A UV sphere with `width_segments` around the equator and `height_segments`
    /// from pole to pole.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);
        let mut vertices = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
        let mut indices = Vec::new();

        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            let phi = v * PI;
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let theta = u * TAU;
                let normal = Vec3::new(
                    -theta.cos() * phi.sin(),
                    phi.cos(),
                    theta.sin() * phi.sin(),
                );
                vertices.push(Vertex3d::new(
                    (normal * radius).into(),
                    normal.into(),
                    [u, v],
                ));
            }
        }

        let row = ws + 1;
        for iy in 0..hs {
            for ix in 0..ws {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != hs - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self::new(vertices, indices)
    }

    /// A capped cylinder (or truncated cone) centered at the origin along Y.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        let segments = radial_segments.max(3);
        let half = height * 0.5;
        let slope = if height > 0.0 {
            (radius_bottom - radius_top) / height
        } else {
            0.0
        };
        let mut geometry = Self::default();

        // Side wall: row 0 is the top ring, row 1 the bottom ring.
        for row in 0..=1u32 {
            let v = row as f32;
            let radius = v * (radius_bottom - radius_top) + radius_top;
            let y = half - v * height;
            for x in 0..=segments {
                let u = x as f32 / segments as f32;
                let (sin, cos) = (u * TAU).sin_cos();
                let normal = Vec3::new(sin, slope, cos).normalize();
                geometry.vertices.push(Vertex3d::new(
                    [radius * sin, y, radius * cos],
                    normal.into(),
                    [u, v],
                ));
            }
        }
        let row = segments + 1;
        for x in 0..segments {
            let a = x;
            let b = row + x;
            let c = row + x + 1;
            let d = x + 1;
            geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }

        if radius_top > 0.0 {
            geometry.push_cap(radius_top, half, segments, true);
        }
        if radius_bottom > 0.0 {
            geometry.push_cap(radius_bottom, -half, segments, false);
        }
        geometry
    }

    /// A cone with its apex on +Y.
    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self::cylinder(0.0, radius, height, radial_segments)
    }

    /// A torus lying in the XY plane.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial = radial_segments.max(3);
        let tubular = tubular_segments.max(3);
        let mut vertices = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);
        let mut indices = Vec::new();

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            for i in 0..=tubular {
                let u = i as f32 / tubular as f32 * TAU;
                let position = Vec3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
                let normal = (position - center).normalize_or_zero();
                vertices.push(Vertex3d::new(
                    position.into(),
                    normal.into(),
                    [i as f32 / tubular as f32, j as f32 / radial as f32],
                ));
            }
        }

        let row = tubular + 1;
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = row * j + i - 1;
                let b = row * (j - 1) + i - 1;
                let c = row * (j - 1) + i;
                let d = row * j + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self::new(vertices, indices)
    }

    /// A wall panel centered at the origin in the XY plane (facing +Z) with an opening
    /// cut out of its bottom edge. The opening's top corners are rounded with radius
    /// `corner_radius`, clamped to half the opening's width and height.
    pub fn wall_with_arch(
        width: f32,
        height: f32,
        opening_width: f32,
        opening_height: f32,
        corner_radius: f32,
        curve_segments: u32,
    ) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let ow = opening_width.min(width) * 0.5;
        let bottom = -hh;
        let top = (bottom + opening_height).min(hh);
        let r = corner_radius.min(ow).min(opening_height * 0.5).max(0.0);
        let mut geometry = Self::default();

        let planar = |x: f32, y: f32| {
            Vertex3d::new([x, y, 0.0], [0.0, 0.0, 1.0], [x / width + 0.5, 0.5 - y / height])
        };

        let mut quad = |g: &mut Self, x0: f32, y0: f32, x1: f32, y1: f32| {
            if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 {
                return;
            }
            let base = g.vertices.len() as u32;
            g.vertices.extend_from_slice(&[
                planar(x0, y0),
                planar(x1, y0),
                planar(x1, y1),
                planar(x0, y1),
            ]);
            g.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        };

        quad(&mut geometry, -hw, -hh, -ow, hh);
        quad(&mut geometry, ow, -hh, hw, hh);
        quad(&mut geometry, -ow, top, ow, hh);

        if r > 0.0 {
            let segments = curve_segments.max(1);
            // Fill between each rounded corner and the square corner it replaces.
            let corners = [
                (
                    Vec3::new(-ow, top, 0.0),
                    Vec3::new(-ow, top - r, 0.0),
                    Vec3::new(-ow + r, top, 0.0),
                ),
                (
                    Vec3::new(ow, top, 0.0),
                    Vec3::new(ow - r, top, 0.0),
                    Vec3::new(ow, top - r, 0.0),
                ),
            ];
            for (corner, start, end) in corners {
                let base = geometry.vertices.len() as u32;
                geometry.vertices.push(planar(corner.x, corner.y));
                for k in 0..=segments {
                    let t = k as f32 / segments as f32;
                    // Quadratic Bezier with the square corner as control point.
                    let p = start * (1.0 - t) * (1.0 - t) + corner * 2.0 * (1.0 - t) * t + end * t * t;
                    geometry.vertices.push(planar(p.x, p.y));
                }
                for k in 0..segments {
                    geometry
                        .indices
                        .extend_from_slice(&[base, base + 1 + k, base + 2 + k]);
                }
            }
        }

        geometry
    }

    fn push_grid(&mut self, origin: Vec3, u: Vec3, v: Vec3, segments_u: u32, segments_v: u32) {
        let normal = u.cross(v).normalize_or_zero();
        let base = self.vertices.len() as u32;
        for j in 0..=segments_v {
            let fv = j as f32 / segments_v as f32;
            for i in 0..=segments_u {
                let fu = i as f32 / segments_u as f32;
                let p = origin + u * fu + v * fv;
                self.vertices
                    .push(Vertex3d::new(p.into(), normal.into(), [fu, 1.0 - fv]));
            }
        }
        let row = segments_u + 1;
        for j in 0..segments_v {
            for i in 0..segments_u {
                let a = base + j * row + i;
                let b = a + 1;
                let c = a + row + 1;
                let d = a + row;
                self.indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }
    }

    fn push_cap(&mut self, radius: f32, y: f32, segments: u32, top: bool) {
        let sign = if top { 1.0 } else { -1.0 };
        let normal = [0.0, sign, 0.0];
        let center_start = self.vertices.len() as u32;
        for x in 1..=segments {
            let u = (x as f32 - 0.5) / segments as f32;
            self.vertices
                .push(Vertex3d::new([0.0, y, 0.0], normal, [u, 0.5]));
        }
        let ring_start = self.vertices.len() as u32;
        for x in 0..=segments {
            let (sin, cos) = (x as f32 / segments as f32 * TAU).sin_cos();
            self.vertices.push(Vertex3d::new(
                [radius * sin, y, radius * cos],
                normal,
                [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5],
            ));
        }
        for x in 0..segments {
            let c = center_start + x;
            let i = ring_start + x;
            if top {
                self.indices.extend_from_slice(&[i, i + 1, c]);
            } else {
                self.indices.extend_from_slice(&[i + 1, i, c]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every non-degenerate triangle should wind counter-clockwise when seen from the
    /// side its vertex normals point to.
    fn assert_outward_winding(geometry: &RawGeometry, name: &str) {
        for tri in geometry.indices.chunks_exact(3) {
            let v: Vec<&Vertex3d> = tri.iter().map(|&i| &geometry.vertices[i as usize]).collect();
            let p0 = Vec3::from(v[0].position);
            let face = (Vec3::from(v[1].position) - p0).cross(Vec3::from(v[2].position) - p0);
            if face.length_squared() < 1e-12 {
                continue;
            }
            let avg = Vec3::from(v[0].normal) + Vec3::from(v[1].normal) + Vec3::from(v[2].normal);
            assert!(face.dot(avg) > 0.0, "{name}: inward triangle {tri:?}");
        }
    }

    fn assert_indices_in_range(geometry: &RawGeometry) {
        let n = geometry.vertices.len() as u32;
        assert!(geometry.indices.iter().all(|&i| i < n));
        assert_eq!(geometry.indices.len() % 3, 0);
    }

    #[test]
    fn raw_geometry_bounds() {
        let vertices = vec![
            Vertex3d::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([-1.0, -1.0, -1.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
        ];
        let geom = RawGeometry::new(vertices, vec![0, 1, 2]);

        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn settle_on_ground_centers_footprint() {
        let mut geom = RawGeometry::cuboid(2.0, 4.0, 2.0, 1).translated(Vec3::new(5.0, -3.0, 1.0));
        geom.settle_on_ground();
        let (min, max) = geom.bounds();
        assert!(min.y.abs() < 1e-6);
        assert!((max.y - 4.0).abs() < 1e-6);
        assert!((min.x + max.x).abs() < 1e-6);
        assert!((min.z + max.z).abs() < 1e-6);
    }

    #[test]
    fn primitives_face_outward() {
        assert_outward_winding(&RawGeometry::plane(2.4, 1.55), "plane");
        assert_outward_winding(&RawGeometry::cuboid(1.0, 2.0, 3.0, 5), "cuboid");
        assert_outward_winding(&RawGeometry::sphere(1.0, 32, 16), "sphere");
        assert_outward_winding(&RawGeometry::cylinder(0.1, 0.1, 0.5, 8), "cylinder");
        assert_outward_winding(&RawGeometry::cone(0.8, 1.5, 32), "cone");
        assert_outward_winding(&RawGeometry::torus(0.6, 0.2, 16, 100), "torus");
        assert_outward_winding(&RawGeometry::wall_with_arch(18.0, 6.0, 4.6, 4.8, 2.1, 12), "wall");
    }

    #[test]
    fn primitives_have_valid_indices() {
        for geometry in [
            RawGeometry::plane(1.0, 1.0),
            RawGeometry::cuboid(1.0, 1.0, 1.0, 5),
            RawGeometry::sphere(0.2, 32, 32),
            RawGeometry::cone(0.6, 2.0, 8),
            RawGeometry::torus(0.3, 0.2, 32, 64),
            RawGeometry::wall_with_arch(18.0, 6.0, 4.6, 4.8, 2.1, 12),
        ] {
            assert_indices_in_range(&geometry);
            assert!(!geometry.is_empty());
        }
    }

    #[test]
    fn plane_faces_positive_z() {
        let plane = RawGeometry::plane(2.0, 1.0);
        assert!(plane.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        assert_eq!(plane.size(), Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn segmented_box_wireframe_edges() {
        // 6 faces of a 5×5 grid: each face has 5·6·2 grid lines + 25 diagonals.
        let geom = RawGeometry::cuboid(1.0, 1.0, 1.0, 5);
        let lines = geom.edges();
        assert_eq!(lines.len() % 2, 0);
        assert_eq!(lines.len() / 2, 6 * (60 + 25));
    }

    #[test]
    fn arch_wall_leaves_opening_empty() {
        let wall = RawGeometry::wall_with_arch(18.0, 6.0, 4.6, 4.8, 2.1, 12);
        // No triangle may contain the middle of the doorway.
        let probe = Vec3::new(0.0, -1.0, 0.0);
        for tri in wall.indices.chunks_exact(3) {
            let p: Vec<Vec3> = tri
                .iter()
                .map(|&i| Vec3::from(wall.vertices[i as usize].position))
                .collect();
            let edge = |a: Vec3, b: Vec3| (b - a).cross(probe - a).z;
            let inside = edge(p[0], p[1]) > 0.0 && edge(p[1], p[2]) > 0.0 && edge(p[2], p[0]) > 0.0;
            assert!(!inside);
        }
        let (min, max) = wall.bounds();
        assert_eq!(min, Vec3::new(-9.0, -3.0, 0.0));
        assert_eq!(max, Vec3::new(9.0, 3.0, 0.0));
    }

    #[test]
    fn mirrored_transform_keeps_winding() {
        let mut plane = RawGeometry::plane(1.0, 1.0);
        plane.transform(Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0)));
        assert_outward_winding(&plane, "mirrored plane");
    }

    #[test]
    fn append_rebases_indices() {
        let mut a = RawGeometry::plane(1.0, 1.0);
        let b = RawGeometry::plane(1.0, 1.0);
        a.append(&b);
        assert_eq!(a.vertices.len(), 8);
        assert_eq!(a.indices.len(), 12);
        assert!(a.indices[6..].iter().zip(&b.indices).all(|(x, y)| *x == y + 4));
    }
}
