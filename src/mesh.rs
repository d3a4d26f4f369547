//! Vertex format, GPU meshes and entity transforms.
//!
//! - [`Vertex3d`]: the vertex format shared by every mesh (position, normal, uv)
//! - [`Mesh`]: GPU-resident geometry uploaded from a [`RawGeometry`]
//! - [`Transform`]: position, rotation and scale of a placed entity
//!
//! # Transforms
//!
//! [`Transform`] uses a builder pattern:
//!
//! ```
//! use tableau::{Transform, Vec3, Quat};
//!
//! let transform = Transform::new()
//!     .position(Vec3::new(0.0, 2.0, -5.0))
//!     .rotation(Quat::from_rotation_y(0.5))
//!     .uniform_scale(2.0);
//!
//! let positioned = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
//! assert_eq!(positioned.scale, Vec3::ONE);
//! ```
//!
//! # Meshes
//!
//! Scenes never hold GPU meshes directly. A [`SceneWorld`](crate::SceneWorld) keeps
//! CPU [`RawGeometry`] behind a [`MeshId`](crate::MeshId), and the renderer uploads
//! each one into a [`Mesh`] the first frame it is drawn. A mesh carries two index
//! buffers: triangles for shaded drawing and a line list of unique edges, which a
//! wireframe material draws instead.
//!
//! # Vertex layout
//!
//! | Attribute | Format    | Offset | Location |
//! |-----------|-----------|--------|----------|
//! | position  | Float32x3 | 0      | 0        |
//! | normal    | Float32x3 | 12     | 1        |
//! | uv        | Float32x2 | 24     | 2        |

use glam::{Mat4, Quat, Vec3};

use crate::geometry::RawGeometry;
use crate::gpu::GpuContext;

/// Vertex shared by every mesh. `v = 0` is the top of the image.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex3d {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &Self::ATTRIBUTES,
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Geometry uploaded to the GPU: triangle indices for shaded drawing and a
/// line list of unique edges for wireframe materials.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
    pub(crate) edge_buffer: wgpu::Buffer,
    pub(crate) edge_count: u32,
}

impl Mesh {
    pub fn new(gpu: &GpuContext, geometry: &RawGeometry) -> Self {
        let edges = geometry.edges();
        Self {
            vertex_buffer: upload(gpu, "Mesh Vertices", &geometry.vertices, wgpu::BufferUsages::VERTEX),
            index_buffer: upload(gpu, "Mesh Triangles", &geometry.indices, wgpu::BufferUsages::INDEX),
            index_count: geometry.indices.len() as u32,
            edge_buffer: upload(gpu, "Mesh Edges", &edges, wgpu::BufferUsages::INDEX),
            edge_count: edges.len() as u32,
        }
    }
}

fn upload<T: bytemuck::Pod>(gpu: &GpuContext, label: &str, data: &[T], usage: wgpu::BufferUsages) -> wgpu::Buffer {
    use wgpu::util::DeviceExt;

    gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage,
    })
}

/// Position, rotation and scale, combined in scale → rotate → translate order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Identity: origin, no rotation, unit scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity rotation and scale at `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Rotation about +Y by `angle` radians.
    pub fn yaw(mut self, angle: f32) -> Self {
        self.rotation = Quat::from_rotation_y(angle);
        self
    }

    /// Per-axis scale. Mirror with [`RawGeometry::transform`] instead, which keeps
    /// the triangle winding outward.
    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Local +Z axis in world space (the front of a plane primitive).
    pub fn front(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Model matrix for the mesh pass and for moving rays into local space.
    ///
    /// ```
    /// use tableau::{Transform, Vec3};
    ///
    /// let t = Transform::from_position(Vec3::new(0.0, 1.0, 0.0)).uniform_scale(3.0);
    /// assert_eq!(t.matrix().transform_point3(Vec3::X), Vec3::new(3.0, 1.0, 0.0));
    /// ```
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn vertex_is_32_bytes() {
        assert_eq!(std::mem::size_of::<Vertex3d>(), 32);
        assert_eq!(Vertex3d::ATTRIBUTES[2].offset, 24);
    }

    #[test]
    fn yaw_turns_front() {
        let t = Transform::new().yaw(FRAC_PI_2);
        assert!((t.front() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn matrix_applies_scale_before_translation() {
        let t = Transform::from_position(Vec3::new(1.0, 0.0, 0.0)).uniform_scale(2.0);
        let p = t.matrix().transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(p, Vec3::new(3.0, 2.0, 0.0));
    }
}
