//! Model decoding: glTF/GLB and STL files into CPU geometry.
//!
//! A decoded [`ModelData`] is a flat list of parts, each a triangle mesh in model
//! space (node transforms already applied) with a base color and an optional index
//! into the model's embedded images. Nothing here touches the GPU, so decoding can run
//! on a loader thread.
//!
//! | Format | Extensions | Notes |
//! |--------|------------|-------|
//! | glTF   | `.gltf`, `.glb` | triangles only, base color factor + texture |
//! | STL    | `.stl` | binary and ASCII, no UVs, single white part |

use std::path::Path;

use glam::{Mat4, Quat, Vec3};

use crate::color::Color;
use crate::error::AssetError;
use crate::geometry::RawGeometry;
use crate::mesh::Vertex3d;
use crate::texture::ImageData;

/// One drawable piece of a model.
#[derive(Clone, Debug)]
pub struct ModelPart {
    pub geometry: RawGeometry,
    pub base_color: Color,
    /// Index into [`ModelData::images`].
    pub image: Option<usize>,
    pub double_sided: bool,
}

/// A decoded model.
#[derive(Clone, Debug, Default)]
pub struct ModelData {
    pub parts: Vec<ModelPart>,
    /// Embedded images; `None` where the pixel format is not supported.
    pub images: Vec<Option<ImageData>>,
}

impl ModelData {
    /// Decodes a model, choosing the format from the file extension.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let model = match extension.as_str() {
            "gltf" | "glb" => {
                let (document, buffers, images) =
                    gltf::import(path).map_err(|source| AssetError::Gltf {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Self::from_gltf(&document, &buffers, &images)
            }
            "stl" => {
                let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_stl_bytes(&bytes, path)?
            }
            _ => {
                return Err(AssetError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension,
                });
            }
        };

        if model.triangle_count() == 0 {
            return Err(AssetError::EmptyModel {
                path: path.to_path_buf(),
            });
        }
        Ok(model)
    }

    /// Decodes a glTF or GLB document held in memory.
    pub fn from_gltf_slice(bytes: &[u8], path: &Path) -> Result<Self, AssetError> {
        let (document, buffers, images) =
            gltf::import_slice(bytes).map_err(|source| AssetError::Gltf {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_gltf(&document, &buffers, &images))
    }

    fn from_gltf(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        images: &[gltf::image::Data],
    ) -> Self {
        let mut model = Self {
            parts: Vec::new(),
            images: images.iter().map(convert_image).collect(),
        };

        let Some(scene) = document
            .default_scene()
            .or_else(|| document.scenes().next())
        else {
            return model;
        };

        for node in scene.nodes() {
            model.collect_node(&node, Mat4::IDENTITY, buffers);
        }
        model
    }

    fn collect_node(&mut self, node: &gltf::Node, parent: Mat4, buffers: &[gltf::buffer::Data]) {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::debug!("skipping non-triangle primitive in mesh {:?}", mesh.name());
                    continue;
                }
                if let Some(mut part) = read_primitive(&primitive, buffers) {
                    part.geometry.transform(world);
                    self.parts.push(part);
                }
            }
        }

        for child in node.children() {
            self.collect_node(&child, world, buffers);
        }
    }

    /// Decodes an STL file held in memory. `path` is only used for error reporting.
    pub fn from_stl_bytes(bytes: &[u8], path: &Path) -> Result<Self, AssetError> {
        let mut cursor = std::io::Cursor::new(bytes);
        let stl = stl_io::read_stl(&mut cursor).map_err(|e| AssetError::Stl {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut vertices = Vec::with_capacity(stl.faces.len() * 3);
        let mut indices = Vec::with_capacity(stl.faces.len() * 3);

        // stl_io returns an indexed mesh; split it so every face keeps its own normal.
        for (i, face) in stl.faces.iter().enumerate() {
            let normal: [f32; 3] = face.normal.into();
            for &vertex_idx in &face.vertices {
                let Some(vertex) = stl.vertices.get(vertex_idx) else {
                    return Err(AssetError::Stl {
                        path: path.to_path_buf(),
                        message: format!("face {i} references missing vertex {vertex_idx}"),
                    });
                };
                let position: [f32; 3] = (*vertex).into();
                vertices.push(Vertex3d::new(position, normal, [0.0, 0.0]));
            }
            let base = (i * 3) as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }

        Ok(Self {
            parts: vec![ModelPart {
                geometry: RawGeometry::new(vertices, indices),
                base_color: Color::WHITE,
                image: None,
                double_sided: false,
            }],
            images: Vec::new(),
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.geometry.triangle_count()).sum()
    }

    /// Bounding box over every part.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.parts.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), part| {
                let (pmin, pmax) = part.geometry.bounds();
                (min.min(pmin), max.max(pmax))
            },
        )
    }

    pub fn size(&self) -> Vec3 {
        let (min, max) = self.bounds();
        max - min
    }

    pub fn transform(&mut self, matrix: Mat4) {
        for part in &mut self.parts {
            part.geometry.transform(matrix);
        }
    }

    /// Recenters on X/Z, puts the base on y = 0 and scales per `fit`. Returns the
    /// scale factor used.
    pub fn fit(&mut self, fit: ModelFit) -> f32 {
        if self.parts.is_empty() {
            return 1.0;
        }
        let (min, max) = self.bounds();
        let center = (min + max) * 0.5;
        let scale = fit.scale_for(max - min);
        self.transform(
            Mat4::from_scale(Vec3::splat(scale))
                * Mat4::from_translation(Vec3::new(-center.x, -min.y, -center.z)),
        );
        scale
    }

    /// Fits the model, turns it about Y and moves it into place, pushing it
    /// `offset` units along the rotated +Z axis.
    pub fn place(&mut self, placement: &ModelPlacement) {
        self.fit(placement.fit);
        self.transform(placement.matrix());
    }
}

/// How a model is scaled after recentering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModelFit {
    /// Keep the model's own size.
    Native,
    /// Uniform scale to the given height.
    Height(f32),
    /// Uniform scale to a height, clamped to `[min_scale, max_scale]`.
    ClampedHeight {
        height: f32,
        min_scale: f32,
        max_scale: f32,
    },
    /// Largest uniform scale that fits within `width` (x) × `length` (z).
    Footprint { width: f32, length: f32 },
}

impl ModelFit {
    /// Scale factor for a model with the given bounding size. Zero extents count as 1.
    pub fn scale_for(&self, size: Vec3) -> f32 {
        let extent = |v: f32| if v > 0.0 { v } else { 1.0 };
        match *self {
            ModelFit::Native => 1.0,
            ModelFit::Height(height) => height / extent(size.y),
            ModelFit::ClampedHeight {
                height,
                min_scale,
                max_scale,
            } => (height / extent(size.y)).clamp(min_scale, max_scale),
            ModelFit::Footprint { width, length } => {
                (width / extent(size.x)).min(length / extent(size.z))
            }
        }
    }

    /// Height the fitted model is expected to reach, if the fit targets one.
    pub fn target_height(&self) -> Option<f32> {
        match *self {
            ModelFit::Height(height) | ModelFit::ClampedHeight { height, .. } => Some(height),
            _ => None,
        }
    }
}

/// Where a fitted model goes in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelPlacement {
    pub fit: ModelFit,
    pub position: Vec3,
    /// Rotation about +Y in radians.
    pub yaw: f32,
    /// Distance pushed along the rotated +Z axis.
    pub offset: f32,
}

impl ModelPlacement {
    pub fn new(fit: ModelFit, position: Vec3) -> Self {
        Self {
            fit,
            position,
            yaw: 0.0,
            offset: 0.0,
        }
    }

    pub fn yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// World position of the fitted model's base center.
    pub fn anchor(&self) -> Vec3 {
        self.position + self.rotation() * Vec3::Z * self.offset
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.anchor())
    }
}

fn read_primitive(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> Option<ModelPart> {
    let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
    let uvs: Option<Vec<[f32; 2]>> = reader.read_tex_coords(0).map(|t| t.into_f32().collect());
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let normal = normals
                .as_ref()
                .and_then(|n| n.get(i).copied())
                .unwrap_or([0.0, 0.0, 0.0]);
            let uv = uvs
                .as_ref()
                .and_then(|t| t.get(i).copied())
                .unwrap_or([0.0, 0.0]);
            Vertex3d::new(position, normal, uv)
        })
        .collect();

    let mut geometry = RawGeometry::new(vertices, indices);
    if normals.is_none() {
        geometry.recalculate_normals();
    }
    if geometry.is_empty() {
        return None;
    }

    let material = primitive.material();
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();

    Some(ModelPart {
        geometry,
        base_color: Color::rgba(r, g, b, a),
        image: pbr
            .base_color_texture()
            .map(|info| info.texture().source().index()),
        double_sided: material.double_sided(),
    })
}

fn convert_image(data: &gltf::image::Data) -> Option<ImageData> {
    use gltf::image::Format;

    let pixels = match data.format {
        Format::R8G8B8A8 => data.pixels.clone(),
        Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => data.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => {
            log::debug!("unsupported embedded image format {other:?}");
            return None;
        }
    };
    Some(ImageData::new(data.width, data.height, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const ASCII_STL: &str = "solid tri
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 2 0 0
    vertex 0 4 0
  endloop
endfacet
endsolid tri
";

    // One triangle at (0,0,0), (1,0,0), (0,1,0) under a node translated by +2 on Y.
    const TRIANGLE_GLTF: &str = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [{"mesh": 0, "translation": [0.0, 2.0, 0.0]}],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        }],
        "bufferViews": [{"buffer": 0, "byteLength": 36}],
        "accessors": [{
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
        }]
    }"#;

    fn unit_cube_model() -> ModelData {
        ModelData {
            parts: vec![ModelPart {
                geometry: RawGeometry::cuboid(2.0, 4.0, 1.0, 1).translated(Vec3::new(3.0, 5.0, -1.0)),
                base_color: Color::WHITE,
                image: None,
                double_sided: false,
            }],
            images: Vec::new(),
        }
    }

    #[test]
    fn stl_ascii_triangle() {
        let model = ModelData::from_stl_bytes(ASCII_STL.as_bytes(), Path::new("tri.stl")).unwrap();
        assert_eq!(model.triangle_count(), 1);
        assert_eq!(model.size(), Vec3::new(2.0, 4.0, 0.0));
        assert_eq!(model.parts[0].geometry.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn gltf_node_transform_is_applied() {
        let model =
            ModelData::from_gltf_slice(TRIANGLE_GLTF.as_bytes(), Path::new("tri.gltf")).unwrap();
        assert_eq!(model.parts.len(), 1);
        let (min, max) = model.bounds();
        assert!((min.y - 2.0).abs() < 1e-6 && (max.y - 3.0).abs() < 1e-6);
        // Normals were missing and got recomputed.
        let n = Vec3::from(model.parts[0].geometry.vertices[0].normal);
        assert!((n - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn unsupported_extension_is_reported() {
        let err = ModelData::load(Path::new("models/thing.fbx")).unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedFormat { ref extension, .. } if extension == "fbx"));
    }

    #[test]
    fn missing_model_is_an_error() {
        let err = ModelData::load(Path::new("/no/such/lantern.glb")).unwrap_err();
        assert_eq!(err.path(), Path::new("/no/such/lantern.glb"));
    }

    #[test]
    fn fit_height_settles_on_ground() {
        let mut model = unit_cube_model();
        let scale = model.fit(ModelFit::Height(1.4));
        assert!((scale - 0.35).abs() < 1e-6);
        let (min, max) = model.bounds();
        assert!(min.y.abs() < 1e-6);
        assert!((max.y - 1.4).abs() < 1e-5);
        assert!((min.x + max.x).abs() < 1e-5);
    }

    #[test]
    fn footprint_uses_tighter_axis() {
        let fit = ModelFit::Footprint {
            width: 4.0,
            length: 6.3,
        };
        // 2 wide, 1 long: width allows 2x, length allows 6.3x.
        assert_eq!(fit.scale_for(Vec3::new(2.0, 0.1, 1.0)), 2.0);
    }

    #[test]
    fn clamped_height_respects_limits() {
        let fit = ModelFit::ClampedHeight {
            height: 1.5,
            min_scale: 0.001,
            max_scale: 50.0,
        };
        assert_eq!(fit.scale_for(Vec3::new(1.0, 0.001, 1.0)), 50.0);
        assert_eq!(fit.scale_for(Vec3::new(1.0, 0.0, 1.0)), 1.5);
    }

    #[test]
    fn placement_offsets_along_rotated_front() {
        let placement = ModelPlacement::new(ModelFit::Height(0.8), Vec3::new(-2.3, 4.2, -16.2))
            .yaw(PI / 2.0)
            .offset(0.8);
        let anchor = placement.anchor();
        assert!((anchor - Vec3::new(-1.5, 4.2, -16.2)).length() < 1e-5);

        let mut model = unit_cube_model();
        model.place(&placement);
        let (min, _) = model.bounds();
        assert!((min.y - 4.2).abs() < 1e-5);
    }
}
