//! Declarative scene records.
//!
//! A [`SceneDesc`] lists everything a demo needs up front: shared geometry, texture
//! files, entities, lights and the models to stream in. Handing it to
//! [`SceneWorld::build`](super::SceneWorld::build) produces the live world plus the
//! asset requests to issue.

use std::path::PathBuf;

use glam::{Quat, Vec3};

use crate::camera::Camera;
use crate::color::Color;
use crate::geometry::RawGeometry;
use crate::light::Light;
use crate::material::{Material, MeshId, TextureId};
use crate::mesh::Transform;
use crate::model::ModelPlacement;
use crate::picking::Collider;

/// What fills the screen behind the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Background {
    Solid(Color),
    /// Vertical gradient from `top` to `bottom`.
    Gradient { top: Color, bottom: Color },
}

impl Background {
    /// Clear color used before the background pass draws.
    pub fn clear_color(&self) -> Color {
        match *self {
            Background::Solid(color) => color,
            Background::Gradient { bottom, .. } => bottom,
        }
    }
}

/// Linear distance fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    pub fn linear(color: Color, near: f32, far: f32) -> Self {
        Self { color, near, far }
    }

    /// Fog blend factor at `distance`, 0 = clear, 1 = fully fogged.
    pub fn factor(&self, distance: f32) -> f32 {
        if self.far <= self.near {
            return if distance >= self.far { 1.0 } else { 0.0 };
        }
        ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

/// Final color output settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Exposure {
    pub exposure: f32,
    /// Apply ACES filmic tone mapping.
    pub tone_mapping: bool,
}

impl Default for Exposure {
    fn default() -> Self {
        Self {
            exposure: 1.0,
            tone_mapping: false,
        }
    }
}

/// One mesh entity.
#[derive(Clone, Debug)]
pub struct EntityDesc {
    pub mesh: MeshId,
    pub material: Material,
    pub transform: Transform,
    pub collider: Option<Collider>,
    /// Lookup key for [`SceneWorld::find`](super::SceneWorld::find).
    pub name: Option<String>,
    /// Display title shown when the entity is selected.
    pub label: Option<String>,
    /// Euler (XYZ) angular velocity in radians per second.
    pub spin: Option<Vec3>,
}

impl EntityDesc {
    pub fn new(mesh: MeshId, material: Material) -> Self {
        Self {
            mesh,
            material,
            transform: Transform::new(),
            collider: None,
            name: None,
            label: None,
            spin: None,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn yaw(mut self, angle: f32) -> Self {
        self.transform.rotation = Quat::from_rotation_y(angle);
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    pub fn collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn spin(mut self, rates: Vec3) -> Self {
        self.spin = Some(rates);
        self
    }
}

/// A light entity.
#[derive(Clone, Debug)]
pub struct LightDesc {
    pub light: Light,
    pub name: Option<String>,
}

/// Point light spawned alongside a model once it attaches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowDesc {
    pub color: Color,
    pub intensity: f32,
    pub range: f32,
    pub decay: f32,
    /// Height above the model base, as a fraction of the fitted height.
    pub height_fraction: f32,
    /// Animate with randomized lantern flicker.
    pub flicker: bool,
}

/// A model file to stream in and where to put it.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelDesc {
    /// Path relative to the asset root.
    pub path: PathBuf,
    pub placement: ModelPlacement,
    pub glow: Option<GlowDesc>,
    /// Name given to every part entity once attached.
    pub name: Option<String>,
}

impl ModelDesc {
    pub fn new(path: impl Into<PathBuf>, placement: ModelPlacement) -> Self {
        Self {
            path: path.into(),
            placement,
            glow: None,
            name: None,
        }
    }

    pub fn glow(mut self, glow: GlowDesc) -> Self {
        self.glow = Some(glow);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An image file backing a [`TextureId`] slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureDesc {
    /// Path relative to the asset root.
    pub path: PathBuf,
}

/// Everything needed to build a scene.
#[derive(Clone, Debug)]
pub struct SceneDesc {
    pub background: Background,
    pub fog: Option<Fog>,
    pub exposure: Exposure,
    pub camera: Camera,
    pub meshes: Vec<RawGeometry>,
    pub textures: Vec<TextureDesc>,
    pub entities: Vec<EntityDesc>,
    pub lights: Vec<LightDesc>,
    pub models: Vec<ModelDesc>,
}

impl Default for SceneDesc {
    fn default() -> Self {
        Self {
            background: Background::Solid(Color::BLACK),
            fog: None,
            exposure: Exposure::default(),
            camera: Camera::default(),
            meshes: Vec::new(),
            textures: Vec::new(),
            entities: Vec::new(),
            lights: Vec::new(),
            models: Vec::new(),
        }
    }
}

impl SceneDesc {
    pub fn new(background: Background, camera: Camera) -> Self {
        Self {
            background,
            camera,
            ..Default::default()
        }
    }

    /// Registers geometry and returns its handle.
    pub fn mesh(&mut self, geometry: RawGeometry) -> MeshId {
        self.meshes.push(geometry);
        MeshId(self.meshes.len() - 1)
    }

    /// Registers an image file, reusing the slot when the path is already known.
    pub fn texture(&mut self, path: impl Into<PathBuf>) -> TextureId {
        let path = path.into();
        if let Some(index) = self.textures.iter().position(|t| t.path == path) {
            return TextureId(index);
        }
        self.textures.push(TextureDesc { path });
        TextureId(self.textures.len() - 1)
    }

    pub fn spawn(&mut self, entity: EntityDesc) {
        self.entities.push(entity);
    }

    pub fn light(&mut self, light: Light) {
        self.lights.push(LightDesc { light, name: None });
    }

    pub fn named_light(&mut self, name: impl Into<String>, light: Light) {
        self.lights.push(LightDesc {
            light,
            name: Some(name.into()),
        });
    }

    pub fn model(&mut self, model: ModelDesc) {
        self.models.push(model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_paths_are_deduplicated() {
        let mut desc = SceneDesc::default();
        let a = desc.texture("artworks/0.jpg");
        let b = desc.texture("artworks/1.jpg");
        let again = desc.texture("artworks/0.jpg");
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(desc.textures.len(), 2);
    }

    #[test]
    fn fog_factor_ramps_linearly() {
        let fog = Fog::linear(Color::BLACK, 40.0, 120.0);
        assert_eq!(fog.factor(10.0), 0.0);
        assert_eq!(fog.factor(80.0), 0.5);
        assert_eq!(fog.factor(500.0), 1.0);
    }

    #[test]
    fn gradient_clears_to_bottom_color() {
        let bg = Background::Gradient {
            top: Color::hex(0x1a1a1a),
            bottom: Color::BLACK,
        };
        assert_eq!(bg.clear_color(), Color::BLACK);
    }
}
