//! Surface appearance for scene entities.

use glam::Vec2;

use crate::color::Color;

/// Handle to a texture slot in a [`SceneWorld`](crate::SceneWorld).
///
/// Slots exist from the moment a scene is built; the image behind a slot arrives
/// later (or never, if loading fails). Materials referencing an empty slot render
/// with their base color alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

/// Handle to geometry in a [`SceneWorld`](crate::SceneWorld).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) usize);

impl TextureId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl MeshId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Color, optional texture and a small set of shading switches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub texture: Option<TextureId>,
    /// Texture coordinate multiplier for repeating textures.
    pub uv_repeat: Vec2,
    pub roughness: f32,
    pub metalness: f32,
    /// Ignore lights and fog shading; draw `color × texture` as-is.
    pub unlit: bool,
    /// Draw triangle edges as lines instead of filled faces.
    pub wireframe: bool,
    /// Render back faces too.
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            texture: None,
            uv_repeat: Vec2::ONE,
            roughness: 1.0,
            metalness: 0.0,
            unlit: false,
            wireframe: false,
            double_sided: false,
        }
    }
}

impl Material {
    /// A lit material with the given base color.
    pub fn standard(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// An unlit material with the given color.
    pub fn basic(color: Color) -> Self {
        Self {
            color,
            unlit: true,
            ..Default::default()
        }
    }

    pub fn texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn repeat(mut self, u: f32, v: f32) -> Self {
        self.uv_repeat = Vec2::new(u, v);
        self
    }

    pub fn roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    pub fn wireframe(mut self) -> Self {
        self.wireframe = true;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    /// Blinn-Phong exponent derived from roughness.
    pub fn shininess(&self) -> f32 {
        let r = self.roughness.clamp(0.04, 1.0);
        (2.0 / (r * r * r * r) - 2.0).clamp(1.0, 1024.0)
    }

    /// Specular strength: dielectrics reflect a little, metals a lot, and rough
    /// surfaces spread it thin.
    pub fn specular(&self) -> f32 {
        let base = 0.04 + (1.0 - 0.04) * self.metalness;
        base * (1.0 - self.roughness * 0.85)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoother_is_shinier() {
        let rough = Material::default().roughness(0.9);
        let smooth = Material::default().roughness(0.4);
        assert!(smooth.shininess() > rough.shininess());
        assert!(smooth.specular() > rough.specular());
    }

    #[test]
    fn metal_reflects_more() {
        let plastic = Material::default().roughness(0.4);
        let metal = plastic.metalness(0.3);
        assert!(metal.specular() > plastic.specular());
    }

    #[test]
    fn builder_clamps_parameters() {
        let m = Material::default().roughness(3.0).metalness(-1.0);
        assert_eq!(m.roughness, 1.0);
        assert_eq!(m.metalness, 0.0);
    }
}
