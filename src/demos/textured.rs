//! A single unlit sphere wrapped in a tiled wood texture, turning about two axes.

use glam::Vec3;

use crate::camera::{Camera, Pose, Projection};
use crate::color::Color;
use crate::geometry::RawGeometry;
use crate::material::Material;
use crate::scene::{Background, EntityDesc, SceneDesc};

use super::{Demo, DemoContext};

pub const WOOD_TEXTURE: &str = "textures/wood.png";

/// 0.01 rad per frame at 60 fps, about X and Y.
const SPIN: Vec3 = Vec3::new(0.6, 0.6, 0.0);

#[derive(Default)]
pub struct TexturedSphere;

impl TexturedSphere {
    pub fn new() -> Self {
        Self
    }
}

impl Demo for TexturedSphere {
    fn title(&self) -> &str {
        "Textured Sphere"
    }

    fn scene(&self) -> SceneDesc {
        let camera = Camera::new(
            Pose::looking_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO),
            Projection::perspective(75.0, 0.1, 10000.0),
        );
        let mut desc = SceneDesc::new(Background::Solid(Color::BLACK), camera);
        let wood = desc.texture(WOOD_TEXTURE);
        let sphere = desc.mesh(RawGeometry::sphere(1.0, 32, 32));
        desc.spawn(
            EntityDesc::new(sphere, Material::basic(Color::WHITE).texture(wood).repeat(4.0, 4.0))
                .spin(SPIN),
        );
        desc
    }

    fn update(&mut self, ctx: &mut DemoContext) {
        ctx.world.advance_spins(ctx.dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::AssetRequest;
    use crate::rng::SeededRandom;
    use crate::scene::SceneWorld;

    #[test]
    fn sphere_waits_on_one_texture() {
        let (world, requests) = SceneWorld::build(TexturedSphere::new().scene(), SeededRandom::new(1));
        assert_eq!(world.texture_count(), 1);
        assert!(matches!(
            &requests[..],
            [AssetRequest::Texture { path, .. }] if path.ends_with(WOOD_TEXTURE)
        ));
    }
}
