//! An orthographic view of a subdivided wireframe box.

use glam::Vec3;

use crate::camera::{Camera, Pose, Projection};
use crate::color::Color;
use crate::geometry::RawGeometry;
use crate::material::Material;
use crate::orbit_camera::OrbitCamera;
use crate::scene::{Background, EntityDesc, SceneDesc};

use super::{Demo, DemoContext};

const EYE: Vec3 = Vec3::new(0.0, 0.0, 3.0);

pub struct OrthoBox {
    orbit: OrbitCamera,
}

impl OrthoBox {
    pub fn new() -> Self {
        Self {
            orbit: OrbitCamera::looking_from(EYE, Vec3::ZERO),
        }
    }
}

impl Default for OrthoBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for OrthoBox {
    fn title(&self) -> &str {
        "Orthographic Camera"
    }

    fn scene(&self) -> SceneDesc {
        let camera = Camera::new(Pose::looking_at(EYE, Vec3::ZERO), Projection::orthographic(1.0, 0.1, 100.0));
        let mut desc = SceneDesc::new(Background::Solid(Color::BLACK), camera);
        let cube = desc.mesh(RawGeometry::cuboid(1.0, 1.0, 1.0, 5));
        desc.spawn(EntityDesc::new(cube, Material::basic(Color::hex(0xfff8e7)).wireframe()));
        desc
    }

    fn hud_lines(&self) -> Vec<String> {
        vec!["Drag to orbit".to_string()]
    }

    fn update(&mut self, ctx: &mut DemoContext) {
        self.orbit.update(ctx.input);
        ctx.camera.pose = self.orbit.pose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing;

    #[test]
    fn bounds_follow_the_window_aspect() {
        let (_, mut camera) = testing::build(&OrthoBox::new());
        let (left, right, bottom, top) = camera.projection.ortho_bounds().unwrap();
        assert!((right - 1280.0 / 720.0).abs() < 1e-5);
        assert_eq!((left, bottom, top), (-right, -1.0, 1.0));

        camera.set_viewport(600, 600);
        assert_eq!(camera.projection.ortho_bounds(), Some((-1.0, 1.0, -1.0, 1.0)));
    }
}
