//! Three spinning primitives on a dark floor, lit by two directional lights whose
//! positions are marked with small glowing spheres.

use glam::Vec3;

use crate::camera::{Camera, Pose, Projection};
use crate::color::Color;
use crate::geometry::RawGeometry;
use crate::light::Light;
use crate::material::Material;
use crate::scene::{Background, EntityDesc, SceneDesc};

use super::{Demo, DemoContext};

/// 0.01 rad per frame at 60 fps.
const SPIN_RATE: f32 = 0.6;

const KEY_LIGHT: Vec3 = Vec3::new(0.0, 5.0, 2.0);
const FILL_LIGHT: Vec3 = Vec3::new(5.0, 4.0, -5.0);

#[derive(Default)]
pub struct Primitives;

impl Primitives {
    pub fn new() -> Self {
        Self
    }
}

impl Demo for Primitives {
    fn title(&self) -> &str {
        "Primitives"
    }

    fn scene(&self) -> SceneDesc {
        let camera = Camera::new(
            Pose::looking_at(Vec3::new(4.0, 3.0, 8.0), Vec3::ZERO),
            Projection::perspective(75.0, 0.1, 2000.0),
        );
        let mut desc = SceneDesc::new(
            Background::Gradient {
                top: Color::hex(0x1a1a1a),
                bottom: Color::hex(0x000000),
            },
            camera,
        );

        let floor = desc.mesh(RawGeometry::plane(12.0, 12.0));
        desc.spawn(
            EntityDesc::new(floor, Material::standard(Color::hex(0x303030)))
                .rotation(glam::Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
        );

        let spin = Vec3::new(0.0, SPIN_RATE, 0.0);
        let cube = desc.mesh(RawGeometry::cuboid(1.0, 1.0, 1.0, 1));
        let cone = desc.mesh(RawGeometry::cone(0.8, 1.5, 32));
        let torus = desc.mesh(RawGeometry::torus(0.6, 0.2, 16, 100));
        desc.spawn(
            EntityDesc::new(cube, Material::standard(Color::hex(0xff5555)).roughness(0.4))
                .at(Vec3::new(-2.0, 0.5, 0.0))
                .spin(spin),
        );
        desc.spawn(
            EntityDesc::new(
                cone,
                Material::standard(Color::hex(0x55ff55)).roughness(0.4).metalness(0.2),
            )
            .at(Vec3::new(0.0, 0.75, 0.0))
            .spin(spin),
        );
        desc.spawn(
            EntityDesc::new(
                torus,
                Material::standard(Color::hex(0x5555ff)).roughness(0.4).metalness(0.3),
            )
            .at(Vec3::new(2.0, 0.6, 0.0))
            .spin(spin),
        );

        desc.light(Light::directional(Color::WHITE, 1.0, KEY_LIGHT, Vec3::ZERO));
        desc.light(Light::directional(Color::WHITE, 0.8, FILL_LIGHT, Vec3::ZERO));
        desc.light(Light::ambient(Color::WHITE, 0.2));

        let marker = desc.mesh(RawGeometry::sphere(0.2, 32, 32));
        for position in [KEY_LIGHT, FILL_LIGHT] {
            desc.spawn(EntityDesc::new(marker, Material::basic(Color::WHITE)).at(position));
        }
        desc
    }

    fn update(&mut self, ctx: &mut DemoContext) {
        ctx.world.advance_spins(ctx.dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_shapes_spin_and_markers_sit_on_lights() {
        let desc = Primitives::new().scene();
        assert_eq!(desc.entities.iter().filter(|e| e.spin.is_some()).count(), 3);
        let markers: Vec<Vec3> = desc
            .entities
            .iter()
            .filter(|e| e.material.unlit)
            .map(|e| e.transform.position)
            .collect();
        assert_eq!(markers, vec![KEY_LIGHT, FILL_LIGHT]);
        assert!(matches!(desc.background, Background::Gradient { .. }));
    }
}
