//! Every light type at once on a shared material: ambient, directional, hemisphere,
//! point and spot, plus a wide spot standing in for a rectangular area light.

use glam::Vec3;

use crate::camera::{Camera, Pose, Projection};
use crate::color::Color;
use crate::geometry::RawGeometry;
use crate::light::Light;
use crate::material::Material;
use crate::orbit_camera::OrbitCamera;
use crate::scene::{Background, EntityDesc, SceneDesc};
use crate::tweaks::{TweakId, TweakPanel};

use super::{Demo, DemoContext};

const EYE: Vec3 = Vec3::new(1.0, 1.0, 4.0);
const AMBIENT: &str = "ambient";

/// Radians per second about X and Y.
const ROTATION_RATES: Vec3 = Vec3::new(0.15, 0.1, 0.0);

pub struct LightStudy {
    orbit: OrbitCamera,
    panel: TweakPanel,
    ambient: TweakId,
}

impl LightStudy {
    pub fn new() -> Self {
        let mut panel = TweakPanel::new();
        let ambient = panel.add("Ambient Intensity", 1.0, 0.0, 3.0, 0.001);
        Self {
            orbit: OrbitCamera::looking_from(EYE, Vec3::ZERO),
            panel,
            ambient,
        }
    }
}

impl Default for LightStudy {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for LightStudy {
    fn title(&self) -> &str {
        "Lights"
    }

    fn scene(&self) -> SceneDesc {
        let camera = Camera::new(Pose::looking_at(EYE, Vec3::ZERO), Projection::perspective(75.0, 0.1, 100.0));
        let mut desc = SceneDesc::new(Background::Solid(Color::BLACK), camera);

        desc.named_light(AMBIENT, Light::ambient(Color::WHITE, self.panel.value(self.ambient)));
        desc.light(Light::directional(
            Color::hex(0x00fffc),
            0.9,
            Vec3::new(1.0, 0.25, 0.0),
            Vec3::ZERO,
        ));
        desc.light(Light::hemisphere(Color::hex(0xff0000), Color::hex(0x0000ff), 0.9));
        desc.light(Light::point(Color::hex(0xff9000), 1.5, Vec3::new(1.0, -0.5, 1.0), 0.0));
        // Area light approximation: a soft spot covering the whole front hemisphere.
        desc.light(Light::spot(
            Color::hex(0x4e00ff),
            6.0,
            Vec3::new(-1.5, 0.0, 1.5),
            Vec3::ZERO,
            0.0,
            1.4,
            1.0,
        ));
        desc.light(
            Light::spot(
                Color::hex(0x78ff00),
                4.5,
                Vec3::new(0.0, 2.0, 3.0),
                Vec3::new(-0.75, 0.0, 0.0),
                10.0,
                std::f32::consts::PI * 0.1,
                0.25,
            )
            .with_decay(1.0),
        );

        let material = Material::standard(Color::WHITE).roughness(0.4);
        let cone = desc.mesh(RawGeometry::cone(0.5, 1.0, 32));
        let cube = desc.mesh(RawGeometry::cuboid(0.75, 0.75, 0.75, 1));
        let torus = desc.mesh(RawGeometry::torus(0.3, 0.2, 32, 64));
        let plane = desc.mesh(RawGeometry::plane(5.0, 5.0));
        desc.spawn(EntityDesc::new(cone, material).at(Vec3::new(-1.5, 0.0, 0.0)).spin(ROTATION_RATES));
        desc.spawn(EntityDesc::new(cube, material).spin(ROTATION_RATES));
        desc.spawn(EntityDesc::new(torus, material).at(Vec3::new(1.5, 0.0, 0.0)).spin(ROTATION_RATES));
        desc.spawn(
            EntityDesc::new(plane, material)
                .rotation(glam::Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2))
                .at(Vec3::new(0.0, -0.65, 0.0)),
        );
        desc
    }

    fn hud_lines(&self) -> Vec<String> {
        vec!["Drag to orbit, scroll to zoom".to_string()]
    }

    fn update(&mut self, ctx: &mut DemoContext) {
        self.orbit.update(ctx.input);
        ctx.camera.pose = self.orbit.pose();
        ctx.world.advance_spins(ctx.dt);

        if self.panel.handle_input(ctx.input) == Some(self.ambient) {
            ctx.world
                .set_light_intensity(AMBIENT, self.panel.value(self.ambient));
        }
        ctx.overlay.set_sidebar(self.panel.lines());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing;
    use crate::input::Input;
    use crate::overlay::OverlayState;
    use crate::scene::Spin;

    #[test]
    fn rotation_tracks_elapsed_time() {
        let mut demo = LightStudy::new();
        let (mut world, mut camera) = testing::build(&demo);
        let mut overlay = OverlayState::default();
        let input = Input::new();
        for frame in 1..=10 {
            testing::frame(&mut demo, &mut world, &mut camera, &mut overlay, &input, 0.1, frame as f32 * 0.1);
        }
        for (_, spin) in world.ecs.query::<&Spin>().iter() {
            assert!((spin.angles - ROTATION_RATES).length() < 1e-4);
        }
    }

    #[test]
    fn six_lights_including_the_area_stand_in() {
        let desc = LightStudy::new().scene();
        assert_eq!(desc.lights.len(), 6);
    }
}
