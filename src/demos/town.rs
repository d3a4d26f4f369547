//! A little town block: grass, crossing roads, three buildings, trees and benches,
//! with a slider panel for the lights and a couple of materials.

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

const EYE: Vec3 = Vec3::new(10.0, 8.0, 12.0);
const TARGET: Vec3 = Vec3::new(0.0, 1.0, 0.0);

const AMBIENT: &str = "ambient";
const SUN: &str = "sun";
const GRASS: &str = "grass";
const ROAD: &str = "road";

/// Saturation and lightness of the default grass color 0x6ab36a.
const GRASS_SATURATION: f32 = 0.324;
const GRASS_LIGHTNESS: f32 = 0.559;

const CONE_TREES: [(f32, f32); 15] = [
    (-10.0, 9.0),
    (-10.0, 1.0),
    (-10.0, -3.0),
    (10.0, 9.0),
    (10.0, 5.0),
    (10.0, 1.0),
    (10.0, -3.0),
    (-6.0, 9.0),
    (0.0, 9.0),
    (6.0, 9.0),
    (-6.0, -9.0),
    (0.0, -9.0),
    (6.0, -9.0),
    (-3.0, 4.0),
    (3.0, -4.0),
];

const BLOSSOM_TREES: [(f32, f32); 2] = [(-10.0, 5.0), (8.0, -6.0)];

const BENCHES: [(f32, f32); 2] = [(2.0, -2.0), (-2.0, -2.0)];

pub fn grass_color(hue: f32) -> Color {
    Color::hsl(hue, GRASS_SATURATION, GRASS_LIGHTNESS)
}

struct Sliders {
    ambient: TweakId,
    sun: TweakId,
    grass_hue: TweakId,
    road_roughness: TweakId,
}

pub struct Town {
    orbit: OrbitCamera,
    panel: TweakPanel,
    sliders: Sliders,
}

impl Town {
    pub fn new() -> Self {
        let mut panel = TweakPanel::new();
        let sliders = Sliders {
            ambient: panel.add("Ambient Light", 0.6, 0.0, 2.0, 0.01),
            sun: panel.add("Sun Intensity", 1.4, 0.0, 3.0, 0.01),
            grass_hue: panel.add("Grass Hue", 120.0, 0.0, 360.0, 1.0),
            road_roughness: panel.add("Road Roughness", 0.8, 0.0, 1.0, 0.01),
        };
        Self {
            orbit: OrbitCamera::looking_from(EYE, TARGET),
            panel,
            sliders,
        }
    }

    pub fn panel(&self) -> &TweakPanel {
        &self.panel
    }
}

impl Default for Town {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for Town {
    fn title(&self) -> &str {
        "Town"
    }

    fn scene(&self) -> SceneDesc {
        let camera = Camera::new(Pose::looking_at(EYE, TARGET), Projection::perspective(75.0, 0.1, 1000.0));
        let mut desc = SceneDesc::new(Background::Solid(Color::hex(0xb5e0ff)), camera);
        let flat = glam::Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);

        desc.named_light(AMBIENT, Light::ambient(Color::WHITE, self.panel.value(self.sliders.ambient)));
        desc.named_light(
            SUN,
            Light::directional(
                Color::WHITE,
                self.panel.value(self.sliders.sun),
                Vec3::new(8.0, 15.0, 10.0),
                Vec3::ZERO,
            ),
        );

        let grass = desc.mesh(RawGeometry::plane(40.0, 40.0));
        desc.spawn(
            EntityDesc::new(grass, Material::standard(Color::hex(0x6ab36a)).roughness(1.0))
                .rotation(flat)
                .named(GRASS),
        );

        let road = Material::standard(Color::hex(0x555555)).roughness(0.8);
        for (w, h) in [(18.0, 3.0), (3.0, 18.0)] {
            let mesh = desc.mesh(RawGeometry::plane(w, h));
            desc.spawn(
                EntityDesc::new(mesh, road)
                    .rotation(flat)
                    .at(Vec3::new(0.0, 0.01, 0.0))
                    .named(ROAD),
            );
        }

        let white = Material::standard(Color::WHITE).roughness(0.3);
        let blue = Material::standard(Color::hex(0x1e90ff)).metalness(0.3).roughness(0.4);
        let small = desc.mesh(RawGeometry::cuboid(3.0, 2.0, 3.0, 1));
        let long = desc.mesh(RawGeometry::cuboid(6.0, 2.0, 2.0, 1));
        desc.spawn(EntityDesc::new(small, white).at(Vec3::new(-6.0, 1.0, 6.0)));
        desc.spawn(EntityDesc::new(small, white).at(Vec3::new(6.0, 1.0, 6.0)));
        desc.spawn(EntityDesc::new(long, blue).at(Vec3::new(0.0, 1.0, -6.0)));

        let bark = Material::standard(Color::hex(0x8b5a2b));
        let leaves = Material::standard(Color::hex(0x1e7a3e)).roughness(1.0);
        let trunk = desc.mesh(RawGeometry::cylinder(0.1, 0.1, 0.5, 8));
        let crown_height = 2.0;
        let crown = desc.mesh(RawGeometry::cone(0.6, crown_height, 8));
        for (x, z) in CONE_TREES {
            desc.spawn(EntityDesc::new(trunk, bark).at(Vec3::new(x, 0.25, z)));
            desc.spawn(EntityDesc::new(crown, leaves).at(Vec3::new(x, 0.8 + crown_height / 2.0, z)));
        }

        let blossom = Material::standard(Color::hex(0xffa6f9)).roughness(1.0);
        let tall_trunk = desc.mesh(RawGeometry::cylinder(0.1, 0.1, 0.6, 8));
        let canopy = desc.mesh(RawGeometry::sphere(1.2, 16, 16));
        for (x, z) in BLOSSOM_TREES {
            desc.spawn(EntityDesc::new(tall_trunk, bark).at(Vec3::new(x, 0.3, z)));
            desc.spawn(EntityDesc::new(canopy, blossom).at(Vec3::new(x, 1.3, z)));
        }

        let seat_wood = Material::standard(Color::hex(0xb58b56));
        let leg = desc.mesh(RawGeometry::cuboid(0.1, 0.4, 0.1, 1));
        let seat = desc.mesh(RawGeometry::cuboid(1.0, 0.1, 0.3, 1));
        for (x, z) in BENCHES {
            desc.spawn(EntityDesc::new(leg, bark).at(Vec3::new(x - 0.4, 0.2, z)));
            desc.spawn(EntityDesc::new(leg, bark).at(Vec3::new(x + 0.4, 0.2, z)));
            desc.spawn(EntityDesc::new(seat, seat_wood).at(Vec3::new(x, 0.45, z)));
        }

        desc
    }

    fn hud_lines(&self) -> Vec<String> {
        vec!["Drag to orbit, scroll to zoom".to_string()]
    }

    fn update(&mut self, ctx: &mut DemoContext) {
        self.orbit.update(ctx.input);
        ctx.camera.pose = self.orbit.pose();

        if let Some(changed) = self.panel.handle_input(ctx.input) {
            let value = self.panel.value(changed);
            let s = &self.sliders;
            if changed == s.ambient {
                ctx.world.set_light_intensity(AMBIENT, value);
            } else if changed == s.sun {
                ctx.world.set_light_intensity(SUN, value);
            } else if changed == s.grass_hue {
                ctx.world.edit_materials(GRASS, |m| m.color = grass_color(value));
            } else if changed == s.road_roughness {
                ctx.world.edit_materials(ROAD, |m| m.roughness = value);
            }
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
    use winit::keyboard::KeyCode;

    #[test]
    fn default_hue_matches_authored_grass() {
        let authored = Color::hex(0x6ab36a);
        let tweaked = grass_color(120.0);
        assert!((authored.r - tweaked.r).abs() < 0.005);
        assert!((authored.g - tweaked.g).abs() < 0.005);
        assert!((authored.b - tweaked.b).abs() < 0.005);
    }

    #[test]
    fn sun_slider_drives_the_light() {
        let mut demo = Town::new();
        let (mut world, mut camera) = testing::build(&demo);
        let mut overlay = OverlayState::default();

        // Select the sun slider, then raise it by ten steps.
        let mut input = Input::new();
        input.set_key(KeyCode::ArrowDown, true);
        testing::frame(&mut demo, &mut world, &mut camera, &mut overlay, &input, 0.016, 0.0);
        input.begin_frame();
        input.set_key(KeyCode::ArrowDown, false);
        input.begin_frame();
        input.set_key(KeyCode::ShiftLeft, true);
        input.set_key(KeyCode::ArrowRight, true);
        testing::frame(&mut demo, &mut world, &mut camera, &mut overlay, &input, 0.016, 0.016);

        let sun = world.light_intensity(SUN).unwrap();
        assert!((sun - 1.5).abs() < 1e-4, "{sun}");
        assert!(!overlay.sidebar.is_empty());
    }

    #[test]
    fn scene_has_every_tree_part() {
        let desc = Town::new().scene();
        // grass, 2 roads, 3 buildings, 15×2 cone tree parts, 2×2 blossom parts, 2×3 bench parts
        assert_eq!(desc.entities.len(), 1 + 2 + 3 + 30 + 4 + 6);
    }
}
