//! Thirty random cubes; clicking one selects it, paints it black and gives it a short
//! scale pulse.

use glam::Vec3;
use hecs::Entity;
use winit::event::MouseButton;

use crate::camera::{Camera, Pose, Projection};
use crate::color::Color;
use crate::geometry::RawGeometry;
use crate::light::Light;
use crate::material::Material;
use crate::mesh::Transform;
use crate::orbit_camera::OrbitCamera;
use crate::picking::{Collider, Ray};
use crate::rng::SeededRandom;
use crate::scene::{Background, EntityDesc, RenderMesh, SceneDesc, SceneWorld};

use super::{Demo, DemoContext};

const EYE: Vec3 = Vec3::new(0.0, 0.0, 8.0);
const CUBE_COUNT: usize = 30;

/// Phase advance per second: 0.1 every 16 ms.
const PULSE_RATE: f32 = 0.1 / 0.016;
const PULSE_AMPLITUDE: f32 = 0.3;

/// A one-shot scale bump `1 + 0.3·sin(t)` over half a period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    pub entity: Entity,
    phase: f32,
}

impl Pulse {
    pub fn new(entity: Entity) -> Self {
        Self { entity, phase: 0.0 }
    }

    pub fn is_done(&self) -> bool {
        self.phase > std::f32::consts::PI
    }

    /// Advances by `dt` seconds and returns the scale to apply.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.phase += dt * PULSE_RATE;
        if self.is_done() {
            1.0
        } else {
            1.0 + PULSE_AMPLITUDE * self.phase.sin()
        }
    }
}

struct Selection {
    entity: Entity,
    color: Color,
}

pub struct CubePicker {
    seed: u32,
    orbit: OrbitCamera,
    selection: Option<Selection>,
    pulse: Option<Pulse>,
}

impl CubePicker {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            orbit: OrbitCamera::looking_from(EYE, Vec3::ZERO),
            selection: None,
            pulse: None,
        }
    }

    pub fn selected(&self) -> Option<Entity> {
        self.selection.as_ref().map(|s| s.entity)
    }

    fn restore(&mut self, world: &mut SceneWorld) {
        self.pulse = None;
        let Some(previous) = self.selection.take() else {
            return;
        };
        if let Ok(mut render) = world.ecs.get::<&mut RenderMesh>(previous.entity) {
            render.material.color = previous.color;
        }
        if let Ok(mut transform) = world.ecs.get::<&mut Transform>(previous.entity) {
            transform.scale = Vec3::ONE;
        }
    }

    fn select(&mut self, world: &mut SceneWorld, entity: Entity) -> Option<String> {
        let color = {
            let mut render = world.ecs.get::<&mut RenderMesh>(entity).ok()?;
            let color = render.material.color;
            render.material.color = Color::BLACK;
            color
        };
        self.selection = Some(Selection { entity, color });
        self.pulse = Some(Pulse::new(entity));

        let position = world.transform(entity)?.position;
        let size = match *world.ecs.get::<&Collider>(entity).ok()? {
            Collider::Box { half_extents } => half_extents.x * 2.0,
            _ => 0.0,
        };
        Some(format!(
            "Cube selected\nPos: {:.2}, {:.2}, {:.2}\nSize: {:.2}",
            position.x, position.y, position.z, size
        ))
    }
}

impl Demo for CubePicker {
    fn title(&self) -> &str {
        "Picking"
    }

    fn scene(&self) -> SceneDesc {
        let camera = Camera::new(Pose::looking_at(EYE, Vec3::ZERO), Projection::perspective(75.0, 0.1, 100.0));
        let mut desc = SceneDesc::new(Background::Solid(Color::WHITE), camera);
        desc.light(Light::ambient(Color::WHITE, 2.0));

        let mut rng = SeededRandom::new(self.seed);
        for _ in 0..CUBE_COUNT {
            let size = rng.range(0.6, 1.6);
            let color = Color::hex(rng.next_u32() & 0xff_ffff);
            let position = Vec3::new(rng.range(-5.0, 5.0), rng.range(-4.0, 4.0), rng.range(0.0, 5.0));
            let mesh = desc.mesh(RawGeometry::cuboid(size, size, size, 1));
            desc.spawn(
                EntityDesc::new(mesh, Material::standard(color))
                    .at(position)
                    .collider(Collider::box_collider(Vec3::splat(size))),
            );
        }
        desc
    }

    fn hud_lines(&self) -> Vec<String> {
        vec![
            "Click a cube to select it".to_string(),
            "Drag to orbit, scroll to zoom".to_string(),
        ]
    }

    fn update(&mut self, ctx: &mut DemoContext) {
        let input = ctx.input;
        if input.mouse_pressed(MouseButton::Left) {
            let cursor = input.mouse_position();
            let ray = Ray::from_screen(
                cursor.x,
                cursor.y,
                ctx.viewport.x,
                ctx.viewport.y,
                ctx.camera.view_matrix(),
                ctx.camera.projection_matrix(),
            );
            let hit = ctx.world.raycast(&ray);
            self.restore(ctx.world);
            let info = match hit {
                Some(hit) => self.select(ctx.world, hit.entity),
                None => Some("No object selected".to_string()),
            };
            ctx.overlay.set_info(info);
        }

        if let Some(pulse) = self.pulse.as_mut() {
            let scale = pulse.advance(ctx.dt);
            if let Ok(mut transform) = ctx.world.ecs.get::<&mut Transform>(pulse.entity) {
                transform.scale = Vec3::splat(scale);
            }
            if pulse.is_done() {
                self.pulse = None;
            }
        }

        self.orbit.update(input);
        ctx.camera.pose = self.orbit.pose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing;
    use crate::input::Input;
    use crate::overlay::OverlayState;
    use glam::Vec2;

    fn screen_position(camera: &Camera, point: Vec3) -> Vec2 {
        let ndc = camera.view_projection().project_point3(point);
        Vec2::new((ndc.x + 1.0) * 0.5 * 1280.0, (1.0 - ndc.y) * 0.5 * 720.0)
    }

    fn nearest_cube(world: &SceneWorld) -> Vec3 {
        world
            .ecs
            .query::<(&Transform, &Collider)>()
            .iter()
            .map(|(_, (t, _))| t.position)
            .max_by(|a, b| a.z.total_cmp(&b.z))
            .unwrap()
    }

    fn black_cubes(world: &SceneWorld) -> usize {
        world
            .ecs
            .query::<&RenderMesh>()
            .iter()
            .filter(|(_, r)| r.material.color == Color::BLACK)
            .count()
    }

    #[test]
    fn pulse_peaks_then_settles() {
        let mut world = hecs::World::new();
        let mut pulse = Pulse::new(world.spawn(()));
        let peak = pulse.advance(std::f32::consts::FRAC_PI_2 / PULSE_RATE);
        assert!((peak - 1.3).abs() < 1e-4);
        assert!(!pulse.is_done());
        assert_eq!(pulse.advance(0.5), 1.0);
        assert!(pulse.is_done());
    }

    #[test]
    fn seed_fixes_the_layout() {
        let a = CubePicker::new(9).scene();
        let b = CubePicker::new(9).scene();
        assert_eq!(a.entities.len(), CUBE_COUNT);
        for (x, y) in a.entities.iter().zip(&b.entities) {
            assert_eq!(x.transform.position, y.transform.position);
            let p = x.transform.position;
            assert!((-5.0..5.0).contains(&p.x));
            assert!((-4.0..4.0).contains(&p.y));
            assert!((0.0..5.0).contains(&p.z));
        }
    }

    #[test]
    fn click_selects_then_miss_restores() {
        let mut demo = CubePicker::new(3);
        let (mut world, mut camera) = testing::build(&demo);
        let mut overlay = OverlayState::default();

        let mut input = Input::new();
        input.set_mouse_position(screen_position(&camera, nearest_cube(&world)));
        input.begin_frame();
        input.set_button(MouseButton::Left, true);
        testing::frame(&mut demo, &mut world, &mut camera, &mut overlay, &input, 0.016, 0.0);

        assert!(demo.selected().is_some());
        assert_eq!(black_cubes(&world), 1);
        assert!(overlay.info.as_deref().unwrap().starts_with("Cube selected\nPos: "));

        input.begin_frame();
        input.set_button(MouseButton::Left, false);
        input.begin_frame();
        input.set_mouse_position(Vec2::new(-5000.0, -5000.0));
        input.set_button(MouseButton::Left, true);
        testing::frame(&mut demo, &mut world, &mut camera, &mut overlay, &input, 0.016, 0.016);

        assert!(demo.selected().is_none());
        assert_eq!(black_cubes(&world), 0);
        assert_eq!(overlay.info.as_deref(), Some("No object selected"));
        for (_, t) in world.ecs.query::<&Transform>().iter() {
            assert_eq!(t.scale, Vec3::ONE);
        }
    }
}
