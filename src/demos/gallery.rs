//! Walkthrough gallery: a plastered hall with a corridor behind an arched opening,
//! paintings on every wall, lantern-lit niches and a fountain in the middle.
//!
//! Click (or Enter) grabs the mouse. While grabbed, WASD walks and the mouse looks
//! around; clicking a painting glides the camera in front of it and Backspace steps
//! back out. Escape releases the mouse.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec2, Vec3};
use hecs::Entity;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::camera::{Camera, Pose, Projection};
use crate::color::Color;
use crate::flicker::Breathing;
use crate::focus::{FocusTransition, VIEW_DISTANCE, VIEW_LIFT, framing_pose_for_surface};
use crate::freelook_camera::PointerLook;
use crate::geometry::RawGeometry;
use crate::input::Input;
use crate::light::Light;
use crate::material::{Material, TextureId};
use crate::mesh::Transform;
use crate::model::{ModelFit, ModelPlacement};
use crate::navigation::{MAX_STEP_DT, MoveKeys, NavigationBounds, Navigator};
use crate::overlay::Overlay;
use crate::picking::{Collider, Ray};
use crate::scene::{Background, EntityDesc, Exposure, Fog, GlowDesc, ModelDesc, SceneDesc, SceneWorld};

use super::{Demo, DemoContext};

const ROOM_WIDTH: f32 = 18.0;
const ROOM_LENGTH: f32 = 26.0;
const ROOM_HEIGHT: f32 = 6.0;
const BACK_Z: f32 = -ROOM_LENGTH / 2.0;
const FRONT_Z: f32 = ROOM_LENGTH / 2.0;
const LEFT_X: f32 = -ROOM_WIDTH / 2.0;
const RIGHT_X: f32 = ROOM_WIDTH / 2.0;

const CORRIDOR_WIDTH: f32 = 4.6;
const CORRIDOR_HEIGHT: f32 = 5.0;
const CORRIDOR_LENGTH: f32 = 7.5;
const END_WALL_Z: f32 = BACK_Z - CORRIDOR_LENGTH;
const ARCH_HEIGHT: f32 = 4.8;
const ARCH_RADIUS: f32 = 2.1;

const NICHE_LEFT_X: f32 = -6.55;
const NICHE_RIGHT_X: f32 = 5.85;

const START_POSITION: Vec3 = Vec3::new(0.0, 1.7, 10.0);
const BACKGROUND: u32 = 0x0b0d12;

/// Name of the breathing key spot light.
const KEY_LIGHT: &str = "key light";
const KEY_INTENSITY: f32 = 1.85;

const PLASTER_TEXTURE: &str = "textures/plaster/plastered_wall_02_diff_2k.jpg";
const FLOOR_TEXTURE: &str = "textures/stone-floor/stone_wall_05_diff_2k.jpg";

/// One painting on the gallery walls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Artwork {
    /// Image number; the texture is `artworks/<id>.jpg`.
    pub id: u32,
    /// Wall anchor point. The painting itself sits slightly in front of it.
    pub position: Vec3,
    /// Rotation about +Y; the painting faces along the rotated +Z axis.
    pub yaw: f32,
    pub size: Vec2,
}

impl Artwork {
    fn new(id: u32, position: Vec3, yaw: f32) -> Self {
        Self {
            id,
            position,
            yaw,
            size: Vec2::new(2.4, 1.55),
        }
    }

    fn sized(mut self, width: f32, height: f32) -> Self {
        self.size = Vec2::new(width, height);
        self
    }

    pub fn normal(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Vec3::Z
    }

    /// Where the painting quad is drawn.
    pub fn painting_position(&self) -> Vec3 {
        self.position + self.normal() * 0.08
    }

    pub fn title(&self) -> String {
        format!("Artwork {}", self.id)
    }
}

/// Four paintings per side wall, two on the front wall and one at the end of the
/// corridor. The corridor painting reuses image 0.
pub fn artwork_layout() -> Vec<Artwork> {
    let offsets = [-1.35f32, -0.45, 0.45, 1.35];
    let mut layout = Vec::with_capacity(11);
    let mut id = 0;
    for z in offsets {
        layout.push(Artwork::new(id, Vec3::new(LEFT_X, 2.65, z * 6.0), FRAC_PI_2));
        id += 1;
    }
    for z in offsets {
        layout.push(Artwork::new(id, Vec3::new(RIGHT_X, 2.65, z * 6.0), -FRAC_PI_2));
        id += 1;
    }
    for x in [-2.2, 2.2] {
        layout.push(Artwork::new(id, Vec3::new(x, 2.85, FRONT_Z), PI).sized(2.8, 1.8));
        id += 1;
    }
    layout.push(Artwork::new(0, Vec3::new(0.0, 2.6, END_WALL_Z + 0.02), 0.0).sized(2.8, 1.8));
    layout
}

/// Camera logic of the walkthrough: mouse look, bounded walking and the focus
/// transition. Walking and looking are suspended while a focus is active.
#[derive(Clone, Debug)]
pub struct Walkthrough {
    pub focus: FocusTransition,
    pub navigator: Navigator,
    pub look: PointerLook,
}

impl Walkthrough {
    pub fn new(start: &Pose) -> Self {
        Self {
            focus: FocusTransition::default(),
            navigator: Navigator::new(NavigationBounds::gallery()),
            look: PointerLook::new().facing(start.orientation),
        }
    }

    pub fn is_focusing(&self) -> bool {
        self.focus.is_active()
    }

    /// Nearest pickable surface straight ahead of the camera.
    pub fn pick(&self, pose: &Pose, world: &SceneWorld) -> Option<Entity> {
        world
            .raycast(&Ray::new(pose.position, pose.forward()))
            .map(|hit| hit.entity)
    }

    /// Starts framing a surface whose front is its local +Z. Returns `false` if a
    /// focus is already active.
    pub fn focus_on(&mut self, pose: &Pose, surface: &Transform) -> bool {
        let target = framing_pose_for_surface(surface.position, surface.rotation, VIEW_DISTANCE, VIEW_LIFT);
        self.focus.start(*pose, target)
    }

    /// Ends an active focus. The camera stays where it is and mouse look continues
    /// from the held orientation.
    pub fn step_back(&mut self, pose: &Pose) -> bool {
        if !self.focus.cancel() {
            return false;
        }
        self.look.sync_from(pose.orientation);
        true
    }

    /// Advances one frame. `dt` is capped so a stalled frame cannot carry the camera
    /// through a wall.
    pub fn update(&mut self, pose: &mut Pose, keys: MoveKeys, look_delta: Vec2, locked: bool, dt: f32) {
        let dt = dt.clamp(0.0, MAX_STEP_DT);
        if let Some(focused) = self.focus.advance(dt) {
            *pose = focused;
            return;
        }
        if locked {
            self.look.apply(look_delta);
            pose.orientation = self.look.orientation();
            pose.position = self.navigator.step(pose, keys, dt);
        }
    }

    /// [`update`](Self::update) driven by the current input state.
    pub fn update_from_input(&mut self, pose: &mut Pose, input: &Input, locked: bool, dt: f32) {
        self.update(pose, MoveKeys::from_input(input), input.look_delta(), locked, dt);
    }
}

pub struct Gallery {
    walk: Walkthrough,
    key_light: Breathing,
    breath_time: f32,
}

impl Gallery {
    pub fn new() -> Self {
        Self {
            walk: Walkthrough::new(&Pose::new(START_POSITION, Quat::IDENTITY)),
            key_light: Breathing::new(KEY_INTENSITY),
            breath_time: 0.0,
        }
    }

    pub fn walkthrough(&self) -> &Walkthrough {
        &self.walk
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for Gallery {
    fn title(&self) -> &str {
        "Gallery"
    }

    fn scene(&self) -> SceneDesc {
        let camera = Camera::new(
            Pose::new(START_POSITION, Quat::IDENTITY),
            Projection::perspective(70.0, 0.05, 260.0),
        );
        let mut desc = SceneDesc::new(Background::Solid(Color::hex(BACKGROUND)), camera);
        desc.fog = Some(Fog::linear(Color::hex(BACKGROUND), 40.0, 120.0));
        desc.exposure = Exposure {
            exposure: 1.5,
            tone_mapping: true,
        };

        add_lights(&mut desc);
        add_room(&mut desc);
        add_ceiling_band(&mut desc);
        add_models(&mut desc);
        for artwork in artwork_layout() {
            add_artwork(&mut desc, &artwork);
        }
        desc
    }

    fn hud_lines(&self) -> Vec<String> {
        [
            "Gallery walkthrough",
            "Click or press Enter to walk",
            "WASD move, mouse looks around",
            "Click a painting to view it, Backspace steps back",
            "Esc releases the mouse",
        ]
        .map(String::from)
        .to_vec()
    }

    fn update(&mut self, ctx: &mut DemoContext) {
        let input = ctx.input;
        let clicked = input.mouse_pressed(MouseButton::Left);

        if !ctx.pointer_locked && (clicked || input.key_pressed(KeyCode::Enter)) {
            ctx.request_pointer_lock();
        } else if ctx.pointer_locked && input.key_pressed(KeyCode::Escape) {
            ctx.release_pointer_lock();
        }

        if input.key_pressed(KeyCode::Backspace) && self.walk.step_back(&ctx.camera.pose) {
            ctx.overlay.hide_panel();
            log::debug!("focus released");
        }

        // The click that grabs the pointer is not a pick.
        if clicked && ctx.pointer_locked && !self.walk.is_focusing() {
            let picked = self.walk.pick(&ctx.camera.pose, ctx.world);
            if let Some(entity) = picked
                && let Some(surface) = ctx.world.transform(entity)
                && self.walk.focus_on(&ctx.camera.pose, &surface)
            {
                let title = ctx.world.label(entity).unwrap_or_else(|| "Artwork".to_string());
                log::debug!("focusing {title}");
                ctx.overlay.show_panel(&title);
            }
        }

        self.walk
            .update_from_input(&mut ctx.camera.pose, input, ctx.pointer_locked, ctx.dt);

        self.breath_time += ctx.dt.clamp(0.0, MAX_STEP_DT);
        ctx.world
            .set_light_intensity(KEY_LIGHT, self.key_light.intensity(self.breath_time));
        ctx.world.animate_flicker(ctx.time);
    }

    fn wants_pointer_lock(&self) -> bool {
        true
    }

    fn on_pointer_lock_changed(&mut self, locked: bool, overlay: &mut dyn Overlay) {
        overlay.set_hud_visible(!locked);
    }
}

fn add_lights(desc: &mut SceneDesc) {
    desc.light(Light::ambient(Color::hex(0xfff1de), 0.35));
    desc.light(Light::hemisphere(Color::hex(0xfff2de), Color::hex(0x1a120c), 0.30));
    desc.named_light(
        KEY_LIGHT,
        Light::spot(
            Color::hex(0xffd3a6),
            KEY_INTENSITY,
            Vec3::new(0.0, ROOM_HEIGHT + 4.2, 6.0),
            Vec3::new(0.0, 1.7, 0.0),
            85.0,
            PI / 6.2,
            0.55,
        )
        .with_decay(1.2),
    );
    desc.light(Light::point(Color::hex(0xffe7c9), 0.55, Vec3::new(-6.5, 3.0, 6.5), 55.0));
    desc.light(Light::point(Color::hex(0xbfd0ff), 0.20, Vec3::new(6.5, 3.0, -6.5), 70.0));
    desc.light(Light::point(
        Color::hex(0xffe6c9),
        0.90,
        Vec3::new(0.0, ROOM_HEIGHT - 0.6, 0.0),
        90.0,
    ));
    desc.light(Light::point(
        Color::hex(0xfff1d6),
        0.10,
        Vec3::new(0.0, 2.7, BACK_Z - CORRIDOR_LENGTH * 0.55),
        18.0,
    ));
}

fn plaster(texture: TextureId, repeat_x: f32, repeat_y: f32) -> Material {
    Material::standard(Color::WHITE)
        .texture(texture)
        .repeat(repeat_x, repeat_y)
        .roughness(1.0)
        .double_sided()
}

fn add_room(desc: &mut SceneDesc) {
    let plaster_texture = desc.texture(PLASTER_TEXTURE);
    let floor_texture = desc.texture(FLOOR_TEXTURE);
    let stone = Material::standard(Color::WHITE)
        .texture(floor_texture)
        .repeat(6.0, 8.0)
        .roughness(1.0);
    let ceiling = Material::standard(Color::hex(0xb49a84)).roughness(0.95).double_sided();
    let flat = Quat::from_rotation_x(-FRAC_PI_2);
    let overhead = Quat::from_rotation_x(FRAC_PI_2);
    let corridor_mid_z = BACK_Z - CORRIDOR_LENGTH / 2.0;

    let hall = desc.mesh(RawGeometry::plane(ROOM_WIDTH, ROOM_LENGTH));
    let corridor = desc.mesh(RawGeometry::plane(CORRIDOR_WIDTH, CORRIDOR_LENGTH));
    desc.spawn(EntityDesc::new(hall, stone).rotation(flat));
    desc.spawn(EntityDesc::new(corridor, stone).rotation(flat).at(Vec3::new(0.0, 0.0, corridor_mid_z)));
    desc.spawn(EntityDesc::new(hall, ceiling).rotation(overhead).at(Vec3::new(0.0, ROOM_HEIGHT, 0.0)));
    desc.spawn(
        EntityDesc::new(corridor, ceiling)
            .rotation(overhead)
            .at(Vec3::new(0.0, CORRIDOR_HEIGHT, corridor_mid_z)),
    );

    // Front, left and right walls face into the hall.
    let end_wall = desc.mesh(RawGeometry::plane(ROOM_WIDTH, ROOM_HEIGHT));
    let side_wall = desc.mesh(RawGeometry::plane(ROOM_LENGTH, ROOM_HEIGHT));
    let mid_y = ROOM_HEIGHT / 2.0;
    desc.spawn(
        EntityDesc::new(end_wall, plaster(plaster_texture, 4.0, 2.0))
            .at(Vec3::new(0.0, mid_y, FRONT_Z))
            .yaw(PI),
    );
    desc.spawn(
        EntityDesc::new(side_wall, plaster(plaster_texture, 6.0, 2.0))
            .at(Vec3::new(LEFT_X, mid_y, 0.0))
            .yaw(FRAC_PI_2),
    );
    desc.spawn(
        EntityDesc::new(side_wall, plaster(plaster_texture, 6.0, 2.0))
            .at(Vec3::new(RIGHT_X, mid_y, 0.0))
            .yaw(-FRAC_PI_2),
    );

    let back_wall = desc.mesh(RawGeometry::wall_with_arch(
        ROOM_WIDTH,
        ROOM_HEIGHT,
        CORRIDOR_WIDTH,
        ARCH_HEIGHT,
        ARCH_RADIUS,
        12,
    ));
    desc.spawn(
        EntityDesc::new(back_wall, plaster(plaster_texture, 4.0, 2.0)).at(Vec3::new(0.0, mid_y, BACK_Z)),
    );

    let corridor_plaster = plaster(plaster_texture, 2.5, 2.0);
    let corridor_side = desc.mesh(RawGeometry::plane(CORRIDOR_LENGTH, CORRIDOR_HEIGHT));
    let corridor_end = desc.mesh(RawGeometry::plane(CORRIDOR_WIDTH, CORRIDOR_HEIGHT));
    let corridor_mid_y = CORRIDOR_HEIGHT / 2.0;
    desc.spawn(
        EntityDesc::new(corridor_side, corridor_plaster)
            .at(Vec3::new(-CORRIDOR_WIDTH / 2.0, corridor_mid_y, corridor_mid_z))
            .yaw(FRAC_PI_2),
    );
    desc.spawn(
        EntityDesc::new(corridor_side, corridor_plaster)
            .at(Vec3::new(CORRIDOR_WIDTH / 2.0, corridor_mid_y, corridor_mid_z))
            .yaw(-FRAC_PI_2),
    );
    desc.spawn(
        EntityDesc::new(corridor_end, corridor_plaster)
            .at(Vec3::new(0.0, corridor_mid_y, END_WALL_Z))
            .yaw(PI),
    );
}

/// Dark band running around the top of the hall walls, with square caps at the
/// corners.
fn add_ceiling_band(desc: &mut SceneDesc) {
    let drop = 0.6;
    let thickness = 0.1;
    let inset = 0.02;
    let y = ROOM_HEIGHT - drop / 2.0;
    let band = Material::standard(Color::hex(0x3f2b21)).roughness(0.95);

    let long_x = desc.mesh(RawGeometry::cuboid(ROOM_WIDTH - 0.02, drop, thickness, 1));
    let long_z = desc.mesh(RawGeometry::cuboid(thickness, drop, ROOM_LENGTH - 0.02, 1));
    let cap = desc.mesh(RawGeometry::cuboid(thickness * 2.2, drop, thickness * 2.2, 1));

    let edge = thickness / 2.0 + inset;
    desc.spawn(EntityDesc::new(long_x, band).at(Vec3::new(0.0, y, FRONT_Z - edge)));
    desc.spawn(EntityDesc::new(long_x, band).at(Vec3::new(0.0, y, BACK_Z + edge)));
    desc.spawn(EntityDesc::new(long_z, band).at(Vec3::new(LEFT_X + edge, y, 0.0)));
    desc.spawn(EntityDesc::new(long_z, band).at(Vec3::new(RIGHT_X - edge, y, 0.0)));

    for (x, z) in [
        (LEFT_X + inset, FRONT_Z - inset),
        (RIGHT_X - inset, FRONT_Z - inset),
        (LEFT_X + inset, BACK_Z + inset),
        (RIGHT_X - inset, BACK_Z + inset),
    ] {
        desc.spawn(EntityDesc::new(cap, band).at(Vec3::new(x, y, z)));
    }
}

fn lantern_glow() -> GlowDesc {
    GlowDesc {
        color: Color::hex(0xffc58f),
        intensity: 1.2,
        range: 12.0,
        decay: 2.0,
        height_fraction: 0.4,
        flicker: true,
    }
}

fn add_models(desc: &mut SceneDesc) {
    let niche_z = BACK_Z + 0.02;
    for x in [NICHE_LEFT_X, NICHE_RIGHT_X] {
        desc.model(
            ModelDesc::new(
                "models/niche/prayer_niche_mihrab.glb",
                ModelPlacement::new(ModelFit::Height(4.0), Vec3::new(x, -0.22, niche_z)).offset(-1.75),
            )
            .named("niche"),
        );
    }

    let window = "models/windows/ottoman_window.glb";
    let windows = [
        (Vec3::new(RIGHT_X - 0.3, 2.2, 0.0), -PI, 4.1, 0.02),
        (Vec3::new(LEFT_X, 2.2, 0.0), PI, 4.1, 0.0),
        (Vec3::new(-6.5, 2.2, FRONT_Z - 0.1), FRAC_PI_2, 3.0, 0.0),
        (Vec3::new(6.5, 2.2, FRONT_Z - 0.1), FRAC_PI_2, 3.0, 0.0),
    ];
    for (position, yaw, height, push) in windows {
        desc.model(
            ModelDesc::new(
                window,
                ModelPlacement::new(ModelFit::Height(height), position)
                    .yaw(yaw)
                    .offset(push),
            )
            .named("window"),
        );
    }

    let lantern = "models/lanterns/lantern.glb";
    let lanterns = [
        (Vec3::new(NICHE_LEFT_X, 3.8, BACK_Z + 0.05), 0.0, 1.4, 0.04),
        (Vec3::new(NICHE_RIGHT_X, 3.8, BACK_Z + 0.05), 0.0, 1.4, 0.04),
        (Vec3::new(-CORRIDOR_WIDTH / 2.0, 4.2, BACK_Z - 3.2), FRAC_PI_2, 0.8, 0.8),
        (Vec3::new(CORRIDOR_WIDTH / 2.0, 4.2, BACK_Z - 3.2), -FRAC_PI_2, 0.8, 0.8),
    ];
    for (position, yaw, height, offset) in lanterns {
        desc.model(
            ModelDesc::new(
                lantern,
                ModelPlacement::new(ModelFit::Height(height), position)
                    .yaw(yaw)
                    .offset(offset),
            )
            .glow(lantern_glow())
            .named("lantern"),
        );
    }

    desc.model(
        ModelDesc::new(
            "models/carpets/ottoman_carpet.glb",
            ModelPlacement::new(
                ModelFit::Footprint {
                    width: CORRIDOR_WIDTH - 0.6,
                    length: CORRIDOR_LENGTH - 1.2,
                },
                Vec3::new(0.0, 0.005, BACK_Z - CORRIDOR_LENGTH / 2.0),
            ),
        )
        .named("carpet"),
    );

    desc.model(
        ModelDesc::new(
            "models/fountain/ottoman_fountain.glb",
            ModelPlacement::new(
                ModelFit::ClampedHeight {
                    height: 1.5,
                    min_scale: 0.001,
                    max_scale: 50.0,
                },
                Vec3::ZERO,
            ),
        )
        .named("fountain"),
    );
}

/// Painting quad with its frame and a spot light aimed at it.
fn add_artwork(desc: &mut SceneDesc, artwork: &Artwork) {
    let texture = desc.texture(format!("artworks/{}.jpg", artwork.id));
    let normal = artwork.normal();
    let painting_at = artwork.painting_position();
    let (w, h) = (artwork.size.x, artwork.size.y);

    let painting = desc.mesh(RawGeometry::plane(w, h));
    desc.spawn(
        EntityDesc::new(painting, Material::basic(Color::WHITE).texture(texture).double_sided())
            .at(painting_at)
            .yaw(artwork.yaw)
            .collider(Collider::quad(w, h))
            .label(artwork.title()),
    );

    let frame = desc.mesh(RawGeometry::plane(w + 0.18, h + 0.18));
    desc.spawn(
        EntityDesc::new(
            frame,
            Material::standard(Color::hex(0x1a1714))
                .roughness(0.9)
                .metalness(0.05)
                .double_sided(),
        )
        .at(painting_at - normal * 0.06)
        .yaw(artwork.yaw),
    );

    desc.light(
        Light::spot(
            Color::hex(0xffe6bf),
            1.2,
            painting_at + Vec3::Y * 1.2 + normal * 2.2,
            painting_at,
            18.0,
            PI / 7.5,
            0.55,
        )
        .with_decay(1.0),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing;
    use crate::light::MAX_LIGHTS;
    use crate::overlay::OverlayState;

    #[test]
    fn layout_has_eleven_paintings_facing_inward() {
        let layout = artwork_layout();
        assert_eq!(layout.len(), 11);
        for artwork in &layout {
            // Every painting faces back toward the hall center line.
            let to_center = Vec3::new(-artwork.position.x, 0.0, -artwork.position.z);
            assert!(artwork.normal().dot(to_center) > 0.0, "{artwork:?}");
        }
        assert_eq!(layout[10].id, 0);
        assert!((layout[10].position.z - (END_WALL_Z + 0.02)).abs() < 1e-5);
    }

    #[test]
    fn scene_fits_the_light_budget_with_lanterns() {
        let desc = Gallery::new().scene();
        // Four lantern glows arrive later with their models.
        assert!(desc.lights.len() + 4 <= MAX_LIGHTS);
        // Plaster, stone floor and ten distinct artwork images.
        assert_eq!(desc.textures.len(), 12);
        assert_eq!(desc.models.iter().filter(|m| m.glow.is_some()).count(), 4);
    }

    #[test]
    fn first_click_only_grabs_the_pointer() {
        let mut demo = Gallery::new();
        let (mut world, mut camera) = testing::build(&demo);
        let mut overlay = OverlayState::with_hud(demo.hud_lines());
        let mut input = Input::new();
        input.set_button(MouseButton::Left, true);

        let request = testing::frame(&mut demo, &mut world, &mut camera, &mut overlay, &input, 0.016, 0.0);
        assert_eq!(request, Some(true));
        assert!(!demo.walkthrough().is_focusing());

        demo.on_pointer_lock_changed(true, &mut overlay);
        assert!(!overlay.hud_visible);
    }

    #[test]
    fn key_light_breathes() {
        let mut demo = Gallery::new();
        let (mut world, mut camera) = testing::build(&demo);
        let mut overlay = OverlayState::default();
        let input = Input::new();
        testing::frame(&mut demo, &mut world, &mut camera, &mut overlay, &input, 0.03, 0.03);
        let intensity = world.light_intensity(KEY_LIGHT).unwrap();
        assert!((intensity - Breathing::new(KEY_INTENSITY).intensity(0.03)).abs() < 1e-6);
    }

    #[test]
    fn unlocked_walkthrough_ignores_movement() {
        let start = Pose::new(START_POSITION, Quat::IDENTITY);
        let mut walk = Walkthrough::new(&start);
        let mut pose = start;
        walk.update(&mut pose, MoveKeys::all(), Vec2::new(50.0, 0.0), false, 0.016);
        assert_eq!(pose, start);
    }
}
