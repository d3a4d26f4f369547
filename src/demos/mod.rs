//! The demo scenes.
//!
//! A demo describes its scene once through [`Demo::scene`] and then drives it every
//! frame from [`Demo::update`]. All per-demo state lives in the implementing struct and
//! everything the frame needs arrives through [`DemoContext`], so demo logic runs
//! unchanged in tests without a window or GPU.

mod gallery;
mod lights;
mod ortho;
mod picking;
mod primitives;
mod textured;
mod town;

pub use gallery::{Artwork, Gallery, Walkthrough, artwork_layout};
pub use lights::LightStudy;
pub use ortho::OrthoBox;
pub use picking::{CubePicker, Pulse};
pub use primitives::Primitives;
pub use textured::TexturedSphere;
pub use town::Town;

use glam::Vec2;

use crate::camera::Camera;
use crate::input::Input;
use crate::overlay::Overlay;
use crate::scene::{SceneDesc, SceneWorld};

/// Everything a demo may read or change during one frame.
pub struct DemoContext<'a> {
    pub world: &'a mut SceneWorld,
    pub input: &'a Input,
    pub camera: &'a mut Camera,
    pub overlay: &'a mut dyn Overlay,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Seconds since the demo started.
    pub time: f32,
    /// Window size in pixels.
    pub viewport: Vec2,
    pub pointer_locked: bool,
    /// Pointer lock change requested this frame; applied by the app after `update`.
    pub lock_request: Option<bool>,
}

impl<'a> DemoContext<'a> {
    pub fn new(
        world: &'a mut SceneWorld,
        input: &'a Input,
        camera: &'a mut Camera,
        overlay: &'a mut dyn Overlay,
    ) -> Self {
        Self {
            world,
            input,
            camera,
            overlay,
            dt: 0.0,
            time: 0.0,
            viewport: Vec2::new(1280.0, 720.0),
            pointer_locked: false,
            lock_request: None,
        }
    }

    pub fn request_pointer_lock(&mut self) {
        self.lock_request = Some(true);
    }

    pub fn release_pointer_lock(&mut self) {
        self.lock_request = Some(false);
    }
}

/// One scene plus its per-frame behavior.
pub trait Demo {
    /// Window title.
    fn title(&self) -> &str;

    /// Declarative scene, consumed once by [`SceneWorld::build`].
    fn scene(&self) -> SceneDesc;

    /// Lines for the instructions HUD.
    fn hud_lines(&self) -> Vec<String> {
        Vec::new()
    }

    fn update(&mut self, ctx: &mut DemoContext);

    /// Whether the app may grab the pointer for this demo.
    fn wants_pointer_lock(&self) -> bool {
        false
    }

    /// Called by the app after the pointer was grabbed or released.
    fn on_pointer_lock_changed(&mut self, _locked: bool, _overlay: &mut dyn Overlay) {}
}

/// Demo selector for the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DemoKind {
    /// First-person gallery walkthrough with click-to-focus paintings
    Gallery,
    /// Small town block with live lighting tweaks
    Town,
    /// Spinning primitives over a gradient background
    Primitives,
    /// Every light type on a shared material
    Lights,
    /// Click random cubes to select them
    Picking,
    /// Texture-mapped rotating sphere
    Textured,
    /// Orthographic wireframe box
    Ortho,
}

impl DemoKind {
    pub fn create(self, seed: u32) -> Box<dyn Demo> {
        match self {
            DemoKind::Gallery => Box::new(Gallery::new()),
            DemoKind::Town => Box::new(Town::new()),
            DemoKind::Primitives => Box::new(Primitives::new()),
            DemoKind::Lights => Box::new(LightStudy::new()),
            DemoKind::Picking => Box::new(CubePicker::new(seed)),
            DemoKind::Textured => Box::new(TexturedSphere::new()),
            DemoKind::Ortho => Box::new(OrthoBox::new()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::overlay::OverlayState;
    use crate::rng::SeededRandom;

    /// Builds a demo's world and camera the way the app does.
    pub fn build(demo: &dyn Demo) -> (SceneWorld, Camera) {
        let desc = demo.scene();
        let mut camera = desc.camera;
        camera.set_viewport(1280, 720);
        let (world, _) = SceneWorld::build(desc, SeededRandom::new(1));
        (world, camera)
    }

    /// Runs one frame of `demo` and returns the requested lock change.
    pub fn frame(
        demo: &mut dyn Demo,
        world: &mut SceneWorld,
        camera: &mut Camera,
        overlay: &mut OverlayState,
        input: &Input,
        dt: f32,
        time: f32,
    ) -> Option<bool> {
        let mut ctx = DemoContext::new(world, input, camera, overlay);
        ctx.dt = dt;
        ctx.time = time;
        demo.update(&mut ctx);
        ctx.lock_request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayState;

    #[test]
    fn every_demo_builds_a_scene() {
        for kind in [
            DemoKind::Gallery,
            DemoKind::Town,
            DemoKind::Primitives,
            DemoKind::Lights,
            DemoKind::Picking,
            DemoKind::Textured,
            DemoKind::Ortho,
        ] {
            let mut demo = kind.create(5);
            let (mut world, mut camera) = testing::build(demo.as_ref());
            assert!(world.mesh_count() > 0, "{kind:?}");
            let mut overlay = OverlayState::default();
            let input = Input::new();
            testing::frame(demo.as_mut(), &mut world, &mut camera, &mut overlay, &input, 0.016, 0.016);
            assert!(camera.view_projection().is_finite(), "{kind:?}");
        }
    }
}
