//! # Tableau
//!
//! **Small wgpu scene demos around a walkthrough gallery.**
//!
//! The centerpiece is a first-person gallery: walk the hall with WASD, click a
//! painting and the camera glides to a framing pose in front of it. Six smaller
//! scenes cover primitives, the light types, ray picking, texturing and an
//! orthographic camera.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tableau::{AppConfig, DemoKind, run};
//!
//! fn main() -> Result<(), tableau::AppError> {
//!     let demo = DemoKind::Gallery.create(7);
//!     run(AppConfig::new().title(demo.title()).assets("assets"), demo)
//! }
//! ```
//!
//! ## Layout
//!
//! - **Scenes are data.** A demo returns a [`SceneDesc`]; [`SceneWorld::build`] turns it
//!   into a `hecs` world plus a list of asset loads.
//! - **Logic never touches the GPU.** Demos run against [`DemoContext`], so the
//!   focus, navigation and picking rules are tested without a window.
//! - **Assets stream in.** Textures and models load on background threads and attach
//!   in whatever order they finish.
//!
//! The focus transition on its own:
//!
//! ```
//! use tableau::{FocusTransition, Pose, Vec3, framing_pose};
//!
//! let start = Pose::looking_at(Vec3::new(0.0, 1.7, 10.0), Vec3::ZERO);
//! let target = framing_pose(Vec3::new(3.0, 1.0, -5.0), Vec3::Z, 2.1, 0.12);
//!
//! let mut focus = FocusTransition::default();
//! assert!(focus.start(start, target));
//! let pose = focus.advance(1.0).unwrap();
//! assert!((pose.position - Vec3::new(3.0, 1.12, -2.9)).length() < 1e-4);
//! ```

mod app;
mod assets;
mod background_pass;
mod camera;
mod color;
pub mod demos;
mod draw2d;
mod error;
mod flicker;
mod focus;
mod freelook_camera;
mod geometry;
mod gpu;
mod input;
mod light;
mod loader;
mod material;
mod mesh;
mod mesh_pass;
mod model;
mod navigation;
mod orbit_camera;
mod overlay;
mod picking;
mod renderer;
mod rng;
pub mod scene;
mod texture;
mod tweaks;

pub use app::{AppConfig, run};
pub use assets::{Assets, FontAtlas, FontId, SYSTEM_FONT_CANDIDATES, find_font};
pub use camera::{Camera, Pose, Projection, look_rotation};
pub use color::Color;
pub use demos::{Demo, DemoContext, DemoKind};
pub use error::{AppError, AssetError};
pub use flicker::{Breathing, LanternGlow};
pub use focus::{
    FOCUS_DURATION, FocusTransition, VIEW_DISTANCE, VIEW_LIFT, framing_pose,
    framing_pose_for_surface, smoothstep,
};
pub use freelook_camera::PointerLook;
pub use geometry::RawGeometry;
pub use gpu::GpuContext;
pub use input::Input;
pub use light::{Light, LightUniforms, MAX_LIGHTS};
pub use loader::{AssetLoader, AssetRequest, LoadResult, LoadedAsset};
pub use material::{Material, MeshId, TextureId};
pub use mesh::{Mesh, Transform, Vertex3d};
pub use model::{ModelData, ModelFit, ModelPart, ModelPlacement};
pub use navigation::{
    EYE_HEIGHT, FloorRect, MAX_STEP_DT, MoveKeys, NavigationBounds, Navigator, Region, WALK_SPEED,
};
pub use orbit_camera::OrbitCamera;
pub use overlay::{Overlay, OverlayState};
pub use picking::{Collider, Ray, RayHit, raycast, raycast_all, screen_to_ndc};
pub use renderer::Renderer;
pub use rng::SeededRandom;
pub use scene::{SceneDesc, SceneWorld};
pub use texture::{ImageData, Texture};
pub use tweaks::{Tweak, TweakId, TweakPanel};

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

// Re-export commonly used winit types for convenience
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

pub use hecs::{Entity, World};
