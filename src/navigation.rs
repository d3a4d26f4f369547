//! Bounded first-person walking.
//!
//! Directional keys become a 2D movement vector (normalized when it would exceed unit
//! length), scaled by walk speed and a capped frame time, and applied along the
//! camera's horizontal forward/right axes. The result is then clamped into one of two
//! rectangular regions: the main hall, or the narrower corridor behind it. Which
//! rectangle applies is decided by the depth (z) coordinate alone, so no collision
//! geometry is needed to keep the walker inside the walls.

use glam::{Vec2, Vec3};
use winit::keyboard::KeyCode;

use crate::camera::Pose;
use crate::input::Input;

/// Walking speed in world units per second.
pub const WALK_SPEED: f32 = 6.2;
/// Height the camera is pinned to while walking.
pub const EYE_HEIGHT: f32 = 1.7;
/// Upper bound on the frame time fed to a single navigation step.
pub const MAX_STEP_DT: f32 = 0.033;

/// The four directional flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveKeys {
    pub fn all() -> Self {
        Self {
            forward: true,
            back: true,
            left: true,
            right: true,
        }
    }

    /// Snapshot WASD from the current input state.
    pub fn from_input(input: &Input) -> Self {
        let mut keys = Self::default();
        for key in [KeyCode::KeyW, KeyCode::KeyS, KeyCode::KeyA, KeyCode::KeyD] {
            keys.apply(key, input.key_down(key));
        }
        keys
    }

    /// Apply a key-down (`pressed == true`) or key-up edge. Returns `false` for keys
    /// that are not movement keys.
    pub fn apply(&mut self, key: KeyCode, pressed: bool) -> bool {
        let flag = match key {
            KeyCode::KeyW => &mut self.forward,
            KeyCode::KeyS => &mut self.back,
            KeyCode::KeyA => &mut self.left,
            KeyCode::KeyD => &mut self.right,
            _ => return false,
        };
        *flag = pressed;
        true
    }

    /// Movement as `(right, forward)` with magnitude at most 1.
    pub fn movement(&self) -> Vec2 {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
        let v = Vec2::new(axis(self.right, self.left), axis(self.forward, self.back));
        if v.length_squared() > 1.0 {
            v.normalize()
        } else {
            v
        }
    }
}

/// Axis-aligned rectangle on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloorRect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl FloorRect {
    pub fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y,
            p.z.clamp(self.min_z, self.max_z),
        )
    }
}

/// Which region a position falls in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Room,
    Corridor,
}

/// Room + corridor clamp rules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigationBounds {
    pub room: FloorRect,
    pub corridor: FloorRect,
    /// Positions with `z` strictly below this use the corridor rectangle.
    pub corridor_threshold: f32,
    pub eye_height: f32,
}

impl NavigationBounds {
    /// Bounds for an 18×26 hall with a 4.6-wide, 7.5-long corridor behind its back
    /// wall at z = -13.
    pub fn gallery() -> Self {
        let back_wall_z = -13.0;
        let corridor_half_width = 4.6 / 2.0 - 0.25;
        let corridor_length = 7.5;
        Self {
            room: FloorRect::new(-7.8, 7.8, -11.8, 11.8),
            corridor: FloorRect::new(
                -corridor_half_width,
                corridor_half_width,
                back_wall_z - corridor_length + 0.35,
                -11.8,
            ),
            corridor_threshold: -11.8,
            eye_height: EYE_HEIGHT,
        }
    }

    pub fn region(&self, position: Vec3) -> Region {
        if position.z < self.corridor_threshold {
            Region::Corridor
        } else {
            Region::Room
        }
    }

    /// Clamp into the region selected by `position.z` and pin the height.
    ///
    /// Only depth picks the region, so stepping past the room's back limit away
    /// from the corridor mouth snaps `x` into the corridor width in one frame.
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        let rect = match self.region(position) {
            Region::Room => &self.room,
            Region::Corridor => &self.corridor,
        };
        let mut p = rect.clamp(position);
        p.y = self.eye_height;
        p
    }
}

/// Walk controller: speed, frame-time cap and bounds.
#[derive(Clone, Copy, Debug)]
pub struct Navigator {
    pub speed: f32,
    pub max_dt: f32,
    pub bounds: NavigationBounds,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            speed: WALK_SPEED,
            max_dt: MAX_STEP_DT,
            bounds: NavigationBounds::gallery(),
        }
    }
}

impl Navigator {
    pub fn new(bounds: NavigationBounds) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }

    /// Move `pose` one frame and return the clamped position.
    pub fn step(&self, pose: &Pose, keys: MoveKeys, dt: f32) -> Vec3 {
        let dt = dt.clamp(0.0, self.max_dt);
        let movement = keys.movement() * self.speed * dt;

        // Horizontal axes only, so looking up or down does not change walking speed.
        let right = Vec3::new(pose.right().x, 0.0, pose.right().z).normalize_or(Vec3::X);
        let forward = Vec3::Y.cross(right);

        let moved = pose.position + right * movement.x + forward * movement.y;
        self.bounds.clamp(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn every_key_combination() -> impl Iterator<Item = MoveKeys> {
        (0u8..16).map(|bits| MoveKeys {
            forward: bits & 1 != 0,
            back: bits & 2 != 0,
            left: bits & 4 != 0,
            right: bits & 8 != 0,
        })
    }

    #[test]
    fn movement_never_exceeds_unit_length() {
        for keys in every_key_combination() {
            assert!(keys.movement().length() <= 1.0 + 1e-6, "{keys:?}");
        }
    }

    #[test]
    fn diagonal_is_not_faster() {
        let diagonal = MoveKeys {
            forward: true,
            right: true,
            ..Default::default()
        };
        let straight = MoveKeys {
            forward: true,
            ..Default::default()
        };
        assert!((diagonal.movement().length() - straight.movement().length()).abs() < 1e-6);
    }

    #[test]
    fn key_edges_toggle_flags() {
        let mut keys = MoveKeys::default();
        assert!(keys.apply(KeyCode::KeyW, true));
        assert!(keys.forward);
        assert!(keys.apply(KeyCode::KeyW, false));
        assert!(!keys.forward);
        assert!(!keys.apply(KeyCode::KeyQ, true));
    }

    #[test]
    fn input_snapshot_reads_wasd() {
        let mut input = Input::new();
        input.set_key(KeyCode::KeyW, true);
        input.set_key(KeyCode::KeyD, true);
        input.set_key(KeyCode::KeyQ, true);
        let keys = MoveKeys::from_input(&input);
        assert_eq!(
            keys,
            MoveKeys {
                forward: true,
                right: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn clamp_is_idempotent() {
        let bounds = NavigationBounds::gallery();
        let samples = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(50.0, 3.0, 50.0),
            Vec3::new(-50.0, -3.0, -50.0),
            Vec3::new(3.0, 1.7, -11.8),
            Vec3::new(6.0, 1.7, -15.0),
            Vec3::new(-1.0, 1.7, -12.0),
        ];
        for p in samples {
            let once = bounds.clamp(p);
            assert_eq!(bounds.clamp(once), once, "{p:?}");
        }
    }

    #[test]
    fn room_clamp_pins_height() {
        let bounds = NavigationBounds::gallery();
        let p = bounds.clamp(Vec3::new(20.0, 9.0, 20.0));
        assert_eq!(p, Vec3::new(7.8, EYE_HEIGHT, 11.8));
    }

    #[test]
    fn corridor_clamp_uses_corridor_width() {
        let bounds = NavigationBounds::gallery();
        let p = bounds.clamp(Vec3::new(5.0, 1.7, -15.0));
        assert_eq!(bounds.region(p), Region::Corridor);
        assert!((p.x - 2.05).abs() < 1e-6);
        assert_eq!(p.z, -15.0);
    }

    #[test]
    fn stepping_past_room_back_limit_snaps_into_corridor_width() {
        let nav = Navigator::default();
        let pose = Pose::new(Vec3::new(7.0, EYE_HEIGHT, -11.8), Quat::IDENTITY);
        let keys = MoveKeys {
            forward: true,
            ..Default::default()
        };
        let p = nav.step(&pose, keys, 0.016);
        assert_eq!(nav.bounds.region(p), Region::Corridor);
        assert_eq!(p.x, nav.bounds.corridor.max_x);
        assert!((p.z - (-11.8 - WALK_SPEED * 0.016)).abs() < 1e-5);
    }

    #[test]
    fn corridor_end_is_bounded() {
        let bounds = NavigationBounds::gallery();
        let p = bounds.clamp(Vec3::new(0.0, 1.7, -40.0));
        assert!((p.z - (-20.15)).abs() < 1e-5);
    }

    #[test]
    fn step_moves_forward_along_view() {
        let nav = Navigator::default();
        let pose = Pose::new(Vec3::new(0.0, EYE_HEIGHT, 0.0), Quat::IDENTITY);
        let keys = MoveKeys {
            forward: true,
            ..Default::default()
        };
        let p = nav.step(&pose, keys, 0.01);
        assert!((p.z - (-0.062)).abs() < 1e-5);
        assert_eq!(p.x, 0.0);
    }

    #[test]
    fn step_caps_frame_time() {
        let nav = Navigator::default();
        let pose = Pose::new(Vec3::new(0.0, EYE_HEIGHT, 0.0), Quat::IDENTITY);
        let keys = MoveKeys {
            right: true,
            ..Default::default()
        };
        let p = nav.step(&pose, keys, 2.0);
        assert!((p.x - WALK_SPEED * MAX_STEP_DT).abs() < 1e-5);
    }
}
