//! Pointer-locked mouse look.
//!
//! [`PointerLook`] turns raw pointer motion into a yaw/pitch orientation, the way a
//! first-person shooter does. It only owns the orientation; position is the
//! navigator's business.
//!
//! # Example
//!
//! ```
//! use tableau::{PointerLook, Pose, Vec2, Vec3};
//!
//! let mut look = PointerLook::new();
//! // Pointer moved 100 px to the right while locked.
//! look.apply(Vec2::new(100.0, 0.0));
//!
//! let pose = Pose::new(Vec3::ZERO, look.orientation());
//! assert!(pose.forward().x > 0.0);
//! ```

use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Quat, Vec2};

/// Yaw/pitch orientation driven by pointer motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerLook {
    /// Rotation about world Y in radians. Zero looks down -Z.
    pub yaw: f32,
    /// Rotation about the camera's X axis in radians, positive looks up.
    pub pitch: f32,
    /// Radians per pixel of pointer motion.
    pub sensitivity: f32,
    /// Pitch limit in either direction.
    pub max_pitch: f32,
}

impl Default for PointerLook {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            sensitivity: 0.002,
            max_pitch: FRAC_PI_2 - 0.01,
        }
    }
}

impl PointerLook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing orientation.
    pub fn facing(mut self, orientation: Quat) -> Self {
        self.sync_from(orientation);
        self
    }

    /// Re-derive yaw and pitch from an orientation set elsewhere, e.g. after a
    /// focus transition moved the camera. Roll is discarded.
    pub fn sync_from(&mut self, orientation: Quat) {
        let (yaw, pitch, _) = orientation.to_euler(EulerRot::YXZ);
        self.yaw = yaw;
        self.pitch = pitch.clamp(-self.max_pitch, self.max_pitch);
    }

    /// Apply a pointer delta in pixels. Moving right turns right, moving down looks down.
    pub fn apply(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.sensitivity;
        self.pitch = (self.pitch - delta.y * self.sensitivity).clamp(-self.max_pitch, self.max_pitch);
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}
