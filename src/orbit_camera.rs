use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use winit::event::MouseButton;

use crate::camera::Pose;
use crate::input::Input;

/// A camera controller that orbits around a target point, with inertia.
///
/// Dragging with the left button queues rotation; each frame only a `damping` share
/// of the queue is applied, so the view keeps drifting briefly after the button is
/// released.
///
/// # Example
/// ```ignore
/// let mut orbit = OrbitCamera::looking_from(Vec3::new(4.0, 3.0, 8.0), Vec3::ZERO);
///
/// // In frame loop:
/// orbit.update(frame.input);
/// camera.pose = orbit.pose();
/// ```
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Distance from target.
    pub distance: f32,
    /// Horizontal angle in radians (yaw).
    pub azimuth: f32,
    /// Vertical angle in radians (pitch), clamped to avoid gimbal lock.
    pub elevation: f32,
    /// Radians per pixel of drag.
    pub sensitivity: f32,
    /// Scroll zoom sensitivity, as a fraction of distance per line.
    pub zoom_sensitivity: f32,
    /// Share of the queued rotation applied per frame.
    pub damping: f32,
    /// Minimum distance from target.
    pub min_distance: f32,
    /// Maximum distance from target.
    pub max_distance: f32,
    pending: Vec2,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            azimuth: 0.0,
            elevation: 0.3,
            sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            damping: 0.05,
            min_distance: 0.5,
            max_distance: 500.0,
            pending: Vec2::ZERO,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// An orbit whose starting pose is `eye` looking at `target`.
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(1e-3);
        Self {
            target,
            distance,
            azimuth: offset.x.atan2(offset.z),
            elevation: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            ..Self::default()
        }
        .clamped()
    }

    /// Set the target point to orbit around.
    pub fn target(mut self, target: impl Into<Vec3>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the distance from target.
    pub fn distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self.clamped()
    }

    /// Set the damping factor. Zero applies drag immediately with no drift.
    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    /// Set distance limits.
    pub fn distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self.clamped()
    }

    fn clamp(&mut self) {
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        self.elevation = self.elevation.clamp(-FRAC_PI_2 + 0.01, FRAC_PI_2 - 0.01);
    }

    fn clamped(mut self) -> Self {
        self.clamp();
        self
    }

    /// Update the camera from this frame's drag and scroll.
    pub fn update(&mut self, input: &Input) {
        if input.mouse_down(MouseButton::Left) {
            self.nudge(input.mouse_delta());
        }

        let scroll = input.scroll_delta();
        if scroll.y.abs() > 0.0 {
            self.distance *= 1.0 - scroll.y * self.zoom_sensitivity;
        }

        self.step();
    }

    /// Applies a `damping` share of the pending rotation and keeps the rest for
    /// later frames.
    pub fn step(&mut self) {
        let applied = if self.damping > 0.0 {
            self.pending * self.damping
        } else {
            self.pending
        };
        self.azimuth += applied.x;
        self.elevation += applied.y;
        self.pending -= applied;
        if self.pending.length_squared() < 1e-12 {
            self.pending = Vec2::ZERO;
        }
        self.clamp();
    }

    /// Queues rotation as if the pointer had been dragged by `pixels`.
    pub fn nudge(&mut self, pixels: Vec2) {
        self.pending += Vec2::new(-pixels.x, pixels.y) * self.sensitivity;
    }

    pub fn position(&self) -> Vec3 {
        let offset = Vec3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        );
        self.target + offset
    }

    /// Current camera pose, always looking at the target.
    pub fn pose(&self) -> Pose {
        Pose::looking_at(self.position(), self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_from_reproduces_eye() {
        let eye = Vec3::new(10.0, 8.0, 12.0);
        let orbit = OrbitCamera::looking_from(eye, Vec3::new(0.0, 1.0, 0.0));
        assert!((orbit.position() - eye).length() < 1e-4);
    }

    #[test]
    fn nudge_drifts_then_settles() {
        let mut orbit = OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 8.0), Vec3::ZERO);
        orbit.nudge(Vec2::new(40.0, 0.0));
        orbit.step();
        let after_first = orbit.azimuth;
        assert!(after_first < 0.0);

        for _ in 0..2000 {
            orbit.step();
        }
        let settled = orbit.azimuth;
        orbit.step();
        assert_eq!(orbit.azimuth, settled);
        assert!(settled < after_first);
    }

    #[test]
    fn elevation_never_reaches_pole() {
        let mut orbit = OrbitCamera::new();
        orbit.nudge(Vec2::new(0.0, 1.0e5));
        orbit.step();
        assert!(orbit.elevation < FRAC_PI_2);
        assert!(orbit.pose().orientation.is_finite());
    }
}
