//! Camera-to-subject focus transition.
//!
//! Selecting a flat surface (a painting) eases the camera from wherever it is to a
//! framing pose in front of that surface. The tween runs for a fixed duration with a
//! smoothstep curve applied to both the position lerp and the orientation slerp, then
//! holds at the target until [`FocusTransition::cancel`] is called.
//!
//! Cancelling leaves the camera exactly where the last frame put it; there is no
//! snap back to the starting pose.
//!
//! ```
//! use tableau::{FocusTransition, Pose, Quat, Vec3, framing_pose};
//!
//! let mut focus = FocusTransition::default();
//! let start = Pose::new(Vec3::new(0.0, 1.7, 10.0), Quat::IDENTITY);
//! let target = framing_pose(Vec3::new(3.0, 1.0, -5.0), Vec3::Z, 2.1, 0.12);
//!
//! assert!(focus.start(start, target));
//! let pose = focus.advance(10.0).unwrap();
//! assert_eq!(pose, target);
//! ```

use glam::{Quat, Vec3};

use crate::camera::Pose;

/// Seconds a focus transition takes to reach its target.
pub const FOCUS_DURATION: f32 = 0.65;
/// Distance in front of the surface the camera stops at.
pub const VIEW_DISTANCE: f32 = 2.1;
/// Extra height added to the framing position.
pub const VIEW_LIFT: f32 = 0.12;

/// Cubic ease `u²(3 − 2u)`, clamped to [0, 1].
pub fn smoothstep(u: f32) -> f32 {
    let u = u.clamp(0.0, 1.0);
    u * u * (3.0 - 2.0 * u)
}

/// Pose that frames a surface point: `distance` along the surface normal, lifted by
/// `lift`, looking back at the point.
pub fn framing_pose(point: Vec3, normal: Vec3, distance: f32, lift: f32) -> Pose {
    let position = point + normal.normalize_or_zero() * distance + Vec3::Y * lift;
    Pose::looking_at(position, point)
}

/// [`framing_pose`] for a surface whose front face is its local +Z axis.
pub fn framing_pose_for_surface(position: Vec3, orientation: Quat, distance: f32, lift: f32) -> Pose {
    framing_pose(position, orientation * Vec3::Z, distance, lift)
}

/// State of an in-flight (or held) focus transition.
#[derive(Clone, Debug)]
pub struct FocusTransition {
    active: bool,
    elapsed: f32,
    duration: f32,
    from: Pose,
    to: Pose,
}

impl Default for FocusTransition {
    fn default() -> Self {
        Self::new(FOCUS_DURATION)
    }
}

impl FocusTransition {
    pub fn new(duration: f32) -> Self {
        Self {
            active: false,
            elapsed: 0.0,
            duration,
            from: Pose::default(),
            to: Pose::default(),
        }
    }

    /// True from [`start`](Self::start) until [`cancel`](Self::cancel), including
    /// while holding at the target.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn target(&self) -> Pose {
        self.to
    }

    /// Fraction of the duration elapsed, clamped to [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }

    /// Begin a transition. Ignored (returns `false`) while one is already active.
    pub fn start(&mut self, from: Pose, to: Pose) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.elapsed = 0.0;
        self.from = from;
        self.to = to;
        true
    }

    /// Advance by `dt` seconds and return the pose to render, or `None` when inactive.
    pub fn advance(&mut self, dt: f32) -> Option<Pose> {
        if !self.active {
            return None;
        }
        self.elapsed += dt.max(0.0);
        Some(self.pose())
    }

    /// Interpolated pose at the current elapsed time.
    pub fn pose(&self) -> Pose {
        let u = self.progress();
        if u >= 1.0 {
            return self.to;
        }
        let s = smoothstep(u);
        if s <= 0.0 {
            return self.from;
        }
        Pose {
            position: self.from.position.lerp(self.to.position, s),
            orientation: self.from.orientation.slerp(self.to.orientation, s),
        }
    }

    /// Stop the transition. The caller keeps whatever pose it last applied.
    /// Returns `true` if a transition was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        self.elapsed = 0.0;
        was_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_pose() -> Pose {
        Pose::new(Vec3::new(0.0, 1.7, 10.0), Quat::from_rotation_y(0.4))
    }

    #[test]
    fn smoothstep_endpoints_and_midpoint() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(-3.0), 0.0);
        assert_eq!(smoothstep(7.0), 1.0);
    }

    #[test]
    fn smoothstep_is_non_decreasing() {
        let mut prev = smoothstep(0.0);
        for i in 1..=1000 {
            let next = smoothstep(i as f32 / 1000.0);
            assert!(next >= prev, "smoothstep decreased at step {i}");
            prev = next;
        }
    }

    #[test]
    fn framing_pose_in_front_of_surface() {
        let pose = framing_pose(Vec3::new(3.0, 1.0, -5.0), Vec3::Z, VIEW_DISTANCE, VIEW_LIFT);
        assert!((pose.position - Vec3::new(3.0, 1.12, -2.9)).length() < 1e-5);
        let to_hit = (Vec3::new(3.0, 1.0, -5.0) - pose.position).normalize();
        assert!((pose.forward() - to_hit).length() < 1e-4);
    }

    #[test]
    fn surface_orientation_rotates_normal() {
        // A painting on the left wall faces +X.
        let orientation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let pose = framing_pose_for_surface(Vec3::new(-8.9, 2.65, 0.0), orientation, 2.1, 0.0);
        assert!((pose.position - Vec3::new(-6.8, 2.65, 0.0)).length() < 1e-4);
    }

    #[test]
    fn zero_elapsed_is_start_pose() {
        let from = start_pose();
        let to = framing_pose(Vec3::new(3.0, 1.0, -5.0), Vec3::Z, 2.1, 0.12);
        let mut focus = FocusTransition::default();
        assert!(focus.start(from, to));
        assert_eq!(focus.advance(0.0), Some(from));
    }

    #[test]
    fn past_duration_is_exact_target_and_holds() {
        let from = start_pose();
        let to = framing_pose(Vec3::new(3.0, 1.0, -5.0), Vec3::Z, 2.1, 0.12);
        let mut focus = FocusTransition::default();
        focus.start(from, to);
        assert_eq!(focus.advance(FOCUS_DURATION), Some(to));
        assert_eq!(focus.advance(5.0), Some(to));
        assert!(focus.is_active());
    }

    #[test]
    fn midway_is_between_endpoints() {
        let from = start_pose();
        let to = Pose::new(Vec3::new(0.0, 1.7, 0.0), Quat::IDENTITY);
        let mut focus = FocusTransition::new(1.0);
        focus.start(from, to);
        let pose = focus.advance(0.5).unwrap();
        assert!((pose.position - Vec3::new(0.0, 1.7, 5.0)).length() < 1e-5);
    }

    #[test]
    fn start_while_active_is_ignored() {
        let mut focus = FocusTransition::default();
        let first = Pose::new(Vec3::X, Quat::IDENTITY);
        let second = Pose::new(Vec3::Y, Quat::IDENTITY);
        assert!(focus.start(Pose::default(), first));
        focus.advance(0.2);
        assert!(!focus.start(Pose::default(), second));
        assert_eq!(focus.target(), first);
        assert!((focus.elapsed() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn cancel_resets_and_reports() {
        let mut focus = FocusTransition::default();
        assert!(!focus.cancel());
        focus.start(start_pose(), Pose::default());
        focus.advance(0.1);
        assert!(focus.cancel());
        assert!(!focus.is_active());
        assert_eq!(focus.advance(0.1), None);
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let to = Pose::new(Vec3::ONE, Quat::IDENTITY);
        let mut focus = FocusTransition::new(0.0);
        focus.start(start_pose(), to);
        assert_eq!(focus.advance(0.0), Some(to));
    }
}
