//! Camera pose and projection.
//!
//! A [`Camera`] is a [`Pose`] (world position plus orientation quaternion) and a
//! [`Projection`]. Controllers such as the orbit camera, the pointer-look camera and
//! the focus transition all produce poses; the renderer only ever reads the camera.
//!
//! Orientation follows the usual right-handed convention: an identity orientation
//! looks down -Z with +Y up.

use glam::{Mat3, Mat4, Quat, Vec3};

/// World-space position and orientation of a camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            orientation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// A pose at `position` oriented to look at `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            orientation: look_rotation(position, target),
        }
    }

    /// Direction the camera faces.
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// World-to-camera transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }
}

/// Orientation of a camera at `eye` looking toward `target` with +Y as up.
///
/// Falls back to +Z as the up hint when looking straight up or down, and to the
/// identity rotation when `eye` and `target` coincide.
pub fn look_rotation(eye: Vec3, target: Vec3) -> Quat {
    let Some(forward) = (target - eye).try_normalize() else {
        return Quat::IDENTITY;
    };
    let up_hint = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let right = forward.cross(up_hint).normalize();
    let up = right.cross(forward);
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
}

/// Camera projection, kept in sync with the viewport via [`Projection::set_viewport`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    /// Orthographic box spanning `±half_height` vertically and `±half_height * aspect`
    /// horizontally.
    Orthographic {
        half_height: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    /// Perspective projection with the field of view given in degrees.
    pub fn perspective(fov_degrees: f32, near: f32, far: f32) -> Self {
        Self::Perspective {
            fov_y: fov_degrees.to_radians(),
            aspect: 1.0,
            near,
            far,
        }
    }

    pub fn orthographic(half_height: f32, near: f32, far: f32) -> Self {
        Self::Orthographic {
            half_height,
            aspect: 1.0,
            near,
            far,
        }
    }

    /// Recompute the aspect ratio from a new viewport size. Zero heights are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let new_aspect = width as f32 / height as f32;
        match self {
            Projection::Perspective { aspect, .. } | Projection::Orthographic { aspect, .. } => {
                *aspect = new_aspect;
            }
        }
    }

    pub fn aspect(&self) -> f32 {
        match self {
            Projection::Perspective { aspect, .. } | Projection::Orthographic { aspect, .. } => {
                *aspect
            }
        }
    }

    /// Left/right/bottom/top of an orthographic projection.
    pub fn ortho_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        match *self {
            Projection::Orthographic {
                half_height,
                aspect,
                ..
            } => {
                let half_width = half_height * aspect;
                Some((-half_width, half_width, -half_height, half_height))
            }
            Projection::Perspective { .. } => None,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov_y, aspect, near, far),
            Projection::Orthographic { near, far, .. } => {
                let (left, right, bottom, top) = self.ortho_bounds().unwrap_or_default();
                Mat4::orthographic_rh(left, right, bottom, top, near, far)
            }
        }
    }
}

/// The camera the renderer draws with.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub pose: Pose,
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pose: Pose::default(),
            projection: Projection::perspective(75.0, 0.1, 1000.0),
        }
    }
}

impl Camera {
    pub fn new(pose: Pose, projection: Projection) -> Self {
        Self { pose, projection }
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.pose.view_matrix()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Resize handler: keep the projection's aspect in step with the window.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.projection.set_viewport(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn looking_at_faces_target() {
        let pose = Pose::looking_at(Vec3::new(3.0, 1.12, -2.9), Vec3::new(3.0, 1.0, -5.0));
        let expected = (Vec3::new(3.0, 1.0, -5.0) - Vec3::new(3.0, 1.12, -2.9)).normalize();
        assert!(approx(pose.forward(), expected));
        assert!(pose.right().y.abs() < 1e-5);
    }

    #[test]
    fn view_matrix_puts_target_on_negative_z() {
        let pose = Pose::looking_at(Vec3::new(4.0, 3.0, 8.0), Vec3::ZERO);
        let p = pose.view_matrix().transform_point3(Vec3::ZERO);
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
        assert!(p.z < 0.0);
    }

    #[test]
    fn look_straight_down_is_finite() {
        let q = look_rotation(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO);
        assert!(q.is_finite());
        assert!(approx(q * Vec3::NEG_Z, Vec3::NEG_Y));
    }

    #[test]
    fn resize_updates_perspective_aspect() {
        let mut camera = Camera::default();
        camera.set_viewport(1600, 900);
        assert!((camera.projection.aspect() - 16.0 / 9.0).abs() < 1e-6);
        camera.set_viewport(1600, 0);
        assert!((camera.projection.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn resize_updates_orthographic_bounds() {
        let mut projection = Projection::orthographic(1.0, 0.1, 100.0);
        projection.set_viewport(800, 400);
        assert_eq!(projection.ortho_bounds(), Some((-2.0, 2.0, -1.0, 1.0)));
    }
}
