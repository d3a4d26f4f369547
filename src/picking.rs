//! Ray picking against entity colliders.
//!
//! - [`Ray`]: origin plus normalized direction, built from a screen point or NDC
//! - [`Collider`]: box, sphere or flat quad attached to an entity
//! - [`raycast`]: nearest hit among every entity with a [`Transform`] and [`Collider`]
//!
//! Colliders are tested in the entity's local space, so rotation and non-uniform scale
//! are honored without any per-shape special cases.
//!
//! ```
//! use tableau::{Collider, Ray, Transform, Vec3, World, raycast};
//!
//! let mut world = World::new();
//! let target = world.spawn((
//!     Transform::from_position(Vec3::new(0.0, 0.0, -5.0)),
//!     Collider::box_collider(Vec3::ONE),
//! ));
//!
//! let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
//! let hit = raycast(&world, &ray).unwrap();
//! assert_eq!(hit.entity, target);
//! assert!((hit.distance - 4.5).abs() < 1e-5);
//! ```

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::mesh::Transform;

/// A ray in 3D space.
///
/// Hit distances returned by the `intersect_*` methods are measured in units of
/// `direction`, which is unit length for every constructor here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Normalized direction.
    pub direction: Vec3,
}

impl Ray {
    /// The direction is normalized automatically.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray through a point in normalized device coordinates (`x`, `y` in [-1, 1], +y up).
    ///
    /// `(0, 0)` is the center of the screen, which is what a pointer-locked first-person
    /// view picks with.
    pub fn from_ndc(ndc: Vec2, view_matrix: Mat4, projection_matrix: Mat4) -> Self {
        let inv_view_proj = (projection_matrix * view_matrix).inverse();

        // wgpu clip space has depth in [0, 1]
        let near_world = inv_view_proj * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far_world = inv_view_proj * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        let near_point = near_world.truncate() / near_world.w;
        let far_point = far_world.truncate() / far_world.w;

        Self {
            origin: near_point,
            direction: (far_point - near_point).normalize_or_zero(),
        }
    }

    /// Ray through a pixel position, origin at the top left of the window.
    ///
    /// This is what the picking demo casts from the cursor. A pointer-locked view
    /// has no cursor and casts along the camera's forward axis instead.
    pub fn from_screen(
        screen_x: f32,
        screen_y: f32,
        screen_width: f32,
        screen_height: f32,
        view_matrix: Mat4,
        projection_matrix: Mat4,
    ) -> Self {
        Self::from_ndc(
            screen_to_ndc(screen_x, screen_y, screen_width, screen_height),
            view_matrix,
            projection_matrix,
        )
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the nearest forward intersection with an axis-aligned box.
    ///
    /// Slab test. A ray starting inside the box reports the exit distance; a box
    /// entirely behind the origin is a miss.
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for i in 0..3 {
            let origin = self.origin[i];
            let dir = self.direction[i];

            if dir.abs() < f32::EPSILON {
                // Parallel to this slab
                if origin < min[i] || origin > max[i] {
                    return None;
                }
            } else {
                let inv_dir = 1.0 / dir;
                let mut t1 = (min[i] - origin) * inv_dir;
                let mut t2 = (max[i] - origin) * inv_dir;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max {
                    return None;
                }
            }
        }

        nearest_positive(t_min, t_max)
    }

    /// Distance to the nearest forward intersection with a sphere.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let a = self.direction.dot(self.direction);
        let b = 2.0 * oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        nearest_positive((-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a))
    }

    /// Distance to a `2·half_size` rectangle centered at the origin in the XY plane.
    /// Both faces count.
    pub fn intersect_quad(&self, half_size: Vec2) -> Option<f32> {
        if self.direction.z.abs() < f32::EPSILON {
            return None;
        }
        let t = -self.origin.z / self.direction.z;
        if t <= 0.0 {
            return None;
        }
        let p = self.point_at(t);
        (p.x.abs() <= half_size.x && p.y.abs() <= half_size.y).then_some(t)
    }
}

/// Converts a pixel position to normalized device coordinates (+y up).
///
/// ```
/// use tableau::{Vec2, screen_to_ndc};
///
/// assert_eq!(screen_to_ndc(640.0, 360.0, 1280.0, 720.0), Vec2::ZERO);
/// assert_eq!(screen_to_ndc(0.0, 0.0, 1280.0, 720.0), Vec2::new(-1.0, 1.0));
/// ```
pub fn screen_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(2.0 * x / width - 1.0, 1.0 - 2.0 * y / height)
}

fn nearest_positive(t1: f32, t2: f32) -> Option<f32> {
    if t1 > 0.0 {
        Some(t1)
    } else if t2 > 0.0 {
        Some(t2)
    } else {
        None
    }
}

/// Collision shape in the entity's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collider {
    /// Box with the given half-extents.
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Flat rectangle in the local XY plane, matching [`RawGeometry::plane`](crate::RawGeometry::plane).
    Quad { half_size: Vec2 },
}

impl Collider {
    /// Box collider from full dimensions.
    pub fn box_collider(size: Vec3) -> Self {
        Self::Box {
            half_extents: size * 0.5,
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Quad collider from full width and height.
    pub fn quad(width: f32, height: f32) -> Self {
        Self::Quad {
            half_size: Vec2::new(width, height) * 0.5,
        }
    }

    /// Distance along `ray` to this collider placed at `transform`, or `None`.
    pub fn intersect(&self, ray: &Ray, transform: &Transform) -> Option<f32> {
        let inverse = transform.matrix().inverse();
        if !inverse.is_finite() {
            return None;
        }
        // The direction stays unnormalized so the hit parameter is a world distance.
        let local = Ray {
            origin: inverse.transform_point3(ray.origin),
            direction: inverse.transform_vector3(ray.direction),
        };
        match *self {
            Collider::Box { half_extents } => local.intersect_aabb(-half_extents, half_extents),
            Collider::Sphere { radius } => local.intersect_sphere(Vec3::ZERO, radius),
            Collider::Quad { half_size } => local.intersect_quad(half_size),
        }
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self::box_collider(Vec3::ONE)
    }
}

/// A ray-collider intersection.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub entity: hecs::Entity,
    /// Distance from the ray origin.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
}

/// Every hit, closest first.
///
/// Only entities carrying both a [`Transform`] and a [`Collider`] take part. Entities
/// without a collider, such as picture frames or lights, are never hit.
pub fn raycast_all(world: &hecs::World, ray: &Ray) -> Vec<RayHit> {
    let mut hits = Vec::new();

    for (entity, (transform, collider)) in world.query::<(&Transform, &Collider)>().iter() {
        if let Some(distance) = collider.intersect(ray, transform) {
            hits.push(RayHit {
                entity,
                distance,
                point: ray.point_at(distance),
            });
        }
    }

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// The closest hit, if any.
pub fn raycast(world: &hecs::World, ray: &Ray) -> Option<RayHit> {
    raycast_all(world, ray).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn aabb_hit_from_outside_and_inside() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(ray.intersect_aabb(Vec3::splat(-1.0), Vec3::splat(1.0)), Some(4.0));

        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(inside.intersect_aabb(Vec3::splat(-1.0), Vec3::splat(1.0)), Some(1.0));
    }

    #[test]
    fn aabb_behind_ray_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert_eq!(ray.intersect_aabb(Vec3::splat(-1.0), Vec3::splat(1.0)), None);
    }

    #[test]
    fn sphere_hit_distance() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = ray.intersect_sphere(Vec3::ZERO, 2.0).unwrap();
        assert!((t - 8.0).abs() < 1e-5);
    }

    #[test]
    fn quad_hits_either_face_and_respects_edges() {
        let quad = Collider::quad(2.4, 1.55);
        let front = Ray::new(Vec3::new(0.5, 0.5, 3.0), Vec3::NEG_Z);
        assert_eq!(quad.intersect(&front, &Transform::new()), Some(3.0));

        let back = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        assert_eq!(quad.intersect(&back, &Transform::new()), Some(2.0));

        let wide = Ray::new(Vec3::new(1.3, 0.0, 3.0), Vec3::NEG_Z);
        assert_eq!(quad.intersect(&wide, &Transform::new()), None);
    }

    #[test]
    fn rotated_quad_on_side_wall() {
        // Painting on the left wall (x = -9) facing +X.
        let transform = Transform::from_position(Vec3::new(-8.92, 2.65, 0.0))
            .rotation(Quat::from_rotation_y(FRAC_PI_2));
        let ray = Ray::new(Vec3::new(0.0, 2.65, 0.0), Vec3::NEG_X);
        let t = Collider::quad(2.4, 1.55).intersect(&ray, &transform).unwrap();
        assert!((t - 8.92).abs() < 1e-4);
    }

    #[test]
    fn scaled_box_grows_collider() {
        let transform = Transform::from_position(Vec3::new(0.0, 0.0, -5.0)).uniform_scale(2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let t = Collider::box_collider(Vec3::ONE).intersect(&ray, &transform).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn center_ray_points_forward() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 8.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(75f32.to_radians(), 4.0 / 3.0, 0.1, 100.0);
        let ray = Ray::from_ndc(Vec2::ZERO, view, proj);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
        assert!((ray.origin.z - 7.9).abs() < 1e-3);
    }

    #[test]
    fn screen_center_is_ndc_origin() {
        assert_eq!(screen_to_ndc(400.0, 300.0, 800.0, 600.0), Vec2::ZERO);
        assert_eq!(screen_to_ndc(0.0, 0.0, 800.0, 600.0), Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn raycast_returns_closest() {
        let mut world = hecs::World::new();
        let _far = world.spawn((
            Transform::from_position(Vec3::new(0.0, 0.0, -10.0)),
            Collider::box_collider(Vec3::ONE),
        ));
        let near = world.spawn((
            Transform::from_position(Vec3::new(0.0, 0.0, -3.0)),
            Collider::sphere(0.5),
        ));
        // No collider: not pickable.
        world.spawn((Transform::from_position(Vec3::new(0.0, 0.0, -1.0)),));

        let hit = raycast(&world, &Ray::new(Vec3::ZERO, Vec3::NEG_Z)).unwrap();
        assert_eq!(hit.entity, near);
        assert!((hit.point.z - (-2.5)).abs() < 1e-5);
        assert_eq!(raycast_all(&world, &Ray::new(Vec3::ZERO, Vec3::NEG_Z)).len(), 2);
    }
}
