//! Scene lights and their GPU representation.
//!
//! Lights are ordinary ECS components. Each frame the renderer gathers every
//! [`Light`] in the world, packs up to [`MAX_LIGHTS`] of them into a uniform array and
//! the mesh shader sums their contribution.
//!
//! Falloff follows the usual real-time conventions: point and spot lights attenuate
//! as `1 / d^decay`, windowed to zero at `range` (a range of `0` means unbounded), and
//! spot lights fade between the outer cone and `angle × (1 − penumbra)`.

use glam::Vec3;

use crate::color::Color;

/// Lights beyond this count are ignored.
pub const MAX_LIGHTS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    /// Sky/ground gradient ambient, blended by how much a normal faces up.
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
    Directional {
        color: Color,
        intensity: f32,
        /// Direction the light travels.
        direction: Vec3,
    },
    Point {
        color: Color,
        intensity: f32,
        position: Vec3,
        range: f32,
        decay: f32,
    },
    Spot {
        color: Color,
        intensity: f32,
        position: Vec3,
        direction: Vec3,
        range: f32,
        /// Outer cone half-angle in radians.
        angle: f32,
        penumbra: f32,
        decay: f32,
    },
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self::Ambient { color, intensity }
    }

    pub fn hemisphere(sky: Color, ground: Color, intensity: f32) -> Self {
        Self::Hemisphere {
            sky,
            ground,
            intensity,
        }
    }

    /// A directional light shining from `position` toward `target`.
    pub fn directional(color: Color, intensity: f32, position: Vec3, target: Vec3) -> Self {
        Self::Directional {
            color,
            intensity,
            direction: (target - position).normalize_or(Vec3::NEG_Y),
        }
    }

    /// A point light with quadratic decay.
    pub fn point(color: Color, intensity: f32, position: Vec3, range: f32) -> Self {
        Self::Point {
            color,
            intensity,
            position,
            range,
            decay: 2.0,
        }
    }

    /// A spot light at `position` aimed at `target`, with quadratic decay.
    pub fn spot(
        color: Color,
        intensity: f32,
        position: Vec3,
        target: Vec3,
        range: f32,
        angle: f32,
        penumbra: f32,
    ) -> Self {
        Self::Spot {
            color,
            intensity,
            position,
            direction: (target - position).normalize_or(Vec3::NEG_Y),
            range,
            angle,
            penumbra,
            decay: 2.0,
        }
    }

    /// Replaces the decay exponent of point and spot lights.
    pub fn with_decay(mut self, value: f32) -> Self {
        match &mut self {
            Light::Point { decay, .. } | Light::Spot { decay, .. } => *decay = value,
            _ => {}
        }
        self
    }

    pub fn intensity(&self) -> f32 {
        match *self {
            Light::Ambient { intensity, .. }
            | Light::Hemisphere { intensity, .. }
            | Light::Directional { intensity, .. }
            | Light::Point { intensity, .. }
            | Light::Spot { intensity, .. } => intensity,
        }
    }

    pub fn set_intensity(&mut self, value: f32) {
        match self {
            Light::Ambient { intensity, .. }
            | Light::Hemisphere { intensity, .. }
            | Light::Directional { intensity, .. }
            | Light::Point { intensity, .. }
            | Light::Spot { intensity, .. } => *intensity = value,
        }
    }

    /// World position for lights that have one.
    pub fn position(&self) -> Option<Vec3> {
        match *self {
            Light::Point { position, .. } | Light::Spot { position, .. } => Some(position),
            _ => None,
        }
    }

    pub fn to_gpu(&self) -> GpuLight {
        let rgb = |c: Color, i: f32| {
            let [r, g, b] = c.rgb_array();
            [r, g, b, i]
        };
        match *self {
            Light::Ambient { color, intensity } => GpuLight {
                kind: [LightKind::Ambient as u32, 0, 0, 0],
                color: rgb(color, intensity),
                ..Default::default()
            },
            Light::Hemisphere {
                sky,
                ground,
                intensity,
            } => GpuLight {
                kind: [LightKind::Hemisphere as u32, 0, 0, 0],
                color: rgb(sky, intensity),
                ground: rgb(ground, 0.0),
                direction: [0.0, 1.0, 0.0, 0.0],
                ..Default::default()
            },
            Light::Directional {
                color,
                intensity,
                direction,
            } => GpuLight {
                kind: [LightKind::Directional as u32, 0, 0, 0],
                color: rgb(color, intensity),
                direction: direction.extend(0.0).into(),
                ..Default::default()
            },
            Light::Point {
                color,
                intensity,
                position,
                range,
                decay,
            } => GpuLight {
                kind: [LightKind::Point as u32, 0, 0, 0],
                color: rgb(color, intensity),
                position: position.extend(range).into(),
                cone: [-2.0, -1.0, decay, 0.0],
                ..Default::default()
            },
            Light::Spot {
                color,
                intensity,
                position,
                direction,
                range,
                angle,
                penumbra,
                decay,
            } => GpuLight {
                kind: [LightKind::Spot as u32, 0, 0, 0],
                color: rgb(color, intensity),
                position: position.extend(range).into(),
                direction: direction.extend(0.0).into(),
                cone: [
                    angle.cos(),
                    (angle * (1.0 - penumbra.clamp(0.0, 1.0))).cos(),
                    decay,
                    0.0,
                ],
                ..Default::default()
            },
        }
    }
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Ambient = 0,
    Hemisphere = 1,
    Directional = 2,
    Point = 3,
    Spot = 4,
}

/// One packed light. Must match `Light` in `mesh.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    pub kind: [u32; 4],
    /// rgb + intensity
    pub color: [f32; 4],
    /// xyz + range
    pub position: [f32; 4],
    pub direction: [f32; 4],
    /// cos(outer), cos(inner), decay, unused
    pub cone: [f32; 4],
    /// Hemisphere ground color
    pub ground: [f32; 4],
}

/// Light array uniform. Must match `Lights` in `mesh.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniforms {
    pub count: [u32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl LightUniforms {
    /// Packs lights in iteration order, dropping any beyond [`MAX_LIGHTS`].
    pub fn pack<'a>(lights: impl IntoIterator<Item = &'a Light>) -> Self {
        let mut uniforms = Self {
            count: [0; 4],
            lights: [GpuLight::default(); MAX_LIGHTS],
        };
        let mut n = 0;
        for light in lights.into_iter().take(MAX_LIGHTS) {
            uniforms.lights[n] = light.to_gpu();
            n += 1;
        }
        uniforms.count[0] = n as u32;
        uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn gpu_light_layout_is_vec4_aligned() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 96);
        assert_eq!(std::mem::size_of::<LightUniforms>(), 16 + 96 * MAX_LIGHTS);
    }

    #[test]
    fn spot_cone_cosines() {
        let spot = Light::spot(Color::WHITE, 1.2, Vec3::new(0.0, 3.0, 0.0), Vec3::ZERO, 18.0, PI / 7.5, 0.55);
        let gpu = spot.to_gpu();
        assert!((gpu.cone[0] - (PI / 7.5).cos()).abs() < 1e-6);
        assert!(gpu.cone[1] > gpu.cone[0]);
        assert_eq!(gpu.direction, [0.0, -1.0, 0.0, 0.0]);
        assert_eq!(gpu.position[3], 18.0);
    }

    #[test]
    fn set_intensity_updates_any_kind() {
        let mut lights = [
            Light::ambient(Color::WHITE, 1.0),
            Light::point(Color::WHITE, 1.2, Vec3::ZERO, 12.0),
            Light::directional(Color::WHITE, 1.0, Vec3::Y, Vec3::ZERO),
        ];
        for light in &mut lights {
            light.set_intensity(0.25);
            assert_eq!(light.intensity(), 0.25);
        }
    }

    #[test]
    fn pack_truncates_to_capacity() {
        let lights = vec![Light::ambient(Color::WHITE, 0.1); MAX_LIGHTS + 5];
        let packed = LightUniforms::pack(&lights);
        assert_eq!(packed.count[0] as usize, MAX_LIGHTS);
    }

    #[test]
    fn decay_override_only_affects_local_lights() {
        let point = Light::point(Color::WHITE, 1.0, Vec3::ZERO, 10.0).with_decay(1.2);
        assert!(matches!(point, Light::Point { decay, .. } if decay == 1.2));
        let ambient = Light::ambient(Color::WHITE, 1.0).with_decay(1.2);
        assert_eq!(ambient, Light::ambient(Color::WHITE, 1.0));
    }
}
