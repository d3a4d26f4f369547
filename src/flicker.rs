//! Decorative light animation: lantern flicker and a slow "breathing" key light.

use std::f32::consts::TAU;

use crate::rng::SeededRandom;

/// Per-lantern flicker parameters.
///
/// Intensity is `base × clamp(1 + a·sin(t) + ½a·sin(2.3t + 1.7), min, max)` where
/// `t = time·speed + phase`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LanternGlow {
    pub base: f32,
    pub phase: f32,
    pub speed: f32,
    pub amplitude: f32,
    pub min_factor: f32,
    pub max_factor: f32,
}

impl LanternGlow {
    pub fn new(base: f32, phase: f32, speed: f32, amplitude: f32) -> Self {
        Self {
            base,
            phase,
            speed,
            amplitude,
            min_factor: 0.7,
            max_factor: 1.3,
        }
    }

    /// Randomized phase in [0, 2π), speed in [2, 3.5) and amplitude in [0.08, 0.18).
    pub fn random(base: f32, rng: &mut SeededRandom) -> Self {
        let phase = rng.range(0.0, TAU);
        let speed = rng.range(2.0, 3.5);
        let amplitude = rng.range(0.08, 0.18);
        Self::new(base, phase, speed, amplitude)
    }

    /// Clamped multiplier at wall-clock `time` seconds.
    pub fn factor(&self, time: f32) -> f32 {
        let t = time * self.speed + self.phase;
        let a = self.amplitude;
        let flick = 1.0 + a * t.sin() + 0.5 * a * (t * 2.3 + 1.7).sin();
        flick.clamp(self.min_factor, self.max_factor)
    }

    pub fn intensity(&self, time: f32) -> f32 {
        self.base * self.factor(time)
    }
}

/// Slow sinusoidal modulation of a key light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breathing {
    pub base: f32,
    pub depth: f32,
    pub rate: f32,
}

impl Breathing {
    pub fn new(base: f32) -> Self {
        Self {
            base,
            depth: 0.07,
            rate: 1.1,
        }
    }

    pub fn intensity(&self, time: f32) -> f32 {
        self.base * (1.0 + self.depth * (time * self.rate).sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flicker_stays_within_bounds() {
        let mut rng = SeededRandom::new(1234);
        for _ in 0..64 {
            let glow = LanternGlow::random(1.2, &mut rng);
            for step in 0..2000 {
                let time = step as f32 * 0.037;
                let i = glow.intensity(time);
                assert!(i >= glow.base * 0.7 - 1e-6 && i <= glow.base * 1.3 + 1e-6);
            }
        }
    }

    #[test]
    fn oversized_amplitude_is_clamped() {
        let glow = LanternGlow::new(2.0, 0.0, 1.0, 5.0);
        for step in 0..500 {
            let f = glow.factor(step as f32 * 0.01);
            assert!((0.7..=1.3).contains(&f));
        }
    }

    #[test]
    fn random_parameters_in_range() {
        let mut rng = SeededRandom::new(9);
        for _ in 0..1000 {
            let glow = LanternGlow::random(1.0, &mut rng);
            assert!((0.0..=TAU).contains(&glow.phase));
            assert!((2.0..=3.5).contains(&glow.speed));
            assert!((0.08..=0.18).contains(&glow.amplitude));
        }
    }

    #[test]
    fn breathing_swings_seven_percent() {
        let b = Breathing::new(1.85);
        assert_eq!(b.intensity(0.0), 1.85);
        let peak = b.intensity(std::f32::consts::FRAC_PI_2 / 1.1);
        assert!((peak - 1.85 * 1.07).abs() < 1e-4);
    }
}
