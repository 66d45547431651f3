//! The renderable particle and its color type.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What a particle belongs to.
///
/// The kind decides which culling, fading and shading rules apply to it in
/// the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Part of the terrain height field.
    Terrain,
    /// Produced by a landmark shape.
    LandmarkGeometry,
    /// Part of the portal (gateway outline, attractor cloud or sigil).
    Gateway,
    /// Decorative background star.
    Star,
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from channels in `[0, 1]`; out-of-range and NaN values clamp.
    pub fn from_unit(c: Vec3) -> Self {
        fn channel(v: f32) -> u8 {
            if v.is_nan() {
                0
            } else {
                (v.clamp(0.0, 1.0) * 255.0).round() as u8
            }
        }
        Self::new(channel(c.x), channel(c.y), channel(c.z))
    }

    /// Channels as `[0, 1]` floats.
    pub fn to_unit(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }

    /// Blend toward `other` by `t` (clamped to `[0, 1]`).
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = crate::math::clamp01(t);
        Rgb::from_unit(self.to_unit().lerp(other.to_unit(), t))
    }

    pub fn tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Rgb::new(r, g, b)
    }
}

/// A single renderable point.
///
/// Built once by the generators and never mutated afterwards; every
/// per-frame effect is computed from these fields plus time and progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Base world-space position.
    pub position: Vec3,
    pub kind: ParticleKind,
    /// Base color before atmospheric falloff.
    pub color: Rgb,
    /// Base size multiplier.
    pub size: f32,
    /// Oscillator phase in `[0, 2π)` for breathing and twinkle.
    pub phase: f32,
    /// Landmark that produced this particle. Doubles as its scroll section.
    pub landmark_id: Option<u32>,
}

impl Particle {
    pub fn new(position: Vec3, kind: ParticleKind, color: Rgb) -> Self {
        Self {
            position,
            kind,
            color,
            size: 1.0,
            phase: 0.0,
            landmark_id: None,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_landmark(mut self, id: u32) -> Self {
        self.landmark_id = Some(id);
        self
    }

    /// True when the position can be projected safely.
    pub fn is_finite(&self) -> bool {
        crate::math::is_finite3(self.position) && self.size.is_finite() && self.phase.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_lerp_endpoints() {
        let a = Rgb::new(0, 100, 200);
        let b = Rgb::new(200, 100, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(100, 100, 100));
    }

    #[test]
    fn test_from_unit_clamps() {
        assert_eq!(Rgb::from_unit(Vec3::new(2.0, -1.0, f32::NAN)), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_builder_sets_fields() {
        let p = Particle::new(Vec3::ONE, ParticleKind::LandmarkGeometry, Rgb::WHITE)
            .with_size(2.0)
            .with_phase(1.5)
            .with_landmark(4);
        assert_eq!(p.size, 2.0);
        assert_eq!(p.phase, 1.5);
        assert_eq!(p.landmark_id, Some(4));
        assert!(p.is_finite());
    }
}
