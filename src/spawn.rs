//! Seeded randomness for particle generation.
//!
//! Every generator that needs randomness (per-particle phase, size jitter,
//! star scatter) takes a [`SpawnContext`] instead of reaching for a global
//! RNG, so a field built twice from the same seed is identical.
//!
//! ```ignore
//! let mut ctx = SpawnContext::seeded(42);
//! let phase = ctx.phase();               // [0, 2π)
//! let size = ctx.size_jitter(1.0, 0.2);  // 0.8 ..= 1.2
//! let star = ctx.random_in_box(Vec3::ZERO, Vec3::splat(100.0));
//! ```
//!
//! Attractor trajectories never draw from a context; only their seed point
//! and optional post-normalization jitter may.

use crate::particle::Rgb;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Injectable random source with helpers for common spawn patterns.
#[derive(Debug, Clone)]
pub struct SpawnContext {
    seed: u64,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context from an explicit seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seed this context was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent child context.
    ///
    /// The child depends only on this context's seed and `salt`, not on how
    /// many values have been drawn, so layers built from forks stay stable
    /// when a sibling layer changes.
    pub fn fork(&self, salt: u64) -> Self {
        Self::seeded(mix_seed(self.seed, salt))
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if !(max > min) {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Oscillator phase in `[0, 2π)`.
    #[inline]
    pub fn phase(&mut self) -> f32 {
        self.random_range(0.0, TAU)
    }

    /// `base` scaled by a random factor in `[1 - spread, 1 + spread)`.
    #[inline]
    pub fn size_jitter(&mut self, base: f32, spread: f32) -> f32 {
        base * self.random_range(1.0 - spread, 1.0 + spread)
    }

    // ========== Position helpers ==========

    /// Random point inside an axis-aligned box.
    pub fn random_in_box(&mut self, center: Vec3, half_extents: Vec3) -> Vec3 {
        center
            + Vec3::new(
                self.random_range(-half_extents.x, half_extents.x),
                self.random_range(-half_extents.y, half_extents.y),
                self.random_range(-half_extents.z, half_extents.z),
            )
    }

    /// Small random offset inside a cube of half-size `amount`.
    pub fn jitter(&mut self, amount: f32) -> Vec3 {
        if amount <= 0.0 {
            return Vec3::ZERO;
        }
        self.random_in_box(Vec3::ZERO, Vec3::splat(amount))
    }

    // ========== Color helpers ==========

    /// Pick one of two colors, `b` with probability `chance`.
    pub fn pick(&mut self, a: Rgb, b: Rgb, chance: f32) -> Rgb {
        if self.random() < chance {
            b
        } else {
            a
        }
    }
}

/// SplitMix64-style mixing of a seed with a salt.
fn mix_seed(seed: u64, salt: u64) -> u64 {
    let mut z = seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
