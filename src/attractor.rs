//! Strange-attractor point clouds.
//!
//! Each [`AttractorKind`] is advanced with a fixed-step Euler integrator:
//! [`WARMUP_STEPS`] steps are thrown away to leave the transient, then
//! `count` steps are recorded. The cloud is then normalized so that its
//! largest axis span is `2 * NORMALIZED_RADIUS`, which puts every system on
//! the same footing regardless of its native scale.
//!
//! | Kind | dt | Native extent |
//! |------|----|---------------|
//! | [`AttractorKind::Lorenz`] | 0.005 | ~±25, z 0..50 |
//! | [`AttractorKind::Thomas`] | 0.02 | ~±4 |
//! | [`AttractorKind::Aizawa`] | 0.01 | ~±1.5 |
//! | [`AttractorKind::Sprott`] | 0.01 | ~±2 |
//! | [`AttractorKind::Rossler`] | 0.01 | ~±12, z 0..25 |
//! | [`AttractorKind::Dadras`] | 0.005 | ~±15 |
//! | [`AttractorKind::Galaxy`] | n/a | parametric spiral |
//!
//! Integration is deterministic: no randomness enters the trajectory, so
//! two calls with the same inputs produce bit-identical output. Optional
//! jitter is layered on afterwards by [`generate_jittered`].
//!
//! These normalized clouds back the gateway. Landmark attractors integrate
//! directly in world space (see [`crate::shapes`]).

use crate::math::is_finite3;
use crate::spawn::SpawnContext;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Steps discarded before recording.
pub const WARMUP_STEPS: u32 = 1000;

/// Half of the largest axis span after normalization.
pub const NORMALIZED_RADIUS: f32 = 1.0;

/// Supported dynamical systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttractorKind {
    Lorenz,
    Thomas,
    Aizawa,
    Sprott,
    Rossler,
    Dadras,
    /// Parametric three-arm spiral. Not an attractor, same interface.
    Galaxy,
}

impl AttractorKind {
    /// Every kind, in declaration order.
    pub const ALL: [AttractorKind; 7] = [
        AttractorKind::Lorenz,
        AttractorKind::Thomas,
        AttractorKind::Aizawa,
        AttractorKind::Sprott,
        AttractorKind::Rossler,
        AttractorKind::Dadras,
        AttractorKind::Galaxy,
    ];

    /// Integration step for this system.
    pub fn dt(self) -> f32 {
        match self {
            AttractorKind::Lorenz => 0.005,
            AttractorKind::Thomas => 0.02,
            AttractorKind::Aizawa => 0.01,
            AttractorKind::Sprott => 0.01,
            AttractorKind::Rossler => 0.01,
            AttractorKind::Dadras => 0.005,
            AttractorKind::Galaxy => 0.0,
        }
    }

    /// A starting point known to land on the attractor.
    pub fn default_seed(self) -> Vec3 {
        match self {
            AttractorKind::Sprott => Vec3::new(0.63, 0.47, -0.54),
            AttractorKind::Dadras => Vec3::new(1.0, 1.0, 1.0),
            AttractorKind::Galaxy => Vec3::ZERO,
            _ => Vec3::new(0.1, 0.0, 0.0),
        }
    }

    /// Time derivative at `p`.
    ///
    /// Returns zero for [`AttractorKind::Galaxy`], which is not integrated.
    pub fn derivative(self, p: Vec3) -> Vec3 {
        let Vec3 { x, y, z } = p;
        match self {
            AttractorKind::Lorenz => {
                let (sigma, rho, beta) = (10.0, 28.0, 8.0 / 3.0);
                Vec3::new(sigma * (y - x), x * (rho - z) - y, x * y - beta * z)
            }
            AttractorKind::Thomas => {
                let b = 0.208_186;
                Vec3::new(y.sin() - b * x, z.sin() - b * y, x.sin() - b * z)
            }
            AttractorKind::Aizawa => {
                let (a, b, c, d, e, f) = (0.95, 0.7, 0.6, 3.5, 0.25, 0.1);
                Vec3::new(
                    (z - b) * x - d * y,
                    d * x + (z - b) * y,
                    c + a * z - z * z * z / 3.0 - (x * x + y * y) * (1.0 + e * z) + f * z * x * x * x,
                )
            }
            AttractorKind::Sprott => {
                let (a, b) = (2.07, 1.79);
                Vec3::new(y + a * x * y + x * z, 1.0 - b * x * x + y * z, x - x * x - y * y)
            }
            AttractorKind::Rossler => {
                let (a, b, c) = (0.2, 0.2, 5.7);
                Vec3::new(-y - z, x + a * y, b + z * (x - c))
            }
            AttractorKind::Dadras => {
                let (a, b, c, d, e) = (3.0, 2.7, 1.7, 2.0, 9.0);
                Vec3::new(y - a * x + b * y * z, c * y - x * z + z, d * x * y - e * z)
            }
            AttractorKind::Galaxy => Vec3::ZERO,
        }
    }
}

/// Generate a normalized point cloud for `kind`.
///
/// See the module docs for the integration and normalization contract.
pub fn generate(kind: AttractorKind, count: u32, seed: Vec3) -> Vec<Vec3> {
    let mut points = match kind {
        AttractorKind::Galaxy => galaxy_spiral(count, seed),
        _ => integrate(kind, count, seed),
    };
    normalize(&mut points, NORMALIZED_RADIUS);
    points
}

/// [`generate`] followed by per-point jitter of up to `amount` (in
/// normalized units) drawn from `ctx`.
///
/// The trajectory is computed first and never sees the random source.
pub fn generate_jittered(
    kind: AttractorKind,
    count: u32,
    seed: Vec3,
    amount: f32,
    ctx: &mut SpawnContext,
) -> Vec<Vec3> {
    let mut points = generate(kind, count, seed);
    for p in &mut points {
        *p += ctx.jitter(amount);
    }
    points
}

/// Euler-integrate `kind` and record `count` points after the warmup.
///
/// Non-finite states are replaced by the last finite point (or the seed).
fn integrate(kind: AttractorKind, count: u32, seed: Vec3) -> Vec<Vec3> {
    let dt = kind.dt();
    let mut state = seed;

    for _ in 0..WARMUP_STEPS {
        state += kind.derivative(state) * dt;
    }

    let mut last_finite = if is_finite3(state) { state } else { seed };
    let mut substituted = 0u32;
    let mut points = Vec::with_capacity(count as usize);

    for _ in 0..count {
        state += kind.derivative(state) * dt;
        if is_finite3(state) {
            last_finite = state;
            points.push(state);
        } else {
            substituted += 1;
            points.push(last_finite);
        }
    }

    if substituted > 0 {
        tracing::warn!(
            ?kind,
            substituted,
            "attractor diverged, reused last finite point"
        );
    }

    points
}

/// Three logarithmic arms with a slight vertical wobble.
///
/// `seed` offsets every point, which only matters before normalization.
fn galaxy_spiral(count: u32, seed: Vec3) -> Vec<Vec3> {
    const ARMS: u32 = 3;
    const TURNS: f32 = 1.75;

    (0..count)
        .map(|i| {
            let arm = i % ARMS;
            let t = i as f32 / count.max(1) as f32;
            let angle = t * TAU * TURNS + arm as f32 * TAU / ARMS as f32;
            let radius = 0.15 + t * 1.85;
            // Deterministic spread around the arm centreline
            let spread = ((i as f32 * 12.9898).sin() * 43_758.547).fract() * 0.18 * radius;
            let wobble = (angle * 3.0).sin() * 0.05 * (1.0 - t);
            seed + Vec3::new(
                (radius + spread) * angle.cos(),
                wobble,
                (radius + spread) * angle.sin(),
            )
        })
        .collect()
}

/// Center `points` on their bounding box and scale uniformly so the largest
/// axis span equals `2 * radius`.
///
/// Non-finite points are skipped during the min/max scan. A degenerate set
/// (zero span) is only translated.
pub fn normalize(points: &mut [Vec3], radius: f32) {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for p in points.iter().filter(|p| is_finite3(**p)) {
        min = min.min(*p);
        max = max.max(*p);
    }
    if !is_finite3(min) || !is_finite3(max) {
        return;
    }

    let center = (min + max) * 0.5;
    let span = (max - min).max_element();
    let scale = if span > f32::EPSILON {
        2.0 * radius / span
    } else {
        1.0
    };

    for p in points.iter_mut() {
        *p = (*p - center) * scale;
    }
}

/// Key of a cached cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: AttractorKind,
    pub count: u32,
    seed_bits: [u32; 3],
}

impl CacheKey {
    pub fn new(kind: AttractorKind, count: u32, seed: Vec3) -> Self {
        Self {
            kind,
            count,
            seed_bits: [seed.x.to_bits(), seed.y.to_bits(), seed.z.to_bits()],
        }
    }
}

/// Memo of normalized attractor clouds.
///
/// Owned by whoever builds fields (the [`crate::scene::Scene`] keeps one
/// across rebuilds). Entries are keyed by every input of [`generate`], so a
/// hit is always exact; [`AttractorCache::retain`] lets the owner drop
/// clouds the current configuration no longer references.
#[derive(Debug, Default)]
pub struct AttractorCache {
    entries: HashMap<CacheKey, Arc<[Vec3]>>,
    hits: u64,
    misses: u64,
}

impl AttractorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the cloud for these inputs, generating it on a miss.
    pub fn get_or_generate(&mut self, kind: AttractorKind, count: u32, seed: Vec3) -> Arc<[Vec3]> {
        let key = CacheKey::new(kind, count, seed);
        if let Some(points) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(points);
        }
        self.misses += 1;
        let points: Arc<[Vec3]> = generate(kind, count, seed).into();
        self.entries.insert(key, Arc::clone(&points));
        points
    }

    /// Keep only entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&CacheKey) -> bool) {
        self.entries.retain(|key, _| keep(key));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(points: &[Vec3]) -> Vec3 {
        let min = points.iter().fold(Vec3::splat(f32::INFINITY), |a, p| a.min(*p));
        let max = points.iter().fold(Vec3::splat(f32::NEG_INFINITY), |a, p| a.max(*p));
        max - min
    }

    #[test]
    fn test_generate_is_bit_identical() {
        for kind in AttractorKind::ALL {
            let a = generate(kind, 500, kind.default_seed());
            let b = generate(kind, 500, kind.default_seed());
            assert_eq!(a.len(), 500);
            for (p, q) in a.iter().zip(&b) {
                assert_eq!(p.x.to_bits(), q.x.to_bits(), "{:?}", kind);
                assert_eq!(p.y.to_bits(), q.y.to_bits(), "{:?}", kind);
                assert_eq!(p.z.to_bits(), q.z.to_bits(), "{:?}", kind);
            }
        }
    }

    #[test]
    fn test_normalized_span_matches_radius() {
        for kind in AttractorKind::ALL {
            let points = generate(kind, 2000, kind.default_seed());
            let largest = span(&points).max_element();
            assert!(
                (largest - 2.0 * NORMALIZED_RADIUS).abs() < 1e-3,
                "{:?} span {}",
                kind,
                largest
            );
            assert!(points.iter().all(|p| is_finite3(*p)));
            assert!(points.iter().all(|p| p.abs().max_element() <= NORMALIZED_RADIUS + 1e-3));
        }
    }

    #[test]
    fn test_divergent_seed_never_yields_nan() {
        // Far outside the basin: Aizawa's cubic terms blow up quickly
        let points = generate(AttractorKind::Aizawa, 300, Vec3::splat(1.0e6));
        assert_eq!(points.len(), 300);
        assert!(points.iter().all(|p| is_finite3(*p)));
    }

    #[test]
    fn test_normalize_skips_non_finite_in_scan() {
        let mut points = vec![Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 0.0), Vec3::NAN];
        normalize(&mut points, 1.0);
        assert!((points[0].x + 1.0).abs() < 1e-6);
        assert!((points[1].x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_degenerate_set_is_centered() {
        let mut points = vec![Vec3::splat(3.0); 4];
        normalize(&mut points, 1.0);
        assert!(points.iter().all(|p| *p == Vec3::ZERO));
    }

    #[test]
    fn test_jitter_does_not_touch_trajectory() {
        let clean = generate(AttractorKind::Lorenz, 200, AttractorKind::Lorenz.default_seed());
        let mut ctx = SpawnContext::seeded(11);
        let jittered = generate_jittered(
            AttractorKind::Lorenz,
            200,
            AttractorKind::Lorenz.default_seed(),
            0.01,
            &mut ctx,
        );
        for (c, j) in clean.iter().zip(&jittered) {
            assert!((*c - *j).abs().max_element() <= 0.01 + 1e-6);
        }
    }

    #[test]
    fn test_cache_hits_and_retain() {
        let mut cache = AttractorCache::new();
        let seed = AttractorKind::Thomas.default_seed();
        let a = cache.get_or_generate(AttractorKind::Thomas, 100, seed);
        let b = cache.get_or_generate(AttractorKind::Thomas, 100, seed);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.stats(), (1, 1));

        cache.get_or_generate(AttractorKind::Lorenz, 100, AttractorKind::Lorenz.default_seed());
        assert_eq!(cache.len(), 2);
        cache.retain(|key| key.kind == AttractorKind::Lorenz);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
