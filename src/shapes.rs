//! Landmark shape generators.
//!
//! Every [`LandmarkShape`] is a pure function of the landmark's scale,
//! density, position and color (plus the terrain for shapes that drape over
//! it, and a [`SpawnContext`] for phase and size jitter). Density scales
//! point counts linearly, rounded down; scale stretches extents linearly
//! from a base unit of 100 world units.
//!
//! # Families
//!
//! | Family | Shapes |
//! |--------|--------|
//! | Parametric solids | Ring, Tower, Helix, Sphere, Ziggurat, Gateway, Orbit, WireframeSphere |
//! | Terrain-draped | Gridlines, Contour |
//! | Scatter | Starfield |
//! | World-space attractors | Lorenz, Halvorsen, Rossler |
//!
//! The attractor landmarks integrate directly in world space with their own
//! visual scale. They do not share the normalized, cached
//! clouds in [`crate::attractor`], which only back the gateway.
//!
//! # Counts
//!
//! [`LandmarkShape::particle_count`] is the closed form of what
//! [`generate`] emits, so callers can bound the cost of a configuration
//! before building it.

use crate::attractor::AttractorKind;
use crate::config::{LandmarkConfig, LandmarkShape, ManifoldConfig};
use crate::math::{fibonacci_sphere, is_finite3, lerp, rotate_xy, rotate_yz};
use crate::particle::{Particle, ParticleKind, Rgb};
use crate::spawn::SpawnContext;
use crate::terrain::terrain_y;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Smallest scale a shape is built at.
pub const MIN_SCALE: f32 = 0.05;
/// Smallest density a shape is built at.
pub const MIN_DENSITY: f32 = 0.01;
/// World units per unit of scale.
const UNIT: f32 = 100.0;

/// Steps discarded before a landmark attractor starts recording.
const LANDMARK_WARMUP: u32 = 200;
/// Points per gridline and per wireframe-sphere line.
const LINE_POINTS: u32 = 24;
const WIRE_POINTS: u32 = 32;

#[inline]
fn clamp_density(density: f32) -> f32 {
    density.max(MIN_DENSITY)
}

#[inline]
fn clamp_scale(scale: f32) -> f32 {
    scale.max(MIN_SCALE)
}

/// `floor(base * density)`.
#[inline]
fn scaled(base: f32, density: f32) -> u32 {
    (base * density).floor().max(0.0) as u32
}

/// `floor(base * density)`, but never fewer than `min`.
#[inline]
fn at_least(min: u32, base: f32, density: f32) -> u32 {
    scaled(base, density).max(min)
}

impl LandmarkShape {
    /// Exact number of particles [`generate`] emits at `density`.
    pub fn particle_count(&self, density: f32) -> u64 {
        let d = clamp_density(density);
        let n = |min: u32, base: f32| at_least(min, base, d) as u64;
        match self {
            LandmarkShape::Ring => 3 * n(1, 80.0),
            LandmarkShape::Tower => 12 * n(1, 20.0),
            LandmarkShape::Helix => 2 * n(1, 100.0),
            LandmarkShape::Sphere => n(1, 300.0),
            LandmarkShape::Ziggurat => n(1, 8.0) * 4 * n(1, 12.0),
            LandmarkShape::Gateway => 2 * n(1, 40.0) + n(1, 60.0),
            LandmarkShape::Orbit => n(1, 40.0) + 3 * n(1, 60.0),
            LandmarkShape::Gridlines => 2 * n(2, 10.0) * LINE_POINTS as u64,
            LandmarkShape::Contour => n(1, 6.0) * n(1, 48.0),
            LandmarkShape::WireframeSphere => (n(2, 8.0) + n(3, 12.0)) * WIRE_POINTS as u64,
            LandmarkShape::Starfield => n(1, 200.0),
            LandmarkShape::Lorenz => scaled(3000.0, d) as u64,
            LandmarkShape::Halvorsen | LandmarkShape::Rossler => scaled(2500.0, d) as u64,
        }
    }
}

/// Collects particles for one landmark with its shared attributes.
struct ShapeBuilder<'a> {
    particles: Vec<Particle>,
    origin: Vec3,
    kind: ParticleKind,
    color: Rgb,
    id: u32,
    ctx: &'a mut SpawnContext,
}

impl<'a> ShapeBuilder<'a> {
    fn new(landmark: &LandmarkConfig, ctx: &'a mut SpawnContext) -> Self {
        Self {
            particles: Vec::with_capacity(landmark.shape.particle_count(landmark.density) as usize),
            origin: landmark.position(),
            kind: ParticleKind::LandmarkGeometry,
            color: landmark.color,
            id: landmark.id,
            ctx,
        }
    }

    /// Push a point relative to the landmark position.
    fn local(&mut self, offset: Vec3) {
        self.world(self.origin + offset);
    }

    /// Push a point in world space.
    fn world(&mut self, position: Vec3) {
        let color = self.color;
        self.world_colored(position, color);
    }

    fn world_colored(&mut self, position: Vec3, color: Rgb) {
        let size = self.ctx.size_jitter(1.0, 0.15);
        let phase = self.ctx.phase();
        self.particles.push(
            Particle::new(position, self.kind, color)
                .with_size(size)
                .with_phase(phase)
                .with_landmark(self.id),
        );
    }

    fn finish(self) -> Vec<Particle> {
        self.particles
    }
}

/// Generate the particles for one landmark.
///
/// Disabled landmarks yield nothing. Scale and density are clamped to
/// [`MIN_SCALE`] and [`MIN_DENSITY`].
pub fn generate(
    landmark: &LandmarkConfig,
    terrain: &ManifoldConfig,
    ctx: &mut SpawnContext,
) -> Vec<Particle> {
    if !landmark.enabled {
        return Vec::new();
    }

    let d = clamp_density(landmark.density);
    let u = clamp_scale(landmark.scale) * UNIT;
    let mut b = ShapeBuilder::new(landmark, ctx);

    match landmark.shape {
        LandmarkShape::Ring => ring(&mut b, u, d),
        LandmarkShape::Tower => tower(&mut b, u, d),
        LandmarkShape::Helix => helix(&mut b, u, d),
        LandmarkShape::Sphere => sphere(&mut b, u, d),
        LandmarkShape::Ziggurat => ziggurat(&mut b, u, d),
        LandmarkShape::Gateway => arch(&mut b, u, d),
        LandmarkShape::Orbit => orbit(&mut b, u, d),
        LandmarkShape::Gridlines => gridlines(&mut b, terrain, u, d),
        LandmarkShape::Contour => contour(&mut b, terrain, u, d),
        LandmarkShape::WireframeSphere => wireframe_sphere(&mut b, u, d),
        LandmarkShape::Starfield => starfield(&mut b, u, d),
        LandmarkShape::Lorenz => world_attractor(&mut b, &LORENZ, landmark.scale, d),
        LandmarkShape::Halvorsen => world_attractor(&mut b, &HALVORSEN, landmark.scale, d),
        LandmarkShape::Rossler => world_attractor(&mut b, &ROSSLER, landmark.scale, d),
    }

    b.finish()
}

// ========== Parametric solids ==========

/// Three concentric circles standing in the XY plane.
fn ring(b: &mut ShapeBuilder, u: f32, d: f32) {
    let n = at_least(1, 80.0, d);
    let outer = 1.5 * u;
    let center = Vec3::new(0.0, -outer, 0.0);
    for radius in [1.0, 0.85, 0.7].map(|f| f * outer) {
        for i in 0..n {
            let theta = i as f32 / n as f32 * TAU;
            b.local(center + Vec3::new(radius * theta.cos(), radius * theta.sin(), 0.0));
        }
    }
}

/// Tapering square levels: 4 corners plus 2 points per edge.
fn tower(b: &mut ShapeBuilder, u: f32, d: f32) {
    let levels = at_least(1, 20.0, d);
    let height = 4.0 * u;
    for level in 0..levels {
        let t = if levels > 1 {
            level as f32 / (levels - 1) as f32
        } else {
            0.0
        };
        let half = u * lerp(0.6, 0.3, t);
        let y = -t * height;
        let corners = square_corners(half, y);
        for k in 0..4 {
            let (a, c) = (corners[k], corners[(k + 1) % 4]);
            b.local(a);
            b.local(a.lerp(c, 1.0 / 3.0));
            b.local(a.lerp(c, 2.0 / 3.0));
        }
    }
}

/// Two interleaved strands, four turns.
fn helix(b: &mut ShapeBuilder, u: f32, d: f32) {
    let n = at_least(1, 100.0, d);
    let radius = 0.6 * u;
    let height = 4.0 * u;
    for strand in 0..2 {
        for i in 0..n {
            let t = i as f32 / n as f32;
            let angle = t * TAU * 4.0 + strand as f32 * PI;
            b.local(Vec3::new(radius * angle.cos(), -t * height, radius * angle.sin()));
        }
    }
}

/// Fibonacci sphere resting on the landmark position.
fn sphere(b: &mut ShapeBuilder, u: f32, d: f32) {
    let n = at_least(1, 300.0, d);
    let radius = 1.2 * u;
    let center = Vec3::new(0.0, -radius, 0.0);
    for i in 0..n {
        b.local(center + fibonacci_sphere(i, n) * radius);
    }
}

/// Stepped pyramid: `floor(8·density)` tiers whose half-size shrinks by
/// 30% in total from the base tier to the top.
fn ziggurat(b: &mut ShapeBuilder, u: f32, d: f32) {
    let tiers = at_least(1, 8.0, d);
    let per_side = at_least(1, 12.0, d);
    let base = 1.5 * u;
    let tier_height = 0.4 * u;
    for tier in 0..tiers {
        let frac = if tiers > 1 {
            tier as f32 / (tiers - 1) as f32
        } else {
            0.0
        };
        let half = ziggurat_half_size(base, frac);
        let corners = square_corners(half, -(tier as f32) * tier_height);
        for k in 0..4 {
            let (a, c) = (corners[k], corners[(k + 1) % 4]);
            for j in 0..per_side {
                b.local(a.lerp(c, j as f32 / per_side as f32));
            }
        }
    }
}

#[inline]
fn ziggurat_half_size(base: f32, frac: f32) -> f32 {
    base * lerp(1.0, 0.7, frac)
}

/// Portal arch: two pillars and a semicircular top.
fn arch(b: &mut ShapeBuilder, u: f32, d: f32) {
    let pillar = at_least(1, 40.0, d);
    let arc = at_least(1, 60.0, d);
    let height = 3.0 * u;
    for side in [-1.0, 1.0] {
        for i in 0..pillar {
            let t = i as f32 / pillar as f32;
            b.local(Vec3::new(side * u, -t * height, 0.0));
        }
    }
    for i in 0..arc {
        let a = PI * (i as f32 + 0.5) / arc as f32;
        b.local(Vec3::new(u * a.cos(), -height - u * a.sin(), 0.0));
    }
}

/// Small core with three tilted elliptical orbits around it.
fn orbit(b: &mut ShapeBuilder, u: f32, d: f32) {
    let core = at_least(1, 40.0, d);
    let per_orbit = at_least(1, 60.0, d);
    let center = Vec3::new(0.0, -1.5 * u, 0.0);
    for i in 0..core {
        b.local(center + fibonacci_sphere(i, core) * 0.3 * u);
    }
    for k in 0..3 {
        let major = (1.2 + 0.4 * k as f32) * u;
        let minor = major * 0.5;
        for i in 0..per_orbit {
            let theta = i as f32 / per_orbit as f32 * TAU;
            let flat = Vec3::new(major * theta.cos(), 0.0, minor * theta.sin());
            let tilted = rotate_xy(rotate_yz(flat, 0.35 + k as f32 * 0.25), k as f32 * 1.05);
            b.local(center + tilted);
        }
    }
}

/// Latitude and longitude lines of a sphere.
fn wireframe_sphere(b: &mut ShapeBuilder, u: f32, d: f32) {
    let parallels = at_least(2, 8.0, d);
    let meridians = at_least(3, 12.0, d);
    let radius = 1.2 * u;
    let center = Vec3::new(0.0, -radius, 0.0);

    for i in 0..parallels {
        let phi = PI * (i + 1) as f32 / (parallels + 1) as f32;
        let ring = radius * phi.sin();
        let y = radius * phi.cos();
        for k in 0..WIRE_POINTS {
            let theta = TAU * k as f32 / WIRE_POINTS as f32;
            b.local(center + Vec3::new(ring * theta.cos(), y, ring * theta.sin()));
        }
    }
    for j in 0..meridians {
        let theta = TAU * j as f32 / meridians as f32;
        for k in 0..WIRE_POINTS {
            let phi = PI * k as f32 / (WIRE_POINTS - 1) as f32;
            b.local(
                center
                    + Vec3::new(
                        radius * phi.sin() * theta.cos(),
                        radius * phi.cos(),
                        radius * phi.sin() * theta.sin(),
                    ),
            );
        }
    }
}

fn square_corners(half: f32, y: f32) -> [Vec3; 4] {
    [
        Vec3::new(-half, y, -half),
        Vec3::new(half, y, -half),
        Vec3::new(half, y, half),
        Vec3::new(-half, y, half),
    ]
}

// ========== Terrain-draped ==========

/// Square grid of lines following the terrain surface.
fn gridlines(b: &mut ShapeBuilder, terrain: &ManifoldConfig, u: f32, d: f32) {
    let lines = at_least(2, 10.0, d);
    let half = 3.0 * u;
    let origin = b.origin;
    let lift = 4.0;

    for axis in 0..2 {
        for l in 0..lines {
            let across = -half + 2.0 * half * l as f32 / (lines - 1) as f32;
            for k in 0..LINE_POINTS {
                let along = -half + 2.0 * half * k as f32 / (LINE_POINTS - 1) as f32;
                let (dx, dz) = if axis == 0 { (along, across) } else { (across, along) };
                let (x, z) = (origin.x + dx, origin.z + dz);
                b.world(Vec3::new(x, terrain_y(x, z, terrain) - lift, z));
            }
        }
    }
}

/// Concentric rings that hug the terrain, each lifted a little higher.
fn contour(b: &mut ShapeBuilder, terrain: &ManifoldConfig, u: f32, d: f32) {
    let rings = at_least(1, 6.0, d);
    let per_ring = at_least(1, 48.0, d);
    let origin = b.origin;
    for i in 0..rings {
        let radius = (i + 1) as f32 * 0.5 * u;
        let lift = (i + 1) as f32 * 0.2 * u;
        for k in 0..per_ring {
            let theta = TAU * k as f32 / per_ring as f32;
            let (x, z) = (origin.x + radius * theta.cos(), origin.z + radius * theta.sin());
            b.world(Vec3::new(x, terrain_y(x, z, terrain) - lift, z));
        }
    }
}

// ========== Scatter ==========

/// Random stars in a 20U × 8U × 20U box above the landmark.
fn starfield(b: &mut ShapeBuilder, u: f32, d: f32) {
    let n = at_least(1, 200.0, d);
    let center = b.origin + Vec3::new(0.0, -4.0 * u, 0.0);
    let half = Vec3::new(10.0 * u, 4.0 * u, 10.0 * u);
    for _ in 0..n {
        let p = b.ctx.random_in_box(center, half);
        let size = b.ctx.random_range(0.5, 1.5);
        let phase = b.ctx.phase();
        b.particles.push(
            Particle::new(p, ParticleKind::Star, b.color)
                .with_size(size)
                .with_phase(phase)
                .with_landmark(b.id),
        );
    }
}

// ========== World-space attractors ==========

/// Integration and placement parameters for a landmark attractor.
struct WorldAttractor {
    base_count: f32,
    visual_scale: f32,
    dt: f32,
    seed: Vec3,
    derivative: fn(Vec3) -> Vec3,
    /// Attractor coordinates to world offset (before scaling).
    to_world: fn(Vec3) -> Vec3,
}

const LORENZ: WorldAttractor = WorldAttractor {
    base_count: 3000.0,
    visual_scale: 12.0,
    dt: 0.005,
    seed: Vec3::new(0.1, 0.0, 0.0),
    derivative: lorenz_derivative,
    to_world: |p| Vec3::new(p.x, -(p.z - 25.0), p.y),
};

const HALVORSEN: WorldAttractor = WorldAttractor {
    base_count: 2500.0,
    visual_scale: 25.0,
    dt: 0.005,
    seed: Vec3::new(-1.48, -1.51, 2.04),
    derivative: halvorsen_derivative,
    to_world: |p| Vec3::new(p.x, -p.y, p.z),
};

const ROSSLER: WorldAttractor = WorldAttractor {
    base_count: 2500.0,
    visual_scale: 15.0,
    dt: 0.01,
    seed: Vec3::new(0.1, 0.0, 0.0),
    derivative: rossler_derivative,
    to_world: |p| Vec3::new(p.x, -p.z, p.y),
};

fn lorenz_derivative(p: Vec3) -> Vec3 {
    AttractorKind::Lorenz.derivative(p)
}

fn rossler_derivative(p: Vec3) -> Vec3 {
    AttractorKind::Rossler.derivative(p)
}

/// Halvorsen system, `a = 1.89`. Cyclically symmetric in x → y → z.
pub fn halvorsen_derivative(p: Vec3) -> Vec3 {
    let a = 1.89;
    let Vec3 { x, y, z } = p;
    Vec3::new(
        -a * x - 4.0 * y - 4.0 * z - y * y,
        -a * y - 4.0 * z - 4.0 * x - z * z,
        -a * z - 4.0 * x - 4.0 * y - x * x,
    )
}

/// Integrate in attractor space and place each point around the landmark.
///
/// Color fades toward white along the trajectory.
fn world_attractor(b: &mut ShapeBuilder, system: &WorldAttractor, scale: f32, d: f32) {
    let n = scaled(system.base_count, d);
    let visual = system.visual_scale * clamp_scale(scale);
    let origin = b.origin;
    let base_color = b.color;

    let mut state = system.seed;
    for _ in 0..LANDMARK_WARMUP {
        state += (system.derivative)(state) * system.dt;
    }
    let mut last_finite = if is_finite3(state) { state } else { system.seed };

    for i in 0..n {
        state += (system.derivative)(state) * system.dt;
        if is_finite3(state) {
            last_finite = state;
        }
        let color = base_color.lerp(Rgb::WHITE, 0.3 * i as f32 / n.max(1) as f32);
        b.world_colored(origin + (system.to_world)(last_finite) * visual, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landmark(shape: LandmarkShape, density: f32) -> LandmarkConfig {
        LandmarkConfig::new(3, shape, Vec3::new(0.0, 200.0, 1000.0)).with_density(density)
    }

    #[test]
    fn test_counts_match_closed_form() {
        let terrain = ManifoldConfig::default();
        for shape in LandmarkShape::ALL {
            for density in [0.05, 0.3, 1.0, 1.7] {
                let mut ctx = SpawnContext::seeded(1);
                let particles = generate(&landmark(shape, density), &terrain, &mut ctx);
                assert_eq!(
                    particles.len() as u64,
                    shape.particle_count(density),
                    "{:?} at density {}",
                    shape,
                    density
                );
            }
        }
    }

    #[test]
    fn test_all_shapes_finite_and_tagged() {
        let terrain = ManifoldConfig::default();
        for shape in LandmarkShape::ALL {
            let mut ctx = SpawnContext::seeded(2);
            let particles = generate(&landmark(shape, 1.0), &terrain, &mut ctx);
            assert!(!particles.is_empty(), "{:?}", shape);
            assert!(particles.iter().all(Particle::is_finite), "{:?}", shape);
            assert!(particles.iter().all(|p| p.landmark_id == Some(3)));
            let expected = if shape == LandmarkShape::Starfield {
                ParticleKind::Star
            } else {
                ParticleKind::LandmarkGeometry
            };
            assert!(particles.iter().all(|p| p.kind == expected), "{:?}", shape);
        }
    }

    #[test]
    fn test_ziggurat_tiers_and_shrink() {
        let terrain = ManifoldConfig::default();
        let mut ctx = SpawnContext::seeded(3);
        let l = landmark(LandmarkShape::Ziggurat, 1.0);
        let particles = generate(&l, &terrain, &mut ctx);

        let mut levels: Vec<f32> = particles.iter().map(|p| p.position.y).collect();
        levels.sort_by(f32::total_cmp);
        levels.dedup_by(|a, b| (*a - *b).abs() < 1e-3);
        assert_eq!(levels.len(), 8);

        let width_at = |y: f32| {
            particles
                .iter()
                .filter(|p| (p.position.y - y).abs() < 1e-3)
                .map(|p| p.position.x.abs())
                .fold(0.0f32, f32::max)
        };
        let bottom = width_at(200.0);
        let top = width_at(*levels.first().unwrap());
        assert!((top / bottom - 0.7).abs() < 1e-4);
    }

    #[test]
    fn test_density_scales_and_floors() {
        assert_eq!(LandmarkShape::Lorenz.particle_count(1.0), 3000);
        assert_eq!(LandmarkShape::Lorenz.particle_count(0.5), 1500);
        assert_eq!(LandmarkShape::Ziggurat.particle_count(0.2), 4 * 2);
        // Structural shapes never collapse to zero
        assert!(LandmarkShape::Ring.particle_count(0.0) >= 3);
        assert!(LandmarkShape::Tower.particle_count(-4.0) >= 12);
    }

    #[test]
    fn test_lorenz_landmark_envelope() {
        let terrain = ManifoldConfig::default();
        let mut ctx = SpawnContext::seeded(4);
        let l = landmark(LandmarkShape::Lorenz, 1.0);
        let particles = generate(&l, &terrain, &mut ctx);
        assert_eq!(particles.len(), 3000);
        for p in &particles {
            assert!(p.position.x.abs() < 2000.0);
            assert!(p.position.y.abs() < 2000.0);
        }
    }

    #[test]
    fn test_gridlines_follow_terrain() {
        let terrain = ManifoldConfig::default();
        let mut ctx = SpawnContext::seeded(5);
        let l = LandmarkConfig::new(1, LandmarkShape::Gridlines, Vec3::new(0.0, 0.0, 3000.0));
        for p in generate(&l, &terrain, &mut ctx) {
            let ground = terrain_y(p.position.x, p.position.z, &terrain);
            assert!((p.position.y - (ground - 4.0)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_disabled_landmark_is_empty() {
        let terrain = ManifoldConfig::default();
        let mut ctx = SpawnContext::seeded(6);
        let mut l = landmark(LandmarkShape::Sphere, 1.0);
        l.enabled = false;
        assert!(generate(&l, &terrain, &mut ctx).is_empty());
    }

    #[test]
    fn test_same_seed_same_landmark() {
        let terrain = ManifoldConfig::default();
        let l = landmark(LandmarkShape::Starfield, 1.0);
        let a = generate(&l, &terrain, &mut SpawnContext::seeded(9));
        let b = generate(&l, &terrain, &mut SpawnContext::seeded(9));
        assert_eq!(a, b);
    }
}
