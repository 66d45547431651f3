//! The built particle set.
//!
//! A [`ParticleField`] is generated in one pass from a
//! [`ParticleSystemConfig`] and never mutated afterwards. Changing the
//! configuration means building a new field and swapping it in (see
//! [`crate::scene::Scene`]).
//!
//! # Layers
//!
//! The field is assembled from independent layers, each drawing from its
//! own [`SpawnContext`] forked off `config.seed`:
//!
//! | Layer | Kind | Salt |
//! |-------|------|------|
//! | stars | `Star` | `STARS_SALT` |
//! | terrain | `Terrain` | `TERRAIN_SALT` |
//! | landmark `id` | `LandmarkGeometry` (`Star` for starfields) | `LANDMARK_SALT + id` |
//! | gateway | `Gateway` | `GATEWAY_SALT` |
//! | sigil | `Gateway` | `SIGIL_SALT` |
//!
//! Editing one landmark therefore leaves the random draws of every other
//! layer untouched.

use crate::attractor::AttractorCache;
use crate::config::ParticleSystemConfig;
use crate::particle::{Particle, ParticleKind};
use crate::spawn::SpawnContext;
use crate::{gateway, shapes, terrain};
use std::time::Instant;
use tracing::{debug, warn};

const STARS_SALT: u64 = 0x5747;
const TERRAIN_SALT: u64 = 0x7E22;
const GATEWAY_SALT: u64 = 0x6A7E;
const SIGIL_SALT: u64 = 0x5161;
const LANDMARK_SALT: u64 = 0x1A4D_0000;

/// Per-kind particle counts of a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldCounts {
    pub terrain: usize,
    pub landmark: usize,
    pub gateway: usize,
    pub star: usize,
    /// Generated points discarded for non-finite values.
    pub dropped: usize,
}

impl FieldCounts {
    pub fn total(&self) -> usize {
        self.terrain + self.landmark + self.gateway + self.star
    }

    pub fn of(&self, kind: ParticleKind) -> usize {
        match kind {
            ParticleKind::Terrain => self.terrain,
            ParticleKind::LandmarkGeometry => self.landmark,
            ParticleKind::Gateway => self.gateway,
            ParticleKind::Star => self.star,
        }
    }

    fn record(&mut self, kind: ParticleKind) {
        match kind {
            ParticleKind::Terrain => self.terrain += 1,
            ParticleKind::LandmarkGeometry => self.landmark += 1,
            ParticleKind::Gateway => self.gateway += 1,
            ParticleKind::Star => self.star += 1,
        }
    }
}

/// Immutable set of particles for one configuration.
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    counts: FieldCounts,
    seed: u64,
}

impl ParticleField {
    /// Generate every layer of `config`.
    ///
    /// Gateway attractor clouds are taken from `cache` when present.
    pub fn build(config: &ParticleSystemConfig, cache: &mut AttractorCache) -> Self {
        let started = Instant::now();
        let root = SpawnContext::seeded(config.seed);
        let mut builder = FieldBuilder::with_capacity(config.estimated_particle_count() as usize);

        builder.extend(
            "stars",
            gateway::generate_stars(&config.decor, &mut root.fork(STARS_SALT)),
        );
        builder.extend(
            "terrain",
            terrain::generate(&config.manifold, &mut root.fork(TERRAIN_SALT)),
        );
        for landmark in config.enabled_landmarks() {
            let mut ctx = root.fork(LANDMARK_SALT + landmark.id as u64);
            builder.extend(
                landmark.shape.name(),
                shapes::generate(landmark, &config.manifold, &mut ctx),
            );
        }
        builder.extend(
            "gateway",
            gateway::generate_gateway(&config.gateway, cache, &mut root.fork(GATEWAY_SALT)),
        );
        builder.extend(
            "sigil",
            gateway::generate_sigil(&config.sigil, &config.gateway, &mut root.fork(SIGIL_SALT)),
        );

        let field = builder.finish(config.seed);
        debug!(
            total = field.len(),
            terrain = field.counts.terrain,
            landmark = field.counts.landmark,
            gateway = field.counts.gateway,
            star = field.counts.star,
            dropped = field.counts.dropped,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "built particle field"
        );
        field
    }

    /// Wrap an existing particle list, dropping non-finite entries.
    pub fn from_particles(particles: impl IntoIterator<Item = Particle>) -> Self {
        let mut builder = FieldBuilder::with_capacity(0);
        builder.extend("custom", particles);
        builder.finish(0)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn counts(&self) -> FieldCounts {
        self.counts
    }

    /// Seed the field was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Particles produced by landmark `id`.
    pub fn landmark_particles(&self, id: u32) -> impl Iterator<Item = &Particle> {
        self.particles
            .iter()
            .filter(move |p| p.landmark_id == Some(id))
    }

    pub fn iter_kind(&self, kind: ParticleKind) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(move |p| p.kind == kind)
    }
}

struct FieldBuilder {
    particles: Vec<Particle>,
    counts: FieldCounts,
}

impl FieldBuilder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            counts: FieldCounts::default(),
        }
    }

    fn extend(&mut self, layer: &str, particles: impl IntoIterator<Item = Particle>) {
        let mut dropped = 0;
        for p in particles {
            if p.is_finite() {
                self.counts.record(p.kind);
                self.particles.push(p);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!(layer, dropped, "dropped non-finite particles");
            self.counts.dropped += dropped;
        }
    }

    fn finish(self, seed: u64) -> ParticleField {
        ParticleField {
            particles: self.particles,
            counts: self.counts,
            seed,
        }
    }
}
