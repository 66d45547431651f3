//! The portal, its sigil and the decorative star layer.
//!
//! A gateway is either a geometric outline or a normalized strange-attractor
//! cloud (pulled from an [`AttractorCache`]), repeated into a tunnel of
//! receding, shrinking layers. All of it renders as [`ParticleKind::Gateway`]
//! and fades out early in the scroll.

use crate::attractor::{AttractorCache, CacheKey};
use crate::config::{DecorConfig, GatewayConfig, GatewayShape, SigilConfig};
use crate::particle::{Particle, ParticleKind, Rgb};
use crate::spawn::SpawnContext;
use glam::{Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Each tunnel layer is this fraction of the size of the one before it.
const TUNNEL_SHRINK: f32 = 0.88;

/// Point at `t ∈ [0, 1)` along the outline of a unit shape in the XY plane.
///
/// Polygons start at the top vertex; screen y points down, so the top is
/// at `-y`.
pub fn outline_point(shape: GatewayShape, t: f32) -> Vec2 {
    let sides = match shape {
        GatewayShape::Circle | GatewayShape::Attractor(_) => {
            let a = t * TAU - FRAC_PI_2;
            return Vec2::new(a.cos(), a.sin());
        }
        GatewayShape::Triangle => 3,
        GatewayShape::Square => 4,
        GatewayShape::Hexagon => 6,
    };
    let along = t.rem_euclid(1.0) * sides as f32;
    let edge = (along.floor() as u32).min(sides - 1);
    let s = along - edge as f32;
    polygon_vertex(edge, sides).lerp(polygon_vertex(edge + 1, sides), s)
}

fn polygon_vertex(i: u32, sides: u32) -> Vec2 {
    let a = TAU * (i % sides) as f32 / sides as f32 - FRAC_PI_2;
    Vec2::new(a.cos(), a.sin())
}

/// Cache key of the attractor cloud this gateway uses, if it uses one.
pub fn attractor_key(gateway: &GatewayConfig) -> Option<CacheKey> {
    match gateway.shape {
        GatewayShape::Attractor(kind) if gateway.enabled && gateway.points > 0 => {
            Some(CacheKey::new(kind, gateway.points, attractor_seed(gateway, kind)))
        }
        _ => None,
    }
}

fn attractor_seed(gateway: &GatewayConfig, kind: crate::attractor::AttractorKind) -> Vec3 {
    gateway
        .attractor_seed
        .map(Vec3::from_array)
        .unwrap_or_else(|| kind.default_seed())
}

/// Generate the gateway tunnel.
///
/// Attractor clouds come from `cache`, so rebuilding a field with the same
/// gateway does not integrate again.
pub fn generate_gateway(
    gateway: &GatewayConfig,
    cache: &mut AttractorCache,
    ctx: &mut SpawnContext,
) -> Vec<Particle> {
    if !gateway.enabled || gateway.points == 0 {
        return Vec::new();
    }

    let layers = gateway.tunnel_layers.max(1);
    let center = Vec3::from_array(gateway.position);
    let unit: Vec<Vec3> = match gateway.shape {
        GatewayShape::Attractor(kind) => cache
            .get_or_generate(kind, gateway.points, attractor_seed(gateway, kind))
            .to_vec(),
        shape => (0..gateway.points)
            .map(|i| outline_point(shape, i as f32 / gateway.points as f32).extend(0.0))
            .collect(),
    };

    let mut particles = Vec::with_capacity(unit.len() * layers as usize);
    for layer in 0..layers {
        let shrink = TUNNEL_SHRINK.powi(layer as i32);
        let depth = Vec3::new(0.0, 0.0, layer as f32 * gateway.tunnel_spacing);
        let color = gateway.color.lerp(Rgb::BLACK, 0.15 * layer as f32);
        for p in &unit {
            particles.push(
                Particle::new(center + depth + *p * gateway.radius * shrink, ParticleKind::Gateway, color)
                    .with_size(ctx.size_jitter(1.2, 0.2))
                    .with_phase(ctx.phase()),
            );
        }
    }
    particles
}

/// Generate the sigil: a circle and a `{n/2}` star polygon.
pub fn generate_sigil(
    sigil: &SigilConfig,
    gateway: &GatewayConfig,
    ctx: &mut SpawnContext,
) -> Vec<Particle> {
    if !sigil.enabled || sigil.points_per_edge == 0 {
        return Vec::new();
    }

    let sides = sigil.sides.max(3);
    let per_edge = sigil.points_per_edge;
    let center = Vec3::from_array(gateway.position) + Vec3::from_array(sigil.offset);
    let mut particles = Vec::with_capacity(((sides + 4) * per_edge) as usize);
    let mut push = |p: Vec2, ctx: &mut SpawnContext| {
        particles.push(
            Particle::new(center + (p * sigil.radius).extend(0.0), ParticleKind::Gateway, sigil.color)
                .with_size(ctx.size_jitter(1.0, 0.1))
                .with_phase(ctx.phase()),
        );
    };

    for i in 0..sides {
        let a = polygon_vertex(i, sides);
        let b = polygon_vertex(i + 2, sides);
        for k in 0..per_edge {
            push(a.lerp(b, k as f32 / per_edge as f32), ctx);
        }
    }
    let circle = 4 * per_edge;
    for k in 0..circle {
        push(outline_point(GatewayShape::Circle, k as f32 / circle as f32), ctx);
    }

    particles
}

/// Scatter the background stars far behind the terrain.
pub fn generate_stars(decor: &DecorConfig, ctx: &mut SpawnContext) -> Vec<Particle> {
    (0..decor.star_count)
        .map(|_| {
            let position = Vec3::new(
                ctx.random_range(-6000.0, 6000.0),
                ctx.random_range(-3000.0, 200.0),
                ctx.random_range(2000.0, 12_000.0),
            );
            let color = ctx.pick(decor.star_color, Rgb::WHITE, 0.2);
            Particle::new(position, ParticleKind::Star, color)
                .with_size(ctx.random_range(0.5, 1.5))
                .with_phase(ctx.phase())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attractor::AttractorKind;

    #[test]
    fn test_outline_vertices() {
        let top = outline_point(GatewayShape::Square, 0.0);
        assert!((top - Vec2::new(0.0, -1.0)).length() < 1e-5);
        let quarter = outline_point(GatewayShape::Square, 0.25);
        assert!((quarter - Vec2::new(1.0, 0.0)).length() < 1e-5);
        for i in 0..64 {
            let p = outline_point(GatewayShape::Circle, i as f32 / 64.0);
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_gateway_count_and_kind() {
        let config = GatewayConfig::default();
        let mut cache = AttractorCache::new();
        let mut ctx = SpawnContext::seeded(1);
        let particles = generate_gateway(&config, &mut cache, &mut ctx);
        assert_eq!(particles.len() as u64, config.particle_count());
        assert!(particles.iter().all(|p| p.kind == ParticleKind::Gateway));
        assert!(particles.iter().all(|p| p.landmark_id.is_none()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_tunnel_layers_recede_and_shrink() {
        let config = GatewayConfig {
            points: 16,
            tunnel_layers: 3,
            ..GatewayConfig::default()
        };
        let mut cache = AttractorCache::new();
        let mut ctx = SpawnContext::seeded(2);
        let particles = generate_gateway(&config, &mut cache, &mut ctx);
        let center = Vec3::from_array(config.position);
        let radius_of = |layer: usize| (particles[layer * 16].position - center).truncate().length();
        assert!((radius_of(0) - config.radius).abs() < 1e-2);
        assert!((radius_of(1) - config.radius * TUNNEL_SHRINK).abs() < 1e-2);
        assert!(particles[32].position.z > particles[16].position.z);
    }

    #[test]
    fn test_attractor_gateway_uses_cache() {
        let config = GatewayConfig {
            shape: GatewayShape::Attractor(AttractorKind::Aizawa),
            points: 300,
            tunnel_layers: 2,
            ..GatewayConfig::default()
        };
        let mut cache = AttractorCache::new();
        let a = generate_gateway(&config, &mut cache, &mut SpawnContext::seeded(3));
        let b = generate_gateway(&config, &mut cache, &mut SpawnContext::seeded(3));
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), (1, 1));
        let key = attractor_key(&config).unwrap();
        assert_eq!(key.kind, AttractorKind::Aizawa);
        assert!(attractor_key(&GatewayConfig::default()).is_none());
        let center = Vec3::from_array(config.position);
        assert!(a
            .iter()
            .all(|p| (p.position - center).abs().max_element() <= config.radius + 140.0 + 1e-2));
    }

    #[test]
    fn test_sigil_count() {
        let sigil = SigilConfig::default();
        let particles = generate_sigil(&sigil, &GatewayConfig::default(), &mut SpawnContext::seeded(4));
        assert_eq!(particles.len() as u64, sigil.particle_count());
    }

    #[test]
    fn test_stars_inside_shell() {
        let decor = DecorConfig {
            star_count: 250,
            ..DecorConfig::default()
        };
        let stars = generate_stars(&decor, &mut SpawnContext::seeded(5));
        assert_eq!(stars.len(), 250);
        for s in &stars {
            assert_eq!(s.kind, ParticleKind::Star);
            assert!((2000.0..12_000.0).contains(&s.position.z));
        }
    }
}
