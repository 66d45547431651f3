//! The terrain height field and its particle grid.
//!
//! The manifold is a `rows × columns` grid laid out on the X-Z plane, with
//! heights from [`terrain_y`]:
//!
//! ```text
//! r = (clamp(z, 800, 8800) − 800) / 50
//! c = x / 65 + 35
//! y = 400 + sin(c·freq + r·0.2)·amp + cos(r·0.12)·150
//!         + sin(c·0.35 + r·0.15)·70 + sin(r·0.08)·100
//! ```
//!
//! Past `mountain_start_row` three clipped, powered sines are subtracted
//! (y points down, so this raises the ground) with a weight that grows
//! linearly toward the far edge, giving the background its mountain
//! silhouette. Camera defaults and landmark placements are tuned against
//! these exact constants.

use crate::config::ManifoldConfig;
use crate::particle::{Particle, ParticleKind};
use crate::spawn::SpawnContext;
use glam::Vec3;

/// Z of the first terrain row.
pub const TERRAIN_Z_START: f32 = 800.0;
/// Z past which the height field stops varying.
pub const TERRAIN_Z_END: f32 = 8800.0;
/// World units between rows (before `spread_z`).
pub const ROW_SPACING: f32 = 50.0;
/// World units between columns (before `spread_x`).
pub const COLUMN_SPACING: f32 = 70.0;
/// Ground level below the eye.
pub const BASE_HEIGHT: f32 = 400.0;

/// Height-field row at which mountain growth reaches full weight.
const MOUNTAIN_FULL_ROW: f32 = (TERRAIN_Z_END - TERRAIN_Z_START) / ROW_SPACING;

/// Height-field row coordinate for a world z.
#[inline]
fn row_coord(z: f32) -> f32 {
    (z.clamp(TERRAIN_Z_START, TERRAIN_Z_END) - TERRAIN_Z_START) / ROW_SPACING
}

/// Height-field column coordinate for a world x.
#[inline]
fn column_coord(x: f32) -> f32 {
    x / 65.0 + 35.0
}

/// Terrain height at `(x, z)`. Pure in `(x, z, manifold)`.
pub fn terrain_y(x: f32, z: f32, manifold: &ManifoldConfig) -> f32 {
    let r = row_coord(z);
    let c = column_coord(x);

    BASE_HEIGHT
        + wave_term(x, z, manifold)
        + (r * 0.12).cos() * 150.0
        + (c * 0.35 + r * 0.15).sin() * 70.0
        + (r * 0.08).sin() * 100.0
        - mountain_lift(x, z, manifold)
}

/// The amplitude-scaled wave, the only term `wave_amplitude` touches.
pub fn wave_term(x: f32, z: f32, manifold: &ManifoldConfig) -> f32 {
    let r = row_coord(z);
    let c = column_coord(x);
    (c * manifold.wave_frequency + r * 0.2).sin() * manifold.wave_amplitude
}

/// Mountain height subtracted from the base field (0 before the start row).
pub fn mountain_lift(x: f32, z: f32, manifold: &ManifoldConfig) -> f32 {
    let r = row_coord(z);
    let start = manifold.mountain_start_row;
    if r <= start || start >= MOUNTAIN_FULL_ROW {
        return 0.0;
    }
    let growth = ((r - start) / (MOUNTAIN_FULL_ROW - start)).clamp(0.0, 1.0);
    let c = column_coord(x);

    let ridge = (c * 0.09 + 1.3).sin().max(0.0).powi(2) * 900.0;
    let peaks = (c * 0.21 + 4.1).sin().max(0.0).powi(3) * 500.0;
    let crags = (c * 0.47 + 2.2).sin().max(0.0).powf(1.5) * 220.0;

    growth * (ridge + peaks + crags)
}

/// World position of grid cell `(row, column)`.
pub fn grid_position(row: u32, column: u32, manifold: &ManifoldConfig) -> Vec3 {
    let x = (column as f32 - manifold.columns as f32 / 2.0) * COLUMN_SPACING * manifold.spread_x;
    let z = TERRAIN_Z_START + row as f32 * ROW_SPACING * manifold.spread_z;
    Vec3::new(x, terrain_y(x, z, manifold), z)
}

/// Generate every terrain particle, row-major from the front edge.
pub fn generate(manifold: &ManifoldConfig, ctx: &mut SpawnContext) -> Vec<Particle> {
    let mut particles = Vec::with_capacity(manifold.particle_count() as usize);

    for row in 0..manifold.rows {
        for column in 0..manifold.columns {
            let position = grid_position(row, column, manifold);
            particles.push(
                Particle::new(position, ParticleKind::Terrain, manifold.color)
                    .with_size(ctx.size_jitter(1.0, 0.2))
                    .with_phase(ctx.phase()),
            );
        }
    }

    particles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ManifoldConfig {
        ManifoldConfig {
            rows: 10,
            columns: 10,
            wave_amplitude: 100.0,
            wave_frequency: 0.2,
            spread_x: 1.0,
            spread_z: 1.0,
            ..ManifoldConfig::default()
        }
    }

    #[test]
    fn test_terrain_y_is_pure() {
        let m = ManifoldConfig::default();
        for &(x, z) in &[(0.0, 800.0), (-1234.5, 4000.0), (900.0, 8700.0), (10.0, 20_000.0)] {
            assert_eq!(terrain_y(x, z, &m).to_bits(), terrain_y(x, z, &m).to_bits());
        }
    }

    #[test]
    fn test_amplitude_scales_wave_linearly() {
        let a = small();
        let mut b = small();
        b.wave_amplitude = a.wave_amplitude * 3.0;
        for &(x, z) in &[(-200.0, 900.0), (130.0, 2500.0), (40.0, 6000.0)] {
            let wa = wave_term(x, z, &a);
            let wb = wave_term(x, z, &b);
            assert!((wb - 3.0 * wa).abs() < 1e-3);

            // Everything else is untouched
            let rest_a = terrain_y(x, z, &a) - wa;
            let rest_b = terrain_y(x, z, &b) - wb;
            assert!((rest_a - rest_b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_reference_height_at_origin_row() {
        // r = 0, c = 35: 400 + sin(7)·amp + 150 + sin(12.25)·70 + 0
        let m = small();
        let expected = 400.0 + (7.0f32).sin() * 100.0 + 150.0 + (12.25f32).sin() * 70.0;
        assert!((terrain_y(0.0, 800.0, &m) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_z_is_clamped() {
        let m = ManifoldConfig::default();
        assert_eq!(terrain_y(50.0, 0.0, &m), terrain_y(50.0, 800.0, &m));
        assert_eq!(terrain_y(50.0, 99_999.0, &m), terrain_y(50.0, 8800.0, &m));
    }

    #[test]
    fn test_mountains_only_in_back_rows() {
        let m = ManifoldConfig::default();
        let front_z = TERRAIN_Z_START + (m.mountain_start_row - 1.0) * ROW_SPACING;
        for x in [-2000.0, -500.0, 0.0, 700.0] {
            assert_eq!(mountain_lift(x, front_z, &m), 0.0);
            assert!(mountain_lift(x, TERRAIN_Z_END, &m) >= 0.0);
        }
        let total: f32 = (0..70)
            .map(|c| mountain_lift((c as f32 - 35.0) * 70.0, TERRAIN_Z_END, &m))
            .sum();
        assert!(total > 0.0);
    }

    #[test]
    fn test_small_grid_layout() {
        let m = small();
        let mut ctx = SpawnContext::seeded(1);
        let particles = generate(&m, &mut ctx);
        assert_eq!(particles.len(), 100);
        assert!(particles.iter().all(|p| p.kind == ParticleKind::Terrain));
        assert!(particles.iter().all(|p| (-350.0..=315.0).contains(&p.position.x)));
        for row in 1..10 {
            let prev = particles[(row - 1) * 10].position.z;
            let cur = particles[row * 10].position.z;
            assert!(cur > prev);
        }
    }
}
