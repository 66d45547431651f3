//! Terrain (manifold) configuration

use crate::particle::Rgb;
use serde::{Deserialize, Serialize};

fn default_opacity() -> f32 {
    0.85
}

fn default_mountain_start() -> f32 {
    110.0
}

/// Shape of the terrain grid and its height field.
///
/// Ranges: `rows`, `columns` ≥ 1; `spread_x`, `spread_z` > 0;
/// `opacity` in `[0, 1]`. `mountain_start_row` is measured in height-field
/// rows (50 world units each) from the front edge.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ManifoldConfig {
    pub rows: u32,
    pub columns: u32,
    pub wave_amplitude: f32,
    pub wave_frequency: f32,
    pub spread_x: f32,
    pub spread_z: f32,
    /// Global alpha multiplier for every terrain particle.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_mountain_start")]
    pub mountain_start_row: f32,
    #[serde(default = "default_terrain_color")]
    pub color: Rgb,
}

fn default_terrain_color() -> Rgb {
    Rgb::new(96, 132, 168)
}

impl Default for ManifoldConfig {
    fn default() -> Self {
        Self {
            rows: 160,
            columns: 70,
            wave_amplitude: 60.0,
            wave_frequency: 0.2,
            spread_x: 1.0,
            spread_z: 1.0,
            opacity: default_opacity(),
            mountain_start_row: default_mountain_start(),
            color: default_terrain_color(),
        }
    }
}

impl ManifoldConfig {
    /// Number of terrain particles this config produces.
    pub fn particle_count(&self) -> u64 {
        self.rows as u64 * self.columns as u64
    }
}
