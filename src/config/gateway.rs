//! Gateway, sigil and decorative layer configuration

use crate::attractor::AttractorKind;
use crate::particle::Rgb;
use serde::{Deserialize, Serialize};

/// How the portal is drawn.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GatewayShape {
    #[default]
    Circle,
    Square,
    Triangle,
    Hexagon,
    /// Normalized, cached attractor cloud.
    Attractor(AttractorKind),
}

/// The portal the sequence opens on.
///
/// `points` is the point count of one tunnel layer; `tunnel_layers` ≥ 1
/// copies recede by `tunnel_spacing` world units.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    pub enabled: bool,
    pub shape: GatewayShape,
    pub position: [f32; 3],
    pub radius: f32,
    pub points: u32,
    pub tunnel_layers: u32,
    pub tunnel_spacing: f32,
    pub color: Rgb,
    /// Attractor start point; `None` uses the system's default seed.
    pub attractor_seed: Option<[f32; 3]>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shape: GatewayShape::Circle,
            position: [0.0, 120.0, 1400.0],
            radius: 220.0,
            points: 480,
            tunnel_layers: 4,
            tunnel_spacing: 140.0,
            color: Rgb::new(255, 196, 120),
            attractor_seed: None,
        }
    }
}

impl GatewayConfig {
    pub fn particle_count(&self) -> u64 {
        if self.enabled {
            self.points as u64 * self.tunnel_layers.max(1) as u64
        } else {
            0
        }
    }
}

/// Emblem drawn on the gateway: an outer circle plus a `{n/2}` star.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SigilConfig {
    pub enabled: bool,
    /// Star points, at least 3.
    pub sides: u32,
    pub radius: f32,
    pub points_per_edge: u32,
    /// Offset from the gateway position.
    pub offset: [f32; 3],
    pub color: Rgb,
}

impl Default for SigilConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sides: 5,
            radius: 90.0,
            points_per_edge: 20,
            offset: [0.0, 0.0, -10.0],
            color: Rgb::new(255, 236, 200),
        }
    }
}

impl SigilConfig {
    pub fn particle_count(&self) -> u64 {
        if self.enabled {
            (self.sides.max(3) as u64 + 4) * self.points_per_edge as u64
        } else {
            0
        }
    }
}

/// Decorative layers that are not tied to any landmark.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecorConfig {
    pub star_count: u32,
    pub star_color: Rgb,
}

impl Default for DecorConfig {
    fn default() -> Self {
        Self {
            star_count: 400,
            star_color: Rgb::new(200, 210, 235),
        }
    }
}
