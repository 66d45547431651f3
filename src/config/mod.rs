//! Configuration types for scrollscape scenes.
//!
//! A [`ParticleSystemConfig`] fully describes one scene: terrain, landmarks,
//! camera, gateway, sigil, scroll mapping and decorative layers. It is
//! serialized as JSON and validated on load; the generators assume the
//! ranges documented on each field but still clamp the values they depend
//! on structurally.

mod animation;
mod camera;
mod gateway;
mod landmark;
mod manifold;

use crate::error::ConfigError;
use crate::particle::Rgb;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub use animation::AnimationConfig;
pub use camera::CameraConfig;
pub use gateway::{DecorConfig, GatewayConfig, GatewayShape, SigilConfig};
pub use landmark::{LandmarkConfig, LandmarkShape};
pub use manifold::ManifoldConfig;

fn default_seed() -> u64 {
    0x5C20_11CA_9E00_0001
}

/// Complete scene configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParticleSystemConfig {
    /// Seed for every random draw made while building the field.
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub manifold: ManifoldConfig,
    #[serde(default)]
    pub landmarks: Vec<LandmarkConfig>,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub sigil: SigilConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub decor: DecorConfig,
}

impl Default for ParticleSystemConfig {
    fn default() -> Self {
        let landmark = |id: u32, shape: LandmarkShape, z: f32, color: Rgb| {
            LandmarkConfig::new(id, shape, Vec3::new(0.0, 220.0, z)).with_color(color)
        };
        Self {
            seed: default_seed(),
            manifold: ManifoldConfig::default(),
            landmarks: vec![
                landmark(1, LandmarkShape::Tower, 2400.0, Rgb::new(150, 220, 255)),
                landmark(2, LandmarkShape::Lorenz, 4200.0, Rgb::new(255, 150, 110)),
                landmark(3, LandmarkShape::Ziggurat, 6000.0, Rgb::new(230, 210, 140)),
                landmark(4, LandmarkShape::WireframeSphere, 7800.0, Rgb::new(170, 255, 200)),
                landmark(5, LandmarkShape::Ring, 9600.0, Rgb::new(220, 170, 255)),
            ],
            camera: CameraConfig::default(),
            gateway: GatewayConfig::default(),
            sigil: SigilConfig::default(),
            animation: AnimationConfig::default(),
            decor: DecorConfig::default(),
        }
    }
}

impl ParticleSystemConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Upper bound on the particles a field built from this config holds.
    ///
    /// Exact except for points the builder drops as non-finite.
    pub fn estimated_particle_count(&self) -> u64 {
        self.manifold.particle_count()
            + self.landmarks.iter().map(LandmarkConfig::particle_count).sum::<u64>()
            + self.gateway.particle_count()
            + self.sigil.particle_count()
            + self.decor.star_count as u64
    }

    /// Landmarks that will be generated.
    pub fn enabled_landmarks(&self) -> impl Iterator<Item = &LandmarkConfig> {
        self.landmarks.iter().filter(|l| l.enabled)
    }

    /// Check every documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.manifold;
        if m.rows == 0 || m.columns == 0 {
            return Err(ConfigError::invalid("manifold", "rows and columns must be at least 1"));
        }
        finite("manifold.wave_amplitude", m.wave_amplitude)?;
        finite("manifold.wave_frequency", m.wave_frequency)?;
        finite("manifold.mountain_start_row", m.mountain_start_row)?;
        positive("manifold.spread_x", m.spread_x)?;
        positive("manifold.spread_z", m.spread_z)?;
        unit("manifold.opacity", m.opacity)?;

        let mut ids = HashSet::new();
        for (i, l) in self.landmarks.iter().enumerate() {
            let field = |name: &str| format!("landmarks[{i}].{name}");
            if l.id == 0 {
                return Err(ConfigError::invalid(field("id"), "ids are 1-based"));
            }
            if !ids.insert(l.id) {
                return Err(ConfigError::invalid(field("id"), format!("duplicate id {}", l.id)));
            }
            positive(&field("scale"), l.scale)?;
            positive(&field("density"), l.density)?;
            for (axis, v) in ["x", "y", "z"].iter().zip(l.position) {
                finite(&field(&format!("position.{axis}")), v)?;
            }
        }

        let c = &self.camera;
        for (name, v) in [
            ("camera.pitch", c.pitch),
            ("camera.yaw", c.yaw),
            ("camera.roll", c.roll),
            ("camera.truck_x", c.truck_x),
            ("camera.truck_y", c.truck_y),
        ] {
            finite(name, v)?;
        }
        positive("camera.focal_length", c.focal_length)?;
        positive("camera.max_depth", c.max_depth)?;
        unit("camera.vanishing_point.x", c.vanishing_point[0])?;
        unit("camera.vanishing_point.y", c.vanishing_point[1])?;
        if !(c.terrain_clip > 0.0 && c.terrain_clip <= 1.0) {
            return Err(ConfigError::invalid("camera.terrain_clip", "must be in (0, 1]"));
        }

        let g = &self.gateway;
        positive("gateway.radius", g.radius)?;
        finite("gateway.tunnel_spacing", g.tunnel_spacing)?;
        for v in g.position {
            finite("gateway.position", v)?;
        }
        if g.enabled && g.tunnel_layers == 0 {
            return Err(ConfigError::invalid("gateway.tunnel_layers", "must be at least 1"));
        }

        let s = &self.sigil;
        if s.sides < 3 {
            return Err(ConfigError::invalid("sigil.sides", "must be at least 3"));
        }
        positive("sigil.radius", s.radius)?;

        let a = &self.animation;
        if a.section_count == 0 {
            return Err(ConfigError::invalid("animation.section_count", "must be at least 1"));
        }
        finite("animation.depth_per_progress", a.depth_per_progress)?;
        if a.depth_per_progress < 0.0 {
            return Err(ConfigError::invalid("animation.depth_per_progress", "must not be negative"));
        }
        unit("animation.gateway_fade_start", a.gateway_fade_start)?;
        unit("animation.gateway_fade_end", a.gateway_fade_end)?;
        unit("animation.transition_end", a.transition_end)?;
        if a.gateway_fade_start > a.gateway_fade_end {
            return Err(ConfigError::invalid(
                "animation.gateway_fade_start",
                "must not exceed gateway_fade_end",
            ));
        }
        if a.gateway_fade_start > a.transition_end {
            return Err(ConfigError::invalid(
                "animation.transition_end",
                "must not precede gateway_fade_start",
            ));
        }
        if !(0.0..1.0).contains(&a.visibility_floor) {
            return Err(ConfigError::invalid("animation.visibility_floor", "must be in [0, 1)"));
        }
        // A landmark past the last section would always be culled
        if let Some((i, l)) = self
            .landmarks
            .iter()
            .enumerate()
            .find(|(_, l)| l.id > a.section_count)
        {
            return Err(ConfigError::invalid(
                format!("landmarks[{i}].id"),
                format!("section {} exceeds section_count {}", l.id, a.section_count),
            ));
        }

        Ok(())
    }
}

fn finite(field: &str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be finite"))
    }
}

fn positive(field: &str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be a positive number"))
    }
}

fn unit(field: &str, v: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be in [0, 1]"))
    }
}
