//! Landmark configuration types

use crate::particle::Rgb;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Landmark archetype.
///
/// Adding a shape means one new variant here plus one arm in
/// [`crate::shapes::generate`] and [`LandmarkShape::particle_count`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkShape {
    Ring,
    Tower,
    Helix,
    Sphere,
    Ziggurat,
    Gateway,
    Orbit,
    Gridlines,
    Contour,
    WireframeSphere,
    Starfield,
    Lorenz,
    Halvorsen,
    Rossler,
}

impl LandmarkShape {
    pub const ALL: [LandmarkShape; 14] = [
        LandmarkShape::Ring,
        LandmarkShape::Tower,
        LandmarkShape::Helix,
        LandmarkShape::Sphere,
        LandmarkShape::Ziggurat,
        LandmarkShape::Gateway,
        LandmarkShape::Orbit,
        LandmarkShape::Gridlines,
        LandmarkShape::Contour,
        LandmarkShape::WireframeSphere,
        LandmarkShape::Starfield,
        LandmarkShape::Lorenz,
        LandmarkShape::Halvorsen,
        LandmarkShape::Rossler,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LandmarkShape::Ring => "Ring",
            LandmarkShape::Tower => "Tower",
            LandmarkShape::Helix => "Helix",
            LandmarkShape::Sphere => "Sphere",
            LandmarkShape::Ziggurat => "Ziggurat",
            LandmarkShape::Gateway => "Gateway",
            LandmarkShape::Orbit => "Orbit",
            LandmarkShape::Gridlines => "Gridlines",
            LandmarkShape::Contour => "Contour",
            LandmarkShape::WireframeSphere => "Wireframe Sphere",
            LandmarkShape::Starfield => "Starfield",
            LandmarkShape::Lorenz => "Lorenz",
            LandmarkShape::Halvorsen => "Halvorsen",
            LandmarkShape::Rossler => "Rossler",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

/// One positioned landmark.
///
/// `id` is 1-based and doubles as the scroll section the landmark belongs
/// to. `scale` stretches spatial extents, `density` scales point counts
/// (practically 0.1–5).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LandmarkConfig {
    pub id: u32,
    pub shape: LandmarkShape,
    pub color: Rgb,
    #[serde(default = "default_one")]
    pub scale: f32,
    #[serde(default = "default_one")]
    pub density: f32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub position: [f32; 3],
}

impl LandmarkConfig {
    pub fn new(id: u32, shape: LandmarkShape, position: Vec3) -> Self {
        Self {
            id,
            shape,
            color: Rgb::new(210, 220, 255),
            scale: 1.0,
            density: 1.0,
            enabled: true,
            position: position.to_array(),
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Particle count this landmark contributes (0 when disabled).
    pub fn particle_count(&self) -> u64 {
        if self.enabled {
            self.shape.particle_count(self.density)
        } else {
            0
        }
    }
}
