//! # scrollscape
//!
//! Procedural particle landscapes for scroll-driven sequences.
//!
//! A scene is a terrain grid, a set of landmark shapes placed on it, a
//! gateway the camera flies through and a sparse star layer. Scroll
//! progress in `[0, 1]` dollies the camera forward, fades landmarks in and
//! out by section and dissolves the gateway; every frame is a back-to-front
//! list of pixel-snapped square sprites handed to a [`DrawSink`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use scrollscape::prelude::*;
//!
//! let config = ParticleSystemConfig::default();
//! let mut scene = Scene::new(config, Viewport::new(1280.0, 720.0))?;
//! let mut image = ImageSink::new(1280, 720, Rgb::new(12, 13, 16));
//!
//! let stats = scene.tick(0.25, 0.0, &mut image)?;
//! image.save_png("frame.png")?;
//! ```
//!
//! ## Building blocks
//!
//! | Stage | Module |
//! |-------|--------|
//! | Chaotic attractor clouds | [`attractor`] |
//! | Landmark shapes | [`shapes`] |
//! | Terrain height field | [`terrain`] |
//! | Gateway, sigil, stars | [`gateway`] |
//! | Immutable particle set | [`field`] |
//! | Projection | [`camera`] |
//! | Scroll phases | [`phase`] |
//! | Per-frame render | [`compositor`] |
//! | Output | [`sink`] |
//! | Live scene with rebuilds | [`scene`] |
//!
//! Generation is deterministic: every random draw comes from a
//! [`SpawnContext`] seeded by [`ParticleSystemConfig::seed`], and
//! attractors are integrated without any randomness at all.

pub mod attractor;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod error;
pub mod field;
pub mod gateway;
pub mod math;
pub mod particle;
pub mod phase;
pub mod scene;
pub mod shapes;
pub mod sink;
pub mod spawn;
pub mod terrain;
pub mod time;

pub use attractor::{AttractorCache, AttractorKind};
pub use camera::{CameraModel, CameraState, ScreenPoint, Viewport};
pub use compositor::{FrameCompositor, FrameStats};
pub use config::{
    AnimationConfig, CameraConfig, DecorConfig, GatewayConfig, GatewayShape, LandmarkConfig,
    LandmarkShape, ManifoldConfig, ParticleSystemConfig, SigilConfig,
};
pub use error::{ConfigError, ExportError, SceneError};
pub use field::{FieldCounts, ParticleField};
pub use glam::{Vec2, Vec3};
pub use particle::{Particle, ParticleKind, Rgb};
pub use phase::{Phase, PhaseController, PhaseSample, PhaseState};
pub use scene::{RebuildHandle, Scene};
pub use sink::{CountingSink, DrawCommand, DrawSink, ImageSink, SpriteBuffer, SpriteInstance};
pub use spawn::SpawnContext;
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use scrollscape::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attractor::{AttractorCache, AttractorKind};
    pub use crate::camera::{CameraState, Viewport};
    pub use crate::compositor::{FrameCompositor, FrameStats};
    pub use crate::config::{
        AnimationConfig, GatewayShape, LandmarkConfig, LandmarkShape, ManifoldConfig,
        ParticleSystemConfig,
    };
    pub use crate::field::ParticleField;
    pub use crate::particle::{Particle, ParticleKind, Rgb};
    pub use crate::phase::PhaseController;
    pub use crate::scene::Scene;
    pub use crate::sink::{CountingSink, DrawCommand, DrawSink, ImageSink, SpriteBuffer};
    pub use crate::spawn::SpawnContext;
    pub use crate::time::FrameClock;
    pub use crate::{Vec2, Vec3};
}
