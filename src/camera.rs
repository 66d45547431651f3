//! Perspective camera for the scroll sequence.
//!
//! The camera sits at the origin looking down +z. Scrolling dollies it
//! forward, which is expressed as a depth offset subtracted from every
//! point rather than as a camera position.
//!
//! # Pipeline
//!
//! For each point, in order:
//!
//! 1. subtract the scroll depth offset from z;
//! 2. subtract the truck offsets from x and y;
//! 3. yaw: rotate in the X-Z plane;
//! 4. cull when `z ≤ NEAR_EPSILON`;
//! 5. perspective divide, `scale = focal_length / z`;
//! 6. pitch: compress y by `cos(pitch)` and shift by
//!    `−sin(pitch)·150·scale` (150 is the scene's eye height);
//! 7. offset from the vanishing point;
//! 8. roll about the vanishing point.
//!
//! Points that land outside the viewport plus a small kind-dependent pad
//! are rejected too, so nothing is drawn off screen.

use crate::math::{rotate_about_cached, rotate_xz_cached};
use crate::particle::ParticleKind;
use glam::{Vec2, Vec3};

/// Points this close to (or behind) the camera are culled.
pub const NEAR_EPSILON: f32 = 0.5;
/// Vertical shift per radian of pitch, in world units at unit scale.
pub const PITCH_EYE_HEIGHT: f32 = 150.0;
/// Off-screen margin kept for terrain, in pixels.
pub const TERRAIN_PAD: f32 = 24.0;
/// Off-screen margin kept for everything else, in pixels.
pub const GEOMETRY_PAD: f32 = 12.0;

/// Camera parameters for one frame (angles in radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub truck_x: f32,
    pub truck_y: f32,
    pub focal_length: f32,
    /// Vanishing point as a fraction of the viewport (0–1 on each axis).
    pub vanishing_point: Vec2,
    /// Farthest depth that is drawn.
    pub max_depth: f32,
    /// Terrain is drawn up to `max_depth * terrain_clip`.
    pub terrain_clip: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        crate::config::CameraConfig::default().to_state()
    }
}

/// Output surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// A projected point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    /// Perspective scale `focal_length / z` at this point.
    pub scale: f32,
    /// Camera-space depth after yaw.
    pub depth: f32,
}

impl ScreenPoint {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// A camera with its trig precomputed for one frame.
#[derive(Debug, Clone)]
pub struct CameraModel {
    state: CameraState,
    viewport: Viewport,
    vanishing_px: Vec2,
    yaw_sin: f32,
    yaw_cos: f32,
    pitch_sin: f32,
    pitch_cos: f32,
    roll_sin: f32,
    roll_cos: f32,
}

impl CameraModel {
    pub fn new(state: &CameraState, viewport: Viewport) -> Self {
        let (yaw_sin, yaw_cos) = state.yaw.sin_cos();
        let (pitch_sin, pitch_cos) = state.pitch.sin_cos();
        let (roll_sin, roll_cos) = state.roll.sin_cos();
        Self {
            state: *state,
            viewport,
            vanishing_px: state.vanishing_point * viewport.size(),
            yaw_sin,
            yaw_cos,
            pitch_sin,
            pitch_cos,
            roll_sin,
            roll_cos,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The vanishing point in pixels.
    pub fn vanishing_point_px(&self) -> Vec2 {
        self.vanishing_px
    }

    /// Project with viewport culling. See the module docs for the pipeline.
    pub fn project(
        &self,
        point: Vec3,
        scroll_depth_offset: f32,
        kind: ParticleKind,
    ) -> Option<ScreenPoint> {
        let projected = self.project_unclipped(point, scroll_depth_offset)?;
        let pad = match kind {
            ParticleKind::Terrain => TERRAIN_PAD,
            _ => GEOMETRY_PAD,
        };
        self.in_viewport(projected.position(), pad)
            .then_some(projected)
    }

    /// Steps 1–8 of the pipeline without the viewport test.
    ///
    /// Still returns `None` behind the camera and for non-finite results.
    pub fn project_unclipped(&self, point: Vec3, scroll_depth_offset: f32) -> Option<ScreenPoint> {
        let local = Vec3::new(
            point.x - self.state.truck_x,
            point.y - self.state.truck_y,
            point.z - scroll_depth_offset,
        );
        let view = rotate_xz_cached(local, self.yaw_sin, self.yaw_cos);

        // Also rejects NaN depths
        if !(view.z > NEAR_EPSILON) {
            return None;
        }

        let scale = self.state.focal_length / view.z;
        let offset = Vec2::new(
            view.x * scale,
            view.y * self.pitch_cos * scale - self.pitch_sin * PITCH_EYE_HEIGHT * scale,
        );
        let screen = rotate_about_cached(
            self.vanishing_px + offset,
            self.vanishing_px,
            self.roll_sin,
            self.roll_cos,
        );

        if !(screen.x.is_finite() && screen.y.is_finite() && scale.is_finite()) {
            return None;
        }

        Some(ScreenPoint {
            x: screen.x,
            y: screen.y,
            scale,
            depth: view.z,
        })
    }

    /// True when `p` lies within the viewport grown by `pad` on every side.
    pub fn in_viewport(&self, p: Vec2, pad: f32) -> bool {
        p.x >= -pad
            && p.y >= -pad
            && p.x <= self.viewport.width + pad
            && p.y <= self.viewport.height + pad
    }
}

/// One-shot projection of a single point.
///
/// Prefer building a [`CameraModel`] once per frame when projecting many
/// points.
pub fn project(
    point: Vec3,
    camera: &CameraState,
    viewport: Viewport,
    scroll_depth_offset: f32,
    kind: ParticleKind,
) -> Option<ScreenPoint> {
    CameraModel::new(camera, viewport).project(point, scroll_depth_offset, kind)
}
