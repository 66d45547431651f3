//! Per-frame sort, cull, shade and emit.
//!
//! [`FrameCompositor::render_frame`] turns a [`ParticleField`] into draw
//! commands for one `(progress, time)` pair:
//!
//! 1. shift every particle by the scroll depth offset and drop those the
//!    phase controller hides or that fall outside `(NEAR_EPSILON, max_depth]`
//!    (terrain stops earlier, at `max_depth · terrain_clip`);
//! 2. sort the survivors far to near;
//! 3. project, fog, fade, size and wobble each one;
//! 4. snap to the pixel grid and hand it to the sink.
//!
//! The compositor keeps a scratch buffer between frames so steady-state
//! rendering does not allocate.

use crate::camera::{CameraModel, CameraState, Viewport, NEAR_EPSILON};
use crate::field::ParticleField;
use crate::math::{clamp01, snap_to_grid};
use crate::particle::{Particle, ParticleKind, Rgb};
use crate::phase::PhaseController;
use crate::sink::{DrawCommand, DrawSink};
use tracing::trace;

/// Far terrain blends toward this color.
pub const FOG_TARGET: Rgb = Rgb::new(38, 40, 46);
/// Fraction of the fog color reached at `max_depth`.
const FOG_STRENGTH: f32 = 0.85;
/// Particles nearer than this get brighter.
const PROXIMITY_RANGE: f32 = 600.0;
const PROXIMITY_BOOST: f32 = 0.5;
/// Blend toward white for the active landmark at full highlight.
const HIGHLIGHT_BLEND: f32 = 0.25;

const SIZE_FACTOR: f32 = 2.5;
const MIN_SPRITE: f32 = 1.0;
const MAX_SPRITE: f32 = 8.0;
/// Extra gateway sprite size once the transition completes.
const GATEWAY_SWELL: f32 = 0.5;

const WOBBLE_PX: f32 = 0.75;
const WOBBLE_RATE: f32 = 0.9;
const BREATH_RATE: f32 = 1.7;
const TWINKLE_RATE: f32 = 3.1;

/// Default pixel grid.
pub const DEFAULT_GRID: f32 = 2.0;

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub considered: usize,
    /// Hidden by the phase controller or below the visibility floor.
    pub culled_phase: usize,
    /// Behind the camera or past the depth limit.
    pub culled_depth: usize,
    /// Rejected by the camera (off screen or degenerate).
    pub culled_projection: usize,
    pub emitted: usize,
}

impl FrameStats {
    pub fn culled(&self) -> usize {
        self.culled_phase + self.culled_depth + self.culled_projection
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    depth: f32,
    alpha: f32,
}

/// Renders fields frame by frame.
#[derive(Debug, Clone)]
pub struct FrameCompositor {
    viewport: Viewport,
    phases: PhaseController,
    grid: f32,
    scratch: Vec<Candidate>,
}

impl FrameCompositor {
    pub fn new(viewport: Viewport, phases: PhaseController) -> Self {
        Self {
            viewport,
            phases,
            grid: DEFAULT_GRID,
            scratch: Vec::new(),
        }
    }

    /// Pixel grid for snapping. Values ≤ 0 disable snapping.
    pub fn with_grid(mut self, grid: f32) -> Self {
        self.grid = grid;
        self
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn phases(&self) -> &PhaseController {
        &self.phases
    }

    pub fn set_phases(&mut self, phases: PhaseController) {
        self.phases = phases;
    }

    /// Render one frame into `sink`, back to front.
    pub fn render_frame(
        &mut self,
        field: &ParticleField,
        camera: &CameraState,
        progress: f32,
        time: f32,
        sink: &mut dyn DrawSink,
    ) -> FrameStats {
        let progress = clamp01(progress);
        let particles = field.particles();
        let mut stats = FrameStats {
            considered: particles.len(),
            ..FrameStats::default()
        };

        let floor = self.phases.config().visibility_floor;
        let depth_offset = self.phases.depth_offset(progress);
        let terrain_limit = camera.max_depth * camera.terrain_clip;

        self.scratch.clear();
        for (index, p) in particles.iter().enumerate() {
            let sample = self.phases.eval(progress, p.kind, p.landmark_id);
            if sample.culled || sample.alpha < floor {
                stats.culled_phase += 1;
                continue;
            }
            let depth = p.position.z - depth_offset;
            let limit = match p.kind {
                ParticleKind::Terrain => terrain_limit,
                _ => camera.max_depth,
            };
            if !(depth > NEAR_EPSILON && depth <= limit) {
                stats.culled_depth += 1;
                continue;
            }
            self.scratch.push(Candidate {
                index,
                depth,
                alpha: sample.alpha,
            });
        }

        // Stable, so equal depths keep field order
        self.scratch.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        let model = CameraModel::new(camera, self.viewport);
        let shade = Shading {
            phases: &self.phases,
            progress,
            time,
            max_depth: camera.max_depth,
            swell: 1.0 + GATEWAY_SWELL * self.phases.transition_amount(progress),
            grid: self.grid,
        };

        sink.begin_frame(self.viewport);
        for c in &self.scratch {
            let p = &particles[c.index];
            let Some(screen) = model.project(p.position, depth_offset, p.kind) else {
                stats.culled_projection += 1;
                continue;
            };
            sink.draw(&shade.command(p, c, screen.x, screen.y, screen.scale));
            stats.emitted += 1;
        }
        sink.end_frame();

        trace!(
            considered = stats.considered,
            culled_phase = stats.culled_phase,
            culled_depth = stats.culled_depth,
            culled_projection = stats.culled_projection,
            emitted = stats.emitted,
            progress,
            "frame composited"
        );
        stats
    }
}

struct Shading<'a> {
    phases: &'a PhaseController,
    progress: f32,
    time: f32,
    max_depth: f32,
    swell: f32,
    grid: f32,
}

impl Shading<'_> {
    fn command(&self, p: &Particle, c: &Candidate, x: f32, y: f32, scale: f32) -> DrawCommand {
        let nd = clamp01(c.depth / self.max_depth);

        let mut color = p.color;
        match (p.kind, p.landmark_id) {
            (ParticleKind::Terrain, _) => color = color.lerp(FOG_TARGET, nd * FOG_STRENGTH),
            (ParticleKind::LandmarkGeometry, Some(section)) => {
                let highlight = self.phases.highlight(self.progress, section);
                if highlight > 0.0 {
                    color = color.lerp(Rgb::WHITE, HIGHLIGHT_BLEND * highlight);
                }
            }
            _ => {}
        }

        let depth_alpha = ((1.0 - nd) * 1.4 + 0.15).min(1.0);
        let mut alpha = c.alpha * depth_alpha;
        if c.depth < PROXIMITY_RANGE {
            alpha *= 1.0 + (1.0 - c.depth / PROXIMITY_RANGE) * PROXIMITY_BOOST;
        }
        alpha = alpha.min(1.0);

        let mut size = (p.size * scale * SIZE_FACTOR).clamp(MIN_SPRITE, MAX_SPRITE);
        if p.kind == ParticleKind::Gateway {
            size *= self.swell;
        }
        if self.grid > 0.0 {
            size = (size / self.grid).ceil() * self.grid;
        }

        let t = self.time * WOBBLE_RATE + p.phase;
        let x = x + t.sin() * WOBBLE_PX;
        let y = y + t.cos() * WOBBLE_PX;
        alpha *= match p.kind {
            ParticleKind::Star => 0.6 + 0.4 * (self.time * TWINKLE_RATE + p.phase).sin(),
            _ => 0.9 + 0.1 * (self.time * BREATH_RATE + p.phase).sin(),
        };

        DrawCommand {
            x: snap_to_grid(x - size * 0.5, self.grid),
            y: snap_to_grid(y - size * 0.5, self.grid),
            rgb: color.tuple(),
            alpha: clamp01(alpha),
            size,
        }
    }
}
