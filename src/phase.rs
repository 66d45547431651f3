//! Scroll progress to per-particle visibility.
//!
//! Everything here is a pure function of scroll progress (clamped to
//! `[0, 1]`, NaN treated as 0), so scrolling back and forth always lands on
//! the same frame.
//!
//! Sections are 1-based. At progress `p` with `n` sections the current
//! section is `min(floor(p·n) + 1, n)` and the intra-section progress is
//! the fractional part of `p·n` (1 at the very end of the scroll).

use crate::config::AnimationConfig;
use crate::math::{clamp01, ease_in_out_cubic, ease_out_cubic, inverse_lerp};
use crate::particle::ParticleKind;

/// How fast the active landmark fades in across its section.
const REVEAL_RATE: f32 = 1.8;
/// Alpha of the landmark one section ahead of or behind the current one.
const NEIGHBOR_ALPHA: f32 = 0.3;

/// Result of evaluating one particle at one progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSample {
    pub alpha: f32,
    pub depth_offset: f32,
    /// Set when the particle belongs to a section too far away to draw.
    pub culled: bool,
}

/// Named stage of the scroll sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The opening view, gateway fully visible.
    Hero,
    /// Passing through the gateway.
    Transition,
    /// Moving through the landmark sections.
    Steady,
}

/// A phase plus how far through it the scroll is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseState {
    pub phase: Phase,
    /// Linear progress through the phase, in `[0, 1]`.
    pub local: f32,
    /// `ease_in_out_cubic(local)`.
    pub eased: f32,
}

/// Maps scroll progress to alpha, depth offset and named phases.
#[derive(Debug, Clone)]
pub struct PhaseController {
    config: AnimationConfig,
    manifold_opacity: f32,
}

impl PhaseController {
    pub fn new(config: AnimationConfig, manifold_opacity: f32) -> Self {
        Self {
            config,
            manifold_opacity: clamp01(manifold_opacity),
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    fn section_count(&self) -> u32 {
        self.config.section_count.max(1)
    }

    /// World units the scene has moved toward the camera.
    pub fn depth_offset(&self, progress: f32) -> f32 {
        clamp01(progress) * self.config.depth_per_progress
    }

    /// Current 1-based section.
    pub fn current_section(&self, progress: f32) -> u32 {
        let n = self.section_count();
        let scaled = clamp01(progress) * n as f32;
        (scaled.floor() as u32 + 1).min(n)
    }

    /// Progress through the current section, in `[0, 1]`.
    pub fn intra_section(&self, progress: f32) -> f32 {
        let p = clamp01(progress);
        if p >= 1.0 {
            return 1.0;
        }
        let scaled = p * self.section_count() as f32;
        scaled - scaled.floor()
    }

    /// Gateway visibility: 1 before the fade window, 0 after it.
    pub fn gateway_fade(&self, progress: f32) -> f32 {
        let p = clamp01(progress);
        let (start, end) = (self.config.gateway_fade_start, self.config.gateway_fade_end);
        if p <= start {
            1.0
        } else if p >= end {
            0.0
        } else {
            1.0 - inverse_lerp(start, end, p)
        }
    }

    /// Alpha and depth offset for a particle of `kind`.
    ///
    /// `landmark_section` is the producing landmark's id, if any.
    pub fn eval(&self, progress: f32, kind: ParticleKind, landmark_section: Option<u32>) -> PhaseSample {
        let p = clamp01(progress);
        let depth_offset = self.depth_offset(p);
        let mut culled = false;

        let alpha = match kind {
            ParticleKind::Terrain => self.manifold_opacity,
            ParticleKind::LandmarkGeometry => match landmark_section {
                Some(section) => match self.current_section(p).abs_diff(section) {
                    0 => (self.intra_section(p) * REVEAL_RATE).min(1.0),
                    1 => NEIGHBOR_ALPHA,
                    _ => {
                        culled = true;
                        0.0
                    }
                },
                None => 1.0,
            },
            ParticleKind::Gateway => self.gateway_fade(p),
            ParticleKind::Star => 1.0,
        };

        PhaseSample {
            alpha,
            depth_offset,
            culled,
        }
    }

    /// Highlight weight for the landmark of `section`: eased reveal while
    /// its section is current, 0 otherwise.
    pub fn highlight(&self, progress: f32, section: u32) -> f32 {
        if self.current_section(progress) != section {
            return 0.0;
        }
        ease_out_cubic((self.intra_section(progress) * REVEAL_RATE).min(1.0))
    }

    /// Named phase at `progress`.
    pub fn phase_at(&self, progress: f32) -> PhaseState {
        let p = clamp01(progress);
        let hero_end = self.config.gateway_fade_start;
        let transition_end = self.config.transition_end.max(hero_end);

        let (phase, local) = if p < hero_end {
            (Phase::Hero, inverse_lerp(0.0, hero_end, p))
        } else if p < transition_end {
            (Phase::Transition, inverse_lerp(hero_end, transition_end, p))
        } else {
            (Phase::Steady, inverse_lerp(transition_end, 1.0, p))
        };
        let local = clamp01(local);

        PhaseState {
            phase,
            local,
            eased: ease_in_out_cubic(local),
        }
    }

    /// Eased progress through the transition: 0 before it, 1 after it.
    pub fn transition_amount(&self, progress: f32) -> f32 {
        let state = self.phase_at(progress);
        match state.phase {
            Phase::Hero => 0.0,
            Phase::Transition => state.eased,
            Phase::Steady => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PhaseController {
        PhaseController::new(AnimationConfig::default(), 0.85)
    }

    #[test]
    fn test_sections_are_one_based() {
        let c = controller();
        assert_eq!(c.current_section(0.0), 1);
        assert_eq!(c.current_section(0.19), 1);
        assert_eq!(c.current_section(0.2), 2);
        assert_eq!(c.current_section(0.99), 5);
        assert_eq!(c.current_section(1.0), 5);
        assert_eq!(c.intra_section(1.0), 1.0);
    }

    #[test]
    fn test_landmark_branches() {
        let c = controller();
        let at = |p, s| c.eval(p, ParticleKind::LandmarkGeometry, Some(s));

        // progress 0.1: section 1, intra 0.5
        let current = at(0.1, 1);
        assert!((current.alpha - 0.9).abs() < 1e-5);
        assert!(!current.culled);

        assert_eq!(at(0.1, 2).alpha, NEIGHBOR_ALPHA);
        let far = at(0.1, 3);
        assert_eq!(far.alpha, 0.0);
        assert!(far.culled);

        assert_eq!(c.eval(0.1, ParticleKind::LandmarkGeometry, None).alpha, 1.0);
    }

    #[test]
    fn test_other_kinds() {
        let c = controller();
        assert_eq!(c.eval(0.7, ParticleKind::Terrain, None).alpha, 0.85);
        assert_eq!(c.eval(0.7, ParticleKind::Star, None).alpha, 1.0);
        assert_eq!(c.eval(0.5, ParticleKind::Terrain, None).depth_offset, 4500.0);
    }

    #[test]
    fn test_gateway_fade_window() {
        let c = controller();
        assert_eq!(c.eval(0.0, ParticleKind::Gateway, None).alpha, 1.0);
        assert_eq!(c.eval(0.15, ParticleKind::Gateway, None).alpha, 1.0);
        assert!((c.eval(0.225, ParticleKind::Gateway, None).alpha - 0.5).abs() < 1e-4);
        assert_eq!(c.eval(0.30, ParticleKind::Gateway, None).alpha, 0.0);
        assert_eq!(c.eval(0.9, ParticleKind::Gateway, None).alpha, 0.0);
    }

    #[test]
    fn test_reversible_for_sections_ahead() {
        let c = controller();
        let forward: Vec<_> = (0..=100)
            .map(|i| c.eval(i as f32 / 100.0, ParticleKind::LandmarkGeometry, Some(4)))
            .collect();
        let backward: Vec<_> = (0..=100)
            .rev()
            .map(|i| c.eval(i as f32 / 100.0, ParticleKind::LandmarkGeometry, Some(4)))
            .collect();
        for (f, b) in forward.iter().zip(backward.iter().rev()) {
            assert_eq!(f, b);
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        let c = controller();
        assert_eq!(
            c.eval(f32::NAN, ParticleKind::Gateway, None),
            c.eval(0.0, ParticleKind::Gateway, None)
        );
        assert_eq!(c.depth_offset(2.0), 9000.0);
        assert_eq!(c.depth_offset(-1.0), 0.0);
    }

    #[test]
    fn test_named_phases() {
        let c = controller();
        assert_eq!(c.phase_at(0.0).phase, Phase::Hero);
        assert_eq!(c.phase_at(0.2).phase, Phase::Transition);
        assert_eq!(c.phase_at(0.5).phase, Phase::Steady);
        assert_eq!(c.transition_amount(0.1), 0.0);
        assert_eq!(c.transition_amount(0.8), 1.0);
        let mid = c.phase_at(0.225);
        assert!((mid.local - 0.5).abs() < 1e-4);
        assert!((mid.eased - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_highlight_only_for_current_section() {
        let c = controller();
        assert!(c.highlight(0.15, 1) > 0.0);
        assert_eq!(c.highlight(0.15, 2), 0.0);
        assert_eq!(c.highlight(0.0, 1), 0.0);
        assert!((c.highlight(0.18, 1) - 1.0).abs() < 1e-5);
    }
}
