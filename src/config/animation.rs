//! Scroll animation configuration

use serde::{Deserialize, Serialize};

/// Scroll-to-scene mapping.
///
/// Ranges: `section_count` ≥ 1, `depth_per_progress` ≥ 0,
/// `0 ≤ gateway_fade_start ≤ gateway_fade_end ≤ 1`,
/// `gateway_fade_start ≤ transition_end ≤ 1`,
/// `visibility_floor` in `[0, 1)`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Number of scroll sections. Landmark `id`s index into them (1-based)
    /// and may not exceed it.
    pub section_count: u32,
    /// World units the camera dollies forward over the full scroll.
    pub depth_per_progress: f32,
    /// Progress at which the gateway starts fading (end of the hero phase).
    pub gateway_fade_start: f32,
    /// Progress at which the gateway is fully gone.
    pub gateway_fade_end: f32,
    /// End of the transition phase.
    pub transition_end: f32,
    /// Particles dimmer than this are skipped.
    pub visibility_floor: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            section_count: 5,
            depth_per_progress: 9000.0,
            gateway_fade_start: 0.15,
            gateway_fade_end: 0.30,
            transition_end: 0.30,
            visibility_floor: 0.01,
        }
    }
}
