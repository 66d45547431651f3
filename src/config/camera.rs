//! Camera configuration (degrees, as authored)

use crate::camera::CameraState;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Authored camera parameters. Angles are in degrees here and converted
/// to radians by [`CameraConfig::to_state`].
///
/// Ranges: `focal_length` > 0, `max_depth` > 0, `terrain_clip` in `(0, 1]`,
/// vanishing point components in `[0, 1]`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub truck_x: f32,
    pub truck_y: f32,
    pub focal_length: f32,
    pub vanishing_point: [f32; 2],
    pub max_depth: f32,
    pub terrain_clip: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pitch: 8.0,
            yaw: 0.0,
            roll: 0.0,
            truck_x: 0.0,
            truck_y: 0.0,
            focal_length: 600.0,
            vanishing_point: [0.5, 0.42],
            max_depth: 8000.0,
            terrain_clip: 0.95,
        }
    }
}

impl CameraConfig {
    /// Convert to the per-frame camera state.
    pub fn to_state(&self) -> CameraState {
        CameraState {
            pitch: self.pitch.to_radians(),
            yaw: self.yaw.to_radians(),
            roll: self.roll.to_radians(),
            truck_x: self.truck_x,
            truck_y: self.truck_y,
            focal_length: self.focal_length,
            vanishing_point: Vec2::from_array(self.vanishing_point),
            max_depth: self.max_depth,
            terrain_clip: self.terrain_clip,
        }
    }
}
