//! Tunable editor settings.
//!
//! Every field has a default matching the constants in [`crate::consts`]; a
//! host can override individual values (the CLI reads them from environment
//! variables) and hand the result to [`crate::editor::EditorCore::with_config`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::*;
use crate::transform::Vec2;

/// Zoom clamp and wheel step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLimits {
    pub min_ppm: f64,
    pub max_ppm: f64,
    /// Pixels-per-meter change applied per wheel notch.
    pub zoom_step: f64,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self { min_ppm: MIN_PIXELS_PER_METER, max_ppm: MAX_PIXELS_PER_METER, zoom_step: ZOOM_STEP }
    }
}

impl ViewLimits {
    /// Clamp a proposed zoom factor into range.
    #[must_use]
    pub fn clamp(&self, ppm: f64) -> f64 {
        ppm.clamp(self.min_ppm, self.max_ppm)
    }
}

/// Settings for the simulation stood up by the preview bridge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSettings {
    /// Fixed step length in seconds.
    pub timestep: f64,
    pub iterations: u32,
    /// Gravity in simulation units (pixels, Y down).
    pub gravity: Vec2,
    /// Half-extent of the square region the engine simulates.
    pub world_bound: f64,
    pub allow_sleep: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            timestep: PREVIEW_TIMESTEP,
            iterations: PREVIEW_ITERATIONS,
            gravity: Vec2::new(0.0, PREVIEW_GRAVITY_Y),
            world_bound: PREVIEW_WORLD_BOUND,
            allow_sleep: true,
        }
    }
}

/// Full editor configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    /// Most commands kept for undo.
    pub history_capacity: usize,
    /// Zoom factor the view starts at and returns to on reset.
    pub default_ppm: f64,
    pub limits: ViewLimits,
    /// Anchor pick radius in screen pixels.
    pub anchor_hit_px: f64,
    /// Vertex pick radius in world meters.
    pub vertex_hit_m: f64,
    pub preview: PreviewSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_ppm: DEFAULT_PIXELS_PER_METER,
            limits: ViewLimits::default(),
            anchor_hit_px: ANCHOR_HIT_RADIUS_PX,
            vertex_hit_m: VERTEX_HIT_RADIUS_M,
            preview: PreviewSettings::default(),
        }
    }
}
