//! Configuration options for visad-a3d displays.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Display-wide configuration options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Whether wind components are converted from m/s to knots before
    /// barbs are built.
    pub knots_convert: bool,

    /// Whether barbs are drawn without a speed label.
    pub no_numbers: bool,

    /// Number of decimal places in barb speed labels.
    pub num_dec_places: usize,

    /// Glyph scale applied to barb strokes and pole length.
    pub barb_scale: f32,

    /// Point size used for the calm-wind circle.
    pub point_size: f32,

    /// Whether a dragged glyph crawls toward the cursor instead of
    /// snapping to it on the first move.
    pub pick_crawl_to_cursor: bool,

    /// Largest distance in pixels between the cursor and a glyph head for
    /// a press to grab the glyph.
    pub pick_radius_px: f32,

    /// Render loop cadence in milliseconds.
    pub frame_interval_ms: u64,

    /// Milliseconds each animation frame stays on screen.
    pub animation_step_ms: u64,

    /// Whether frame population may run on the worker pool.
    pub parallel_frames: bool,

    /// Whether animated functions are drawn as trajectories by default.
    pub trajectory: bool,

    /// Whether the display box is drawn.
    pub box_visible: bool,

    /// Whether the cursor and its readout are drawn.
    pub cursor_visible: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            knots_convert: true,
            no_numbers: true,
            num_dec_places: 0,
            barb_scale: 0.1,
            point_size: 0.02,
            pick_crawl_to_cursor: true,
            pick_radius_px: 12.0,
            frame_interval_ms: 20,
            animation_step_ms: 500,
            parallel_frames: true,
            trajectory: false,
            box_visible: true,
            cursor_visible: true,
        }
    }
}

impl Options {
    /// Parses options from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes the options as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render loop cadence.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    /// Time each animation frame stays on screen.
    pub fn animation_step(&self) -> Duration {
        Duration::from_millis(self.animation_step_ms.max(1))
    }
}
