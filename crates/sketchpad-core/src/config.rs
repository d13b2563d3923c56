//! Editor configuration.

use crate::geometry::{MIN_CSS_HEIGHT, MIN_CSS_WIDTH};
use crate::shapes::{DEFAULT_STROKE_WIDTH, SerializableColor};
use crate::snap::GRID_SIZE;
use crate::storage::StorageResult;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Editor configuration. Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid cell in CSS pixels.
    pub grid_size: f64,
    /// Color for new strokes.
    pub stroke_color: SerializableColor,
    /// Width for new strokes, in CSS pixels.
    pub stroke_width: f64,
    /// Smallest drawable width in CSS pixels.
    pub min_css_width: f64,
    /// Smallest drawable height in CSS pixels.
    pub min_css_height: f64,
    /// Arrow-key step in normalized units.
    pub nudge_step: f64,
    /// Arrow-key step with Shift held.
    pub nudge_step_large: f64,
    /// Outline color for selected elements.
    pub selection_color: SerializableColor,
    /// Paint the grid into the raster snapshot.
    pub grid_in_snapshot: bool,
    /// How long the host should show an advisory, in milliseconds.
    pub notice_duration_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            stroke_color: SerializableColor::ink(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            min_css_width: MIN_CSS_WIDTH,
            min_css_height: MIN_CSS_HEIGHT,
            nudge_step: 0.01,
            nudge_step_large: 0.02,
            selection_color: SerializableColor::new(0x25, 0x63, 0xeb),
            grid_in_snapshot: false,
            notice_duration_ms: 4000,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> StorageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn min_css_size(&self) -> Size {
        Size::new(self.min_css_width, self.min_css_height)
    }

    /// Nudge distance for one arrow-key press.
    pub fn nudge_for(&self, large: bool) -> f64 {
        if large { self.nudge_step_large } else { self.nudge_step }
    }
}
