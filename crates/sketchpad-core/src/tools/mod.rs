//! Tool system for the sketch editor.

use crate::shapes::{
    DEFAULT_STROKE_WIDTH, IconKind, STROKE_WIDTH_RANGE, SerializableColor, StrokeStyle, normalize_rotation,
};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Select,
    Solid,
    Dashed,
    Rect,
    RectSquare,
    Earth,
    Air,
    Antenna,
    Text,
}

impl ToolKind {
    /// All tools in toolbar order.
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Select,
        ToolKind::Solid,
        ToolKind::Dashed,
        ToolKind::Rect,
        ToolKind::RectSquare,
        ToolKind::Earth,
        ToolKind::Air,
        ToolKind::Antenna,
        ToolKind::Text,
    ];

    /// Stroke style produced by drawing tools.
    pub fn stroke_style(self) -> Option<StrokeStyle> {
        match self {
            ToolKind::Solid => Some(StrokeStyle::Solid),
            ToolKind::Dashed => Some(StrokeStyle::Dashed),
            ToolKind::Rect => Some(StrokeStyle::Rect),
            ToolKind::RectSquare => Some(StrokeStyle::RectSquare),
            _ => None,
        }
    }

    /// Icon kind placed by placement tools (text included).
    pub fn icon_kind(self) -> Option<IconKind> {
        match self {
            ToolKind::Earth => Some(IconKind::Earth),
            ToolKind::Air => Some(IconKind::Air),
            ToolKind::Antenna => Some(IconKind::Antenna),
            ToolKind::Text => Some(IconKind::Text),
            _ => None,
        }
    }

    /// Placement tools show a ghost preview under the pointer.
    pub fn shows_ghost(self) -> bool {
        self.icon_kind().is_some()
    }

    /// Stable name used by hosts and keyboard shortcuts.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Solid => "solid",
            ToolKind::Dashed => "dashed",
            ToolKind::Rect => "rect",
            ToolKind::RectSquare => "rect_square",
            ToolKind::Earth => "earth",
            ToolKind::Air => "air",
            ToolKind::Antenna => "antenna",
            ToolKind::Text => "text",
        }
    }
}

/// Pointer cursor the host should show over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorHint {
    Grab,
    Grabbing,
    Crosshair,
}

impl CursorHint {
    /// CSS cursor keyword.
    pub fn css(self) -> &'static str {
        match self {
            CursorHint::Grab => "grab",
            CursorHint::Grabbing => "grabbing",
            CursorHint::Crosshair => "crosshair",
        }
    }
}

/// Current tool plus the style applied to new elements.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Color for new strokes.
    pub stroke_color: SerializableColor,
    /// Width for new strokes, in CSS pixels.
    pub stroke_width: f64,
    /// Rotation given to newly placed earth icons.
    pub earth_rotation_preset: i32,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            stroke_color: SerializableColor::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            earth_rotation_preset: 0,
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
    }

    /// Set the width for new strokes, clamped to the toolbar range.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = if width.is_finite() {
            width.clamp(*STROKE_WIDTH_RANGE.start(), *STROKE_WIDTH_RANGE.end())
        } else {
            DEFAULT_STROKE_WIDTH
        };
    }

    /// Advance the earth rotation preset by 90°.
    pub fn cycle_earth_rotation(&mut self) -> i32 {
        self.earth_rotation_preset = normalize_rotation(self.earth_rotation_preset + 90);
        self.earth_rotation_preset
    }

    /// Resting cursor for the current tool.
    pub fn cursor(&self) -> CursorHint {
        if self.current_tool == ToolKind::Select {
            CursorHint::Grab
        } else {
            CursorHint::Crosshair
        }
    }
}
