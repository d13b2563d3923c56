//! Element definitions for the sketch.

mod icon;
mod stroke;

pub use icon::{Icon, IconKind, normalize_rotation};
pub use stroke::{DEFAULT_STROKE_WIDTH, STROKE_WIDTH_RANGE, Stroke, StrokeStyle, square_corner};

use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Serializable color representation (RGB8, written as `#rrggbb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Default ink color (slate-900).
    pub const fn ink() -> Self {
        Self::new(0x0f, 0x17, 0x2a)
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Convert to a render color with the given alpha (0-255).
    pub fn with_alpha(self, alpha: u8) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, alpha)
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::ink()
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error returned when a color string is not `#rgb` or `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color: {:?}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for SerializableColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            3 => {
                let short = |i: usize| channel(i..i + 1).map(|v| v * 17);
                Ok(Self::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(err()),
        }
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        color.with_alpha(255)
    }
}

/// The structured, re-loadable form of a sketch: strokes and icons in z-order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SketchModel {
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    #[serde(default)]
    pub icons: Vec<Icon>,
}

impl SketchModel {
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.icons.is_empty()
    }

    /// Clamp every coordinate into the unit square and normalize rotations.
    ///
    /// Hosts may hand back snapshots written by other tools, so loaded data is
    /// repaired silently rather than rejected.
    pub fn normalized(mut self) -> Self {
        for stroke in &mut self.strokes {
            stroke.normalize();
        }
        for icon in &mut self.icons {
            icon.normalize();
        }
        self
    }
}
