//! Placeable symbols: earth electrodes, air terminals, antennas and free text.

use crate::geometry::clamp_unit;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Deserializer, Serialize};

/// Symbol kind, serialized in lowercase under the `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    Earth,
    Air,
    Antenna,
    Text,
}

impl IconKind {
    pub fn name(self) -> &'static str {
        match self {
            IconKind::Earth => "earth",
            IconKind::Air => "air",
            IconKind::Antenna => "antenna",
            IconKind::Text => "text",
        }
    }
}

/// A placed symbol. Position is normalized to the drawable area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(rename = "type")]
    pub kind: IconKind,
    pub x: f64,
    pub y: f64,
    /// Degrees in [0, 360); only earth icons carry one.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_rotation"
    )]
    pub rotation: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Icon {
    fn at(kind: IconKind, position: Point) -> Self {
        let position = clamp_unit(position);
        Self {
            kind,
            x: position.x,
            y: position.y,
            rotation: None,
            label: None,
            text: None,
        }
    }

    /// An earth electrode with its measurement label and rotation.
    pub fn earth(position: Point, label: impl Into<String>, rotation: i32) -> Self {
        Self {
            rotation: Some(normalize_rotation(rotation)),
            label: Some(label.into()),
            ..Self::at(IconKind::Earth, position)
        }
    }

    pub fn air(position: Point) -> Self {
        Self::at(IconKind::Air, position)
    }

    pub fn antenna(position: Point) -> Self {
        Self::at(IconKind::Antenna, position)
    }

    /// A text label. The caller is expected to pass already trimmed text.
    pub fn text(position: Point, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::at(IconKind::Text, position)
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move to `position`, clamped into the unit square.
    pub fn set_position(&mut self, position: Point) {
        let position = clamp_unit(position);
        self.x = position.x;
        self.y = position.y;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.set_position(self.position() + delta);
    }

    /// Rotation in degrees, zero when unset.
    pub fn rotation_degrees(&self) -> i32 {
        self.rotation.unwrap_or(0)
    }

    /// Rotate by `degrees`. Returns `false` for kinds that do not rotate.
    pub fn rotate_by(&mut self, degrees: i32) -> bool {
        if self.kind != IconKind::Earth {
            return false;
        }
        self.rotation = Some(normalize_rotation(self.rotation_degrees() + degrees));
        true
    }

    /// Label trimmed, `None` when missing or blank.
    pub fn trimmed_label(&self) -> Option<&str> {
        self.label.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Text trimmed, `None` when missing or blank.
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Repair loaded data.
    pub fn normalize(&mut self) {
        self.set_position(self.position());
        if let Some(rotation) = self.rotation {
            self.rotation = Some(normalize_rotation(rotation));
        }
    }
}

/// Normalize degrees into [0, 360).
pub fn normalize_rotation(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}

fn deserialize_rotation<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .filter(|v| v.is_finite())
        .map(|v| normalize_rotation((v.round() % 360.0) as i32)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_normalization() {
        for (input, expected) in [(0, 0), (90, 90), (360, 0), (450, 90), (-90, 270), (-720, 0), (1234, 154)] {
            assert_eq!(normalize_rotation(input), expected, "input {input}");
        }
    }

    #[test]
    fn test_earth_rotates_others_do_not() {
        let mut earth = Icon::earth(Point::new(0.5, 0.5), "Z1", 270);
        assert!(earth.rotate_by(90));
        assert_eq!(earth.rotation, Some(0));

        let mut air = Icon::air(Point::new(0.5, 0.5));
        assert!(!air.rotate_by(90));
        assert_eq!(air.rotation, None);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let value = serde_json::to_value(Icon::air(Point::new(0.2, 0.3))).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(value["type"], "air");
        assert!(object.get("label").is_none());
        assert!(object.get("rotation").is_none());
    }

    #[test]
    fn test_earth_json_shape() {
        let value = serde_json::to_value(Icon::earth(Point::new(0.2, 0.3), "Z3", -90)).unwrap();
        assert_eq!(value["type"], "earth");
        assert_eq!(value["rotation"], 270);
        assert_eq!(value["label"], "Z3");
    }

    #[test]
    fn test_deserialize_accepts_fractional_rotation() {
        let icon: Icon =
            serde_json::from_str(r#"{"type":"earth","x":0.1,"y":0.2,"rotation":-90.0,"label":"A"}"#).unwrap();
        assert_eq!(icon.rotation, Some(270));
        let icon: Icon = serde_json::from_str(r#"{"type":"text","x":0.1,"y":0.2,"text":"hi"}"#).unwrap();
        assert_eq!(icon.rotation, None);
        assert_eq!(icon.trimmed_text(), Some("hi"));
    }

    #[test]
    fn test_position_clamped() {
        let mut icon = Icon::antenna(Point::new(1.5, -0.5));
        assert_eq!(icon.position(), Point::new(1.0, 0.0));
        icon.translate(Vec2::new(-0.25, 0.25));
        assert_eq!(icon.position(), Point::new(0.75, 0.25));
    }

    #[test]
    fn test_trimmed_label() {
        let mut icon = Icon::air(Point::ZERO);
        icon.label = Some("   ".into());
        assert_eq!(icon.trimmed_label(), None);
        icon.label = Some("  J1 ".into());
        assert_eq!(icon.trimmed_label(), Some("J1"));
    }
}
