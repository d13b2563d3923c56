//! Input vocabulary for pointer and keyboard events.
//!
//! Positions are CSS pixels relative to the canvas' top-left corner, exactly as
//! the host reports them; the editor converts to device pixels itself.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Shift, Ctrl or Cmd toggles membership instead of replacing the selection.
    pub fn multi_select(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
    },
    /// The pointer left the canvas; finishes any gesture like `Up`.
    Leave,
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Character(char),
    Other(String),
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "Delete" | "Del" => Key::Delete,
            "Backspace" => Key::Backspace,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Other(name.to_string()),
                }
            }
        }
    }

    /// Unit direction for arrow keys (y grows downwards).
    pub fn arrow_direction(&self) -> Option<(f64, f64)> {
        match self {
            Key::ArrowUp => Some((0.0, -1.0)),
            Key::ArrowDown => Some((0.0, 1.0)),
            Key::ArrowLeft => Some((-1.0, 0.0)),
            Key::ArrowRight => Some((1.0, 0.0)),
            _ => None,
        }
    }

    /// Case-insensitive character comparison.
    pub fn is_char(&self, expected: char) -> bool {
        matches!(self, Key::Character(c) if c.eq_ignore_ascii_case(&expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_select_modifiers() {
        assert!(!Modifiers::NONE.multi_select());
        assert!(Modifiers::SHIFT.multi_select());
        assert!(Modifiers::CTRL.multi_select());
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert!(meta.multi_select());
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        assert!(!alt.multi_select());
    }

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("Escape"), Key::Escape);
        assert_eq!(Key::from_name("Backspace"), Key::Backspace);
        assert_eq!(Key::from_name("r"), Key::Character('r'));
        assert_eq!(Key::from_name("F5"), Key::Other("F5".into()));
        assert!(Key::from_name("R").is_char('r'));
    }

    #[test]
    fn test_arrow_direction() {
        assert_eq!(Key::ArrowLeft.arrow_direction(), Some((-1.0, 0.0)));
        assert_eq!(Key::ArrowUp.arrow_direction(), Some((0.0, -1.0)));
        assert_eq!(Key::Escape.arrow_direction(), None);
    }
}
