//! Keyboard shortcut registry and documentation.

use sketchpad_core::input::{Key, Modifiers};

/// What a key press asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorAction {
    /// Abort the marquee or drag, drop the selection and return to the select tool.
    Cancel,
    /// Remove the selected icons and strokes.
    DeleteSelection,
    /// Move the selection one step in a unit direction.
    Nudge { dx: f64, dy: f64, large: bool },
    /// Rotate selected earth electrodes by 90°.
    RotateSelection,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Shift+ArrowUp").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Escape", false, false, "Cancel current action, deselect and switch to select"),
            Shortcut::new("Delete", false, false, "Delete selected elements"),
            Shortcut::new("Backspace", false, false, "Delete selected elements"),
            Shortcut::new("Arrows", false, false, "Nudge selection by 1%"),
            Shortcut::new("Arrows", false, true, "Nudge selection by 2%"),
            Shortcut::new("R", false, false, "Rotate selected earth electrodes by 90°"),
        ]
    }

    /// Resolve a key press. Command-modified keys are left to the host.
    pub fn action_for(key: &Key, modifiers: Modifiers) -> Option<EditorAction> {
        if modifiers.command() {
            return None;
        }
        match key {
            Key::Escape => Some(EditorAction::Cancel),
            Key::Delete | Key::Backspace => Some(EditorAction::DeleteSelection),
            key if key.is_char('r') => Some(EditorAction::RotateSelection),
            key => key.arrow_direction().map(|(dx, dy)| EditorAction::Nudge {
                dx,
                dy,
                large: modifiers.shift,
            }),
        }
    }
}
