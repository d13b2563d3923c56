//! Sketchpad Editor
//!
//! The interactive shell around the core model: it turns host pointer and
//! keyboard events into canvas edits, repaints the raster buffer after each
//! one and pushes committed sketches back to the host document.

mod editor;
mod error;
pub mod event_handler;
mod notices;
mod shortcuts;

pub use editor::SketchEditor;
pub use error::{EditorError, EditorResult};
pub use event_handler::{EventHandler, EventOutcome, Interaction, TextRequest, TextTarget};
pub use notices::{Notice, NoticeBoard};
pub use shortcuts::{EditorAction, Shortcut, ShortcutRegistry};
