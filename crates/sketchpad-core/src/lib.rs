//! Sketchpad Core Library
//!
//! Platform-agnostic data model, geometry and selection logic for the Sketchpad
//! diagram editor. Everything here is resolution independent: documents store
//! normalized coordinates and only the hit-testing helpers look at device pixels.

pub mod canvas;
pub mod config;
pub mod geometry;
pub mod input;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod storage;
pub mod tools;

pub use canvas::{Canvas, ElementRef, PlacementRejection, SketchDocument};
pub use config::EditorConfig;
pub use geometry::Viewport;
pub use input::{Key, Modifiers, MouseButton, PointerEvent};
pub use selection::{DragState, Selection};
pub use shapes::{Icon, IconKind, SerializableColor, SketchModel, Stroke, StrokeStyle};
pub use snap::{AngleSnapResult, GRID_SIZE, snap_angle, snap_to_grid};
pub use storage::{FormHost, HostDocument, MemoryHost, PersistedSketch, StorageError, StorageResult};
pub use tools::{CursorHint, ToolKind, ToolManager};
