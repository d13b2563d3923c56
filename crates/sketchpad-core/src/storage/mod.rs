//! Persistence bridge to the host document.
//!
//! The editor never stores anything itself: it pulls an optional snapshot from
//! the host on mount and pushes a fresh one after every committed edit.

mod form;
mod memory;

pub use form::{FormHost, LPS_KEY, earth_labels_from_rows};
pub use memory::MemoryHost;

use crate::shapes::{Icon, SketchModel, Stroke};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Host rejected the snapshot: {0}")]
    Host(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Everything handed to the host after an edit, under the host's field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSketch {
    #[serde(rename = "sketchJson", default)]
    pub strokes: Vec<Stroke>,
    #[serde(rename = "sketchIcons", default)]
    pub icons: Vec<Icon>,
    /// PNG of the canvas as a `data:image/png;base64,` URL. Empty when encoding failed.
    #[serde(rename = "sketchPng", default)]
    pub raster_snapshot: String,
}

impl PersistedSketch {
    pub fn new(model: SketchModel, raster_snapshot: String) -> Self {
        Self {
            strokes: model.strokes,
            icons: model.icons,
            raster_snapshot,
        }
    }

    /// The re-loadable part of the snapshot.
    pub fn model(&self) -> SketchModel {
        SketchModel {
            strokes: self.strokes.clone(),
            icons: self.icons.clone(),
        }
    }
}

/// The host document the editor is mounted into.
pub trait HostDocument {
    /// Snapshot to start from, `None` for a fresh sketch.
    fn initial_model(&self) -> StorageResult<Option<SketchModel>>;

    /// Receive the snapshot after a committed edit.
    fn persist(&mut self, snapshot: &PersistedSketch) -> StorageResult<()>;

    /// Earth electrode labels, one per measurement row. The length is the placement limit.
    fn earth_labels(&self) -> StorageResult<Vec<String>> {
        Ok(Vec::new())
    }
}
