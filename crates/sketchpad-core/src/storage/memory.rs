//! In-memory host implementation.

use super::{HostDocument, PersistedSketch, StorageError, StorageResult};
use crate::shapes::SketchModel;

/// In-memory host for testing and embedding without a form store.
///
/// Keeps every snapshot it receives so callers can inspect the persistence history.
#[derive(Debug, Default)]
pub struct MemoryHost {
    initial: Option<SketchModel>,
    labels: Vec<String>,
    snapshots: Vec<PersistedSketch>,
    failure: Option<String>,
}

impl MemoryHost {
    /// Create a new empty memory host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_model(model: SketchModel) -> Self {
        Self {
            initial: Some(model),
            ..Self::default()
        }
    }

    /// Supply earth electrode labels.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
    }

    /// Make every following `persist` call fail with `message`; `None` heals it.
    pub fn set_failure(&mut self, message: Option<String>) {
        self.failure = message;
    }

    /// Snapshots received so far, oldest first.
    pub fn snapshots(&self) -> &[PersistedSketch] {
        &self.snapshots
    }

    pub fn persist_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Most recent snapshot.
    pub fn last(&self) -> Option<&PersistedSketch> {
        self.snapshots.last()
    }
}

impl HostDocument for MemoryHost {
    fn initial_model(&self) -> StorageResult<Option<SketchModel>> {
        Ok(self.initial.clone())
    }

    fn persist(&mut self, snapshot: &PersistedSketch) -> StorageResult<()> {
        if let Some(message) = &self.failure {
            return Err(StorageError::Host(message.clone()));
        }
        self.snapshots.push(snapshot.clone());
        Ok(())
    }

    fn earth_labels(&self) -> StorageResult<Vec<String>> {
        Ok(self.labels.clone())
    }
}
