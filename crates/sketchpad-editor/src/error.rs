//! Editor errors.

use sketchpad_core::storage::StorageError;
use sketchpad_render::RendererError;
use thiserror::Error;

/// Errors surfaced by editor setup. Event handlers never return them; failures
/// during a gesture are logged instead.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
