// Error types for note operations

use crate::kv::KvError;
use thiserror::Error;

/// Result type alias for note operations.
pub type NoteResult<T> = Result<T, NoteError>;

/// Errors that can occur during note operations.
///
/// None of these are fatal: a failed operation leaves the previously
/// committed list in place.
#[derive(Debug, Error)]
pub enum NoteError {
    /// Note text is empty or whitespace-only.
    #[error("note text cannot be empty")]
    Validation,

    /// No note with this id (only under the reject policy).
    #[error("note not found: {0}")]
    NotFound(String),

    /// The key-value store failed to read, write, or remove.
    #[error("persistence failed: {0}")]
    Persistence(#[from] KvError),

    /// Stored blob is not a valid note list.
    #[error("stored notes are unreadable: {0}")]
    Decode(#[source] serde_json::Error),

    /// Note list could not be serialized.
    #[error("failed to encode notes: {0}")]
    Encode(#[source] serde_json::Error),
}
