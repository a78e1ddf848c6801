use thiserror::Error;

use crate::document::DocumentUri;
use crate::editor::BindingId;

/// Contract violations detected while applying deltas.
///
/// None of these are recoverable I/O failures. They signal that a collaborator
/// broke an invariant (an editor pointing at a document nobody announced, a
/// document added twice, etc.), so callers reject the offending delta as a
/// whole and report it.
///
/// # Examples
///
/// ```
/// use docsync_core::error::{Result, SyncError};
/// use docsync_core::DocumentUri;
///
/// fn remove(known: &[DocumentUri], uri: &DocumentUri) -> Result<()> {
///     if !known.contains(uri) {
///         return Err(SyncError::UnknownDocument(uri.clone()));
///     }
///     Ok(())
/// }
///
/// let uri = DocumentUri::new("file:///a.txt");
/// assert!(remove(&[], &uri).is_err());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("document {0} is already tracked")]
    DuplicateDocument(DocumentUri),

    #[error("document {0} is not tracked")]
    UnknownDocument(DocumentUri),

    #[error("editor {binding} references document {uri} which is not tracked")]
    MissingDocument { binding: BindingId, uri: DocumentUri },

    #[error("editor {0} is already tracked")]
    DuplicateEditor(BindingId),

    #[error("editor {0} is not tracked")]
    UnknownEditor(BindingId),
}

/// Convenience type alias for `Result<T, SyncError>`.
pub type Result<T> = std::result::Result<T, SyncError>;
