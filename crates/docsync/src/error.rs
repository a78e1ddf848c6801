use docsync_core::SyncError;
use thiserror::Error;

/// Error types for the docsync crate.
///
/// Wraps contract violations from `docsync-core` together with the I/O and
/// decoding failures of the configuration loader and the replay binary.
///
/// # Examples
///
/// ```
/// use docsync::error::{DocsyncError, Result};
///
/// fn parse_line(line: &str) -> Result<serde_json::Value> {
///     Ok(serde_json::from_str(line)?)
/// }
///
/// let err = parse_line("not json").unwrap_err();
/// assert!(matches!(err, DocsyncError::Json(_)));
/// ```
#[derive(Error, Debug)]
pub enum DocsyncError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("invalid host command: {0}")]
    InvalidCommand(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for `Result<T, DocsyncError>`.
pub type Result<T> = std::result::Result<T, DocsyncError>;
