//! Core abstractions for docsync.
//!
//! This crate provides the value types and algorithms shared by the state
//! tracker and the delta dispatcher in the `docsync` crate.
//!
//! # Architecture
//!
//! docsync-core defines:
//! - **Values**: `TextDocument`, `EditorBinding`, editor presentation state
//! - **Snapshot**: canonically ordered view of what is synchronized
//! - **Delta**: linear merge diff between two snapshots
//! - **Events**: `Emitter` / `Subscription` publish-subscribe primitives
//! - **Host traits**: `DocumentHost`, `EditorHost`, `CodeEditor`
//! - **Wire payload**: `DocumentsAndEditorsDelta` and its records
//!
//! # Examples
//!
//! Diffing two snapshots:
//!
//! ```
//! use docsync_core::{Delta, DocumentUri, Snapshot, TextDocument};
//!
//! let doc = |uri: &str| TextDocument::new(DocumentUri::new(uri), 1, "", "plaintext");
//!
//! let before = Snapshot::new(vec![doc("file:///a.txt"), doc("file:///b.txt")], vec![], None);
//! let after = Snapshot::new(vec![doc("file:///b.txt"), doc("file:///c.txt")], vec![], None);
//!
//! let delta = Delta::compute(Some(&before), &after);
//! assert_eq!(delta.removed_documents[0].uri.as_str(), "file:///a.txt");
//! assert_eq!(delta.added_documents[0].uri.as_str(), "file:///c.txt");
//! assert!(Delta::compute(Some(&after), &after).is_empty());
//! ```

pub mod delta;
pub mod document;
pub mod editor;
pub mod error;
pub mod event;
pub mod host;
pub mod payload;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use delta::{Delta, SortedDiff, diff_sorted};
pub use document::{DocumentUri, EndOfLine, TextDocument};
pub use editor::{
    BindingId, CursorStyle, EditorBinding, EditorControl, EditorId, EditorOptions,
    LineNumbersStyle, Selection, VisibleEditor,
};
pub use error::{Result, SyncError};
pub use event::{Emitter, Subscription, SubscriptionSet};
pub use host::{CodeEditor, DocumentHost, EditorHost, Host, Listener};
pub use payload::{DocumentAddData, DocumentsAndEditorsDelta, EditorAddData, EditorPropertiesChange};
pub use snapshot::Snapshot;
