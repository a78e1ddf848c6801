pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod mirror;
pub mod script;
pub mod sync;
pub mod tracker;

mod test_utils;

// Re-export commonly used types
pub use config::SyncConfig;
pub use dispatch::{DeltaDispatcher, LiveEditorHandle};
pub use error::{DocsyncError, Result};
pub use mirror::{ChannelMirror, LocalMirror, MirrorMessage, MirrorState, RemoteMirror};
pub use sync::DocumentsAndEditors;
pub use tracker::StateTracker;
