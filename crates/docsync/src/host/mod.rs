//! Host implementations.
//!
//! Real editor hosts implement the `docsync_core::host` traits themselves;
//! this module only ships the in-memory host used for replays and tests.

mod memory;

pub use memory::{MemoryEditor, MemoryHost};
