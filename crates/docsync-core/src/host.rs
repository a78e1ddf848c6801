//! Collaborator interfaces consumed by the synchronization layer.
//!
//! The text model, the editor widgets, dirty tracking, and the workbench's
//! notion of an active pane all live outside this workspace. These traits are
//! the narrow surface through which they are observed. Every enumeration call
//! must return a consistent view of the host at the instant it is made.

use std::rc::Rc;

use crate::document::{DocumentUri, TextDocument};
use crate::editor::{EditorControl, EditorId, EditorOptions, Selection, VisibleEditor};
use crate::event::Subscription;

/// Callback taking an event payload by reference.
pub type Listener<T> = Box<dyn Fn(&T)>;

/// A code editor widget living in the host.
pub trait CodeEditor {
    fn id(&self) -> EditorId;

    /// URI of the document currently shown, if any.
    fn document_uri(&self) -> Option<DocumentUri>;

    fn has_text_focus(&self) -> bool;

    /// Embedded single-purpose editors (input boxes, find widgets) are never
    /// synchronized.
    fn is_simple_widget(&self) -> bool {
        false
    }

    fn options(&self) -> EditorOptions;

    fn selections(&self) -> Vec<Selection>;

    /// Fires after the editor switched to another document (or to none).
    fn on_did_change_document(&self, listener: Listener<()>) -> Subscription;

    fn on_did_focus_text(&self, listener: Listener<()>) -> Subscription;

    fn on_did_blur_text(&self, listener: Listener<()>) -> Subscription;

    fn on_did_change_selections(&self, listener: Listener<Vec<Selection>>) -> Subscription;

    fn on_did_change_options(&self, listener: Listener<EditorOptions>) -> Subscription;
}

/// The host's document model service.
pub trait DocumentHost {
    fn documents(&self) -> Vec<TextDocument>;

    /// Documents too large for rich processing are invisible to the
    /// synchronization layer.
    fn is_too_large(&self, document: &TextDocument) -> bool;

    fn is_dirty(&self, uri: &DocumentUri) -> bool;

    fn on_did_add_document(&self, listener: Listener<TextDocument>) -> Subscription;

    fn on_did_remove_document(&self, listener: Listener<DocumentUri>) -> Subscription;
}

/// The host's editor service and workbench layout.
pub trait EditorHost {
    fn editors(&self) -> Vec<Rc<dyn CodeEditor>>;

    /// The control of the active editor pane, if a text pane is active.
    fn active_editor(&self) -> Option<EditorControl>;

    fn visible_editors(&self) -> Vec<VisibleEditor>;

    fn on_did_add_editor(&self, listener: Listener<Rc<dyn CodeEditor>>) -> Subscription;

    fn on_did_remove_editor(&self, listener: Listener<EditorId>) -> Subscription;

    fn on_did_change_active_editor(&self, listener: Listener<()>) -> Subscription;
}

/// Everything the synchronization layer needs from the host.
pub trait Host: DocumentHost + EditorHost {}

impl<T: DocumentHost + EditorHost + ?Sized> Host for T {}
