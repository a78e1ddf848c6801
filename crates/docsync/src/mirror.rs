//! The remote side of the synchronization.
//!
//! [`RemoteMirror`] is the only thing the dispatcher knows about the remote
//! process. [`ChannelMirror`] forwards messages over a tokio channel,
//! [`LocalMirror`] applies them to an in-process [`MirrorState`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use docsync_core::{
    BindingId, DocumentAddData, DocumentUri, DocumentsAndEditorsDelta, EditorAddData,
    EditorPropertiesChange, Result, SyncError,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Receiver of synchronization messages. Delivery is fire-and-forget.
pub trait RemoteMirror {
    fn accept_documents_and_editors_delta(&self, delta: DocumentsAndEditorsDelta);

    fn accept_editor_properties_changed(&self, id: &BindingId, change: EditorPropertiesChange);
}

/// One call on the remote mirror, as it travels over the wire.
///
/// # Examples
///
/// ```
/// use docsync::mirror::MirrorMessage;
/// use docsync_core::DocumentsAndEditorsDelta;
///
/// let message = MirrorMessage::AcceptDocumentsAndEditorsDelta(DocumentsAndEditorsDelta {
///     new_active_editor: Some(None),
///     ..Default::default()
/// });
///
/// assert_eq!(
///     serde_json::to_string(&message).unwrap(),
///     r#"{"method":"acceptDocumentsAndEditorsDelta","params":{"newActiveEditor":null}}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum MirrorMessage {
    #[serde(rename = "acceptDocumentsAndEditorsDelta")]
    AcceptDocumentsAndEditorsDelta(DocumentsAndEditorsDelta),
    #[serde(rename = "acceptEditorPropertiesChanged")]
    AcceptEditorPropertiesChanged {
        id: BindingId,
        change: EditorPropertiesChange,
    },
}

/// What the remote side knows, reconstructed from the messages it received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorState {
    documents: BTreeMap<DocumentUri, DocumentAddData>,
    editors: BTreeMap<BindingId, EditorAddData>,
    active_editor: Option<BindingId>,
}

impl MirrorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a delta, or leaves the state untouched if any part of it is
    /// inconsistent with what is already known.
    pub fn accept_delta(&mut self, delta: &DocumentsAndEditorsDelta) -> Result<()> {
        let mut next = self.clone();

        for uri in &delta.removed_documents {
            if next.documents.remove(uri).is_none() {
                return Err(SyncError::UnknownDocument(uri.clone()));
            }
        }

        for document in &delta.added_documents {
            if next.documents.contains_key(&document.uri) {
                return Err(SyncError::DuplicateDocument(document.uri.clone()));
            }
            next.documents.insert(document.uri.clone(), document.clone());
        }

        for id in &delta.removed_editors {
            if next.editors.remove(id).is_none() {
                return Err(SyncError::UnknownEditor(id.clone()));
            }
        }

        for editor in &delta.added_editors {
            if next.editors.contains_key(&editor.id) {
                return Err(SyncError::DuplicateEditor(editor.id.clone()));
            }
            if !next.documents.contains_key(&editor.document_uri) {
                return Err(SyncError::MissingDocument {
                    binding: editor.id.clone(),
                    uri: editor.document_uri.clone(),
                });
            }
            next.editors.insert(editor.id.clone(), editor.clone());
        }

        if let Some(active) = &delta.new_active_editor {
            if let Some(id) = active
                && !next.editors.contains_key(id)
            {
                return Err(SyncError::UnknownEditor(id.clone()));
            }
            next.active_editor = active.clone();
        }

        *self = next;
        Ok(())
    }

    pub fn accept_properties(&mut self, id: &BindingId, change: &EditorPropertiesChange) -> Result<()> {
        let editor = self
            .editors
            .get_mut(id)
            .ok_or_else(|| SyncError::UnknownEditor(id.clone()))?;

        if let Some(options) = change.options {
            editor.options = options;
        }
        if let Some(selections) = &change.selections {
            editor.selections = selections.clone();
        }
        Ok(())
    }

    pub fn apply(&mut self, message: &MirrorMessage) -> Result<()> {
        match message {
            MirrorMessage::AcceptDocumentsAndEditorsDelta(delta) => self.accept_delta(delta),
            MirrorMessage::AcceptEditorPropertiesChanged { id, change } => {
                self.accept_properties(id, change)
            }
        }
    }

    pub fn document(&self, uri: &DocumentUri) -> Option<&DocumentAddData> {
        self.documents.get(uri)
    }

    /// Known document URIs in ascending order.
    pub fn document_uris(&self) -> Vec<DocumentUri> {
        self.documents.keys().cloned().collect()
    }

    pub fn editor(&self, id: &BindingId) -> Option<&EditorAddData> {
        self.editors.get(id)
    }

    /// Known binding ids in ascending order.
    pub fn editor_ids(&self) -> Vec<BindingId> {
        self.editors.keys().cloned().collect()
    }

    pub fn active_editor(&self) -> Option<&BindingId> {
        self.active_editor.as_ref()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn editor_count(&self) -> usize {
        self.editors.len()
    }
}

/// Forwards every call as a [`MirrorMessage`] over an unbounded channel.
pub struct ChannelMirror {
    tx: UnboundedSender<MirrorMessage>,
}

impl ChannelMirror {
    pub fn new() -> (Self, UnboundedReceiver<MirrorMessage>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, message: MirrorMessage) {
        if self.tx.send(message).is_err() {
            tracing::warn!("mirror receiver closed, dropping message");
        }
    }
}

impl RemoteMirror for ChannelMirror {
    fn accept_documents_and_editors_delta(&self, delta: DocumentsAndEditorsDelta) {
        self.send(MirrorMessage::AcceptDocumentsAndEditorsDelta(delta));
    }

    fn accept_editor_properties_changed(&self, id: &BindingId, change: EditorPropertiesChange) {
        self.send(MirrorMessage::AcceptEditorPropertiesChanged {
            id: id.clone(),
            change,
        });
    }
}

/// Applies every call to an in-process [`MirrorState`].
///
/// Rejected messages are logged and counted; the state keeps its previous
/// value.
#[derive(Debug, Default)]
pub struct LocalMirror {
    state: RefCell<MirrorState>,
    violations: Cell<usize>,
}

impl LocalMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MirrorState {
        self.state.borrow().clone()
    }

    /// Number of messages rejected so far.
    pub fn violations(&self) -> usize {
        self.violations.get()
    }

    fn apply(&self, message: &MirrorMessage) {
        let result = self.state.borrow_mut().apply(message);
        if let Err(e) = result {
            tracing::error!("mirror rejected message: {}", e);
            self.violations.set(self.violations.get() + 1);
        }
    }
}

impl RemoteMirror for LocalMirror {
    fn accept_documents_and_editors_delta(&self, delta: DocumentsAndEditorsDelta) {
        self.apply(&MirrorMessage::AcceptDocumentsAndEditorsDelta(delta));
    }

    fn accept_editor_properties_changed(&self, id: &BindingId, change: EditorPropertiesChange) {
        self.apply(&MirrorMessage::AcceptEditorPropertiesChanged {
            id: id.clone(),
            change,
        });
    }
}
