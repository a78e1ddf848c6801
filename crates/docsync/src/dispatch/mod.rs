//! Delta dispatcher: turns snapshot deltas into live bookkeeping, wire
//! payloads, and local events.
//!
//! # Processing order
//!
//! For each delta:
//! 1. The whole delta is validated against the registries
//! 2. Added documents are registered, then added bindings become live handles
//! 3. Removed handles are disposed and unregistered
//! 4. Removed documents are unregistered
//! 5. The payload is sent to the remote mirror (when non-empty)
//! 6. Local events fire: editors removed, editors added, documents removed,
//!    documents added
//!
//! Nothing is mutated when validation fails.

mod handle;

pub use handle::LiveEditorHandle;

use std::collections::HashSet;
use std::rc::Rc;

use dashmap::DashMap;
use docsync_core::{
    BindingId, Delta, DocumentAddData, DocumentUri, DocumentsAndEditorsDelta, EditorBinding,
    EditorId, Emitter, Host, Subscription, SyncError, TextDocument, VisibleEditor,
};

use crate::mirror::RemoteMirror;

/// Applies deltas to the live registries and the remote mirror.
pub struct DeltaDispatcher {
    host: Rc<dyn Host>,
    mirror: Rc<dyn RemoteMirror>,
    ignore_path_casing: bool,
    /// Keyed by [`DocumentUri::identity_key`].
    documents: DashMap<String, TextDocument>,
    editors: DashMap<BindingId, Rc<LiveEditorHandle>>,
    on_did_add_editors: Emitter<Vec<Rc<LiveEditorHandle>>>,
    on_did_remove_editors: Emitter<Vec<BindingId>>,
    on_did_add_documents: Emitter<Vec<TextDocument>>,
    on_did_remove_documents: Emitter<Vec<DocumentUri>>,
}

impl DeltaDispatcher {
    pub fn new(host: Rc<dyn Host>, mirror: Rc<dyn RemoteMirror>, ignore_path_casing: bool) -> Self {
        Self {
            host,
            mirror,
            ignore_path_casing,
            documents: DashMap::new(),
            editors: DashMap::new(),
            on_did_add_editors: Emitter::new(),
            on_did_remove_editors: Emitter::new(),
            on_did_add_documents: Emitter::new(),
            on_did_remove_documents: Emitter::new(),
        }
    }

    /// Applies `delta`.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the delta adds a document that is already
    /// registered, removes one that is not, or adds a binding whose document
    /// is unknown. Bookkeeping is left untouched in that case.
    pub fn handle_delta(&self, delta: &Delta) -> docsync_core::Result<()> {
        self.validate(delta)?;

        for document in &delta.added_documents {
            self.documents.insert(self.key(&document.uri), document.clone());
        }

        let visible = self.host.visible_editors();
        let mut added_handles = Vec::with_capacity(delta.added_editors.len());
        for binding in &delta.added_editors {
            let document = self
                .lookup(binding.document_uri())
                .ok_or_else(|| missing_document(binding))?;
            let view_column = view_column_for(binding.editor_id(), &visible);
            let handle = LiveEditorHandle::new(binding, document, view_column, Rc::clone(&self.mirror));
            self.editors.insert(binding.id().clone(), Rc::clone(&handle));
            added_handles.push(handle);
        }

        let mut removed_editors = Vec::with_capacity(delta.removed_editors.len());
        for binding in &delta.removed_editors {
            match self.editors.remove(binding.id()) {
                Some((id, handle)) => {
                    handle.dispose();
                    removed_editors.push(id);
                }
                None => tracing::debug!("editor {} was not registered, ignoring removal", binding.id()),
            }
        }

        let removed_documents: Vec<DocumentUri> = delta
            .removed_documents
            .iter()
            .map(|document| document.uri.clone())
            .collect();
        for uri in &removed_documents {
            // An added document may already own this key when only the casing
            // differs; keep it.
            self.documents
                .remove_if(&self.key(uri), |_, registered| registered.uri == *uri);
        }

        let payload = DocumentsAndEditorsDelta {
            new_active_editor: delta
                .active_editor_changed()
                .then(|| delta.new_active_editor.clone()),
            removed_documents: removed_documents.clone(),
            removed_editors: removed_editors.clone(),
            added_documents: delta
                .added_documents
                .iter()
                .map(|document| self.add_data(document))
                .collect(),
            added_editors: added_handles.iter().map(|handle| handle.to_add_data()).collect(),
        };

        if payload.is_empty() {
            tracing::debug!("nothing to send for delta");
        } else {
            self.mirror.accept_documents_and_editors_delta(payload);
        }

        if !removed_editors.is_empty() {
            self.on_did_remove_editors.fire(&removed_editors);
        }
        if !added_handles.is_empty() {
            self.on_did_add_editors.fire(&added_handles);
        }
        if !removed_documents.is_empty() {
            self.on_did_remove_documents.fire(&removed_documents);
        }
        if !delta.added_documents.is_empty() {
            self.on_did_add_documents.fire(&delta.added_documents);
        }

        Ok(())
    }

    fn validate(&self, delta: &Delta) -> docsync_core::Result<()> {
        let removed: HashSet<&DocumentUri> = delta
            .removed_documents
            .iter()
            .map(|document| &document.uri)
            .collect();

        let mut added_keys = HashSet::new();
        for document in &delta.added_documents {
            let key = self.key(&document.uri);
            let taken = self
                .documents
                .get(&key)
                .is_some_and(|registered| !removed.contains(&registered.uri));
            if taken || !added_keys.insert(key) {
                return Err(SyncError::DuplicateDocument(document.uri.clone()));
            }
        }

        for document in &delta.removed_documents {
            let known = self
                .documents
                .get(&self.key(&document.uri))
                .is_some_and(|registered| registered.uri == document.uri);
            if !known {
                return Err(SyncError::UnknownDocument(document.uri.clone()));
            }
        }

        for binding in &delta.added_editors {
            if self.editors.contains_key(binding.id()) {
                return Err(SyncError::DuplicateEditor(binding.id().clone()));
            }
            let key = self.key(binding.document_uri());
            if !added_keys.contains(&key) && !self.documents.contains_key(&key) {
                return Err(missing_document(binding));
            }
        }

        Ok(())
    }

    fn key(&self, uri: &DocumentUri) -> String {
        uri.identity_key(self.ignore_path_casing)
    }

    fn lookup(&self, uri: &DocumentUri) -> Option<TextDocument> {
        self.documents
            .get(&self.key(uri))
            .map(|entry| entry.value().clone())
    }

    fn add_data(&self, document: &TextDocument) -> DocumentAddData {
        DocumentAddData {
            uri: document.uri.clone(),
            version_id: document.version,
            content: document.content.to_string(),
            eol: document.eol,
            language_id: document.language_id.clone(),
            is_dirty: self.host.is_dirty(&document.uri),
        }
    }

    pub fn on_did_add_editors(
        &self,
        listener: impl Fn(&Vec<Rc<LiveEditorHandle>>) + 'static,
    ) -> Subscription {
        self.on_did_add_editors.subscribe(listener)
    }

    pub fn on_did_remove_editors(&self, listener: impl Fn(&Vec<BindingId>) + 'static) -> Subscription {
        self.on_did_remove_editors.subscribe(listener)
    }

    pub fn on_did_add_documents(&self, listener: impl Fn(&Vec<TextDocument>) + 'static) -> Subscription {
        self.on_did_add_documents.subscribe(listener)
    }

    pub fn on_did_remove_documents(
        &self,
        listener: impl Fn(&Vec<DocumentUri>) + 'static,
    ) -> Subscription {
        self.on_did_remove_documents.subscribe(listener)
    }

    pub fn get_editor(&self, id: &BindingId) -> Option<Rc<LiveEditorHandle>> {
        self.editors.get(id).map(|entry| Rc::clone(entry.value()))
    }

    /// Live bindings of one host editor, in ascending order.
    pub fn find_editor_ids_for(&self, editor_id: &EditorId) -> Vec<BindingId> {
        let mut ids: Vec<BindingId> = self
            .editors
            .iter()
            .filter(|entry| entry.value().editor_id() == *editor_id)
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn document(&self, uri: &DocumentUri) -> Option<TextDocument> {
        self.lookup(uri)
    }

    /// Registered documents ordered by URI.
    pub fn documents(&self) -> Vec<TextDocument> {
        let mut documents: Vec<TextDocument> = self
            .documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        documents.sort_by(|a, b| a.uri.cmp(&b.uri));
        documents
    }

    /// Registered bindings ordered by id.
    pub fn editor_ids(&self) -> Vec<BindingId> {
        let mut ids: Vec<BindingId> = self.editors.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn editor_count(&self) -> usize {
        self.editors.len()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Disposes every live handle and forgets all documents.
    pub fn dispose_all(&self) {
        let ids: Vec<BindingId> = self.editors.iter().map(|entry| entry.key().clone()).collect();
        for id in ids {
            if let Some((_, handle)) = self.editors.remove(&id) {
                handle.dispose();
            }
        }
        self.documents.clear();
    }
}

fn missing_document(binding: &EditorBinding) -> SyncError {
    SyncError::MissingDocument {
        binding: binding.id().clone(),
        uri: binding.document_uri().clone(),
    }
}

/// Column of the first visible pane that is exactly this code editor.
fn view_column_for(editor_id: &EditorId, visible: &[VisibleEditor]) -> Option<u32> {
    visible
        .iter()
        .find(|pane| pane.control.code_editor() == Some(editor_id))
        .map(|pane| pane.view_column)
}
