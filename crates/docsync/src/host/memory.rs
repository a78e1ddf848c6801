//! In-memory host used by the replay binary and by tests.
//!
//! `MemoryHost` keeps documents and editors in plain collections and fires the
//! same signals a real editor host would. Every mutation updates state first
//! and fires afterwards, with no borrow held, so listeners may call back into
//! the host.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use docsync_core::{
    CodeEditor, DocumentHost, DocumentUri, EditorControl, EditorHost, EditorId, EditorOptions,
    Emitter, Listener, Selection, Subscription, TextDocument, VisibleEditor,
};

use crate::config::DocumentsConfig;
use crate::error::{DocsyncError, Result};

/// A code editor widget held in memory.
pub struct MemoryEditor {
    id: EditorId,
    document: RefCell<Option<DocumentUri>>,
    focused: Cell<bool>,
    simple_widget: bool,
    options: Cell<EditorOptions>,
    selections: RefCell<Vec<Selection>>,
    on_did_change_document: Emitter<()>,
    on_did_focus_text: Emitter<()>,
    on_did_blur_text: Emitter<()>,
    on_did_change_selections: Emitter<Vec<Selection>>,
    on_did_change_options: Emitter<EditorOptions>,
}

impl MemoryEditor {
    pub fn new(id: impl Into<EditorId>) -> Self {
        Self::build(id.into(), false)
    }

    /// An embedded widget editor, which never gets synchronized.
    pub fn simple_widget(id: impl Into<EditorId>) -> Self {
        Self::build(id.into(), true)
    }

    fn build(id: EditorId, simple_widget: bool) -> Self {
        Self {
            id,
            document: RefCell::new(None),
            focused: Cell::new(false),
            simple_widget,
            options: Cell::new(EditorOptions::default()),
            selections: RefCell::new(vec![Selection::default()]),
            on_did_change_document: Emitter::new(),
            on_did_focus_text: Emitter::new(),
            on_did_blur_text: Emitter::new(),
            on_did_change_selections: Emitter::new(),
            on_did_change_options: Emitter::new(),
        }
    }

    /// Shows `uri` (or nothing). The cursor is reset to the start.
    pub fn set_document(&self, uri: Option<DocumentUri>) {
        if *self.document.borrow() == uri {
            return;
        }
        *self.document.borrow_mut() = uri;
        *self.selections.borrow_mut() = vec![Selection::default()];
        self.on_did_change_document.fire(&());
    }

    pub fn focus(&self) {
        if !self.focused.replace(true) {
            self.on_did_focus_text.fire(&());
        }
    }

    pub fn blur(&self) {
        if self.focused.replace(false) {
            self.on_did_blur_text.fire(&());
        }
    }

    pub fn set_selections(&self, selections: Vec<Selection>) {
        if *self.selections.borrow() == selections {
            return;
        }
        *self.selections.borrow_mut() = selections.clone();
        self.on_did_change_selections.fire(&selections);
    }

    pub fn set_options(&self, options: EditorOptions) {
        if self.options.replace(options) != options {
            self.on_did_change_options.fire(&options);
        }
    }

    /// Listeners on the document, focus, and blur signals.
    pub fn tracking_listener_count(&self) -> usize {
        self.on_did_change_document.listener_count()
            + self.on_did_focus_text.listener_count()
            + self.on_did_blur_text.listener_count()
    }

    /// Listeners on the selection and options signals.
    pub fn property_listener_count(&self) -> usize {
        self.on_did_change_selections.listener_count() + self.on_did_change_options.listener_count()
    }
}

impl CodeEditor for MemoryEditor {
    fn id(&self) -> EditorId {
        self.id.clone()
    }

    fn document_uri(&self) -> Option<DocumentUri> {
        self.document.borrow().clone()
    }

    fn has_text_focus(&self) -> bool {
        self.focused.get()
    }

    fn is_simple_widget(&self) -> bool {
        self.simple_widget
    }

    fn options(&self) -> EditorOptions {
        self.options.get()
    }

    fn selections(&self) -> Vec<Selection> {
        self.selections.borrow().clone()
    }

    fn on_did_change_document(&self, listener: Listener<()>) -> Subscription {
        self.on_did_change_document.subscribe(listener)
    }

    fn on_did_focus_text(&self, listener: Listener<()>) -> Subscription {
        self.on_did_focus_text.subscribe(listener)
    }

    fn on_did_blur_text(&self, listener: Listener<()>) -> Subscription {
        self.on_did_blur_text.subscribe(listener)
    }

    fn on_did_change_selections(&self, listener: Listener<Vec<Selection>>) -> Subscription {
        self.on_did_change_selections.subscribe(listener)
    }

    fn on_did_change_options(&self, listener: Listener<EditorOptions>) -> Subscription {
        self.on_did_change_options.subscribe(listener)
    }
}

/// Documents, editors, and workbench layout held in memory.
///
/// # Examples
///
/// ```
/// use docsync::host::MemoryHost;
/// use docsync_core::{DocumentHost, DocumentUri, EditorHost};
///
/// let host = MemoryHost::new(1024);
/// host.open_document(DocumentUri::new("file:///a.txt"), "hello", "plaintext").unwrap();
/// let editor = host.create_editor("e1").unwrap();
/// editor.set_document(Some(DocumentUri::new("file:///a.txt")));
///
/// assert_eq!(host.documents().len(), 1);
/// assert_eq!(host.editors().len(), 1);
/// ```
pub struct MemoryHost {
    documents: RefCell<Vec<TextDocument>>,
    dirty: RefCell<HashSet<DocumentUri>>,
    editors: RefCell<Vec<Rc<MemoryEditor>>>,
    active: RefCell<Option<EditorControl>>,
    visible: RefCell<Vec<VisibleEditor>>,
    large_file_threshold: usize,
    on_did_add_document: Emitter<TextDocument>,
    on_did_remove_document: Emitter<DocumentUri>,
    on_did_add_editor: Emitter<Rc<dyn CodeEditor>>,
    on_did_remove_editor: Emitter<EditorId>,
    on_did_change_active_editor: Emitter<()>,
}

impl MemoryHost {
    /// Creates an empty host treating documents above `large_file_threshold`
    /// bytes as too large.
    pub fn new(large_file_threshold: usize) -> Self {
        Self {
            documents: RefCell::new(Vec::new()),
            dirty: RefCell::new(HashSet::new()),
            editors: RefCell::new(Vec::new()),
            active: RefCell::new(None),
            visible: RefCell::new(Vec::new()),
            large_file_threshold,
            on_did_add_document: Emitter::new(),
            on_did_remove_document: Emitter::new(),
            on_did_add_editor: Emitter::new(),
            on_did_remove_editor: Emitter::new(),
            on_did_change_active_editor: Emitter::new(),
        }
    }

    pub fn from_config(config: &DocumentsConfig) -> Self {
        Self::new(config.large_file_threshold)
    }

    pub fn open_document(
        &self,
        uri: DocumentUri,
        content: &str,
        language_id: &str,
    ) -> Result<TextDocument> {
        if self.document(&uri).is_some() {
            return Err(DocsyncError::InvalidCommand(format!(
                "document {uri} is already open"
            )));
        }

        let document = TextDocument::new(uri, 1, content, language_id);
        self.documents.borrow_mut().push(document.clone());
        tracing::trace!("host opened {}", document.uri);
        self.on_did_add_document.fire(&document);
        Ok(document)
    }

    pub fn close_document(&self, uri: &DocumentUri) -> Result<()> {
        let removed = {
            let mut documents = self.documents.borrow_mut();
            let before = documents.len();
            documents.retain(|doc| doc.uri != *uri);
            documents.len() != before
        };
        if !removed {
            return Err(DocsyncError::InvalidCommand(format!(
                "document {uri} is not open"
            )));
        }

        self.dirty.borrow_mut().remove(uri);
        tracing::trace!("host closed {}", uri);
        self.on_did_remove_document.fire(uri);
        Ok(())
    }

    pub fn document(&self, uri: &DocumentUri) -> Option<TextDocument> {
        self.documents
            .borrow()
            .iter()
            .find(|doc| doc.uri == *uri)
            .cloned()
    }

    pub fn set_dirty(&self, uri: &DocumentUri, dirty: bool) {
        let mut set = self.dirty.borrow_mut();
        if dirty {
            set.insert(uri.clone());
        } else {
            set.remove(uri);
        }
    }

    pub fn create_editor(&self, id: impl Into<EditorId>) -> Result<Rc<MemoryEditor>> {
        self.add_editor(MemoryEditor::new(id))
    }

    /// Adds an already-built editor (for example a simple widget).
    pub fn add_editor(&self, editor: MemoryEditor) -> Result<Rc<MemoryEditor>> {
        if self.editor(&editor.id).is_some() {
            return Err(DocsyncError::InvalidCommand(format!(
                "editor {} already exists",
                editor.id
            )));
        }

        let editor = Rc::new(editor);
        self.editors.borrow_mut().push(Rc::clone(&editor));
        let as_code_editor: Rc<dyn CodeEditor> = editor.clone();
        self.on_did_add_editor.fire(&as_code_editor);
        Ok(editor)
    }

    pub fn remove_editor(&self, id: &EditorId) -> Result<()> {
        let removed = {
            let mut editors = self.editors.borrow_mut();
            let idx = editors.iter().position(|editor| editor.id == *id);
            idx.map(|idx| editors.remove(idx))
        };
        if removed.is_none() {
            return Err(DocsyncError::InvalidCommand(format!(
                "editor {id} does not exist"
            )));
        }

        self.on_did_remove_editor.fire(id);
        Ok(())
    }

    pub fn editor(&self, id: &EditorId) -> Option<Rc<MemoryEditor>> {
        self.editors
            .borrow()
            .iter()
            .find(|editor| editor.id == *id)
            .cloned()
    }

    pub(crate) fn require_editor(&self, id: &EditorId) -> Result<Rc<MemoryEditor>> {
        self.editor(id)
            .ok_or_else(|| DocsyncError::InvalidCommand(format!("editor {id} does not exist")))
    }

    /// Moves text focus to `id`, blurring whichever editor had it.
    pub fn focus_editor(&self, id: &EditorId) -> Result<()> {
        let target = self.require_editor(id)?;
        let others: Vec<Rc<MemoryEditor>> = self
            .editors
            .borrow()
            .iter()
            .filter(|editor| editor.id != *id)
            .cloned()
            .collect();

        for other in others {
            other.blur();
        }
        target.focus();
        Ok(())
    }

    pub fn set_active_editor(&self, control: Option<EditorControl>) {
        if *self.active.borrow() == control {
            return;
        }
        *self.active.borrow_mut() = control;
        self.on_did_change_active_editor.fire(&());
    }

    pub fn set_visible_editors(&self, visible: Vec<VisibleEditor>) {
        *self.visible.borrow_mut() = visible;
    }

    /// Listeners on the host-level signals.
    pub fn listener_count(&self) -> usize {
        self.on_did_add_document.listener_count()
            + self.on_did_remove_document.listener_count()
            + self.on_did_add_editor.listener_count()
            + self.on_did_remove_editor.listener_count()
            + self.on_did_change_active_editor.listener_count()
    }
}

impl DocumentHost for MemoryHost {
    fn documents(&self) -> Vec<TextDocument> {
        self.documents.borrow().clone()
    }

    fn is_too_large(&self, document: &TextDocument) -> bool {
        document.len() > self.large_file_threshold
    }

    fn is_dirty(&self, uri: &DocumentUri) -> bool {
        self.dirty.borrow().contains(uri)
    }

    fn on_did_add_document(&self, listener: Listener<TextDocument>) -> Subscription {
        self.on_did_add_document.subscribe(listener)
    }

    fn on_did_remove_document(&self, listener: Listener<DocumentUri>) -> Subscription {
        self.on_did_remove_document.subscribe(listener)
    }
}

impl EditorHost for MemoryHost {
    fn editors(&self) -> Vec<Rc<dyn CodeEditor>> {
        self.editors
            .borrow()
            .iter()
            .map(|editor| Rc::clone(editor) as Rc<dyn CodeEditor>)
            .collect()
    }

    fn active_editor(&self) -> Option<EditorControl> {
        self.active.borrow().clone()
    }

    fn visible_editors(&self) -> Vec<VisibleEditor> {
        self.visible.borrow().clone()
    }

    fn on_did_add_editor(&self, listener: Listener<Rc<dyn CodeEditor>>) -> Subscription {
        self.on_did_add_editor.subscribe(listener)
    }

    fn on_did_remove_editor(&self, listener: Listener<EditorId>) -> Subscription {
        self.on_did_remove_editor.subscribe(listener)
    }

    fn on_did_change_active_editor(&self, listener: Listener<()>) -> Subscription {
        self.on_did_change_active_editor.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> DocumentUri {
        DocumentUri::new(s)
    }

    #[test]
    fn test_open_and_close_document() {
        let host = MemoryHost::new(1024);
        let added = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&added);
        let _sub = DocumentHost::on_did_add_document(
            &host,
            Box::new(move |doc: &TextDocument| sink.borrow_mut().push(doc.uri.clone())),
        );

        let doc = host.open_document(uri("file:///a.txt"), "abc", "plaintext").unwrap();
        assert_eq!(doc.version, 1);
        assert_eq!(*added.borrow(), vec![uri("file:///a.txt")]);

        assert!(host.open_document(uri("file:///a.txt"), "", "plaintext").is_err());

        host.close_document(&uri("file:///a.txt")).unwrap();
        assert!(host.documents().is_empty());
        assert!(host.close_document(&uri("file:///a.txt")).is_err());
    }

    #[test]
    fn test_too_large_threshold() {
        let host = MemoryHost::new(4);
        let small = host.open_document(uri("file:///s"), "1234", "plaintext").unwrap();
        let big = host.open_document(uri("file:///b"), "12345", "plaintext").unwrap();
        assert!(!host.is_too_large(&small));
        assert!(host.is_too_large(&big));
    }

    #[test]
    fn test_dirty_state_cleared_on_close() {
        let host = MemoryHost::new(1024);
        host.open_document(uri("file:///a.txt"), "", "plaintext").unwrap();
        host.set_dirty(&uri("file:///a.txt"), true);
        assert!(host.is_dirty(&uri("file:///a.txt")));

        host.close_document(&uri("file:///a.txt")).unwrap();
        assert!(!host.is_dirty(&uri("file:///a.txt")));
    }

    #[test]
    fn test_focus_moves_between_editors() {
        let host = MemoryHost::new(1024);
        let e1 = host.create_editor("e1").unwrap();
        let e2 = host.create_editor("e2").unwrap();

        host.focus_editor(&EditorId::new("e1")).unwrap();
        assert!(e1.has_text_focus());

        host.focus_editor(&EditorId::new("e2")).unwrap();
        assert!(!e1.has_text_focus());
        assert!(e2.has_text_focus());

        assert!(host.focus_editor(&EditorId::new("nope")).is_err());
    }

    #[test]
    fn test_editor_signals_fire_only_on_change() {
        let editor = MemoryEditor::new("e1");
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        let _sub = editor.on_did_change_document.subscribe(move |_| sink.set(sink.get() + 1));

        editor.set_document(Some(uri("file:///a.txt")));
        editor.set_document(Some(uri("file:///a.txt")));
        editor.set_document(None);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_duplicate_editor_rejected() {
        let host = MemoryHost::new(1024);
        host.create_editor("e1").unwrap();
        assert!(host.create_editor("e1").is_err());
        host.remove_editor(&EditorId::new("e1")).unwrap();
        assert!(host.remove_editor(&EditorId::new("e1")).is_err());
    }
}
