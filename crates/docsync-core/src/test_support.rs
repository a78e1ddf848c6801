//! Minimal host and editor stand-ins for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::document::{DocumentUri, TextDocument};
use crate::editor::{EditorBinding, EditorControl, EditorId, EditorOptions, Selection, VisibleEditor};
use crate::event::Subscription;
use crate::host::{CodeEditor, DocumentHost, EditorHost, Listener};

pub(crate) fn doc(uri: &str) -> TextDocument {
    TextDocument::new(DocumentUri::new(uri), 1, "", "plaintext")
}

pub(crate) struct StubEditor {
    id: EditorId,
    uri: RefCell<Option<DocumentUri>>,
    focus: Cell<bool>,
    simple_widget: Cell<bool>,
}

impl StubEditor {
    pub(crate) fn showing(id: &str, uri: &str) -> Rc<Self> {
        Rc::new(Self {
            id: EditorId::new(id),
            uri: RefCell::new(Some(DocumentUri::new(uri))),
            focus: Cell::new(false),
            simple_widget: Cell::new(false),
        })
    }

    pub(crate) fn empty(id: &str) -> Rc<Self> {
        Rc::new(Self {
            id: EditorId::new(id),
            uri: RefCell::new(None),
            focus: Cell::new(false),
            simple_widget: Cell::new(false),
        })
    }

    pub(crate) fn set_focus(&self, focus: bool) {
        self.focus.set(focus);
    }

    pub(crate) fn set_simple_widget(&self, simple: bool) {
        self.simple_widget.set(simple);
    }

    pub(crate) fn binding(self: &Rc<Self>) -> EditorBinding {
        let uri = self
            .uri
            .borrow()
            .clone()
            .unwrap_or_else(|| DocumentUri::new(""));
        EditorBinding::new(Rc::clone(self) as Rc<dyn CodeEditor>, uri)
    }
}

impl CodeEditor for StubEditor {
    fn id(&self) -> EditorId {
        self.id.clone()
    }

    fn document_uri(&self) -> Option<DocumentUri> {
        self.uri.borrow().clone()
    }

    fn has_text_focus(&self) -> bool {
        self.focus.get()
    }

    fn is_simple_widget(&self) -> bool {
        self.simple_widget.get()
    }

    fn options(&self) -> EditorOptions {
        EditorOptions::default()
    }

    fn selections(&self) -> Vec<Selection> {
        vec![Selection::default()]
    }

    fn on_did_change_document(&self, _listener: Listener<()>) -> Subscription {
        Subscription::new(|| {})
    }

    fn on_did_focus_text(&self, _listener: Listener<()>) -> Subscription {
        Subscription::new(|| {})
    }

    fn on_did_blur_text(&self, _listener: Listener<()>) -> Subscription {
        Subscription::new(|| {})
    }

    fn on_did_change_selections(&self, _listener: Listener<Vec<Selection>>) -> Subscription {
        Subscription::new(|| {})
    }

    fn on_did_change_options(&self, _listener: Listener<EditorOptions>) -> Subscription {
        Subscription::new(|| {})
    }
}

#[derive(Default)]
pub(crate) struct StubHost {
    documents: RefCell<Vec<TextDocument>>,
    editors: RefCell<Vec<Rc<dyn CodeEditor>>>,
    active: RefCell<Option<EditorControl>>,
    limit: Cell<Option<usize>>,
    dirty: RefCell<HashSet<DocumentUri>>,
}

impl StubHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_document(&self, document: TextDocument) {
        self.documents.borrow_mut().push(document);
    }

    pub(crate) fn add_editor(&self, editor: Rc<StubEditor>) {
        self.editors.borrow_mut().push(editor);
    }

    pub(crate) fn set_active(&self, control: Option<EditorControl>) {
        *self.active.borrow_mut() = control;
    }

    pub(crate) fn set_limit(&self, limit: usize) {
        self.limit.set(Some(limit));
    }
}

impl DocumentHost for StubHost {
    fn documents(&self) -> Vec<TextDocument> {
        self.documents.borrow().clone()
    }

    fn is_too_large(&self, document: &TextDocument) -> bool {
        self.limit.get().is_some_and(|limit| document.len() > limit)
    }

    fn is_dirty(&self, uri: &DocumentUri) -> bool {
        self.dirty.borrow().contains(uri)
    }

    fn on_did_add_document(&self, _listener: Listener<TextDocument>) -> Subscription {
        Subscription::new(|| {})
    }

    fn on_did_remove_document(&self, _listener: Listener<DocumentUri>) -> Subscription {
        Subscription::new(|| {})
    }
}

impl EditorHost for StubHost {
    fn editors(&self) -> Vec<Rc<dyn CodeEditor>> {
        self.editors.borrow().clone()
    }

    fn active_editor(&self) -> Option<EditorControl> {
        self.active.borrow().clone()
    }

    fn visible_editors(&self) -> Vec<VisibleEditor> {
        Vec::new()
    }

    fn on_did_add_editor(&self, _listener: Listener<Rc<dyn CodeEditor>>) -> Subscription {
        Subscription::new(|| {})
    }

    fn on_did_remove_editor(&self, _listener: Listener<EditorId>) -> Subscription {
        Subscription::new(|| {})
    }

    fn on_did_change_active_editor(&self, _listener: Listener<()>) -> Subscription {
        Subscription::new(|| {})
    }
}
