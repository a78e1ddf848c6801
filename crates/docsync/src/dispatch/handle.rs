use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use docsync_core::{
    BindingId, CodeEditor, EditorAddData, EditorBinding, EditorId, EditorOptions,
    EditorPropertiesChange, Selection, SubscriptionSet, TextDocument,
};

use crate::mirror::RemoteMirror;

/// A synchronized editor binding.
///
/// Caches the editor's presentation state and forwards every selection or
/// options change to the remote mirror until it is disposed.
pub struct LiveEditorHandle {
    id: BindingId,
    editor: Rc<dyn CodeEditor>,
    document: TextDocument,
    view_column: Option<u32>,
    options: Cell<EditorOptions>,
    selections: RefCell<Vec<Selection>>,
    mirror: Rc<dyn RemoteMirror>,
    subscriptions: RefCell<SubscriptionSet>,
    disposed: Cell<bool>,
}

impl LiveEditorHandle {
    pub(crate) fn new(
        binding: &EditorBinding,
        document: TextDocument,
        view_column: Option<u32>,
        mirror: Rc<dyn RemoteMirror>,
    ) -> Rc<Self> {
        let editor = Rc::clone(binding.editor());
        let handle = Rc::new(Self {
            id: binding.id().clone(),
            options: Cell::new(editor.options()),
            selections: RefCell::new(editor.selections()),
            editor,
            document,
            view_column,
            mirror,
            subscriptions: RefCell::new(SubscriptionSet::new()),
            disposed: Cell::new(false),
        });
        handle.attach();
        handle
    }

    fn attach(self: &Rc<Self>) {
        let mut subscriptions = SubscriptionSet::new();

        let weak: Weak<Self> = Rc::downgrade(self);
        subscriptions.add(self.editor.on_did_change_selections(Box::new(
            move |selections: &Vec<Selection>| {
                if let Some(handle) = weak.upgrade() {
                    handle.selections_changed(selections);
                }
            },
        )));

        let weak: Weak<Self> = Rc::downgrade(self);
        subscriptions.add(self.editor.on_did_change_options(Box::new(
            move |options: &EditorOptions| {
                if let Some(handle) = weak.upgrade() {
                    handle.options_changed(*options);
                }
            },
        )));

        *self.subscriptions.borrow_mut() = subscriptions;
    }

    fn selections_changed(&self, selections: &[Selection]) {
        if self.disposed.get() {
            return;
        }
        *self.selections.borrow_mut() = selections.to_vec();
        tracing::trace!("selections changed in {}", self.id);
        self.mirror.accept_editor_properties_changed(
            &self.id,
            EditorPropertiesChange {
                options: None,
                selections: Some(selections.to_vec()),
            },
        );
    }

    fn options_changed(&self, options: EditorOptions) {
        if self.disposed.get() {
            return;
        }
        self.options.set(options);
        tracing::trace!("options changed in {}", self.id);
        self.mirror.accept_editor_properties_changed(
            &self.id,
            EditorPropertiesChange {
                options: Some(options),
                selections: None,
            },
        );
    }

    pub fn id(&self) -> &BindingId {
        &self.id
    }

    pub fn editor_id(&self) -> EditorId {
        self.editor.id()
    }

    pub fn document(&self) -> &TextDocument {
        &self.document
    }

    pub fn view_column(&self) -> Option<u32> {
        self.view_column
    }

    pub fn options(&self) -> EditorOptions {
        self.options.get()
    }

    pub fn selections(&self) -> Vec<Selection> {
        self.selections.borrow().clone()
    }

    pub fn to_add_data(&self) -> EditorAddData {
        EditorAddData {
            id: self.id.clone(),
            document_uri: self.document.uri.clone(),
            options: self.options(),
            selections: self.selections(),
            view_column_position: self.view_column,
        }
    }

    /// Stops forwarding editor changes. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
        drop(subscriptions);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl fmt::Debug for LiveEditorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveEditorHandle")
            .field("id", &self.id)
            .field("document", &self.document.uri)
            .field("view_column", &self.view_column)
            .field("disposed", &self.disposed.get())
            .finish()
    }
}
