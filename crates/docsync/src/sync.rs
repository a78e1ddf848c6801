//! Wiring of tracker, dispatcher, and remote mirror.

use std::rc::Rc;

use docsync_core::{BindingId, DocumentUri, EditorId, Host, Subscription, TextDocument};

use crate::config::SyncConfig;
use crate::dispatch::{DeltaDispatcher, LiveEditorHandle};
use crate::mirror::RemoteMirror;
use crate::tracker::StateTracker;

/// Keeps a remote mirror in sync with a host's documents and editors.
///
/// Construction performs the initial synchronization, so the mirror holds the
/// host's full state as soon as `new` returns.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use docsync::config::SyncConfig;
/// use docsync::host::MemoryHost;
/// use docsync::mirror::LocalMirror;
/// use docsync::sync::DocumentsAndEditors;
/// use docsync_core::DocumentUri;
///
/// let host = Rc::new(MemoryHost::new(1024));
/// let mirror = Rc::new(LocalMirror::new());
/// let sync = DocumentsAndEditors::new(host.clone(), mirror.clone(), &SyncConfig::default());
///
/// host.open_document(DocumentUri::new("file:///a.txt"), "a", "plaintext").unwrap();
/// assert_eq!(sync.document_count(), 1);
/// assert_eq!(mirror.state().document_count(), 1);
/// ```
pub struct DocumentsAndEditors {
    tracker: StateTracker,
    dispatcher: Rc<DeltaDispatcher>,
    _wiring: Subscription,
}

impl DocumentsAndEditors {
    pub fn new(host: Rc<dyn Host>, mirror: Rc<dyn RemoteMirror>, config: &SyncConfig) -> Self {
        let dispatcher = Rc::new(DeltaDispatcher::new(
            Rc::clone(&host),
            mirror,
            config.documents.ignore_path_casing,
        ));
        let tracker = StateTracker::new(host, config);

        let weak = Rc::downgrade(&dispatcher);
        let wiring = tracker.on_did_change_state(move |delta| {
            let Some(dispatcher) = weak.upgrade() else {
                return;
            };
            if let Err(e) = dispatcher.handle_delta(delta) {
                tracing::error!("rejected state delta: {}", e);
            }
        });

        tracker.refresh();
        tracing::info!(
            "initial sync: {} documents, {} editors",
            dispatcher.document_count(),
            dispatcher.editor_count()
        );

        Self {
            tracker,
            dispatcher,
            _wiring: wiring,
        }
    }

    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    pub fn dispatcher(&self) -> &Rc<DeltaDispatcher> {
        &self.dispatcher
    }

    pub fn get_editor(&self, id: &BindingId) -> Option<Rc<LiveEditorHandle>> {
        self.dispatcher.get_editor(id)
    }

    pub fn find_editor_ids_for(&self, editor_id: &EditorId) -> Vec<BindingId> {
        self.dispatcher.find_editor_ids_for(editor_id)
    }

    pub fn document(&self, uri: &DocumentUri) -> Option<TextDocument> {
        self.dispatcher.document(uri)
    }

    pub fn documents(&self) -> Vec<TextDocument> {
        self.dispatcher.documents()
    }

    pub fn editor_count(&self) -> usize {
        self.dispatcher.editor_count()
    }

    pub fn document_count(&self) -> usize {
        self.dispatcher.document_count()
    }

    /// Stops tracking the host and releases every live handle.
    pub fn dispose(&self) {
        self.tracker.dispose();
        self.dispatcher.dispose_all();
    }
}

impl Drop for DocumentsAndEditors {
    fn drop(&mut self) {
        self.dispose();
    }
}
