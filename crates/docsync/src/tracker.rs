//! State tracker: folds host signals into snapshot deltas.
//!
//! The tracker listens to every host signal that can change what is
//! synchronized, re-enumerates the host, and emits the difference to the
//! previous snapshot. The new snapshot is stored before subscribers run, so a
//! subscriber that mutates the host triggers a nested cycle against a
//! consistent baseline.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use docsync_core::{
    CodeEditor, Delta, DocumentUri, EditorId, Emitter, Host, Snapshot, Subscription, SubscriptionSet,
    TextDocument,
};

use crate::config::SyncConfig;

/// Watches a host and emits a [`Delta`] whenever its synchronized state
/// changes.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use docsync::config::SyncConfig;
/// use docsync::host::MemoryHost;
/// use docsync::tracker::StateTracker;
/// use docsync_core::DocumentUri;
///
/// let host = Rc::new(MemoryHost::new(1024));
/// let tracker = StateTracker::new(host.clone(), &SyncConfig::default());
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = seen.clone();
/// let _sub = tracker.on_did_change_state(move |delta| sink.borrow_mut().push(delta.clone()));
///
/// host.open_document(DocumentUri::new("file:///a.txt"), "a", "plaintext").unwrap();
/// assert_eq!(seen.borrow().len(), 1);
/// assert_eq!(seen.borrow()[0].added_documents.len(), 1);
/// ```
pub struct StateTracker {
    inner: Rc<TrackerInner>,
}

struct TrackerInner {
    host: Rc<dyn Host>,
    track_active_editor: bool,
    ignore_path_casing: bool,
    current: RefCell<Option<Snapshot>>,
    on_did_change_state: Emitter<Delta>,
    host_subscriptions: RefCell<SubscriptionSet>,
    editor_subscriptions: RefCell<HashMap<EditorId, SubscriptionSet>>,
    disposed: Cell<bool>,
}

impl StateTracker {
    /// Subscribes to `host` and to every editor it currently has.
    ///
    /// No delta is emitted until the host changes or [`refresh`](Self::refresh)
    /// is called.
    pub fn new(host: Rc<dyn Host>, config: &SyncConfig) -> Self {
        let inner = Rc::new(TrackerInner {
            host,
            track_active_editor: config.tracker.track_active_editor,
            ignore_path_casing: config.documents.ignore_path_casing,
            current: RefCell::new(None),
            on_did_change_state: Emitter::new(),
            host_subscriptions: RefCell::new(SubscriptionSet::new()),
            editor_subscriptions: RefCell::new(HashMap::new()),
            disposed: Cell::new(false),
        });

        let mut subscriptions = SubscriptionSet::new();
        let host = &inner.host;

        let weak = Rc::downgrade(&inner);
        subscriptions.add(host.on_did_add_document(Box::new(move |document: &TextDocument| {
            if let Some(inner) = weak.upgrade() {
                inner.update_state_on_document_add(document);
            }
        })));

        let weak = Rc::downgrade(&inner);
        subscriptions.add(host.on_did_remove_document(Box::new(move |_: &DocumentUri| {
            if let Some(inner) = weak.upgrade() {
                inner.update_state();
            }
        })));

        let weak = Rc::downgrade(&inner);
        subscriptions.add(host.on_did_add_editor(Box::new(move |editor: &Rc<dyn CodeEditor>| {
            if let Some(inner) = weak.upgrade() {
                TrackerInner::register_editor(&inner, editor);
                inner.update_state();
            }
        })));

        let weak = Rc::downgrade(&inner);
        subscriptions.add(host.on_did_remove_editor(Box::new(move |id: &EditorId| {
            if let Some(inner) = weak.upgrade() {
                inner.release_editor(id);
                inner.update_state();
            }
        })));

        if inner.track_active_editor {
            let weak = Rc::downgrade(&inner);
            subscriptions.add(host.on_did_change_active_editor(Box::new(move |_: &()| {
                if let Some(inner) = weak.upgrade() {
                    inner.update_state();
                }
            })));
        }

        *inner.host_subscriptions.borrow_mut() = subscriptions;

        for editor in inner.host.editors() {
            TrackerInner::register_editor(&inner, &editor);
        }

        Self { inner }
    }

    pub fn on_did_change_state(&self, listener: impl Fn(&Delta) + 'static) -> Subscription {
        self.inner.on_did_change_state.subscribe(listener)
    }

    /// Re-enumerates the host and emits whatever changed.
    pub fn refresh(&self) {
        self.inner.update_state();
    }

    /// The last emitted snapshot.
    pub fn current(&self) -> Option<Snapshot> {
        self.inner.current.borrow().clone()
    }

    /// Number of host editors with live per-editor subscriptions.
    pub fn tracked_editor_count(&self) -> usize {
        self.inner.editor_subscriptions.borrow().len()
    }

    /// Releases every subscription. Safe to call more than once.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }

        let host_subscriptions = std::mem::take(&mut *self.inner.host_subscriptions.borrow_mut());
        let editor_subscriptions =
            std::mem::take(&mut *self.inner.editor_subscriptions.borrow_mut());
        drop(host_subscriptions);
        drop(editor_subscriptions);

        tracing::debug!("state tracker disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl Drop for StateTracker {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl TrackerInner {
    fn update_state(&self) {
        if self.disposed.get() {
            return;
        }

        let snapshot = Snapshot::capture(
            self.host.as_ref(),
            self.track_active_editor,
            self.ignore_path_casing,
        );
        let delta = Delta::compute(self.current.borrow().as_ref(), &snapshot);
        if delta.is_empty() {
            tracing::trace!("host state unchanged");
            return;
        }

        tracing::debug!(
            "state changed: -{}/+{} documents, -{}/+{} editors, active changed: {}",
            delta.removed_documents.len(),
            delta.added_documents.len(),
            delta.removed_editors.len(),
            delta.added_editors.len(),
            delta.active_editor_changed()
        );

        *self.current.borrow_mut() = Some(snapshot);
        self.on_did_change_state.fire(&delta);
    }

    /// Inserts `document` into the stored snapshot without enumerating the
    /// host. Falls back to a full update whenever the shortcut could miss
    /// something: no snapshot yet, a too-large document, an editor already
    /// showing it, a document the host no longer lists (an earlier listener
    /// closed it), or a case variant of a known document.
    fn update_state_on_document_add(&self, document: &TextDocument) {
        if self.disposed.get() {
            return;
        }

        let shortcut = !self.host.is_too_large(document)
            && self.is_listed(document)
            && !self.is_shown(document);
        let next = if shortcut {
            self.current
                .borrow()
                .as_ref()
                .filter(|current| !current.contains_identity(&document.uri, self.ignore_path_casing))
                .and_then(|current| current.with_document(document.clone()))
        } else {
            None
        };

        let Some(next) = next else {
            self.update_state();
            return;
        };

        tracing::debug!("document added: {}", document.uri);
        *self.current.borrow_mut() = Some(next);
        self.on_did_change_state
            .fire(&Delta::document_added(document.clone()));
    }

    fn is_listed(&self, document: &TextDocument) -> bool {
        self.host
            .documents()
            .iter()
            .any(|listed| listed.uri == document.uri)
    }

    fn is_shown(&self, document: &TextDocument) -> bool {
        self.host
            .editors()
            .iter()
            .any(|editor| editor.document_uri().as_ref() == Some(&document.uri))
    }

    fn register_editor(inner: &Rc<Self>, editor: &Rc<dyn CodeEditor>) {
        let id = editor.id();
        if inner.editor_subscriptions.borrow().contains_key(&id) {
            tracing::warn!("editor {} registered twice, keeping the first registration", id);
            return;
        }

        let mut subscriptions = SubscriptionSet::new();
        subscriptions.add(editor.on_did_change_document(update_on(inner)));
        subscriptions.add(editor.on_did_focus_text(update_on(inner)));
        subscriptions.add(editor.on_did_blur_text(update_on(inner)));

        tracing::trace!("tracking editor {}", id);
        inner.editor_subscriptions.borrow_mut().insert(id, subscriptions);
    }

    fn release_editor(&self, id: &EditorId) {
        let released = self.editor_subscriptions.borrow_mut().remove(id);
        match released {
            Some(subscriptions) => {
                drop(subscriptions);
                tracing::trace!("released editor {}", id);
            }
            None => tracing::debug!("editor {} was not tracked", id),
        }
    }
}

fn update_on(inner: &Rc<TrackerInner>) -> Box<dyn Fn(&())> {
    let weak: Weak<TrackerInner> = Rc::downgrade(inner);
    Box::new(move |_: &()| {
        if let Some(inner) = weak.upgrade() {
            inner.update_state();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use docsync_core::{BindingId, DocumentHost, EditorControl};

    fn uri(s: &str) -> DocumentUri {
        DocumentUri::new(s)
    }

    fn recording(tracker: &StateTracker) -> (Rc<RefCell<Vec<Delta>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = tracker.on_did_change_state(move |delta| sink.borrow_mut().push(delta.clone()));
        (seen, sub)
    }

    fn tracker_for(host: &Rc<MemoryHost>) -> StateTracker {
        StateTracker::new(host.clone(), &SyncConfig::default())
    }

    #[test]
    fn test_initial_refresh_reports_everything() {
        let host = Rc::new(MemoryHost::new(1024));
        host.open_document(uri("file:///a.txt"), "a", "plaintext").unwrap();
        let editor = host.create_editor("e1").unwrap();
        editor.set_document(Some(uri("file:///a.txt")));

        let tracker = tracker_for(&host);
        let (seen, _sub) = recording(&tracker);
        assert!(seen.borrow().is_empty());

        tracker.refresh();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].added_documents.len(), 1);
        assert_eq!(seen[0].added_editors.len(), 1);
        assert_eq!(seen[0].new_active_editor, None);
    }

    #[test]
    fn test_refresh_without_changes_is_silent() {
        let host = Rc::new(MemoryHost::new(1024));
        host.open_document(uri("file:///a.txt"), "a", "plaintext").unwrap();
        let tracker = tracker_for(&host);
        tracker.refresh();

        let (seen, _sub) = recording(&tracker);
        tracker.refresh();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_document_add_fast_path() {
        let host = Rc::new(MemoryHost::new(1024));
        host.open_document(uri("file:///a.txt"), "a", "plaintext").unwrap();
        let tracker = tracker_for(&host);
        tracker.refresh();

        let (seen, _sub) = recording(&tracker);
        host.open_document(uri("file:///b.txt"), "b", "plaintext").unwrap();

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(
            seen.borrow()[0],
            Delta::document_added(host.document(&uri("file:///b.txt")).unwrap())
        );
        assert!(tracker.current().unwrap().contains_document(&uri("file:///b.txt")));
    }

    #[test]
    fn test_document_closed_by_earlier_listener_stays_closed() {
        let host = Rc::new(MemoryHost::new(1024));
        host.open_document(uri("file:///seed.txt"), "s", "plaintext").unwrap();

        // Registered before the tracker, so it runs first.
        let closer = Rc::clone(&host);
        let _early = DocumentHost::on_did_add_document(
            host.as_ref(),
            Box::new(move |doc: &TextDocument| {
                if doc.uri.as_str() == "file:///tmp.txt" {
                    closer.close_document(&doc.uri).unwrap();
                }
            }),
        );

        let tracker = tracker_for(&host);
        tracker.refresh();
        let (seen, _sub) = recording(&tracker);

        host.open_document(uri("file:///tmp.txt"), "t", "plaintext").unwrap();

        assert!(seen.borrow().is_empty());
        let current = tracker.current().unwrap();
        assert_eq!(current.documents().len(), 1);
        assert!(!current.contains_document(&uri("file:///tmp.txt")));
    }

    #[test]
    fn test_case_variant_add_takes_full_update() {
        let host = Rc::new(MemoryHost::new(1024));
        let mut config = SyncConfig::default();
        config.documents.ignore_path_casing = true;
        let tracker = StateTracker::new(host.clone(), &config);

        host.open_document(uri("file:///A.txt"), "a", "plaintext").unwrap();
        let (seen, _sub) = recording(&tracker);
        host.open_document(uri("file:///a.txt"), "a", "plaintext").unwrap();
        assert!(seen.borrow().is_empty());

        host.close_document(&uri("file:///A.txt")).unwrap();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].removed_documents[0].uri, uri("file:///A.txt"));
        assert_eq!(seen[0].added_documents[0].uri, uri("file:///a.txt"));
    }

    #[test]
    fn test_too_large_document_is_ignored() {
        let host = Rc::new(MemoryHost::new(4));
        let tracker = tracker_for(&host);
        tracker.refresh();

        let (seen, _sub) = recording(&tracker);
        host.open_document(uri("file:///big.txt"), "too large", "plaintext").unwrap();
        let editor = host.create_editor("e1").unwrap();
        editor.set_document(Some(uri("file:///big.txt")));

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_removing_filtered_editor_is_silent() {
        let host = Rc::new(MemoryHost::new(1024));
        let tracker = tracker_for(&host);
        tracker.refresh();
        host.create_editor("e1").unwrap();

        let (seen, _sub) = recording(&tracker);
        host.remove_editor(&EditorId::new("e1")).unwrap();
        assert!(seen.borrow().is_empty());
        assert_eq!(tracker.tracked_editor_count(), 0);
    }

    #[test]
    fn test_focus_sets_active_editor() {
        let host = Rc::new(MemoryHost::new(1024));
        host.open_document(uri("file:///a.txt"), "a", "plaintext").unwrap();
        let editor = host.create_editor("e1").unwrap();
        editor.set_document(Some(uri("file:///a.txt")));
        let tracker = tracker_for(&host);
        tracker.refresh();

        let (seen, _sub) = recording(&tracker);
        host.focus_editor(&EditorId::new("e1")).unwrap();
        host.focus_editor(&EditorId::new("e1")).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].new_active_editor, Some(BindingId::from("e1,file:///a.txt")));
        assert!(seen[0].added_editors.is_empty());
    }

    #[test]
    fn test_redundant_focus_emits_at_most_once() {
        let host = Rc::new(MemoryHost::new(1024));
        host.open_document(uri("file:///a.txt"), "a", "plaintext").unwrap();
        let editor = host.create_editor("e1").unwrap();
        editor.set_document(Some(uri("file:///a.txt")));
        editor.focus();
        let tracker = tracker_for(&host);
        tracker.refresh();

        let (seen, _sub) = recording(&tracker);
        editor.blur();
        editor.focus();
        // Blur clears the active editor, focus restores it.
        assert_eq!(seen.borrow().len(), 2);

        seen.borrow_mut().clear();
        tracker.refresh();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_active_pane_change_is_tracked() {
        let host = Rc::new(MemoryHost::new(1024));
        host.open_document(uri("file:///a.txt"), "a", "plaintext").unwrap();
        let editor = host.create_editor("e1").unwrap();
        editor.set_document(Some(uri("file:///a.txt")));
        let tracker = tracker_for(&host);
        tracker.refresh();

        let (seen, _sub) = recording(&tracker);
        host.set_active_editor(Some(EditorControl::code("e1")));
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].active_editor_changed());
    }

    #[test]
    fn test_active_tracking_can_be_disabled() {
        let host = Rc::new(MemoryHost::new(1024));
        host.open_document(uri("file:///a.txt"), "a", "plaintext").unwrap();
        let editor = host.create_editor("e1").unwrap();
        editor.set_document(Some(uri("file:///a.txt")));
        let mut config = SyncConfig::default();
        config.tracker.track_active_editor = false;
        let tracker = StateTracker::new(host.clone(), &config);
        tracker.refresh();

        let (seen, _sub) = recording(&tracker);
        host.focus_editor(&EditorId::new("e1")).unwrap();
        host.set_active_editor(Some(EditorControl::code("e1")));
        assert!(seen.borrow().is_empty());
        assert_eq!(tracker.current().unwrap().active_editor(), None);
    }

    #[test]
    fn test_dispose_releases_all_subscriptions() {
        let host = Rc::new(MemoryHost::new(1024));
        let tracker = tracker_for(&host);
        let baseline = host.listener_count();
        assert!(baseline > 0);

        let mut editors = Vec::new();
        for n in 0..5 {
            let editor = host.create_editor(format!("e{n}").as_str()).unwrap();
            assert_eq!(editor.tracking_listener_count(), 3);
            editors.push(editor);
        }
        host.remove_editor(&EditorId::new("e0")).unwrap();
        assert_eq!(editors[0].tracking_listener_count(), 0);
        assert_eq!(tracker.tracked_editor_count(), 4);

        tracker.dispose();
        tracker.dispose();
        assert!(tracker.is_disposed());
        assert_eq!(tracker.tracked_editor_count(), 0);
        assert_eq!(host.listener_count(), 0);
        assert!(editors.iter().all(|editor| editor.tracking_listener_count() == 0));
    }

    #[test]
    fn test_existing_editors_subscribed_at_construction() {
        let host = Rc::new(MemoryHost::new(1024));
        let editor = host.create_editor("e1").unwrap();
        let tracker = tracker_for(&host);

        assert_eq!(tracker.tracked_editor_count(), 1);
        assert_eq!(editor.tracking_listener_count(), 3);
    }

    #[test]
    fn test_no_updates_after_dispose() {
        let host = Rc::new(MemoryHost::new(1024));
        let tracker = tracker_for(&host);
        let (seen, _sub) = recording(&tracker);
        tracker.dispose();

        host.open_document(uri("file:///a.txt"), "a", "plaintext").unwrap();
        tracker.refresh();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_nested_update_from_listener() {
        let host = Rc::new(MemoryHost::new(1024));
        let tracker = tracker_for(&host);
        tracker.refresh();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let reentrant_host = Rc::clone(&host);
        let _sub = tracker.on_did_change_state(move |delta: &Delta| {
            sink.borrow_mut().push(delta.clone());
            if delta
                .added_documents
                .iter()
                .any(|doc| doc.uri.as_str() == "file:///a.txt")
            {
                reentrant_host
                    .open_document(uri("file:///b.txt"), "b", "plaintext")
                    .unwrap();
            }
        });

        host.open_document(uri("file:///a.txt"), "a", "plaintext").unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].added_documents[0].uri, uri("file:///b.txt"));
        let current = tracker.current().unwrap();
        assert_eq!(current.documents().len(), 2);
    }
}
