//! Point-in-time view of synchronized documents and editors.

use std::collections::HashSet;

use crate::document::{DocumentUri, TextDocument};
use crate::editor::{BindingId, EditorBinding, EditorControl};
use crate::host::Host;

/// Immutable, canonically ordered view of documents, bindings, and the
/// active binding.
///
/// Documents are sorted by URI and bindings by editor id then URI, both
/// without duplicates. [`crate::Delta::compute`] relies on this order.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    documents: Vec<TextDocument>,
    editors: Vec<EditorBinding>,
    active_editor: Option<BindingId>,
}

impl Snapshot {
    /// Builds a snapshot, sorting and deduplicating both sequences.
    ///
    /// A document URI listed twice keeps its first entry. An editor listed
    /// twice keeps its first binding, since an editor shows exactly one
    /// document at a time.
    pub fn new(
        mut documents: Vec<TextDocument>,
        mut editors: Vec<EditorBinding>,
        active_editor: Option<BindingId>,
    ) -> Self {
        documents.sort_by(|a, b| a.uri.cmp(&b.uri));
        documents.dedup_by(|later, earlier| later.uri == earlier.uri);

        editors.sort_by(|a, b| a.editor_id().cmp(b.editor_id()));
        editors.dedup_by(|later, earlier| later.editor_id() == earlier.editor_id());

        Self {
            documents,
            editors,
            active_editor,
        }
    }

    /// Enumerates the host and filters it down to what gets synchronized.
    ///
    /// Too-large documents are dropped, and with them every editor showing
    /// them. Editors without a document, showing a document the host does not
    /// list, or that are simple widgets are dropped as well.
    ///
    /// With `ignore_path_casing`, URIs differing only in case name one
    /// document: the first one the host lists is kept, the others are
    /// dropped together with their editors.
    ///
    /// The active binding is the first kept editor with text focus. Failing
    /// that, the host's active pane is matched against the kept editors,
    /// looking through diff views to their modified side.
    pub fn capture(host: &dyn Host, track_active_editor: bool, ignore_path_casing: bool) -> Self {
        let mut identities = HashSet::new();
        let documents: Vec<TextDocument> = host
            .documents()
            .into_iter()
            .filter(|doc| {
                if host.is_too_large(doc) {
                    tracing::trace!("skipping too-large document {}", doc.uri);
                    return false;
                }
                if ignore_path_casing && !identities.insert(doc.uri.identity_key(true)) {
                    tracing::trace!("skipping case variant {}", doc.uri);
                    return false;
                }
                true
            })
            .collect();

        let mut editors = Vec::new();
        let mut focused = None;
        {
            let known: HashSet<&DocumentUri> = documents.iter().map(|doc| &doc.uri).collect();

            for editor in host.editors() {
                if editor.is_simple_widget() {
                    tracing::trace!("skipping simple widget {}", editor.id());
                    continue;
                }
                let Some(uri) = editor.document_uri() else {
                    continue;
                };
                if !known.contains(&uri) {
                    continue;
                }

                let has_focus = editor.has_text_focus();
                let binding = EditorBinding::new(editor, uri);
                if has_focus && focused.is_none() {
                    focused = Some(binding.id().clone());
                }
                editors.push(binding);
            }
        }

        let active_editor = if track_active_editor {
            focused.or_else(|| {
                host.active_editor()
                    .and_then(|control| resolve_active(&control, &editors))
            })
        } else {
            None
        };

        Self::new(documents, editors, active_editor)
    }

    pub fn documents(&self) -> &[TextDocument] {
        &self.documents
    }

    pub fn editors(&self) -> &[EditorBinding] {
        &self.editors
    }

    pub fn active_editor(&self) -> Option<&BindingId> {
        self.active_editor.as_ref()
    }

    pub fn contains_document(&self, uri: &DocumentUri) -> bool {
        self.documents
            .binary_search_by(|doc| doc.uri.cmp(uri))
            .is_ok()
    }

    /// Whether a document with the same identity as `uri` is present.
    pub fn contains_identity(&self, uri: &DocumentUri, ignore_path_casing: bool) -> bool {
        if !ignore_path_casing {
            return self.contains_document(uri);
        }
        let key = uri.identity_key(true);
        self.documents
            .iter()
            .any(|doc| doc.uri.identity_key(true) == key)
    }

    /// Copy of this snapshot with `document` inserted in order.
    ///
    /// Returns `None` when a document with the same URI is already present.
    pub fn with_document(&self, document: TextDocument) -> Option<Self> {
        let idx = match self
            .documents
            .binary_search_by(|doc| doc.uri.cmp(&document.uri))
        {
            Ok(_) => return None,
            Err(idx) => idx,
        };

        let mut documents = self.documents.clone();
        documents.insert(idx, document);
        Some(Self {
            documents,
            editors: self.editors.clone(),
            active_editor: self.active_editor.clone(),
        })
    }
}

fn resolve_active(control: &EditorControl, editors: &[EditorBinding]) -> Option<BindingId> {
    let target = control.editing_editor();
    editors
        .iter()
        .find(|binding| binding.editor_id() == target)
        .map(|binding| binding.id().clone())
}
