//! Minimal add/remove description between two snapshots.

use std::cmp::Ordering;

use crate::document::TextDocument;
use crate::editor::{BindingId, EditorBinding};
use crate::snapshot::Snapshot;

/// Items only in `before` (removed) and only in `after` (added).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedDiff<T> {
    pub removed: Vec<T>,
    pub added: Vec<T>,
}

/// Diffs two sequences sorted under `cmp` in one linear merge pass.
///
/// Items comparing equal are the same item and show up on neither side.
/// Both inputs must be sorted and duplicate-free under `cmp`, and `cmp` must
/// be a strict total order; otherwise the result is unspecified.
///
/// # Examples
///
/// ```
/// use docsync_core::delta::diff_sorted;
///
/// let diff = diff_sorted(&[1, 3, 5], &[2, 3, 6], |a, b| a.cmp(b));
/// assert_eq!(diff.removed, vec![1, 5]);
/// assert_eq!(diff.added, vec![2, 6]);
/// ```
pub fn diff_sorted<T: Clone>(
    before: &[T],
    after: &[T],
    mut cmp: impl FnMut(&T, &T) -> Ordering,
) -> SortedDiff<T> {
    let mut removed = Vec::new();
    let mut added = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < before.len() && j < after.len() {
        match cmp(&before[i], &after[j]) {
            Ordering::Less => {
                removed.push(before[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                added.push(after[j].clone());
                j += 1;
            }
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    removed.extend_from_slice(&before[i..]);
    added.extend_from_slice(&after[j..]);

    SortedDiff { removed, added }
}

/// Changes that turn one snapshot into the next.
///
/// `old_active_editor`/`new_active_editor` are both `None` when the active
/// binding did not change. When it did, at least one of them is set, and a
/// `None` on the new side means no editor is active any more.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    pub removed_documents: Vec<TextDocument>,
    pub added_documents: Vec<TextDocument>,
    pub removed_editors: Vec<EditorBinding>,
    pub added_editors: Vec<EditorBinding>,
    pub old_active_editor: Option<BindingId>,
    pub new_active_editor: Option<BindingId>,
}

impl Delta {
    /// Diffs `before` against `after`.
    ///
    /// Without a previous snapshot everything in `after` counts as added and
    /// its active binding as the new active editor.
    pub fn compute(before: Option<&Snapshot>, after: &Snapshot) -> Self {
        let Some(before) = before else {
            return Self {
                removed_documents: Vec::new(),
                added_documents: after.documents().to_vec(),
                removed_editors: Vec::new(),
                added_editors: after.editors().to_vec(),
                old_active_editor: None,
                new_active_editor: after.active_editor().cloned(),
            };
        };

        let documents = diff_sorted(before.documents(), after.documents(), |a, b| {
            a.uri.cmp(&b.uri)
        });
        let editors = diff_sorted(
            before.editors(),
            after.editors(),
            EditorBinding::canonical_cmp,
        );

        let (old_active_editor, new_active_editor) =
            if before.active_editor() == after.active_editor() {
                (None, None)
            } else {
                (
                    before.active_editor().cloned(),
                    after.active_editor().cloned(),
                )
            };

        Self {
            removed_documents: documents.removed,
            added_documents: documents.added,
            removed_editors: editors.removed,
            added_editors: editors.added,
            old_active_editor,
            new_active_editor,
        }
    }

    /// Delta announcing a single new document and nothing else.
    pub fn document_added(document: TextDocument) -> Self {
        Self {
            added_documents: vec![document],
            ..Self::default()
        }
    }

    pub fn active_editor_changed(&self) -> bool {
        self.old_active_editor != self.new_active_editor
    }

    pub fn is_empty(&self) -> bool {
        self.removed_documents.is_empty()
            && self.added_documents.is_empty()
            && self.removed_editors.is_empty()
            && self.added_editors.is_empty()
            && !self.active_editor_changed()
    }
}
