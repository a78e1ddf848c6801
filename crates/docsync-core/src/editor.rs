//! Editor identity, bindings, and presentation state.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::document::DocumentUri;
use crate::host::CodeEditor;

/// Host-assigned identifier of an editor widget.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditorId(String);

impl EditorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EditorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identity of an editor binding: `"{editor_id},{document_uri}"`.
///
/// # Examples
///
/// ```
/// use docsync_core::{BindingId, DocumentUri, EditorId};
///
/// let id = BindingId::compose(&EditorId::new("e1"), &DocumentUri::new("file:///a.txt"));
/// assert_eq!(id.as_str(), "e1,file:///a.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(String);

impl BindingId {
    pub fn compose(editor: &EditorId, uri: &DocumentUri) -> Self {
        Self(format!("{editor},{uri}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BindingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One editor paired with the document it currently shows.
///
/// Equality and ordering only look at `(editor_id, document_uri)`; the editor
/// handle rides along so later stages can read presentation state from it.
#[derive(Clone)]
pub struct EditorBinding {
    id: BindingId,
    editor_id: EditorId,
    document_uri: DocumentUri,
    editor: Rc<dyn CodeEditor>,
}

impl EditorBinding {
    pub fn new(editor: Rc<dyn CodeEditor>, document_uri: DocumentUri) -> Self {
        let editor_id = editor.id();
        Self {
            id: BindingId::compose(&editor_id, &document_uri),
            editor_id,
            document_uri,
            editor,
        }
    }

    pub fn id(&self) -> &BindingId {
        &self.id
    }

    pub fn editor_id(&self) -> &EditorId {
        &self.editor_id
    }

    pub fn document_uri(&self) -> &DocumentUri {
        &self.document_uri
    }

    pub fn editor(&self) -> &Rc<dyn CodeEditor> {
        &self.editor
    }

    /// Canonical snapshot order: editor id, then document URI.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.editor_id
            .cmp(&other.editor_id)
            .then_with(|| self.document_uri.cmp(&other.document_uri))
    }
}

impl PartialEq for EditorBinding {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_cmp(other) == Ordering::Equal
    }
}

impl Eq for EditorBinding {}

impl fmt::Debug for EditorBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EditorBinding").field(&self.id.0).finish()
    }
}

/// A selection in 1-based line/column coordinates.
///
/// The anchor is the selection start, the position is where the cursor sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub selection_start_line_number: u32,
    pub selection_start_column: u32,
    pub position_line_number: u32,
    pub position_column: u32,
}

impl Selection {
    /// Empty selection (a caret) at `line`/`column`.
    pub fn caret(line: u32, column: u32) -> Self {
        Self {
            selection_start_line_number: line,
            selection_start_column: column,
            position_line_number: line,
            position_column: column,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selection_start_line_number == self.position_line_number
            && self.selection_start_column == self.position_column
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::caret(1, 1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorStyle {
    #[default]
    Line,
    Block,
    Underline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineNumbersStyle {
    Off,
    #[default]
    On,
    Relative,
}

/// Editor configuration the remote side needs to mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    pub tab_size: u32,
    pub indent_size: u32,
    pub insert_spaces: bool,
    pub cursor_style: CursorStyle,
    pub line_numbers: LineNumbersStyle,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            indent_size: 4,
            insert_spaces: true,
            cursor_style: CursorStyle::default(),
            line_numbers: LineNumbersStyle::default(),
        }
    }
}

/// The widget behind an editor pane.
///
/// A pane either hosts one code editor directly, or a diff view made of two
/// code editors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EditorControl {
    Code { editor: EditorId },
    Diff { original: EditorId, modified: EditorId },
}

impl EditorControl {
    pub fn code(editor: impl Into<EditorId>) -> Self {
        Self::Code {
            editor: editor.into(),
        }
    }

    /// The code editor this control *is*, if it is a plain code editor.
    pub fn code_editor(&self) -> Option<&EditorId> {
        match self {
            Self::Code { editor } => Some(editor),
            Self::Diff { .. } => None,
        }
    }

    /// The code editor that receives edits: the editor itself, or the
    /// modified side of a diff view.
    pub fn editing_editor(&self) -> &EditorId {
        match self {
            Self::Code { editor } => editor,
            Self::Diff { modified, .. } => modified,
        }
    }
}

/// A pane currently shown to the user and the view column it sits in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleEditor {
    pub control: EditorControl,
    pub view_column: u32,
}
