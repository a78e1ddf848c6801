//! Wire payload sent to the remote side.
//!
//! The JSON shape uses camelCase keys. Empty sequences are left out and read
//! back as empty; `newActiveEditor` distinguishes "unchanged" (key absent)
//! from "no active editor" (`null`).

use serde::{Deserialize, Deserializer, Serialize};

use crate::document::{DocumentUri, EndOfLine};
use crate::editor::{BindingId, EditorOptions, Selection};

/// A flattened delta as the remote mirror receives it.
///
/// # Examples
///
/// ```
/// use docsync_core::payload::DocumentsAndEditorsDelta;
///
/// let cleared = DocumentsAndEditorsDelta {
///     new_active_editor: Some(None),
///     ..Default::default()
/// };
/// assert_eq!(serde_json::to_string(&cleared).unwrap(), r#"{"newActiveEditor":null}"#);
///
/// let unchanged = DocumentsAndEditorsDelta::default();
/// assert_eq!(serde_json::to_string(&unchanged).unwrap(), "{}");
/// assert!(unchanged.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsAndEditorsDelta {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub new_active_editor: Option<Option<BindingId>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_documents: Vec<DocumentUri>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_editors: Vec<BindingId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added_documents: Vec<DocumentAddData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added_editors: Vec<EditorAddData>,
}

impl DocumentsAndEditorsDelta {
    pub fn is_empty(&self) -> bool {
        self.new_active_editor.is_none()
            && self.removed_documents.is_empty()
            && self.removed_editors.is_empty()
            && self.added_documents.is_empty()
            && self.added_editors.is_empty()
    }
}

/// A present key maps to `Some`, including `null` (which becomes `Some(None)`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Everything the remote side needs to materialize a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAddData {
    pub uri: DocumentUri,
    pub version_id: i32,
    pub content: String,
    pub eol: EndOfLine,
    pub language_id: String,
    pub is_dirty: bool,
}

/// Everything the remote side needs to materialize an editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorAddData {
    pub id: BindingId,
    pub document_uri: DocumentUri,
    pub options: EditorOptions,
    pub selections: Vec<Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_column_position: Option<u32>,
}

/// Presentation state of a live editor that changed after it was added.
///
/// Unchanged parts are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorPropertiesChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<EditorOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selections: Option<Vec<Selection>>,
}
