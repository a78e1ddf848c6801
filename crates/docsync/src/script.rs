//! Host commands replayed against a [`MemoryHost`].
//!
//! Each command is one JSON object tagged by `command`:
//!
//! ```json
//! {"command":"open_document","uri":"file:///a.txt","content":"hello"}
//! {"command":"create_editor","id":"e1"}
//! {"command":"set_editor_document","id":"e1","uri":"file:///a.txt"}
//! {"command":"focus_editor","id":"e1"}
//! ```

use serde::{Deserialize, Serialize};

use docsync_core::{
    DocumentUri, EditorControl, EditorId, EditorOptions, Selection, VisibleEditor,
};

use crate::error::Result;
use crate::host::{MemoryEditor, MemoryHost};

/// A single host mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum HostCommand {
    OpenDocument {
        uri: DocumentUri,
        #[serde(default)]
        content: String,
        #[serde(default = "default_language_id")]
        language_id: String,
    },
    CloseDocument {
        uri: DocumentUri,
    },
    SetDirty {
        uri: DocumentUri,
        dirty: bool,
    },
    CreateEditor {
        id: EditorId,
        #[serde(default)]
        simple_widget: bool,
    },
    RemoveEditor {
        id: EditorId,
    },
    SetEditorDocument {
        id: EditorId,
        #[serde(default)]
        uri: Option<DocumentUri>,
    },
    FocusEditor {
        id: EditorId,
    },
    BlurEditor {
        id: EditorId,
    },
    SetActiveEditor {
        #[serde(default)]
        control: Option<EditorControl>,
    },
    SetVisibleEditors {
        editors: Vec<VisibleEditor>,
    },
    SetSelections {
        id: EditorId,
        selections: Vec<Selection>,
    },
    SetOptions {
        id: EditorId,
        options: EditorOptions,
    },
}

fn default_language_id() -> String {
    "plaintext".to_string()
}

impl HostCommand {
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn apply(&self, host: &MemoryHost) -> Result<()> {
        match self {
            Self::OpenDocument {
                uri,
                content,
                language_id,
            } => {
                host.open_document(uri.clone(), content, language_id)?;
            }
            Self::CloseDocument { uri } => host.close_document(uri)?,
            Self::SetDirty { uri, dirty } => host.set_dirty(uri, *dirty),
            Self::CreateEditor { id, simple_widget } => {
                let editor = if *simple_widget {
                    MemoryEditor::simple_widget(id.clone())
                } else {
                    MemoryEditor::new(id.clone())
                };
                host.add_editor(editor)?;
            }
            Self::RemoveEditor { id } => host.remove_editor(id)?,
            Self::SetEditorDocument { id, uri } => {
                host.require_editor(id)?.set_document(uri.clone());
            }
            Self::FocusEditor { id } => host.focus_editor(id)?,
            Self::BlurEditor { id } => host.require_editor(id)?.blur(),
            Self::SetActiveEditor { control } => host.set_active_editor(control.clone()),
            Self::SetVisibleEditors { editors } => host.set_visible_editors(editors.clone()),
            Self::SetSelections { id, selections } => {
                host.require_editor(id)?.set_selections(selections.clone());
            }
            Self::SetOptions { id, options } => host.require_editor(id)?.set_options(*options),
        }
        Ok(())
    }
}
