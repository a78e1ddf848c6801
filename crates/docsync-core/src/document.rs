//! Document identity and the document value tracked by snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Canonical URI string of a document.
///
/// Ordering and equality are plain string comparison, which is the order
/// snapshots keep their documents in.
///
/// # Examples
///
/// ```
/// use docsync_core::DocumentUri;
///
/// let a = DocumentUri::new("file:///a.txt");
/// let b = DocumentUri::new("file:///b.txt");
/// assert!(a < b);
/// assert_eq!(a.as_str(), "file:///a.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentUri(String);

impl DocumentUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Registry key for this URI.
    ///
    /// With `ignore_case` set, URIs that differ only in letter case map to the
    /// same key, matching hosts running on case-insensitive file systems.
    pub fn identity_key(&self, ignore_case: bool) -> String {
        if ignore_case {
            self.0.to_lowercase()
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// End-of-line sequence used by a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndOfLine {
    #[default]
    #[serde(rename = "\n")]
    Lf,
    #[serde(rename = "\r\n")]
    CrLf,
}

impl EndOfLine {
    /// Detects the sequence from the first line break in `content`.
    pub fn detect(content: &str) -> Self {
        match content.find('\n') {
            Some(idx) if idx > 0 && content.as_bytes()[idx - 1] == b'\r' => Self::CrLf,
            _ => Self::Lf,
        }
    }
}

/// A text document as seen by the host at one instant.
///
/// Documents are owned by the host; this is a cheap value copy of the parts
/// the synchronization layer forwards. Content is shared behind an `Rc`, so
/// cloning a document for every snapshot does not copy the text.
///
/// # Examples
///
/// ```
/// use docsync_core::{DocumentUri, TextDocument};
///
/// let doc = TextDocument::new(DocumentUri::new("file:///a.rs"), 1, "fn main() {}", "rust");
/// assert_eq!(doc.len(), 12);
/// assert_eq!(doc.language_id, "rust");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub uri: DocumentUri,
    pub version: i32,
    pub content: Rc<str>,
    pub language_id: String,
    pub eol: EndOfLine,
}

impl TextDocument {
    pub fn new(
        uri: DocumentUri,
        version: i32,
        content: impl Into<Rc<str>>,
        language_id: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let eol = EndOfLine::detect(&content);
        Self {
            uri,
            version,
            content,
            language_id: language_id.into(),
            eol,
        }
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
