//! # Document Handle
//!
//! A Document owns the authoritative source text of one note plus its
//! editing state. Documents are either memory-backed (unsaved, "untitled")
//! or file-backed with disk persistence.
//!
//! Every committed edit produces an [`EditDelta`]: a reversible record of
//! exactly which bytes changed, stamped with the version it produced. The
//! delta is what the history stack stores and what the incremental parser
//! consumes. The parse tree and preview are derived views owned elsewhere;
//! the document never holds references into them.

use crate::EditorError;
use notedown_parser::{content_hash, document_id, TextEdit};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// A committed, reversible edit: `removed` was replaced by `inserted` at
/// byte offset `start`, producing document version `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDelta {
    pub start: usize,
    pub removed: String,
    pub inserted: String,
    pub version: u64,
}

impl EditDelta {
    /// The delta that exactly reverses this one. Its `version` field is a
    /// placeholder; applying it mints a fresh version.
    pub fn inverse(&self) -> EditDelta {
        EditDelta {
            start: self.start,
            removed: self.inserted.clone(),
            inserted: self.removed.clone(),
            version: self.version,
        }
    }

    /// The range this delta replaces when applied.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.removed.len()
    }

    /// Byte-count view of the delta for the incremental parser.
    pub fn text_edit(&self) -> TextEdit {
        TextEdit::new(self.start, self.removed.len(), self.inserted.len())
    }
}

/// Editable note document.
#[derive(Debug)]
pub struct Document {
    path: Option<PathBuf>,
    id: String,
    version: u64,
    last_saved_version: u64,
    content: String,
}

impl Document {
    /// Create an unsaved, memory-backed document.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            path: None,
            id: document_id(None),
            version: 0,
            last_saved_version: 0,
            content: source.into(),
        }
    }

    /// Load a document from disk.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, EditorError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        let id = document_id(path.to_str());
        Ok(Self {
            path: Some(path),
            id,
            version: 0,
            last_saved_version: 0,
            content,
        })
    }

    /// Stable document identity, derived from the file path.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current version. Strictly increases with every committed edit,
    /// including undo and redo.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Owned copy of the full text, for export snapshots that outlive the
    /// borrow on the session.
    pub fn snapshot(&self) -> String {
        self.content.clone()
    }

    /// CRC32 hash of a byte range of the content. None when the range is
    /// out of bounds or off a character boundary.
    pub fn content_hash(&self, range: Range<usize>) -> Option<u32> {
        self.content.get(range).map(content_hash)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether the document has committed edits that are not on disk.
    pub fn is_dirty(&self) -> bool {
        self.version != self.last_saved_version
    }

    /// Replace `range` with `text` and mint a new version.
    ///
    /// The range is validated before any mutation, so a rejected edit
    /// leaves the document byte-identical and the version untouched.
    pub fn apply_edit(&mut self, range: Range<usize>, text: &str) -> Result<EditDelta, EditorError> {
        let len = self.content.len();
        if range.start > range.end || range.end > len {
            return Err(EditorError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }
        for pos in [range.start, range.end] {
            if !self.content.is_char_boundary(pos) {
                return Err(EditorError::NotCharBoundary { pos });
            }
        }

        let removed = self.content[range.clone()].to_string();
        self.content.replace_range(range.clone(), text);
        self.version += 1;

        Ok(EditDelta {
            start: range.start,
            removed,
            inserted: text.to_string(),
            version: self.version,
        })
    }

    /// Write the document to its backing file.
    pub fn save(&mut self) -> Result<(), EditorError> {
        match &self.path {
            Some(path) => {
                std::fs::write(path, &self.content)?;
                self.last_saved_version = self.version;
                Ok(())
            }
            None => Err(EditorError::NotFileBacked),
        }
    }

    /// Write the document to a new path, adopting it (and the identity it
    /// implies) as the backing file.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), EditorError> {
        let path = path.into();
        std::fs::write(&path, &self.content)?;
        self.id = document_id(path.to_str());
        self.path = Some(path);
        self.last_saved_version = self.version;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_edit_replaces_range() {
        let mut doc = Document::from_source("hello world");
        let delta = doc.apply_edit(6..11, "there").unwrap();

        assert_eq!(doc.content(), "hello there");
        assert_eq!(delta.removed, "world");
        assert_eq!(delta.inserted, "there");
        assert_eq!(delta.version, 1);
    }

    #[test]
    fn test_version_strictly_increases() {
        let mut doc = Document::from_source("abc");
        assert_eq!(doc.version(), 0);
        doc.apply_edit(0..0, "x").unwrap();
        doc.apply_edit(0..1, "").unwrap();
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn test_rejected_edit_leaves_document_unchanged() {
        let mut doc = Document::from_source("abc");

        let err = doc.apply_edit(2..9, "x").unwrap_err();
        assert!(matches!(err, EditorError::InvalidRange { len: 3, .. }));
        assert_eq!(doc.content(), "abc");
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_rejects_non_char_boundary() {
        let mut doc = Document::from_source("héllo");

        // Offset 2 lands inside the two-byte 'é'.
        let err = doc.apply_edit(2..3, "x").unwrap_err();
        assert!(matches!(err, EditorError::NotCharBoundary { pos: 2 }));
        assert_eq!(doc.content(), "héllo");
    }

    #[test]
    fn test_content_hash_over_range() {
        let doc = Document::from_source("abcdef");
        assert_eq!(doc.content_hash(0..3), Some(content_hash("abc")));
        assert_eq!(doc.content_hash(0..99), None);
    }

    #[test]
    fn test_delta_inverse_round_trips() {
        let mut doc = Document::from_source("one two three");
        let delta = doc.apply_edit(4..7, "2").unwrap();
        assert_eq!(doc.content(), "one 2 three");

        let inverse = delta.inverse();
        doc.apply_edit(inverse.range(), &inverse.inserted).unwrap();
        assert_eq!(doc.content(), "one two three");
    }

    #[test]
    fn test_dirty_tracking_follows_saved_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, "# Note\n").unwrap();

        let mut doc = Document::load(&path).unwrap();
        assert!(!doc.is_dirty());

        doc.apply_edit(0..0, "x").unwrap();
        assert!(doc.is_dirty());

        doc.save().unwrap();
        assert!(!doc.is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x# Note\n");
    }

    #[test]
    fn test_save_as_adopts_identity() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::from_source("draft");
        let untitled = doc.id().to_string();

        doc.save_as(dir.path().join("draft.md")).unwrap();
        assert_ne!(doc.id(), untitled);
        assert!(!doc.is_dirty());
    }
}
