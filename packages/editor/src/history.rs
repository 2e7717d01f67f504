//! # Undo/Redo History
//!
//! Linear edit history built from [`EditDelta`] records.
//!
//! - Every committed edit is recorded with enough information to reverse it
//! - Undo applies the inverse delta and moves the record to the redo stack
//! - Redo reapplies the original delta
//! - A new edit clears the redo stack
//! - Undo and redo are themselves edits: they mint fresh versions instead
//!   of rewinding the version counter
//!
//! Named checkpoint snapshots sit alongside the stacks; they capture the
//! full document text so they stay restorable after the stacks are trimmed.

use crate::document::{Document, EditDelta};
use crate::EditorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("No snapshot recorded for version {version}")]
    UnknownSnapshot { version: u64 },
}

/// Full-content checkpoint of a document at a point in its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub timestamp: DateTime<Utc>,
    pub label: Option<String>,
    pub content: String,
}

impl Snapshot {
    pub fn capture(doc: &Document, label: Option<String>) -> Self {
        Self {
            version: doc.version(),
            timestamp: Utc::now(),
            label,
            content: doc.content().to_string(),
        }
    }
}

/// Undo/redo stacks plus checkpoint snapshots for one document.
#[derive(Debug, Default)]
pub struct HistoryManager {
    undo_stack: Vec<EditDelta>,
    redo_stack: Vec<EditDelta>,
    snapshots: Vec<Snapshot>,
    max_levels: usize,
}

impl HistoryManager {
    /// Default depth of 100 undo levels.
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// `max_levels` of 0 means unlimited.
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            snapshots: Vec::new(),
            max_levels,
        }
    }

    /// Record a freshly committed edit. Any undone edits become
    /// unreachable: the redo stack is cleared.
    pub fn record(&mut self, delta: EditDelta) {
        self.undo_stack.push(delta);
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Reverse the most recent edit. Returns the delta that was applied to
    /// the document (the inverse, stamped with its new version).
    pub fn undo(&mut self, doc: &mut Document) -> Result<EditDelta, EditorError> {
        let delta = self.undo_stack.pop().ok_or(HistoryError::NothingToUndo)?;
        let inverse = delta.inverse();
        let applied = doc.apply_edit(inverse.range(), &inverse.inserted)?;
        self.redo_stack.push(delta);
        Ok(applied)
    }

    /// Reapply the most recently undone edit.
    pub fn redo(&mut self, doc: &mut Document) -> Result<EditDelta, EditorError> {
        let delta = self.redo_stack.pop().ok_or(HistoryError::NothingToRedo)?;
        let applied = doc.apply_edit(delta.range(), &delta.inserted)?;
        // Straight back onto the undo stack; this is not a new edit, so the
        // remaining redo entries stay reachable.
        self.undo_stack.push(delta);
        Ok(applied)
    }

    /// Capture a named checkpoint of the document's current content.
    pub fn take_snapshot(&mut self, doc: &Document, label: Option<String>) -> Snapshot {
        let snapshot = Snapshot::capture(doc, label);
        self.snapshots.push(snapshot.clone());
        snapshot
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn find_snapshot(&self, version: u64) -> Option<&Snapshot> {
        self.snapshots.iter().rev().find(|s| s.version == version)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(
        doc: &mut Document,
        history: &mut HistoryManager,
        range: std::ops::Range<usize>,
        text: &str,
    ) {
        let delta = doc.apply_edit(range, text).unwrap();
        history.record(delta);
    }

    #[test]
    fn test_undo_then_redo_restores_content() {
        let mut doc = Document::from_source("hello world");
        let mut history = HistoryManager::new();

        edit(&mut doc, &mut history, 6..11, "there");
        assert_eq!(doc.content(), "hello there");

        history.undo(&mut doc).unwrap();
        assert_eq!(doc.content(), "hello world");
        assert!(history.can_redo());

        history.redo(&mut doc).unwrap();
        assert_eq!(doc.content(), "hello there");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_mints_new_version() {
        let mut doc = Document::from_source("abc");
        let mut history = HistoryManager::new();

        edit(&mut doc, &mut history, 3..3, "!");
        assert_eq!(doc.version(), 1);

        let applied = history.undo(&mut doc).unwrap();
        assert_eq!(applied.version, 2);
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut doc = Document::from_source("abc");
        let mut history = HistoryManager::new();

        edit(&mut doc, &mut history, 3..3, "1");
        edit(&mut doc, &mut history, 4..4, "2");
        history.undo(&mut doc).unwrap();
        assert_eq!(history.redo_levels(), 1);

        edit(&mut doc, &mut history, 4..4, "3");
        assert_eq!(history.redo_levels(), 0);
        assert!(matches!(
            history.redo(&mut doc).unwrap_err(),
            EditorError::History(HistoryError::NothingToRedo)
        ));
    }

    #[test]
    fn test_undo_on_empty_history_fails() {
        let mut doc = Document::from_source("abc");
        let mut history = HistoryManager::new();

        assert!(matches!(
            history.undo(&mut doc).unwrap_err(),
            EditorError::History(HistoryError::NothingToUndo)
        ));
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = Document::from_source("");
        let mut history = HistoryManager::with_max_levels(2);

        for i in 0..3 {
            edit(&mut doc, &mut history, i..i, "x");
        }
        assert_eq!(history.undo_levels(), 2);
    }

    #[test]
    fn test_snapshot_captures_content_and_version() {
        let mut doc = Document::from_source("draft");
        let mut history = HistoryManager::new();

        edit(&mut doc, &mut history, 5..5, " one");
        let snapshot = history.take_snapshot(&doc, Some("first".to_string()));

        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.content, "draft one");
        assert_eq!(history.find_snapshot(1), Some(&snapshot));
    }
}
