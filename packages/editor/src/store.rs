//! Checkpoint snapshot persistence.
//!
//! Snapshots are appended to one JSON-lines log per document identity, so a
//! crashed or closed session can list and restore earlier checkpoints. The
//! log is append-only; nothing in the editing path ever rewrites it.

use crate::history::Snapshot;
use crate::EditorError;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

#[derive(Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, EditorError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn log_path(&self, doc_id: &str) -> PathBuf {
        self.dir.join(format!("{}.history.jsonl", doc_id))
    }

    /// Append one snapshot to the document's log.
    pub fn append(&self, doc_id: &str, snapshot: &Snapshot) -> Result<(), EditorError> {
        let line = serde_json::to_string(snapshot)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(doc_id))?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// All persisted snapshots for a document, oldest first. A document
    /// with no log yet has an empty history.
    pub fn load_all(&self, doc_id: &str) -> Result<Vec<Snapshot>, EditorError> {
        let path = self.log_path(doc_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let mut snapshots = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            snapshots.push(serde_json::from_str(&line)?);
        }
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_append_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();

        let mut doc = Document::from_source("v0");
        let first = Snapshot::capture(&doc, Some("start".to_string()));
        store.append(doc.id(), &first).unwrap();

        doc.apply_edit(2..2, " v1").unwrap();
        let second = Snapshot::capture(&doc, None);
        store.append(doc.id(), &second).unwrap();

        let loaded = store.load_all(doc.id()).unwrap();
        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn test_unknown_document_has_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        assert!(store.load_all("deadbeef").unwrap().is_empty());
    }

    #[test]
    fn test_logs_are_separated_by_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();

        let doc_a = Document::from_source("a");
        let snapshot = Snapshot::capture(&doc_a, None);
        store.append("doc-a", &snapshot).unwrap();

        assert_eq!(store.load_all("doc-a").unwrap().len(), 1);
        assert!(store.load_all("doc-b").unwrap().is_empty());
    }
}
