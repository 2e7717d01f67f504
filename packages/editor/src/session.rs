//! # Edit Session
//!
//! One open document with all of its derived state: the incremental parse
//! tree, the preview fragment sequence, the source/preview sync map, and
//! the undo/redo history. The session is the seam the application edits
//! through; every mutation flows document first, derived views second, so
//! the source text is always the single authority.

use crate::document::{Document, EditDelta};
use crate::history::{HistoryError, HistoryManager, Snapshot};
use crate::store::SnapshotStore;
use crate::EditorError;
use notedown_parser::{ChangedSet, IncrementalParser, NodeTree};
use notedown_renderer::{
    ExternalRenderer, PreviewAnchor, RenderPipeline, RenderedFragment, SyncMap,
};
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// What one committed edit produced: the new version, the node identities
/// it touched, and the full preview sequence to display.
#[derive(Debug)]
pub struct EditOutcome {
    pub version: u64,
    pub changed: ChangedSet,
    pub fragments: Vec<RenderedFragment>,
}

pub struct EditSession {
    document: Document,
    parser: IncrementalParser,
    pipeline: RenderPipeline,
    sync: SyncMap,
    history: HistoryManager,
    store: Option<SnapshotStore>,
}

impl EditSession {
    /// Start a session for a document, parsing and rendering it in full.
    pub fn new(document: Document, renderer: Arc<dyn ExternalRenderer>) -> Self {
        let mut parser = IncrementalParser::new(document.id());
        let changed = parser.parse_full(document.content());

        let mut pipeline = RenderPipeline::new(renderer);
        pipeline.render_pass(document.content(), parser.tree(), &changed);
        let sync = SyncMap::build(parser.tree());

        Self {
            document,
            parser,
            pipeline,
            sync,
            history: HistoryManager::new(),
            store: None,
        }
    }

    /// Attach a persistent snapshot store for checkpoint history.
    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the open document. Derived state for the old document is
    /// dropped; history does not carry across documents.
    pub fn open(&mut self, document: Document) {
        debug!(doc_id = document.id(), "opening document");
        self.parser = IncrementalParser::new(document.id());
        let changed = self.parser.parse_full(document.content());

        self.pipeline.invalidate_all();
        self.pipeline
            .render_pass(document.content(), self.parser.tree(), &changed);
        self.sync = SyncMap::build(self.parser.tree());
        self.history.clear();
        self.document = document;
    }

    /// Commit an edit: mutate the document, record it for undo, re-parse
    /// incrementally, and refresh the preview and sync map.
    pub fn apply_edit(&mut self, range: Range<usize>, text: &str) -> Result<EditOutcome, EditorError> {
        let delta = self.document.apply_edit(range, text)?;
        self.history.record(delta.clone());
        self.refresh_derived(&delta)
    }

    /// Reverse the most recent edit. The reversal is a fresh edit with its
    /// own version; derived views update the same way as for typing.
    pub fn undo(&mut self) -> Result<EditOutcome, EditorError> {
        let applied = self.history.undo(&mut self.document)?;
        self.refresh_derived(&applied)
    }

    /// Reapply the most recently undone edit.
    pub fn redo(&mut self) -> Result<EditOutcome, EditorError> {
        let applied = self.history.redo(&mut self.document)?;
        self.refresh_derived(&applied)
    }

    fn refresh_derived(&mut self, delta: &EditDelta) -> Result<EditOutcome, EditorError> {
        let changed = self
            .parser
            .reparse_edit(self.document.content(), &delta.text_edit())?;
        debug!(
            version = delta.version,
            touched = changed.len(),
            "edit committed"
        );

        let fragments =
            self.pipeline
                .render_pass(self.document.content(), self.parser.tree(), &changed);
        self.sync = SyncMap::build(self.parser.tree());

        Ok(EditOutcome {
            version: self.document.version(),
            changed,
            fragments,
        })
    }

    /// Fold in any settled external render results. Returns the refreshed
    /// sequence when something landed, None when nothing was pending.
    pub fn poll_renders(&mut self) -> Option<Vec<RenderedFragment>> {
        if self.pipeline.poll_completed() == 0 {
            return None;
        }
        Some(
            self.pipeline
                .emit(self.document.content(), self.parser.tree()),
        )
    }

    /// Capture a checkpoint snapshot, persisting it when a store is
    /// attached.
    pub fn take_snapshot(&mut self, label: Option<String>) -> Result<Snapshot, EditorError> {
        let snapshot = self.history.take_snapshot(&self.document, label);
        if let Some(store) = &self.store {
            store.append(self.document.id(), &snapshot)?;
        }
        Ok(snapshot)
    }

    /// Restore a checkpoint as a new, undoable edit over the whole text.
    pub fn restore_snapshot(&mut self, version: u64) -> Result<EditOutcome, EditorError> {
        let content = self
            .history
            .find_snapshot(version)
            .map(|s| s.content.clone())
            .ok_or(HistoryError::UnknownSnapshot { version })?;
        self.apply_edit(0..self.document.len(), &content)
    }

    /// Current full preview sequence, for export or a fresh view.
    pub fn render_state(&mut self) -> Vec<RenderedFragment> {
        self.pipeline
            .emit(self.document.content(), self.parser.tree())
    }

    /// Map a source byte offset to its preview anchor.
    pub fn preview_anchor(&self, offset: usize) -> Option<PreviewAnchor> {
        self.sync.source_offset_to_preview(offset)
    }

    /// Map a preview anchor back to a source offset.
    pub fn source_offset(&self, anchor: &PreviewAnchor) -> Option<usize> {
        self.sync.preview_anchor_to_source_offset(anchor)
    }

    pub fn save(&mut self) -> Result<(), EditorError> {
        self.document.save()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tree(&self) -> &NodeTree {
        self.parser.tree()
    }

    pub fn sync(&self) -> &SyncMap {
        &self.sync
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }
}
