//! End-to-end session behavior: edits flowing through the document into
//! the parse tree, preview sequence, sync map, and history.

use notedown_editor::{Document, EditSession, EditorError, HistoryError, SnapshotStore};
use notedown_parser::{DiagramKind, Node};
use notedown_renderer::{
    Diagnostic, ExternalRenderer, FragmentStatus, NullRenderer, RenderedMarkup,
};
use std::sync::Arc;

struct EchoRenderer;

impl ExternalRenderer for EchoRenderer {
    fn render_diagram(&self, _kind: DiagramKind, source: &str) -> Result<RenderedMarkup, Diagnostic> {
        Ok(RenderedMarkup::new(format!("<svg>{}</svg>", source)))
    }

    fn render_math(&self, source: &str) -> Result<RenderedMarkup, Diagnostic> {
        Ok(RenderedMarkup::new(format!("<math>{}</math>", source)))
    }
}

fn session(source: &str) -> EditSession {
    EditSession::new(Document::from_source(source), Arc::new(NullRenderer))
}

#[test]
fn test_edit_produces_new_version_and_fragments() {
    let mut session = session("# Title\n\nSome *text*.");
    assert_eq!(session.tree().len(), 2);

    let outcome = session.apply_edit(21..21, " More.").unwrap();
    assert_eq!(outcome.version, 1);
    assert_eq!(outcome.fragments.len(), 2);
    assert_eq!(session.document().content(), "# Title\n\nSome *text*. More.");
}

#[test]
fn test_single_char_edit_touches_only_its_paragraph() {
    let mut session = session("First paragraph.\n\nSecond paragraph.\n");
    let second_id = session.tree().nodes[1].span().id.clone();

    // Insert one character inside the second paragraph.
    let outcome = session.apply_edit(24..24, "x").unwrap();
    assert_eq!(outcome.changed.modified, vec![second_id]);
    assert!(outcome.changed.added.is_empty());
    assert!(outcome.changed.removed.is_empty());
}

#[test]
fn test_version_strictly_increases_through_undo_redo() {
    let mut session = session("note");
    let v1 = session.apply_edit(4..4, " one").unwrap().version;
    let v2 = session.undo().unwrap().version;
    let v3 = session.redo().unwrap().version;

    assert!(v1 < v2);
    assert!(v2 < v3);
}

#[test]
fn test_undo_redo_restores_bytes_exactly() {
    let original = "# Title\n\nSome *text*.";
    let mut session = session(original);

    session.apply_edit(9..13, "Other").unwrap();
    assert_eq!(session.document().content(), "# Title\n\nOther *text*.");

    session.undo().unwrap();
    assert_eq!(session.document().content(), original);

    session.redo().unwrap();
    assert_eq!(session.document().content(), "# Title\n\nOther *text*.");
}

#[test]
fn test_new_edit_after_undo_discards_redo() {
    let mut session = session("base");
    session.apply_edit(4..4, " one").unwrap();
    session.apply_edit(8..8, " two").unwrap();

    session.undo().unwrap();
    assert_eq!(session.document().content(), "base one");

    // A fresh edit makes the undone branch unreachable.
    session.apply_edit(8..8, " three").unwrap();
    assert!(matches!(
        session.redo().unwrap_err(),
        EditorError::History(HistoryError::NothingToRedo)
    ));
    assert_eq!(session.document().content(), "base one three");
}

#[test]
fn test_rejected_edit_changes_nothing() {
    let mut session = session("short");
    let before_version = session.document().version();

    let err = session.apply_edit(3..99, "x").unwrap_err();
    assert!(matches!(err, EditorError::InvalidRange { .. }));
    assert_eq!(session.document().content(), "short");
    assert_eq!(session.document().version(), before_version);
    assert!(!session.history().can_undo());
}

#[test]
fn test_offset_maps_into_paragraph_anchor() {
    let session = session("# Title\n\nSome *text*.");
    let paragraph_id = session.tree().nodes[1].span().id.clone();

    let anchor = session.preview_anchor(10).unwrap();
    assert_eq!(anchor.node_id, paragraph_id);
    assert_eq!(session.source_offset(&anchor), Some(9));
}

#[test]
fn test_sync_map_follows_edits() {
    let mut session = session("# Title\n\nSome *text*.");
    session.apply_edit(0..0, "Intro paragraph.\n\n").unwrap();

    // The heading is now the second node; offset 0 maps to the new intro.
    let anchor = session.preview_anchor(0).unwrap();
    assert_eq!(anchor.index, 0);
    assert!(matches!(session.tree().nodes[1], Node::Heading { .. }));
}

#[test]
fn test_diagram_renders_asynchronously_and_settles() {
    let source = "```mermaid\ngraph TD;\n```\n";
    let mut session = EditSession::new(Document::from_source(source), Arc::new(EchoRenderer));

    // Without a runtime the render completes inline and is waiting.
    let fragments = session.poll_renders().expect("settled render");
    assert!(fragments[0].is_ready());
}

#[test]
fn test_failed_render_keeps_source_visible() {
    let source = "```mermaid\nflowchart LR\n```\n";
    let mut session = session(source);

    let fragments = session.poll_renders().expect("settled render");
    match &fragments[0].status {
        FragmentStatus::Failed { diagnostic } => {
            assert!(diagnostic.message.contains("no renderer"));
        }
        other => panic!("expected failed fragment, got {:?}", other),
    }
    assert!(fragments[0].body.text_content().contains("flowchart LR"));
}

#[test]
fn test_snapshot_persists_and_restores() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path()).unwrap();
    let doc = Document::from_source("checkpoint me");
    let doc_id = doc.id().to_string();

    let mut session = EditSession::new(doc, Arc::new(NullRenderer)).with_store(store);
    session.apply_edit(13..13, " please").unwrap();
    let snapshot = session.take_snapshot(Some("before rewrite".to_string())).unwrap();

    // Persisted to the per-document log.
    let store = SnapshotStore::new(dir.path()).unwrap();
    let persisted = store.load_all(&doc_id).unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].content, "checkpoint me please");

    // Rewrite everything, then restore the checkpoint as an undoable edit.
    session.apply_edit(0..20, "rewritten").unwrap();
    session.restore_snapshot(snapshot.version).unwrap();
    assert_eq!(session.document().content(), "checkpoint me please");

    session.undo().unwrap();
    assert_eq!(session.document().content(), "rewritten");
}

#[test]
fn test_open_resets_history_and_preview() {
    let mut session = session("first document");
    session.apply_edit(0..0, "x").unwrap();
    assert!(session.history().can_undo());

    session.open(Document::from_source("# Second\n\ndocument"));
    assert!(!session.history().can_undo());
    assert_eq!(session.tree().len(), 2);
    assert_eq!(session.render_state().len(), 2);
}
