//! # Notedown Editor
//!
//! Editing state for note documents: the authoritative source text, the
//! reversible edit history with checkpoint snapshots, and the live session
//! that keeps the parse tree, preview, and sync map in step with every
//! keystroke.

pub mod document;
pub mod errors;
pub mod history;
pub mod session;
pub mod store;

pub use document::{Document, EditDelta};
pub use errors::EditorError;
pub use history::{HistoryError, HistoryManager, Snapshot};
pub use session::{EditOutcome, EditSession};
pub use store::SnapshotStore;
