//! Error types for the editor

use crate::history::HistoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] notedown_parser::ParseError),

    #[error("Edit range {start}..{end} is invalid for document of length {len}")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Edit boundary at {pos} is not a character boundary")]
    NotCharBoundary { pos: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Snapshot store error: {0}")]
    Store(#[from] serde_json::Error),

    #[error("Document is not file-backed")]
    NotFileBacked,
}
