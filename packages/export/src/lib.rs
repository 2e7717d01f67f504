//! # Notedown Export
//!
//! Serializes a rendered document snapshot (node tree plus preview fragment
//! sequence) into a portable format. Serializers share their inputs
//! immutably, so exports can run while editing continues on a clone.
//!
//! Export always degrades instead of failing: a block that cannot be
//! represented in the target format is emitted as its literal source and
//! reported as a warning on the artifact.

pub mod html;
pub mod print;
pub mod text;

use notedown_parser::NodeTree;
use notedown_renderer::RenderedFragment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No rendered fragment for node {node_id}")]
    MissingFragment { node_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Html,
    PrintHtml,
    PlainText,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html | ExportFormat::PrintHtml => "html",
            ExportFormat::PlainText => "txt",
        }
    }
}

/// Options from the export dialog.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Emit a complete document shell rather than a bare fragment.
    pub standalone: bool,
    /// Embed the default stylesheet in standalone output.
    pub include_css: bool,
    /// Document title; defaults to the first heading's text.
    pub title: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            standalone: true,
            include_css: true,
            title: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// The target format has no representation for this block.
    UnsupportedNodeKind,
    /// The external renderer had not produced output for this block.
    RendererUnavailable,
}

/// Per-node degradation notice attached to the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportWarning {
    pub node_id: String,
    pub kind: WarningKind,
    pub message: String,
}

impl ExportWarning {
    pub fn new(node_id: impl Into<String>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            kind,
            message: message.into(),
        }
    }
}

/// A completed export: the serialized content plus every degradation that
/// occurred while producing it.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub content: String,
    pub warnings: Vec<ExportWarning>,
}

/// Serialize a document snapshot into the requested format.
pub fn export(
    format: ExportFormat,
    tree: &NodeTree,
    fragments: &[RenderedFragment],
    options: &ExportOptions,
) -> Result<ExportArtifact, ExportError> {
    match format {
        ExportFormat::Html => html::export_html(tree, fragments, options),
        ExportFormat::PrintHtml => print::export_print_html(tree, fragments, options),
        ExportFormat::PlainText => text::export_plain_text(tree, fragments),
    }
}

/// The title to use for a standalone document: the explicit option, else
/// the first heading's text, else a fixed fallback.
pub(crate) fn document_title(tree: &NodeTree, options: &ExportOptions) -> String {
    if let Some(title) = &options.title {
        return title.clone();
    }
    tree.nodes
        .iter()
        .find_map(|node| match node {
            notedown_parser::Node::Heading { inlines, .. } => Some(text::inline_text(inlines)),
            _ => None,
        })
        .unwrap_or_else(|| "Untitled note".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notedown_parser::parse;

    #[test]
    fn test_title_falls_back_to_first_heading() {
        let tree = parse("intro\n\n# Actual Title\n\nbody\n");
        let title = document_title(&tree, &ExportOptions::default());
        assert_eq!(title, "Actual Title");
    }

    #[test]
    fn test_explicit_title_wins() {
        let tree = parse("# Heading\n");
        let options = ExportOptions {
            title: Some("Chosen".to_string()),
            ..Default::default()
        };
        assert_eq!(document_title(&tree, &options), "Chosen");
    }

    #[test]
    fn test_headingless_document_gets_fallback_title() {
        let tree = parse("just a paragraph\n");
        assert_eq!(
            document_title(&tree, &ExportOptions::default()),
            "Untitled note"
        );
    }
}
