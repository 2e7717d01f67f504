//! Plain-text serializer.
//!
//! Walks the node tree directly and strips all markup. Diagram and math
//! blocks have no textual rendering, so their literal source is included
//! and a warning recorded; a block whose render never settled is reported
//! as `RendererUnavailable` instead.

use crate::{ExportArtifact, ExportError, ExportFormat, ExportWarning, WarningKind};
use notedown_parser::{Inline, Node, NodeTree};
use notedown_renderer::RenderedFragment;
use std::collections::HashMap;

pub fn export_plain_text(
    tree: &NodeTree,
    fragments: &[RenderedFragment],
) -> Result<ExportArtifact, ExportError> {
    let by_id: HashMap<&str, &RenderedFragment> = fragments
        .iter()
        .map(|f| (f.node_id.as_str(), f))
        .collect();

    let mut warnings = Vec::new();
    let mut blocks = Vec::new();

    for node in &tree.nodes {
        match node {
            Node::Paragraph { inlines, .. } | Node::Heading { inlines, .. } => {
                blocks.push(inline_text(inlines));
            }
            Node::List { ordered, items, .. } => {
                let mut lines = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    let marker = if *ordered {
                        format!("{}. ", i + 1)
                    } else {
                        "- ".to_string()
                    };
                    let task = match item.task {
                        Some(true) => "[x] ",
                        Some(false) => "[ ] ",
                        None => "",
                    };
                    lines.push(format!("{}{}{}", marker, task, inline_text(&item.inlines)));
                }
                blocks.push(lines.join("\n"));
            }
            Node::CodeBlock { code, .. } => {
                blocks.push(code.trim_end().to_string());
            }
            Node::DiagramBlock { source, .. } | Node::MathBlock { source, .. } => {
                let id = node.id();
                let fragment = by_id.get(id).ok_or_else(|| ExportError::MissingFragment {
                    node_id: id.to_string(),
                })?;
                let (kind, message) = if fragment.is_ready() {
                    (
                        WarningKind::UnsupportedNodeKind,
                        "no plain-text rendering; source included",
                    )
                } else {
                    (
                        WarningKind::RendererUnavailable,
                        "render unavailable; source included",
                    )
                };
                warnings.push(ExportWarning::new(id, kind, message));
                blocks.push(source.trim_end().to_string());
            }
        }
    }

    let mut content = blocks.join("\n\n");
    content.push('\n');

    Ok(ExportArtifact {
        format: ExportFormat::PlainText,
        content,
        warnings,
    })
}

/// Flatten inline markup to its text, keeping link targets visible.
pub(crate) fn inline_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text { content } | Inline::Code { content } => out.push_str(content),
            Inline::Emphasis { children }
            | Inline::Strong { children }
            | Inline::Strikethrough { children } => out.push_str(&inline_text(children)),
            Inline::Link { text, href } => {
                out.push_str(&inline_text(text));
                out.push_str(&format!(" ({})", href));
            }
        }
    }
    out
}
