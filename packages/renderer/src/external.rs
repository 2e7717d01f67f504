use notedown_parser::DiagramKind;
use serde::{Deserialize, Serialize};

/// A render error reported by the external renderer for one block.
/// Per-node and non-fatal: the block renders as an inert placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Markup payload produced by the external renderer (SVG for diagrams,
/// MathML or similar for math).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedMarkup {
    pub markup: String,
}

impl RenderedMarkup {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }
}

/// The external renderer collaborator for diagram and math blocks.
///
/// Contract: a pure function of the input text with no shared mutable
/// state. Cancellation is the caller's job; the scheduler drops stale
/// results rather than interrupting the renderer.
pub trait ExternalRenderer: Send + Sync {
    fn render_diagram(&self, kind: DiagramKind, source: &str) -> Result<RenderedMarkup, Diagnostic>;

    fn render_math(&self, source: &str) -> Result<RenderedMarkup, Diagnostic>;
}

/// Renderer used when no diagram/math backend is configured (headless or
/// CLI use). Every request fails, so blocks keep showing their source.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl ExternalRenderer for NullRenderer {
    fn render_diagram(&self, kind: DiagramKind, _source: &str) -> Result<RenderedMarkup, Diagnostic> {
        Err(Diagnostic::new(format!(
            "no renderer configured for {} diagrams",
            kind.as_str()
        )))
    }

    fn render_math(&self, _source: &str) -> Result<RenderedMarkup, Diagnostic> {
        Err(Diagnostic::new("no math renderer configured"))
    }
}
