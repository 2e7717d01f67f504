//! Print-ready HTML serializer, the input for PDF generation.
//!
//! Same serialization as the HTML exporter with a print stylesheet layered
//! on top. Print output is always a standalone document; a bare fragment
//! cannot be fed to a PDF engine.

use crate::html::render_document;
use crate::{ExportArtifact, ExportError, ExportFormat, ExportOptions};
use notedown_parser::NodeTree;
use notedown_renderer::RenderedFragment;

const PRINT_CSS: &str = "\
@page { size: A4; margin: 2cm; }
@media print {
  body { max-width: none; margin: 0; font-size: 11pt; }
  pre, figure, .unrendered-block { break-inside: avoid; }
  h1, h2, h3 { break-after: avoid; }
  a { color: inherit; text-decoration: none; }
}
";

pub fn export_print_html(
    tree: &NodeTree,
    fragments: &[RenderedFragment],
    options: &ExportOptions,
) -> Result<ExportArtifact, ExportError> {
    let options = ExportOptions {
        standalone: true,
        ..options.clone()
    };
    render_document(
        tree,
        fragments,
        &options,
        Some(PRINT_CSS),
        ExportFormat::PrintHtml,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export;
    use notedown_parser::parse;
    use notedown_renderer::{NullRenderer, RenderPipeline};
    use std::sync::Arc;

    #[test]
    fn test_print_export_is_always_standalone() {
        let source = "# Report\n\nFindings.\n";
        let tree = parse(source);
        let mut pipeline = RenderPipeline::new(Arc::new(NullRenderer));
        let fragments = pipeline.emit(source, &tree);

        let options = ExportOptions {
            standalone: false,
            ..Default::default()
        };
        let artifact = export(ExportFormat::PrintHtml, &tree, &fragments, &options).unwrap();

        assert!(artifact.content.starts_with("<!DOCTYPE html>"));
        assert!(artifact.content.contains("@page"));
        assert!(artifact.content.contains("@media print"));
    }
}
