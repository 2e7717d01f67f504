//! HTML serializer.
//!
//! Ready fragments serialize their preview body directly. Diagram and math
//! fragments whose external render never settled degrade to a literal
//! source block plus a `RendererUnavailable` warning; the export itself
//! always completes.

use crate::{
    document_title, ExportArtifact, ExportError, ExportFormat, ExportOptions, ExportWarning,
    WarningKind,
};
use notedown_parser::NodeTree;
use notedown_renderer::{FragmentKind, FragmentStatus, PreviewNode, RenderedFragment};

/// Stylesheet embedded in standalone exports.
pub(crate) const DEFAULT_CSS: &str = "\
body { font-family: sans-serif; max-width: 46rem; margin: 2rem auto; line-height: 1.5; }
pre { background: #f4f4f4; padding: 0.75rem; overflow-x: auto; }
code { font-family: monospace; }
.task-list-item { list-style: none; }
.unrendered-block { border-left: 3px solid #c0c0c0; }
.render-error { border-left: 3px solid #cc4444; padding-left: 0.5rem; }
.render-error-message { color: #cc4444; }
";

struct Context {
    buffer: String,
    depth: usize,
    indent: &'static str,
}

impl Context {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            depth: 0,
            indent: "  ",
        }
    }

    fn add_line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str(self.indent);
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn into_output(self) -> String {
        self.buffer
    }
}

pub fn export_html(
    tree: &NodeTree,
    fragments: &[RenderedFragment],
    options: &ExportOptions,
) -> Result<ExportArtifact, ExportError> {
    render_document(tree, fragments, options, None, ExportFormat::Html)
}

/// Shared HTML document rendering; the print serializer layers its
/// stylesheet on top via `extra_css`.
pub(crate) fn render_document(
    tree: &NodeTree,
    fragments: &[RenderedFragment],
    options: &ExportOptions,
    extra_css: Option<&str>,
    format: ExportFormat,
) -> Result<ExportArtifact, ExportError> {
    let mut warnings = Vec::new();
    let mut ctx = Context::new();

    if options.standalone {
        ctx.add_line("<!DOCTYPE html>");
        ctx.add_line("<html>");
        ctx.indent();
        write_head(tree, options, extra_css, &mut ctx);
        ctx.add_line("<body>");
        ctx.indent();
    }

    ctx.add_line("<main class=\"notedown-export\">");
    ctx.indent();
    for fragment in fragments {
        write_fragment(fragment, &mut ctx, &mut warnings);
    }
    ctx.dedent();
    ctx.add_line("</main>");

    if options.standalone {
        ctx.dedent();
        ctx.add_line("</body>");
        ctx.dedent();
        ctx.add_line("</html>");
    }

    Ok(ExportArtifact {
        format,
        content: ctx.into_output(),
        warnings,
    })
}

fn write_head(
    tree: &NodeTree,
    options: &ExportOptions,
    extra_css: Option<&str>,
    ctx: &mut Context,
) {
    ctx.add_line("<head>");
    ctx.indent();
    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    ctx.add_line(&format!(
        "<title>{}</title>",
        escape_html(&document_title(tree, options))
    ));

    if options.include_css || extra_css.is_some() {
        ctx.add_line("<style>");
        if options.include_css {
            for line in DEFAULT_CSS.lines() {
                ctx.add_line(line);
            }
        }
        if let Some(css) = extra_css {
            for line in css.lines() {
                ctx.add_line(line);
            }
        }
        ctx.add_line("</style>");
    }

    ctx.dedent();
    ctx.add_line("</head>");
}

fn write_fragment(
    fragment: &RenderedFragment,
    ctx: &mut Context,
    warnings: &mut Vec<ExportWarning>,
) {
    if fragment.kind != FragmentKind::Structural && !fragment.is_ready() {
        let reason = match &fragment.status {
            FragmentStatus::Failed { diagnostic } => diagnostic.message.clone(),
            _ => "render still pending".to_string(),
        };
        warnings.push(ExportWarning::new(
            &fragment.node_id,
            WarningKind::RendererUnavailable,
            format!("exported as literal source: {}", reason),
        ));
        let source = fragment.source.as_deref().unwrap_or_default();
        ctx.add_line(&format!(
            "<pre class=\"unrendered-block\"><code>{}</code></pre>",
            escape_html(source)
        ));
        return;
    }

    // Each fragment body serializes onto one line; newlines injected into
    // a <pre> would change its content.
    ctx.add_line(&node_markup(&fragment.body));
}

/// Serialize one preview node and its children, escaping text and passing
/// externally rendered markup through verbatim.
fn node_markup(node: &PreviewNode) -> String {
    match node {
        PreviewNode::Text { content } => escape_html(content),
        PreviewNode::Raw { markup } => markup.clone(),
        PreviewNode::Element {
            tag,
            attributes,
            children,
        } => {
            let mut out = format!("<{}", tag);
            for (name, value) in attributes {
                if value.is_empty() {
                    out.push_str(&format!(" {}", name));
                } else {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                }
            }
            if children.is_empty() && is_void(tag) {
                out.push('>');
                return out;
            }
            out.push('>');
            for child in children {
                out.push_str(&node_markup(child));
            }
            out.push_str(&format!("</{}>", tag));
            out
        }
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "input" | "br" | "hr" | "img" | "meta" | "link")
}
