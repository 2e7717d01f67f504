use crate::cache::FragmentCache;
use crate::external::ExternalRenderer;
use crate::fragment::{FragmentKind, FragmentStatus, PreviewNode, RenderedFragment};
use crate::scheduler::{RenderJob, RenderScheduler};
use notedown_parser::{content_hash, ChangedSet, DiagramKind, Inline, Node, NodeTree};
use std::sync::Arc;
use tracing::debug;

/// Turns the node tree into the ordered preview fragment sequence.
///
/// Structural nodes render synchronously from their fields. Diagram and
/// math nodes enter the sequence as Pending placeholders while the external
/// render runs; [`RenderPipeline::poll_completed`] settles them. Unchanged
/// nodes are served from the cache, so a pass over a mostly-unchanged
/// document is cheap while the consumer still receives one full, consistent
/// sequence.
pub struct RenderPipeline {
    cache: FragmentCache,
    scheduler: RenderScheduler,
}

impl RenderPipeline {
    pub fn new(renderer: Arc<dyn ExternalRenderer>) -> Self {
        Self {
            cache: FragmentCache::new(),
            scheduler: RenderScheduler::new(renderer),
        }
    }

    /// Render a full pass for the current tree. `changed` is the parse
    /// pass's changed-set; removed nodes are evicted before rendering.
    pub fn render_pass(
        &mut self,
        source: &str,
        tree: &NodeTree,
        changed: &ChangedSet,
    ) -> Vec<RenderedFragment> {
        for id in &changed.removed {
            self.cache.remove(id);
            self.scheduler.forget(id);
        }

        tree.nodes
            .iter()
            .map(|node| self.fragment_for(source, node))
            .collect()
    }

    /// Re-emit the sequence for an unchanged tree (after completions have
    /// settled, or for an export snapshot).
    pub fn emit(&mut self, source: &str, tree: &NodeTree) -> Vec<RenderedFragment> {
        self.render_pass(source, tree, &ChangedSet::default())
    }

    /// Apply settled external render results to the cache, dropping stale
    /// ones. Returns how many fragments were updated.
    pub fn poll_completed(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.scheduler.try_recv() {
            if !self
                .scheduler
                .is_current(&completion.node_id, completion.generation)
            {
                debug!(node_id = %completion.node_id, "dropping superseded render result");
                continue;
            }

            let kind = match &completion.job {
                RenderJob::Diagram { .. } => FragmentKind::Diagram,
                RenderJob::Math { .. } => FragmentKind::Math,
            };
            let (status, body) = match completion.result {
                Ok(markup) => (
                    FragmentStatus::Ready,
                    rendered_body(kind, &completion.job, &markup.markup),
                ),
                Err(diagnostic) => {
                    let body = failed_body(&completion.job, &diagnostic.message);
                    (FragmentStatus::Failed { diagnostic }, body)
                }
            };

            if self
                .cache
                .settle(&completion.node_id, completion.content_hash, status, body)
            {
                applied += 1;
            } else {
                debug!(node_id = %completion.node_id, "dropping render result for superseded content");
            }
        }
        applied
    }

    /// Drop all cached fragments and in-flight bookkeeping. Used when the
    /// active document identity changes.
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
        self.scheduler.clear();
    }

    fn fragment_for(&mut self, source: &str, node: &Node) -> RenderedFragment {
        let span = node.span();
        let hash = content_hash(&source[span.start..span.end]);
        if let Some(cached) = self.cache.get(&span.id, hash) {
            return cached.clone();
        }

        let fragment = match node {
            Node::DiagramBlock { kind, source: payload, .. } => {
                self.scheduler.request(
                    &span.id,
                    hash,
                    RenderJob::Diagram {
                        kind: *kind,
                        source: payload.clone(),
                    },
                );
                RenderedFragment {
                    node_id: span.id.clone(),
                    content_hash: hash,
                    kind: FragmentKind::Diagram,
                    status: FragmentStatus::Pending,
                    body: source_placeholder(Some(kind.as_str()), payload),
                    source: Some(payload.clone()),
                }
            }
            Node::MathBlock { source: payload, .. } => {
                self.scheduler.request(
                    &span.id,
                    hash,
                    RenderJob::Math {
                        source: payload.clone(),
                    },
                );
                RenderedFragment {
                    node_id: span.id.clone(),
                    content_hash: hash,
                    kind: FragmentKind::Math,
                    status: FragmentStatus::Pending,
                    body: source_placeholder(Some("math"), payload),
                    source: Some(payload.clone()),
                }
            }
            structural => RenderedFragment {
                node_id: span.id.clone(),
                content_hash: hash,
                kind: FragmentKind::Structural,
                status: FragmentStatus::Ready,
                body: render_structural(structural),
                source: None,
            },
        };

        self.cache.insert(fragment.clone());
        fragment
    }
}

/// Deterministic rendering for the structural node kinds.
fn render_structural(node: &Node) -> PreviewNode {
    match node {
        Node::Paragraph { inlines, .. } => {
            PreviewNode::element("p").with_children(render_inlines(inlines))
        }
        Node::Heading { level, inlines, .. } => {
            PreviewNode::element(format!("h{}", level)).with_children(render_inlines(inlines))
        }
        Node::List { ordered, items, .. } => {
            let tag = if *ordered { "ol" } else { "ul" };
            let mut list = PreviewNode::element(tag);
            for item in items {
                let mut li = PreviewNode::element("li");
                if let Some(checked) = item.task {
                    li = li.with_attr("class", "task-list-item");
                    let mut checkbox = PreviewNode::element("input")
                        .with_attr("type", "checkbox")
                        .with_attr("disabled", "");
                    if checked {
                        checkbox = checkbox.with_attr("checked", "");
                    }
                    li = li.with_child(checkbox);
                }
                list = list.with_child(li.with_children(render_inlines(&item.inlines)));
            }
            list
        }
        Node::CodeBlock { language, code, .. } => {
            let mut code_el = PreviewNode::element("code");
            if let Some(lang) = language {
                code_el = code_el.with_attr("class", format!("language-{}", lang));
            }
            PreviewNode::element("pre").with_child(code_el.with_child(PreviewNode::text(code)))
        }
        // Externally rendered kinds never reach here via fragment_for, but
        // their placeholder form keeps the match exhaustive.
        Node::DiagramBlock { kind, source, .. } => {
            source_placeholder(Some(kind.as_str()), source)
        }
        Node::MathBlock { source, .. } => source_placeholder(Some("math"), source),
    }
}

fn render_inlines(inlines: &[Inline]) -> Vec<PreviewNode> {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text { content } => PreviewNode::text(content),
            Inline::Emphasis { children } => {
                PreviewNode::element("em").with_children(render_inlines(children))
            }
            Inline::Strong { children } => {
                PreviewNode::element("strong").with_children(render_inlines(children))
            }
            Inline::Strikethrough { children } => {
                PreviewNode::element("del").with_children(render_inlines(children))
            }
            Inline::Code { content } => {
                PreviewNode::element("code").with_child(PreviewNode::text(content))
            }
            Inline::Link { text, href } => PreviewNode::element("a")
                .with_attr("href", href)
                .with_children(render_inlines(text)),
        })
        .collect()
}

/// Inert representation of an unrendered diagram/math block: the original
/// source, shown verbatim.
fn source_placeholder(kind: Option<&str>, source: &str) -> PreviewNode {
    let mut code = PreviewNode::element("code");
    if let Some(kind) = kind {
        code = code.with_attr("class", format!("language-{}", kind));
    }
    PreviewNode::element("pre")
        .with_attr("class", "unrendered-block")
        .with_child(code.with_child(PreviewNode::text(source)))
}

fn rendered_body(kind: FragmentKind, job: &RenderJob, markup: &str) -> PreviewNode {
    match (kind, job) {
        (FragmentKind::Diagram, RenderJob::Diagram { kind, .. }) => {
            PreviewNode::element("figure")
                .with_attr("class", format!("diagram diagram-{}", kind.as_str()))
                .with_child(PreviewNode::raw(markup))
        }
        _ => PreviewNode::element("div")
            .with_attr("class", "math-block")
            .with_child(PreviewNode::raw(markup)),
    }
}

fn failed_body(job: &RenderJob, message: &str) -> PreviewNode {
    let kind = match job {
        RenderJob::Diagram { kind, .. } => Some(kind.as_str()),
        RenderJob::Math { .. } => Some("math"),
    };
    PreviewNode::element("div")
        .with_attr("class", "render-error")
        .with_child(
            PreviewNode::element("p")
                .with_attr("class", "render-error-message")
                .with_child(PreviewNode::text(message)),
        )
        .with_child(source_placeholder(kind, job.source()))
}
