use serde::{Deserialize, Serialize};

/// Span information for source location tracking.
///
/// `id` is the node's stable identity: it is assigned once at creation and
/// preserved across incremental re-parses as long as the node's content is
/// unchanged. Render caching and editor↔preview position mapping both key
/// off this identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub id: String,
}

impl Span {
    pub fn new(start: usize, end: usize, id: String) -> Self {
        Self { start, end, id }
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Shift both endpoints by a signed byte delta.
    pub fn shift(&mut self, delta: isize) {
        self.start = (self.start as isize + delta) as usize;
        self.end = (self.end as isize + delta) as usize;
    }
}

/// Diagram dialects recognized by fence info string.
///
/// The payload is opaque text handed verbatim to the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagramKind {
    Mermaid,
    Dot,
    PlantUml,
}

impl DiagramKind {
    /// Match a fence info string against the known diagram dialects.
    pub fn from_info(info: &str) -> Option<Self> {
        match info {
            "mermaid" => Some(DiagramKind::Mermaid),
            "dot" | "graphviz" => Some(DiagramKind::Dot),
            "plantuml" => Some(DiagramKind::PlantUml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::Mermaid => "mermaid",
            DiagramKind::Dot => "dot",
            DiagramKind::PlantUml => "plantuml",
        }
    }
}

/// Top-level block node.
///
/// This is a closed set: every downstream pass (render pipeline, sync map,
/// export serializers) matches on it exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Paragraph {
        inlines: Vec<Inline>,
        span: Span,
    },

    Heading {
        level: u8,
        inlines: Vec<Inline>,
        span: Span,
    },

    List {
        ordered: bool,
        items: Vec<ListItem>,
        span: Span,
    },

    CodeBlock {
        language: Option<String>,
        code: String,
        span: Span,
    },

    DiagramBlock {
        kind: DiagramKind,
        source: String,
        span: Span,
    },

    MathBlock {
        source: String,
        span: Span,
    },
}

impl Node {
    pub fn span(&self) -> &Span {
        match self {
            Node::Paragraph { span, .. }
            | Node::Heading { span, .. }
            | Node::List { span, .. }
            | Node::CodeBlock { span, .. }
            | Node::DiagramBlock { span, .. }
            | Node::MathBlock { span, .. } => span,
        }
    }

    pub fn span_mut(&mut self) -> &mut Span {
        match self {
            Node::Paragraph { span, .. }
            | Node::Heading { span, .. }
            | Node::List { span, .. }
            | Node::CodeBlock { span, .. }
            | Node::DiagramBlock { span, .. }
            | Node::MathBlock { span, .. } => span,
        }
    }

    pub fn id(&self) -> &str {
        &self.span().id
    }

    /// True for block kinds whose payload goes to the external renderer.
    pub fn is_external(&self) -> bool {
        matches!(self, Node::DiagramBlock { .. } | Node::MathBlock { .. })
    }

    /// True for block kinds delimited by fences. Edits touching these force
    /// a full re-parse because the fence pairing is position-dependent.
    pub fn is_fenced(&self) -> bool {
        matches!(
            self,
            Node::CodeBlock { .. } | Node::DiagramBlock { .. } | Node::MathBlock { .. }
        )
    }

    /// Structural equality: same kind, content, and source range, ignoring
    /// node identities. Used to compare an incremental re-parse against a
    /// from-scratch parse.
    pub fn structural_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (
                Node::Paragraph { inlines: a, span: sa },
                Node::Paragraph { inlines: b, span: sb },
            ) => a == b && sa.start == sb.start && sa.end == sb.end,
            (
                Node::Heading { level: la, inlines: a, span: sa },
                Node::Heading { level: lb, inlines: b, span: sb },
            ) => la == lb && a == b && sa.start == sb.start && sa.end == sb.end,
            (
                Node::List { ordered: oa, items: a, span: sa },
                Node::List { ordered: ob, items: b, span: sb },
            ) => {
                oa == ob
                    && a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.structural_eq(y))
                    && sa.start == sb.start
                    && sa.end == sb.end
            }
            (
                Node::CodeBlock { language: la, code: a, span: sa },
                Node::CodeBlock { language: lb, code: b, span: sb },
            ) => la == lb && a == b && sa.start == sb.start && sa.end == sb.end,
            (
                Node::DiagramBlock { kind: ka, source: a, span: sa },
                Node::DiagramBlock { kind: kb, source: b, span: sb },
            ) => ka == kb && a == b && sa.start == sb.start && sa.end == sb.end,
            (
                Node::MathBlock { source: a, span: sa },
                Node::MathBlock { source: b, span: sb },
            ) => a == b && sa.start == sb.start && sa.end == sb.end,
            _ => false,
        }
    }
}

/// One item of a list. `task` is the checkbox state for task-list items
/// (`- [ ]` / `- [x]`), `None` for plain items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub task: Option<bool>,
    pub inlines: Vec<Inline>,
    pub span: Span,
}

impl ListItem {
    pub fn structural_eq(&self, other: &ListItem) -> bool {
        self.task == other.task
            && self.inlines == other.inlines
            && self.span.start == other.span.start
            && self.span.end == other.span.end
    }
}

/// Inline markup within a paragraph, heading, or list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Inline {
    Text { content: String },
    Emphasis { children: Vec<Inline> },
    Strong { children: Vec<Inline> },
    Strikethrough { children: Vec<Inline> },
    Code { content: String },
    Link { text: Vec<Inline>, href: String },
}

/// Ordered sequence of top-level nodes for one document.
///
/// Owned exclusively by the incremental parser; replaced (never mutated in
/// place) on structural change, with unchanged nodes carried over.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeTree {
    pub nodes: Vec<Node>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id())
    }

    pub fn structural_eq(&self, other: &NodeTree) -> bool {
        self.nodes.len() == other.nodes.len()
            && self
                .nodes
                .iter()
                .zip(&other.nodes)
                .all(|(a, b)| a.structural_eq(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains_is_half_open() {
        let span = Span::new(4, 10, "d-1".to_string());
        assert!(!span.contains(3));
        assert!(span.contains(4));
        assert!(span.contains(9));
        assert!(!span.contains(10));
    }

    #[test]
    fn test_diagram_kind_from_info() {
        assert_eq!(DiagramKind::from_info("mermaid"), Some(DiagramKind::Mermaid));
        assert_eq!(DiagramKind::from_info("graphviz"), Some(DiagramKind::Dot));
        assert_eq!(DiagramKind::from_info("rust"), None);
    }

    #[test]
    fn test_structural_eq_ignores_ids() {
        let a = Node::Paragraph {
            inlines: vec![Inline::Text {
                content: "hi".to_string(),
            }],
            span: Span::new(0, 2, "d-1".to_string()),
        };
        let b = Node::Paragraph {
            inlines: vec![Inline::Text {
                content: "hi".to_string(),
            }],
            span: Span::new(0, 2, "d-99".to_string()),
        };
        assert!(a.structural_eq(&b));
        assert_ne!(a, b);
    }
}
