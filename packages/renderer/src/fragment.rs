use crate::external::Diagnostic;
use serde::{Deserialize, Serialize};

/// One element of the preview representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PreviewNode {
    /// Styled markup element
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<PreviewNode>,
    },

    /// Text content
    Text { content: String },

    /// Opaque markup produced by the external renderer (SVG, MathML)
    Raw { markup: String },
}

impl PreviewNode {
    pub fn element(tag: impl Into<String>) -> Self {
        PreviewNode::Element {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        PreviewNode::Text {
            content: content.into(),
        }
    }

    pub fn raw(markup: impl Into<String>) -> Self {
        PreviewNode::Raw {
            markup: markup.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let PreviewNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.push((key.into(), value.into()));
        }
        self
    }

    pub fn with_child(mut self, child: PreviewNode) -> Self {
        if let PreviewNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<PreviewNode>) -> Self {
        if let PreviewNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    /// Concatenated text content of this subtree. Raw markup contributes
    /// nothing.
    pub fn text_content(&self) -> String {
        match self {
            PreviewNode::Text { content } => content.clone(),
            PreviewNode::Raw { .. } => String::new(),
            PreviewNode::Element { children, .. } => {
                children.iter().map(|c| c.text_content()).collect()
            }
        }
    }
}

/// Where a fragment's content came from; export serializers treat
/// externally rendered fragments differently from structural ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FragmentKind {
    Structural,
    Diagram,
    Math,
}

/// Render status of one fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum FragmentStatus {
    /// Rendered and current.
    Ready,
    /// External render in flight; the body shows the literal source.
    Pending,
    /// External renderer reported a diagnostic; the body shows the literal
    /// source plus the message, inert.
    Failed { diagnostic: Diagnostic },
}

/// The preview representation of one node, cached by (node id, content
/// hash). The pipeline emits the full ordered fragment sequence on every
/// pass, so the preview surface always sees one consistent document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedFragment {
    pub node_id: String,
    pub content_hash: u32,
    pub kind: FragmentKind,
    pub status: FragmentStatus,
    pub body: PreviewNode,
    /// Original block source for diagram/math fragments; export falls back
    /// to this when the rendered payload is unavailable or unrepresentable.
    pub source: Option<String>,
}

impl RenderedFragment {
    pub fn is_ready(&self) -> bool {
        matches!(self.status, FragmentStatus::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chains() {
        let node = PreviewNode::element("p")
            .with_attr("class", "para")
            .with_child(PreviewNode::text("hi"));

        match &node {
            PreviewNode::Element {
                tag,
                attributes,
                children,
            } => {
                assert_eq!(tag, "p");
                assert_eq!(attributes.len(), 1);
                assert_eq!(children.len(), 1);
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_text_content_skips_raw_markup() {
        let node = PreviewNode::element("div")
            .with_child(PreviewNode::text("a"))
            .with_child(PreviewNode::raw("<svg/>"))
            .with_child(PreviewNode::element("em").with_child(PreviewNode::text("b")));
        assert_eq!(node.text_content(), "ab");
    }
}
