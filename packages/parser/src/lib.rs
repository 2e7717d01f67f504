//! # Notedown Parser
//!
//! Parses note documents (markdown with embedded diagram/math fences) into
//! a tree of top-level nodes with stable identities and source spans.
//!
//! The parser is incremental: after an edit it re-parses only the damaged
//! region, expanded to the nearest blank-line block boundary, and splices
//! the result into the previous tree. Node identities survive re-parses so
//! downstream render caching and position mapping stay warm. Full re-parse
//! is the correctness fallback for anything fence-related.

pub mod ast;
pub mod block;
pub mod error;
pub mod id_generator;
pub mod incremental;
pub mod inline;
pub mod tokenizer;

pub use ast::{DiagramKind, Inline, ListItem, Node, NodeTree, Span};
pub use error::{ParseError, ParseResult};
pub use id_generator::{content_hash, document_id, IdGenerator};
pub use incremental::{ChangedSet, IncrementalParser, TextEdit};

/// Parse a complete document with a fresh identity seed. Convenience for
/// one-shot consumers (export, CLI); interactive editing goes through
/// [`IncrementalParser`].
pub fn parse(source: &str) -> NodeTree {
    let mut ids = IdGenerator::new(None);
    let nodes = block::BlockParser::new(source, 0, &mut ids).parse_blocks();
    NodeTree { nodes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spec_scenario() {
        // "# Title\n\nSome *text*." parses to [Heading(1), Paragraph].
        let tree = parse("# Title\n\nSome *text*.");
        assert_eq!(tree.len(), 2);
        assert!(matches!(tree.nodes[0], Node::Heading { level: 1, .. }));
        assert!(matches!(tree.nodes[1], Node::Paragraph { .. }));
    }
}
