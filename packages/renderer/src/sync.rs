use notedown_parser::NodeTree;
use serde::{Deserialize, Serialize};

/// A position reference into the rendered preview: the fragment-sequence
/// index plus the node identity it belongs to. A plain value, never a
/// pointer back into the document or preview tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewAnchor {
    pub index: usize,
    pub node_id: String,
}

#[derive(Debug, Clone, PartialEq)]
struct SyncEntry {
    start: usize,
    end: usize,
    node_id: String,
}

/// Bidirectional mapping between document byte offsets and preview
/// anchors, rebuilt from the node spans after every parse pass.
///
/// Tie-break: an offset inside a node's range maps to that node; an offset
/// exactly on a boundary maps to the following node (the cursor sits
/// before the next node).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncMap {
    entries: Vec<SyncEntry>,
}

impl SyncMap {
    pub fn build(tree: &NodeTree) -> Self {
        let entries = tree
            .nodes
            .iter()
            .map(|node| {
                let span = node.span();
                SyncEntry {
                    start: span.start,
                    end: span.end,
                    node_id: span.id.clone(),
                }
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map a document byte offset to a preview anchor.
    pub fn source_offset_to_preview(&self, offset: usize) -> Option<PreviewAnchor> {
        for (index, entry) in self.entries.iter().enumerate() {
            if offset < entry.end {
                return Some(PreviewAnchor {
                    index,
                    node_id: entry.node_id.clone(),
                });
            }
        }
        // Past the last node: clamp to it.
        self.entries.last().map(|entry| PreviewAnchor {
            index: self.entries.len() - 1,
            node_id: entry.node_id.clone(),
        })
    }

    /// Map a preview anchor back to a document offset (the start of the
    /// node's source range, for click-to-source navigation).
    pub fn preview_anchor_to_source_offset(&self, anchor: &PreviewAnchor) -> Option<usize> {
        self.entries
            .get(anchor.index)
            .filter(|e| e.node_id == anchor.node_id)
            .map(|e| e.start)
            .or_else(|| {
                // The index went stale; fall back to identity lookup.
                self.entries
                    .iter()
                    .find(|e| e.node_id == anchor.node_id)
                    .map(|e| e.start)
            })
    }

    pub fn anchor_for_node(&self, node_id: &str) -> Option<PreviewAnchor> {
        self.entries
            .iter()
            .position(|e| e.node_id == node_id)
            .map(|index| PreviewAnchor {
                index,
                node_id: node_id.to_string(),
            })
    }

    /// Map an editor scroll fraction (0.0 = top, 1.0 = bottom) to the
    /// nearest preview anchor, for scroll-position linking.
    pub fn scroll_fraction_to_anchor(&self, fraction: f64, doc_len: usize) -> Option<PreviewAnchor> {
        let offset = (fraction.clamp(0.0, 1.0) * doc_len as f64) as usize;
        self.source_offset_to_preview(offset)
    }
}
