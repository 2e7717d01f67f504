use crate::fragment::{FragmentStatus, RenderedFragment};
use std::collections::HashMap;

/// Fragment cache keyed by node identity and validated by content hash.
///
/// A lookup only hits when the stored fragment was rendered for exactly the
/// content the node has now; anything else is a miss and the stale entry is
/// replaced on the next insert.
#[derive(Debug, Default)]
pub struct FragmentCache {
    entries: HashMap<String, RenderedFragment>,
}

impl FragmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node_id: &str, content_hash: u32) -> Option<&RenderedFragment> {
        self.entries
            .get(node_id)
            .filter(|f| f.content_hash == content_hash)
    }

    pub fn insert(&mut self, fragment: RenderedFragment) {
        self.entries.insert(fragment.node_id.clone(), fragment);
    }

    pub fn remove(&mut self, node_id: &str) {
        self.entries.remove(node_id);
    }

    /// Upgrade a Pending entry to its settled status, but only if the entry
    /// still describes the same content. Stale completions (the node was
    /// re-edited while the render was in flight) are refused.
    pub fn settle(
        &mut self,
        node_id: &str,
        content_hash: u32,
        status: FragmentStatus,
        body: crate::fragment::PreviewNode,
    ) -> bool {
        match self.entries.get_mut(node_id) {
            Some(entry) if entry.content_hash == content_hash => {
                entry.status = status;
                entry.body = body;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
