use crate::ast::{Node, NodeTree};
use crate::block::{is_blank, is_fence_line, scan_lines, BlockParser};
use crate::error::{ParseError, ParseResult};
use crate::id_generator::{content_hash, IdGenerator};
use std::collections::{HashMap, VecDeque};

/// A committed text edit, expressed in byte counts against the document the
/// edit was applied to: `removed` bytes at `start` were replaced by
/// `inserted` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl TextEdit {
    pub fn new(start: usize, removed: usize, inserted: usize) -> Self {
        Self {
            start,
            removed,
            inserted,
        }
    }

    /// Signed byte growth of the document.
    pub fn delta(&self) -> isize {
        self.inserted as isize - self.removed as isize
    }
}

/// Node identities touched by the most recent parse pass. Drives fragment
/// cache invalidation and sync-map rebuilds downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangedSet {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
}

impl ChangedSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Total number of touched identities.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.added.iter().any(|i| i == id)
            || self.removed.iter().any(|i| i == id)
            || self.modified.iter().any(|i| i == id)
    }
}

/// Incremental parser owning the current node tree for one document.
///
/// Each edit re-parses only the damaged region, expanded outward to the
/// nearest blank-line block boundary. A full re-parse is the correctness
/// fallback whenever fences are involved: the expanded region contains a
/// fence line, or overlaps a fenced node, or a node straddles the region
/// boundary.
#[derive(Debug, Clone)]
pub struct IncrementalParser {
    ids: IdGenerator,
    tree: NodeTree,
    /// Content hash of each live node at its last parse.
    hashes: HashMap<String, u32>,
}

impl IncrementalParser {
    pub fn new(document_id: &str) -> Self {
        Self {
            ids: IdGenerator::from_seed(document_id),
            tree: NodeTree::new(),
            hashes: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Content hash recorded for a live node.
    pub fn node_hash(&self, id: &str) -> Option<u32> {
        self.hashes.get(id).copied()
    }

    /// Parse the whole document from scratch, preserving identities of
    /// nodes whose content is unchanged.
    pub fn parse_full(&mut self, source: &str) -> ChangedSet {
        let new_nodes = BlockParser::new(source, 0, &mut self.ids).parse_blocks();
        let old_nodes = std::mem::take(&mut self.tree.nodes);
        let (nodes, changed) = self.reconcile(old_nodes, new_nodes, source);
        self.tree = NodeTree { nodes };
        self.rebuild_hashes(source);
        changed
    }

    /// Re-parse after an edit. `source` is the post-edit document text.
    pub fn reparse_edit(&mut self, source: &str, edit: &TextEdit) -> ParseResult<ChangedSet> {
        let edit_end = edit.start + edit.inserted;
        if edit_end > source.len() {
            return Err(ParseError::edit_out_of_bounds(
                edit.start,
                edit.removed,
                source.len(),
            ));
        }
        if !source.is_char_boundary(edit.start) {
            return Err(ParseError::not_char_boundary(edit.start));
        }
        if !source.is_char_boundary(edit_end) {
            return Err(ParseError::not_char_boundary(edit_end));
        }

        if self.tree.is_empty() {
            return Ok(self.parse_full(source));
        }

        match self.try_splice(source, edit) {
            Some(changed) => Ok(changed),
            None => Ok(self.parse_full(source)),
        }
    }

    /// The incremental path. Returns None when the edit cannot be isolated
    /// unambiguously, which sends the caller to the full re-parse fallback.
    fn try_splice(&mut self, source: &str, edit: &TextEdit) -> Option<ChangedSet> {
        let delta = edit.delta();
        let (region_start, region_end) = damage_region(source, edit);

        // Fence delimiters inside the damaged region are position-dependent.
        if scan_lines(&source[region_start..region_end])
            .iter()
            .any(|l| is_fence_line(l.text))
        {
            return None;
        }

        // Map the region back to pre-edit coordinates. Bytes before the edit
        // are untouched; bytes after it are shifted by the edit's delta.
        let region_start_old = region_start;
        let region_end_old = usize::try_from(region_end as isize - delta).ok()?;

        // Partition indices: [0, prefix_end) untouched before the region,
        // [prefix_end, suffix_start) inside it, [suffix_start, ..) after.
        let nodes = &self.tree.nodes;
        let mut prefix_end = 0;
        while prefix_end < nodes.len() && nodes[prefix_end].span().end <= region_start_old {
            prefix_end += 1;
        }
        let mut suffix_start = prefix_end;
        while suffix_start < nodes.len() && nodes[suffix_start].span().start < region_end_old {
            let node = &nodes[suffix_start];
            let span = node.span();
            // Fenced content may contain blank lines, so blank-line
            // expansion is not a safe boundary around or inside it. A node
            // straddling the region boundary means the boundary itself is
            // ambiguous.
            if node.is_fenced() || span.start < region_start_old || span.end > region_end_old {
                return None;
            }
            suffix_start += 1;
        }

        let mut old_nodes = std::mem::take(&mut self.tree.nodes);
        let suffix = old_nodes.split_off(suffix_start);
        let middle = old_nodes.split_off(prefix_end);
        let prefix = old_nodes;

        let region_nodes =
            BlockParser::new(&source[region_start..region_end], region_start, &mut self.ids)
                .parse_blocks();

        let (mut spliced, changed) = self.reconcile(middle, region_nodes, source);

        let mut nodes = prefix;
        nodes.append(&mut spliced);
        for mut node in suffix {
            node.span_mut().shift(delta);
            for item_span in node_item_spans(&mut node) {
                item_span.shift(delta);
            }
            nodes.push(node);
        }
        self.tree = NodeTree { nodes };
        self.rebuild_hashes(source);

        Some(changed)
    }

    /// Carry identities from `old` over to `new`: nodes with identical
    /// content keep their id and are excluded from the changed-set; nodes
    /// pairing up positionally with the same kind keep their id and are
    /// reported modified; everything else is added/removed.
    fn reconcile(
        &mut self,
        old: Vec<Node>,
        mut new: Vec<Node>,
        source: &str,
    ) -> (Vec<Node>, ChangedSet) {
        let mut changed = ChangedSet::default();

        // Pool of old identities keyed by last-parse content hash.
        let mut by_hash: HashMap<u32, VecDeque<usize>> = HashMap::new();
        for (i, node) in old.iter().enumerate() {
            if let Some(h) = self.hashes.get(node.id()) {
                by_hash.entry(*h).or_default().push_back(i);
            }
        }

        let mut consumed = vec![false; old.len()];
        let mut matched = vec![false; new.len()];

        for (j, node) in new.iter_mut().enumerate() {
            let span = node.span();
            let h = content_hash(&source[span.start..span.end]);
            if let Some(queue) = by_hash.get_mut(&h) {
                while let Some(i) = queue.pop_front() {
                    if !consumed[i] {
                        node.span_mut().id = old[i].id().to_string();
                        consumed[i] = true;
                        matched[j] = true;
                        break;
                    }
                }
            }
        }

        // Pair the remainder in document order: same kind means the node
        // was edited in place and keeps its identity.
        let leftovers_old: Vec<usize> = (0..old.len()).filter(|i| !consumed[*i]).collect();
        let leftovers_new: Vec<usize> = (0..new.len()).filter(|j| !matched[*j]).collect();

        let pairs = leftovers_old.len().min(leftovers_new.len());
        for k in 0..pairs {
            let i = leftovers_old[k];
            let j = leftovers_new[k];
            if same_kind(&old[i], &new[j]) {
                new[j].span_mut().id = old[i].id().to_string();
                changed.modified.push(old[i].id().to_string());
            } else {
                changed.removed.push(old[i].id().to_string());
                changed.added.push(new[j].id().to_string());
            }
        }
        for &i in &leftovers_old[pairs..] {
            changed.removed.push(old[i].id().to_string());
        }
        for &j in &leftovers_new[pairs..] {
            changed.added.push(new[j].id().to_string());
        }

        (new, changed)
    }

    fn rebuild_hashes(&mut self, source: &str) {
        self.hashes.clear();
        for node in &self.tree.nodes {
            let span = node.span();
            self.hashes
                .insert(span.id.clone(), content_hash(&source[span.start..span.end]));
        }
    }
}

fn same_kind(a: &Node, b: &Node) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Mutable spans of a node's list items, so suffix shifting moves them
/// along with the node's own span.
fn node_item_spans(node: &mut Node) -> Vec<&mut crate::ast::Span> {
    match node {
        Node::List { items, .. } => items.iter_mut().map(|i| &mut i.span).collect(),
        _ => Vec::new(),
    }
}

/// Expand the edit to the smallest blank-line-delimited region of the
/// post-edit source that fully contains it.
fn damage_region(source: &str, edit: &TextEdit) -> (usize, usize) {
    if source.is_empty() {
        return (0, 0);
    }
    let lines = scan_lines(source);

    // Last line starting at or before the edit.
    let locate = |offset: usize| -> usize {
        match lines.iter().rposition(|l| l.start <= offset) {
            Some(i) => i,
            None => 0,
        }
    };

    let mut start_line = locate(edit.start);
    while start_line > 0 && !is_blank(lines[start_line - 1].text) {
        start_line -= 1;
    }

    let mut end_line = locate(edit.start + edit.inserted);
    while end_line + 1 < lines.len() && !is_blank(lines[end_line + 1].text) {
        end_line += 1;
    }

    (lines[start_line].start, lines[end_line].end)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Apply `edit` to `before`, returning the post-edit source.
    fn apply(before: &str, edit: &TextEdit, inserted: &str) -> String {
        assert_eq!(inserted.len(), edit.inserted);
        let mut s = String::with_capacity(before.len());
        s.push_str(&before[..edit.start]);
        s.push_str(inserted);
        s.push_str(&before[edit.start + edit.removed..]);
        s
    }

    fn full_parse(source: &str) -> NodeTree {
        let mut p = IncrementalParser::new("fresh");
        p.parse_full(source);
        p.tree().clone()
    }

    #[test]
    fn test_initial_parse_reports_all_added() {
        let mut p = IncrementalParser::new("doc");
        let changed = p.parse_full("# Title\n\nSome *text*.\n");
        assert_eq!(changed.added.len(), 2);
        assert!(changed.removed.is_empty());
        assert!(changed.modified.is_empty());
    }

    #[test]
    fn test_single_char_edit_touches_only_one_paragraph() {
        let before = "# Title\n\nfirst paragraph\n\nsecond paragraph\n";
        let mut p = IncrementalParser::new("doc");
        p.parse_full(before);
        let first_para_id = p.tree().nodes[1].id().to_string();
        let other_ids: Vec<String> = [0, 2].iter().map(|&i| p.tree().nodes[i].id().to_string()).collect();

        // Insert one character inside "first paragraph".
        let edit = TextEdit::new(14, 0, 1);
        let after = apply(before, &edit, "X");
        let changed = p.reparse_edit(&after, &edit).unwrap();

        assert_eq!(changed.modified, vec![first_para_id.clone()]);
        assert!(changed.added.is_empty());
        assert!(changed.removed.is_empty());

        // Untouched nodes keep their identities.
        assert_eq!(p.tree().nodes[0].id(), other_ids[0]);
        assert_eq!(p.tree().nodes[2].id(), other_ids[1]);
    }

    #[test]
    fn test_incremental_matches_full_parse() {
        let before = "# Title\n\nalpha beta\n\n- one\n- two\n\ntail paragraph\n";
        let mut p = IncrementalParser::new("doc");
        p.parse_full(before);

        let edit = TextEdit::new(11, 4, 5);
        let after = apply(before, &edit, "gamma");
        p.reparse_edit(&after, &edit).unwrap();

        assert!(p.tree().structural_eq(&full_parse(&after)));
    }

    #[test]
    fn test_paragraph_split_by_blank_line() {
        let before = "one two three\n\ntail\n";
        let mut p = IncrementalParser::new("doc");
        p.parse_full(before);
        assert_eq!(p.tree().len(), 2);

        // Split the first paragraph in two.
        let edit = TextEdit::new(3, 1, 2);
        let after = apply(before, &edit, "\n\n");
        let changed = p.reparse_edit(&after, &edit).unwrap();

        assert_eq!(p.tree().len(), 3);
        assert!(p.tree().structural_eq(&full_parse(&after)));
        // One in-place edit plus one new block.
        assert_eq!(changed.modified.len(), 1);
        assert_eq!(changed.added.len(), 1);
    }

    #[test]
    fn test_paragraph_merge_by_deleting_blank_line() {
        let before = "one\n\ntwo\n";
        let mut p = IncrementalParser::new("doc");
        p.parse_full(before);

        let edit = TextEdit::new(3, 2, 0);
        let after = apply(before, &edit, "");
        p.reparse_edit(&after, &edit).unwrap();

        assert_eq!(p.tree().len(), 1);
        assert!(p.tree().structural_eq(&full_parse(&after)));
    }

    #[test]
    fn test_edit_inside_code_block_falls_back_to_full() {
        let before = "intro\n\n```rust\nlet a = 1;\n\nlet b = 2;\n```\n";
        let mut p = IncrementalParser::new("doc");
        p.parse_full(before);
        let code_id = p.tree().nodes[1].id().to_string();

        // Insert inside the code payload (which contains a blank line).
        let edit = TextEdit::new(20, 0, 1);
        let after = apply(before, &edit, "x");
        let changed = p.reparse_edit(&after, &edit).unwrap();

        assert!(p.tree().structural_eq(&full_parse(&after)));
        // Kind is unchanged, so identity survives the fallback too.
        assert_eq!(changed.modified, vec![code_id]);
    }

    #[test]
    fn test_inserting_a_fence_falls_back_and_stays_consistent() {
        let before = "text before\n\nplain words\n";
        let mut p = IncrementalParser::new("doc");
        p.parse_full(before);

        let edit = TextEdit::new(13, 0, 4);
        let after = apply(before, &edit, "```\n");
        p.reparse_edit(&after, &edit).unwrap();

        assert!(p.tree().structural_eq(&full_parse(&after)));
    }

    #[test]
    fn test_unchanged_content_keeps_identity_across_full_reparse() {
        let source = "# Title\n\nbody text\n";
        let mut p = IncrementalParser::new("doc");
        p.parse_full(source);
        let ids: Vec<String> = p.tree().node_ids().map(String::from).collect();

        let changed = p.parse_full(source);
        assert!(changed.is_empty());
        let ids_after: Vec<String> = p.tree().node_ids().map(String::from).collect();
        assert_eq!(ids, ids_after);
    }

    #[test]
    fn test_edit_out_of_bounds_is_rejected() {
        let mut p = IncrementalParser::new("doc");
        p.parse_full("short\n");
        let edit = TextEdit::new(100, 0, 5);
        let err = p.reparse_edit("short\n", &edit).unwrap_err();
        assert!(matches!(err, ParseError::EditOutOfBounds { .. }));
    }

    #[test]
    fn test_append_at_end_of_document() {
        let before = "# Title\n\npara\n";
        let mut p = IncrementalParser::new("doc");
        p.parse_full(before);

        let edit = TextEdit::new(before.len(), 0, 6);
        let after = apply(before, &edit, "\nmore\n");
        p.reparse_edit(&after, &edit).unwrap();

        assert!(p.tree().structural_eq(&full_parse(&after)));
    }
}
