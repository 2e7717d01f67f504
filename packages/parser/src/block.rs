use crate::ast::{DiagramKind, ListItem, Node, Span};
use crate::id_generator::IdGenerator;
use crate::inline::parse_inlines;

/// One physical line of the region being parsed. Offsets are local to the
/// region; the block parser adds its base offset when building spans.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'src> {
    pub text: &'src str,
    pub start: usize,
    pub end: usize, // exclusive, without the trailing newline
}

pub(crate) fn scan_lines(source: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, b) in source.bytes().enumerate() {
        if b == b'\n' {
            lines.push(Line {
                text: &source[start..i],
                start,
                end: i,
            });
            start = i + 1;
        }
    }
    if start < source.len() {
        lines.push(Line {
            text: &source[start..],
            start,
            end: source.len(),
        });
    }
    lines
}

pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Fence delimiters are position-dependent: a line that looks like one
/// forces the incremental parser onto the full re-parse path.
pub(crate) fn is_fence_line(text: &str) -> bool {
    let t = text.trim_start();
    t.starts_with("```") || t.starts_with("~~~") || t.starts_with("$$")
}

pub(crate) fn heading_level(text: &str) -> Option<(u8, &str)> {
    let hashes = text.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    match text.as_bytes().get(hashes) {
        Some(b' ') => Some((hashes as u8, text[hashes + 1..].trim())),
        None => Some((hashes as u8, "")),
        _ => None,
    }
}

/// Returns (ordered, byte offset of the item content) for a list-item line.
pub(crate) fn list_marker(text: &str) -> Option<(bool, usize)> {
    let trimmed = text.trim_start();
    let indent = text.len() - trimmed.len();

    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("+ "))
    {
        return Some((false, text.len() - rest.len()));
    }

    let digits = trimmed.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 {
        let after = &trimmed[digits..];
        if let Some(rest) = after.strip_prefix(". ").or_else(|| after.strip_prefix(") ")) {
            return Some((true, indent + digits + (after.len() - rest.len())));
        }
    }

    None
}

fn starts_new_block(text: &str) -> bool {
    heading_level(text).is_some() || is_fence_line(text) || list_marker(text).is_some()
}

/// Line-oriented block parser. Parses a region of the document (the whole
/// document, or the damaged region during an incremental re-parse) into
/// top-level nodes with absolute spans.
pub struct BlockParser<'src, 'id> {
    source: &'src str,
    base: usize,
    lines: Vec<Line<'src>>,
    pos: usize,
    ids: &'id mut IdGenerator,
}

impl<'src, 'id> BlockParser<'src, 'id> {
    pub fn new(source: &'src str, base: usize, ids: &'id mut IdGenerator) -> Self {
        let lines = scan_lines(source);
        Self {
            source,
            base,
            lines,
            pos: 0,
            ids,
        }
    }

    pub fn parse_blocks(mut self) -> Vec<Node> {
        let mut nodes = Vec::new();

        while self.pos < self.lines.len() {
            if is_blank(self.lines[self.pos].text) {
                self.pos += 1;
                continue;
            }

            let line = self.lines[self.pos];
            let node = if heading_level(line.text).is_some() {
                self.parse_heading()
            } else if line.text.trim_start().starts_with("```")
                || line.text.trim_start().starts_with("~~~")
            {
                self.parse_fenced()
            } else if line.text.trim() == "$$" {
                self.parse_dollar_math()
            } else if list_marker(line.text).is_some() {
                self.parse_list()
            } else {
                self.parse_paragraph()
            };
            nodes.push(node);
        }

        nodes
    }

    fn span(&mut self, start: usize, end: usize) -> Span {
        Span::new(self.base + start, self.base + end, self.ids.new_id())
    }

    fn parse_heading(&mut self) -> Node {
        let line = self.lines[self.pos];
        self.pos += 1;
        let (level, rest) = heading_level(line.text).unwrap_or((1, line.text));
        Node::Heading {
            level,
            inlines: parse_inlines(rest),
            span: self.span(line.start, line.end),
        }
    }

    fn parse_fenced(&mut self) -> Node {
        let open = self.lines[self.pos];
        let trimmed = open.text.trim_start();
        let marker = trimmed.as_bytes()[0];
        let fence_len = trimmed.bytes().take_while(|b| *b == marker).count();
        let info = trimmed[fence_len..].trim().to_string();
        self.pos += 1;

        let content_start = self.pos;
        let mut close_line = None;
        while self.pos < self.lines.len() {
            let t = self.lines[self.pos].text.trim_start();
            let run = t.bytes().take_while(|b| *b == marker).count();
            if run >= fence_len && t[run..].trim().is_empty() {
                close_line = Some(self.pos);
                self.pos += 1;
                break;
            }
            self.pos += 1;
        }

        // Unterminated fence runs to end of input.
        let content_end = close_line.unwrap_or(self.lines.len());
        let content = if content_start < content_end {
            let s = self.lines[content_start].start;
            let e = self.lines[content_end - 1].end;
            self.source[s..e].to_string()
        } else {
            String::new()
        };

        let end = match close_line {
            Some(i) => self.lines[i].end,
            None => self.lines.last().map(|l| l.end).unwrap_or(open.end),
        };
        let span = self.span(open.start, end);

        let info_word = info.split_whitespace().next().unwrap_or("");
        if let Some(kind) = DiagramKind::from_info(info_word) {
            Node::DiagramBlock {
                kind,
                source: content,
                span,
            }
        } else if matches!(info_word, "math" | "katex" | "latex") {
            Node::MathBlock {
                source: content,
                span,
            }
        } else {
            Node::CodeBlock {
                language: if info_word.is_empty() {
                    None
                } else {
                    Some(info_word.to_string())
                },
                code: content,
                span,
            }
        }
    }

    fn parse_dollar_math(&mut self) -> Node {
        let open = self.lines[self.pos];
        self.pos += 1;

        let content_start = self.pos;
        let mut close_line = None;
        while self.pos < self.lines.len() {
            if self.lines[self.pos].text.trim() == "$$" {
                close_line = Some(self.pos);
                self.pos += 1;
                break;
            }
            self.pos += 1;
        }

        let content_end = close_line.unwrap_or(self.lines.len());
        let content = if content_start < content_end {
            let s = self.lines[content_start].start;
            let e = self.lines[content_end - 1].end;
            self.source[s..e].to_string()
        } else {
            String::new()
        };

        let end = match close_line {
            Some(i) => self.lines[i].end,
            None => self.lines.last().map(|l| l.end).unwrap_or(open.end),
        };

        Node::MathBlock {
            source: content,
            span: self.span(open.start, end),
        }
    }

    fn parse_list(&mut self) -> Node {
        let first = self.lines[self.pos];
        let (ordered, _) = list_marker(first.text).expect("caller checked list marker");

        let mut items = Vec::new();
        let mut last_end = first.end;

        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            let marker = match list_marker(line.text) {
                Some((o, offset)) if o == ordered => offset,
                _ => break,
            };

            let content = &line.text[marker..];
            let (task, content) = match content.split_at_checked(4) {
                Some(("[ ] ", rest)) => (Some(false), rest),
                Some(("[x] ", rest)) | Some(("[X] ", rest)) => (Some(true), rest),
                _ => (None, content),
            };

            let span = self.span(line.start, line.end);
            items.push(ListItem {
                task,
                inlines: parse_inlines(content),
                span,
            });
            last_end = line.end;
            self.pos += 1;
        }

        Node::List {
            ordered,
            items,
            span: self.span(first.start, last_end),
        }
    }

    fn parse_paragraph(&mut self) -> Node {
        let first = self.lines[self.pos];
        let mut last_end = first.end;
        self.pos += 1;

        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if is_blank(line.text) || starts_new_block(line.text) {
                break;
            }
            last_end = line.end;
            self.pos += 1;
        }

        let text = &self.source[first.start..last_end];
        Node::Paragraph {
            inlines: parse_inlines(text),
            span: self.span(first.start, last_end),
        }
    }
}
