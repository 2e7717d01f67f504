use crate::ast::Inline;
use crate::tokenizer::{tokenize, InlineToken};
use std::ops::Range;

/// Parse inline markup (emphasis, strong, strikethrough, code spans, links)
/// from the raw text of one block.
pub fn parse_inlines(source: &str) -> Vec<Inline> {
    let tokens = tokenize(source);
    InlineParser::new(source, tokens).parse_until(None)
}

struct InlineParser<'src> {
    source: &'src str,
    tokens: Vec<(InlineToken<'src>, Range<usize>)>,
    pos: usize,
}

impl<'src> InlineParser<'src> {
    fn new(source: &'src str, tokens: Vec<(InlineToken<'src>, Range<usize>)>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&InlineToken<'src>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn span_at(&self, index: usize) -> &Range<usize> {
        &self.tokens[index].1
    }

    /// Index of the next occurrence of `token` at or after `from`.
    fn find_ahead(&self, token: &InlineToken<'src>, from: usize) -> Option<usize> {
        self.tokens[from..]
            .iter()
            .position(|(t, _)| t == token)
            .map(|i| from + i)
    }

    /// Parse until the given delimiter (consumed) or end of input.
    ///
    /// Unpaired delimiters degrade to literal text; inline parsing never
    /// fails.
    fn parse_until(&mut self, stop: Option<&InlineToken<'src>>) -> Vec<Inline> {
        let mut inlines = Vec::new();

        while let Some(token) = self.peek().cloned() {
            if stop == Some(&token) {
                self.advance();
                return inlines;
            }

            match token {
                InlineToken::DoubleStar => {
                    self.styled_run(&token, &mut inlines, |children| Inline::Strong { children });
                }
                InlineToken::Star => {
                    self.styled_run(&token, &mut inlines, |children| Inline::Emphasis {
                        children,
                    });
                }
                InlineToken::DoubleTilde => {
                    self.styled_run(&token, &mut inlines, |children| Inline::Strikethrough {
                        children,
                    });
                }
                InlineToken::Backtick => {
                    if let Some(close) = self.find_ahead(&InlineToken::Backtick, self.pos + 1) {
                        let start = self.span_at(self.pos).end;
                        let end = self.span_at(close).start;
                        inlines.push(Inline::Code {
                            content: self.source[start..end].to_string(),
                        });
                        self.pos = close + 1;
                    } else {
                        push_text(&mut inlines, "`");
                        self.advance();
                    }
                }
                InlineToken::LBracket => {
                    if !self.try_link(&mut inlines) {
                        push_text(&mut inlines, "[");
                        self.advance();
                    }
                }
                other => {
                    push_text(&mut inlines, other.literal());
                    self.advance();
                }
            }
        }

        inlines
    }

    /// Parse a `delim ... delim` styled run, falling back to literal text
    /// when the closing delimiter is missing.
    fn styled_run<F>(&mut self, delim: &InlineToken<'src>, inlines: &mut Vec<Inline>, wrap: F)
    where
        F: FnOnce(Vec<Inline>) -> Inline,
    {
        if self.find_ahead(delim, self.pos + 1).is_some() {
            self.advance();
            let children = self.parse_until(Some(delim));
            inlines.push(wrap(children));
        } else {
            push_text(inlines, delim.literal());
            self.advance();
        }
    }

    /// Try to parse `[text](href)` starting at the current LBracket.
    fn try_link(&mut self, inlines: &mut Vec<Inline>) -> bool {
        let close_bracket = match self.find_ahead(&InlineToken::RBracket, self.pos + 1) {
            Some(i) => i,
            None => return false,
        };
        match self.tokens.get(close_bracket + 1) {
            Some((InlineToken::LParen, _)) => {}
            _ => return false,
        }
        let close_paren = match self.find_ahead(&InlineToken::RParen, close_bracket + 2) {
            Some(i) => i,
            None => return false,
        };

        let text_tokens = self.tokens[self.pos + 1..close_bracket].to_vec();
        let text = InlineParser::new(self.source, text_tokens).parse_until(None);

        let href = if close_bracket + 2 < close_paren {
            let start = self.span_at(close_bracket + 2).start;
            let end = self.span_at(close_paren).start;
            self.source[start..end].to_string()
        } else {
            String::new()
        };

        inlines.push(Inline::Link { text, href });
        self.pos = close_paren + 1;
        true
    }
}

/// Append text, merging with a preceding text run.
fn push_text(inlines: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text { content }) = inlines.last_mut() {
        content.push_str(text);
    } else {
        inlines.push(Inline::Text {
            content: text.to_string(),
        });
    }
}
