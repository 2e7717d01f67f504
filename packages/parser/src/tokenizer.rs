use logos::Logos;
use std::ops::Range;

/// Token types for inline markup.
///
/// Block structure is decided line-by-line before inline parsing, so this
/// lexer only distinguishes the span delimiters; everything else is text.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum InlineToken<'src> {
    #[token("**")]
    DoubleStar,

    #[token("*")]
    Star,

    #[token("~~")]
    DoubleTilde,

    #[token("~")]
    Tilde,

    #[token("`")]
    Backtick,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[regex(r"[^*~`\[\]()]+", |lex| lex.slice())]
    Text(&'src str),
}

impl<'src> InlineToken<'src> {
    /// The literal source text a delimiter token stands for, used when a
    /// delimiter turns out to be unpaired and must fall back to plain text.
    pub fn literal(&self) -> &'src str {
        match self {
            InlineToken::DoubleStar => "**",
            InlineToken::Star => "*",
            InlineToken::DoubleTilde => "~~",
            InlineToken::Tilde => "~",
            InlineToken::Backtick => "`",
            InlineToken::LBracket => "[",
            InlineToken::RBracket => "]",
            InlineToken::LParen => "(",
            InlineToken::RParen => ")",
            InlineToken::Text(s) => s,
        }
    }
}

/// Tokenize inline source into a vector of (token, span) pairs.
///
/// Lexer errors are folded back into text tokens so tokenization is total:
/// every byte of the input is covered by exactly one token.
pub fn tokenize(source: &str) -> Vec<(InlineToken<'_>, Range<usize>)> {
    let mut lexer = InlineToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => tokens.push((InlineToken::Text(&source[span.clone()]), span)),
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_plain_text() {
        let tokens = tokenize("hello world");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].0, InlineToken::Text("hello world"));
    }

    #[test]
    fn test_tokenize_delimiters() {
        let tokens = tokenize("a **b** `c`");
        let kinds: Vec<_> = tokens.iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                InlineToken::Text("a "),
                InlineToken::DoubleStar,
                InlineToken::Text("b"),
                InlineToken::DoubleStar,
                InlineToken::Text(" "),
                InlineToken::Backtick,
                InlineToken::Text("c"),
                InlineToken::Backtick,
            ]
        );
    }

    #[test]
    fn test_tokenize_covers_every_byte() {
        let source = "*em* ~~strike~~ [link](url) plain";
        let tokens = tokenize(source);
        let mut pos = 0;
        for (_, span) in &tokens {
            assert_eq!(span.start, pos);
            pos = span.end;
        }
        assert_eq!(pos, source.len());
    }
}
