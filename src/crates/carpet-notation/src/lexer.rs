use crate::span::Span;
use carpet_core::{PitchChange, Suffix};
use logos::Logos;

/// Character classes of the notation
///
/// Whitespace is a token of its own: it separates sibling phrases.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    #[token("(")]
    OpenGroup,
    #[token(")")]
    CloseGroup,
    #[token("[")]
    OpenPrimary,
    #[token("]")]
    ClosePrimary,

    #[token("@")]
    Reference,
    #[token("+", |_| PitchChange::Up)]
    #[token("-", |_| PitchChange::Down)]
    #[token("$", |_| PitchChange::Last)]
    Pitch(PitchChange),

    #[token("*")]
    Multiplier,
    #[token("#")]
    Count,
    #[token("?", |_| Suffix::What)]
    #[token("!", |_| Suffix::Not)]
    Suffix(Suffix),

    #[regex(r"[0-9]+")]
    Digits,
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,
    #[regex(r"[^ \t\r\n\f()\[\]@+\-$*#?!0-9]+")]
    Text,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::OpenGroup => write!(f, "("),
            Token::CloseGroup => write!(f, ")"),
            Token::OpenPrimary => write!(f, "["),
            Token::ClosePrimary => write!(f, "]"),
            Token::Reference => write!(f, "@"),
            Token::Pitch(p) => write!(f, "{}", p),
            Token::Multiplier => write!(f, "*"),
            Token::Count => write!(f, "#"),
            Token::Suffix(s) => write!(f, "{}", s),
            Token::Digits => write!(f, "digits"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::Text => write!(f, "text"),
        }
    }
}

/// Lexer over one piece of notation, reporting spans in the coordinates of
/// the enclosing input
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    base: usize,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Lexer::with_offset(source, 0)
    }

    /// Lex `source`, which starts at byte `base` of the original input
    pub fn with_offset(source: &'source str, base: usize) -> Self {
        Lexer {
            inner: Token::lexer(source),
            base,
        }
    }

    pub fn next_token(&mut self) -> Option<(Token, Span)> {
        let token = self.inner.next()?;
        let span = Span::from(self.inner.span()).offset_by(self.base);
        // Every character falls into some class, so errors only come from
        // inputs logos cannot split; treat them as plain text.
        Some((token.unwrap_or(Token::Text), span))
    }

    pub fn source(&self) -> &'source str {
        self.inner.source()
    }

    pub fn base(&self) -> usize {
        self.base
    }

    /// End of this piece in original-input coordinates
    pub fn end(&self) -> usize {
        self.base + self.source().len()
    }

    /// Text under `span`, which must lie inside this piece
    pub fn slice(&self, span: Span) -> &'source str {
        let start = span.start.saturating_sub(self.base);
        let end = span.end.saturating_sub(self.base).min(self.source().len());
        &self.source()[start..end]
    }
}
