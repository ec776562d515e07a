use crate::error::{ParseError, Result};
use crate::lexer::{Lexer, Token};
use crate::span::Span;
use carpet_core::{
    LanguageContext, PhraseChild, PhraseNode, PitchChange, ReferenceLookup, Suffix, TerminalLookup,
};
use serde::{Deserialize, Serialize};

/// Parser settings supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Deepest group nesting accepted before giving up
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { max_depth: 64 }
    }
}

/// True for text that names a lexeme
pub fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphabetic() || c == '\'' || c == '_')
}

/// Parser for Carpet notation
///
/// Holds the two lookups it resolves words and cross-references through.
/// Grouped text is kept verbatim while scanning and re-tokenized once the
/// phrase it belongs to is complete.
pub struct Parser<'a> {
    terminals: &'a dyn TerminalLookup,
    references: &'a dyn ReferenceLookup,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    pub fn new(terminals: &'a dyn TerminalLookup, references: &'a dyn ReferenceLookup) -> Self {
        Parser {
            terminals,
            references,
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parse a complete phrase
    ///
    /// A single top-level phrase is returned as is; several become the
    /// children of a group node. The root is never primary.
    pub fn parse(&self, text: &str, context: &LanguageContext) -> Result<PhraseNode> {
        let mut phrases = self.parse_phrases(text, 0, 0, context)?;
        if phrases.len() > 1 {
            return Ok(PhraseNode::group(
                phrases.into_iter().map(PhraseChild::Owned).collect(),
            ));
        }
        match phrases.pop() {
            Some(mut root) => {
                root.is_primary = false;
                Ok(root)
            }
            None => Err(ParseError::EmptyPhrase {
                span: Span::new(0, text.len()),
            }),
        }
    }

    /// Split `text` into sibling phrases
    ///
    /// `base` is the offset of `text` inside the top-level input and `depth`
    /// the number of groups it sits in.
    fn parse_phrases(
        &self,
        text: &str,
        base: usize,
        depth: usize,
        context: &LanguageContext,
    ) -> Result<Vec<PhraseNode>> {
        if depth > self.options.max_depth {
            return Err(ParseError::DepthLimitExceeded {
                limit: self.options.max_depth,
                span: Span::new(base, base + text.len()),
            });
        }

        let mut lexer = Lexer::with_offset(text, base);
        let mut phrases = Vec::new();
        let mut scan = TokenScan::new(base);

        while let Some((token, span)) = lexer.next_token() {
            if token == Token::Whitespace && !scan.in_segment() {
                if let Some(node) = self.finish(scan, span.start, &lexer, depth, context)? {
                    phrases.push(node);
                }
                scan = TokenScan::new(span.end);
                continue;
            }
            scan.feed(token, span, &lexer)?;
        }
        if let Some(node) = self.finish(scan, lexer.end(), &lexer, depth, context)? {
            phrases.push(node);
        }

        Ok(phrases)
    }

    /// Turn a fully scanned token into a phrase, or drop it when it is empty
    fn finish(
        &self,
        scan: TokenScan,
        end: usize,
        lexer: &Lexer<'_>,
        depth: usize,
        context: &LanguageContext,
    ) -> Result<Option<PhraseNode>> {
        let token_span = Span::new(scan.start, end);
        let token_text = lexer.slice(token_span);

        if let Some(open) = &scan.open {
            let token = token_text.to_string();
            return Err(match open.kind {
                SegmentKind::Group => ParseError::UnclosedGroup {
                    span: open.open_span,
                    token,
                },
                SegmentKind::Primary => ParseError::UnclosedPrimary {
                    span: open.open_span,
                    token,
                },
            });
        }

        let multiplier = match &scan.multiplier {
            Some(modifier) => modifier.value('*', token_text, false)?,
            None => 1,
        };
        let count = match &scan.count {
            Some(modifier) => Some(modifier.value('#', token_text, true)?),
            None => None,
        };

        let body = if scan.reference {
            self.resolve_reference(&scan)?
        } else if let Some(run) = &scan.text {
            Some(self.resolve_word(&run.text, run.span, context)?)
        } else {
            self.resolve_segments(&scan, token_span, depth, context)?
        };

        let Some(mut node) = body else {
            return Ok(None);
        };
        node.pitch_change = scan.pitch_change;
        node.multiplier = multiplier;
        node.count = count;
        node.suffix = scan.suffix;
        node.is_primary = scan.is_primary;

        log::debug!("committed phrase {:?} at {}", token_text, token_span);
        Ok(Some(node))
    }

    fn resolve_word(&self, word: &str, span: Span, context: &LanguageContext) -> Result<PhraseNode> {
        if !is_word(word) {
            return Err(ParseError::InvalidWord {
                word: word.to_string(),
                span,
            });
        }
        self.terminals
            .lookup_terminal(word, &context.language)
            .map(PhraseNode::leaf)
            .map_err(|_| ParseError::UndefinedTerminal {
                word: word.to_string(),
                span,
            })
    }

    fn resolve_reference(&self, scan: &TokenScan) -> Result<Option<PhraseNode>> {
        let (name, span) = match (&scan.text, scan.segments.as_slice()) {
            (Some(run), _) => (run.text.trim().to_string(), run.span),
            (None, [first, ..]) => {
                let joined: Vec<&str> = scan.segments.iter().map(|s| s.text.trim()).collect();
                let last = scan.segments.last().map(|s| s.span()).unwrap_or(first.span());
                (joined.join(" ").trim().to_string(), first.span().join(last))
            }
            (None, []) => return Ok(None),
        };
        if name.is_empty() {
            return Ok(None);
        }

        let shared = self
            .references
            .lookup_reference(&name)
            .map_err(|_| ParseError::UndefinedReference {
                name: name.clone(),
                span,
            })?;
        log::trace!("resolved reference {:?}", name);
        Ok(Some(PhraseNode::group(vec![PhraseChild::Shared(shared)])))
    }

    fn resolve_segments(
        &self,
        scan: &TokenScan,
        token_span: Span,
        depth: usize,
        context: &LanguageContext,
    ) -> Result<Option<PhraseNode>> {
        let filled: Vec<&Segment> = scan
            .segments
            .iter()
            .filter(|segment| !segment.text.trim().is_empty())
            .collect();

        match filled.as_slice() {
            [] => return Ok(None),
            [only] if is_word(only.text.trim()) => {
                let word = only.text.trim();
                let lead = only.text.len() - only.text.trim_start().len();
                let start = only.offset + lead;
                return self
                    .resolve_word(word, Span::new(start, start + word.len()), context)
                    .map(Some);
            }
            _ => {}
        }

        let mut children = Vec::new();
        for segment in filled {
            log::debug!("re-tokenizing {:?} at depth {}", segment.text, depth + 1);
            let nested = self.parse_phrases(&segment.text, segment.offset, depth + 1, context)?;
            children.extend(nested.into_iter().map(PhraseChild::Owned));
        }
        if children.is_empty() {
            return Err(ParseError::EmptyPhrase { span: token_span });
        }
        Ok(Some(PhraseNode::group(children)))
    }
}

/// Convenience function to parse one phrase
pub fn parse(
    text: &str,
    context: &LanguageContext,
    terminals: &dyn TerminalLookup,
    references: &dyn ReferenceLookup,
) -> Result<PhraseNode> {
    Parser::new(terminals, references).parse(text, context)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    Group,
    Primary,
}

/// Verbatim content of one `( )` or `[ ]` pair
#[derive(Debug)]
struct Segment {
    offset: usize,
    text: String,
}

impl Segment {
    fn span(&self) -> Span {
        Span::new(self.offset, self.offset + self.text.len())
    }
}

#[derive(Debug)]
struct OpenSegment {
    kind: SegmentKind,
    open_span: Span,
    /// Parentheses currently open, counting the opener of a group
    depth: usize,
    offset: usize,
    text: String,
}

impl OpenSegment {
    fn close(self) -> Segment {
        Segment {
            offset: self.offset,
            text: self.text,
        }
    }
}

#[derive(Debug)]
struct TextRun {
    span: Span,
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Multiplier,
    Count,
}

#[derive(Debug)]
struct Modifier {
    marker_span: Span,
    digits: String,
}

impl Modifier {
    fn new(marker_span: Span) -> Self {
        Modifier {
            marker_span,
            digits: String::new(),
        }
    }

    fn value(&self, marker: char, token: &str, allow_zero: bool) -> Result<u32> {
        let span = Span::new(
            self.marker_span.start,
            self.marker_span.end + self.digits.len(),
        );
        match self.digits.parse::<u32>() {
            Ok(n) if n > 0 || allow_zero => Ok(n),
            _ => Err(ParseError::InvalidNumber {
                marker,
                value: self.digits.clone(),
                span,
                token: token.to_string(),
            }),
        }
    }
}

/// Raw text of the token that started at `start`, up to and including `upto`
fn raw(lexer: &Lexer<'_>, start: usize, upto: Span) -> String {
    lexer.slice(Span::new(start, upto.end)).to_string()
}

/// State of the token currently being scanned
struct TokenScan {
    start: usize,
    pitch_change: Option<PitchChange>,
    reference: bool,
    is_primary: bool,
    multiplier: Option<Modifier>,
    count: Option<Modifier>,
    active: Option<Marker>,
    suffix: Option<Suffix>,
    text: Option<TextRun>,
    segments: Vec<Segment>,
    open: Option<OpenSegment>,
}

impl TokenScan {
    fn new(start: usize) -> Self {
        TokenScan {
            start,
            pitch_change: None,
            reference: false,
            is_primary: false,
            multiplier: None,
            count: None,
            active: None,
            suffix: None,
            text: None,
            segments: Vec::new(),
            open: None,
        }
    }

    fn in_segment(&self) -> bool {
        self.open.is_some()
    }

    /// Nothing but leading flags seen so far
    fn is_fresh(&self) -> bool {
        self.text.is_none() && self.segments.is_empty() && self.open.is_none()
    }

    fn feed(&mut self, token: Token, span: Span, lexer: &Lexer<'_>) -> Result<()> {
        let start = self.start;
        if let Some(open) = self.open.as_mut() {
            let closes = match (open.kind, token) {
                (_, Token::OpenGroup) => {
                    open.depth += 1;
                    false
                }
                (SegmentKind::Group, Token::CloseGroup) => {
                    open.depth -= 1;
                    open.depth == 0
                }
                (SegmentKind::Primary, Token::CloseGroup) => {
                    if open.depth == 0 {
                        return Err(ParseError::UnopenedGroup {
                            span,
                            token: raw(lexer, start, span),
                        });
                    }
                    open.depth -= 1;
                    false
                }
                (SegmentKind::Primary, Token::OpenPrimary) if open.depth == 0 => {
                    return Err(ParseError::NestedPrimary {
                        span,
                        token: raw(lexer, start, span),
                    });
                }
                (SegmentKind::Primary, Token::ClosePrimary) => open.depth == 0,
                _ => false,
            };
            if closes {
                if let Some(open) = self.open.take() {
                    self.segments.push(open.close());
                }
            } else {
                open.text.push_str(lexer.slice(span));
            }
            return Ok(());
        }

        match token {
            Token::OpenGroup | Token::OpenPrimary => {
                if self.text.is_some() {
                    return Err(ParseError::MisplacedText {
                        span,
                        token: raw(lexer, start, span),
                    });
                }
                let kind = if token == Token::OpenGroup {
                    SegmentKind::Group
                } else {
                    self.is_primary = true;
                    SegmentKind::Primary
                };
                self.open = Some(OpenSegment {
                    kind,
                    open_span: span,
                    depth: usize::from(kind == SegmentKind::Group),
                    offset: span.end,
                    text: String::new(),
                });
                self.active = None;
            }
            Token::CloseGroup => {
                return Err(ParseError::UnopenedGroup {
                    span,
                    token: raw(lexer, start, span),
                });
            }
            Token::ClosePrimary => {
                return Err(ParseError::UnopenedPrimary {
                    span,
                    token: raw(lexer, start, span),
                });
            }
            Token::Pitch(pitch) if self.is_fresh() => {
                if self.pitch_change.is_some() {
                    return Err(ParseError::DuplicatePitchChange {
                        span,
                        token: raw(lexer, start, span),
                    });
                }
                self.pitch_change = Some(pitch);
                self.active = None;
            }
            Token::Reference if self.is_fresh() => {
                if self.reference {
                    return Err(ParseError::DuplicateReferenceMarker {
                        span,
                        token: raw(lexer, start, span),
                    });
                }
                self.reference = true;
                self.active = None;
            }
            Token::Multiplier => {
                if self.multiplier.is_some() {
                    return Err(ParseError::DuplicateMultiplierMarker {
                        span,
                        token: raw(lexer, start, span),
                    });
                }
                self.multiplier = Some(Modifier::new(span));
                self.active = Some(Marker::Multiplier);
            }
            Token::Count => {
                if self.count.is_some() {
                    return Err(ParseError::DuplicateCountMarker {
                        span,
                        token: raw(lexer, start, span),
                    });
                }
                self.count = Some(Modifier::new(span));
                self.active = Some(Marker::Count);
            }
            Token::Suffix(suffix) => {
                if self.suffix.is_some() {
                    return Err(ParseError::DuplicateSuffix {
                        span,
                        token: raw(lexer, start, span),
                    });
                }
                self.suffix = Some(suffix);
                self.active = None;
            }
            Token::Digits if self.active.is_some() => {
                let modifier = match self.active {
                    Some(Marker::Multiplier) => self.multiplier.as_mut(),
                    _ => self.count.as_mut(),
                };
                if let Some(modifier) = modifier {
                    modifier.digits.push_str(lexer.slice(span));
                }
                self.active = None;
            }
            Token::Whitespace => {}
            _ => self.push_text(span, lexer)?,
        }
        Ok(())
    }

    fn push_text(&mut self, span: Span, lexer: &Lexer<'_>) -> Result<()> {
        let start = self.start;
        self.active = None;
        if !self.segments.is_empty() {
            return Err(ParseError::MisplacedText {
                span,
                token: raw(lexer, start, span),
            });
        }
        match self.text.as_mut() {
            None => {
                self.text = Some(TextRun {
                    span,
                    text: lexer.slice(span).to_string(),
                });
            }
            Some(run) if run.span.end == span.start => {
                run.text.push_str(lexer.slice(span));
                run.span = run.span.join(span);
            }
            Some(_) => {
                return Err(ParseError::MisplacedText {
                    span,
                    token: raw(lexer, start, span),
                });
            }
        }
        Ok(())
    }
}
