use crate::span::Span;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Every way a notation string can be rejected
///
/// Spans point into the text given to the top-level parse, and `token` is
/// the raw text of the phrase being scanned when the error was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unopened ')' at {span} in '{token}'")]
    UnopenedGroup { span: Span, token: String },

    #[error("unopened ']' at {span} in '{token}'")]
    UnopenedPrimary { span: Span, token: String },

    #[error("unclosed '(' opened at {span} in '{token}'")]
    UnclosedGroup { span: Span, token: String },

    #[error("unclosed '[' opened at {span} in '{token}'")]
    UnclosedPrimary { span: Span, token: String },

    #[error("nested primary subphrase at {span} in '{token}'")]
    NestedPrimary { span: Span, token: String },

    #[error("multiple tone changes at {span} in '{token}'")]
    DuplicatePitchChange { span: Span, token: String },

    #[error("multiple suffixes at {span} in '{token}' (use parentheses)")]
    DuplicateSuffix { span: Span, token: String },

    #[error("repeated '*' at {span} in '{token}'")]
    DuplicateMultiplierMarker { span: Span, token: String },

    #[error("repeated '#' at {span} in '{token}'")]
    DuplicateCountMarker { span: Span, token: String },

    #[error("repeated '@' at {span} in '{token}'")]
    DuplicateReferenceMarker { span: Span, token: String },

    #[error("invalid number '{value}' after '{marker}' at {span} in '{token}'")]
    InvalidNumber {
        marker: char,
        value: String,
        span: Span,
        token: String,
    },

    #[error("'{word}' at {span} is not a word")]
    InvalidWord { word: String, span: Span },

    #[error("text next to a group at {span} in '{token}'")]
    MisplacedText { span: Span, token: String },

    #[error("undefined lexeme '{word}' at {span}")]
    UndefinedTerminal { word: String, span: Span },

    #[error("undefined reference '{name}' at {span}")]
    UndefinedReference { name: String, span: Span },

    #[error("empty phrase at {span}")]
    EmptyPhrase { span: Span },

    #[error("phrase nested deeper than {limit} levels at {span}")]
    DepthLimitExceeded { limit: usize, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnopenedGroup { span, .. }
            | ParseError::UnopenedPrimary { span, .. }
            | ParseError::UnclosedGroup { span, .. }
            | ParseError::UnclosedPrimary { span, .. }
            | ParseError::NestedPrimary { span, .. }
            | ParseError::DuplicatePitchChange { span, .. }
            | ParseError::DuplicateSuffix { span, .. }
            | ParseError::DuplicateMultiplierMarker { span, .. }
            | ParseError::DuplicateCountMarker { span, .. }
            | ParseError::DuplicateReferenceMarker { span, .. }
            | ParseError::InvalidNumber { span, .. }
            | ParseError::InvalidWord { span, .. }
            | ParseError::MisplacedText { span, .. }
            | ParseError::UndefinedTerminal { span, .. }
            | ParseError::UndefinedReference { span, .. }
            | ParseError::EmptyPhrase { span }
            | ParseError::DepthLimitExceeded { span, .. } => *span,
        }
    }

    /// Raw token text, for the variants raised while scanning a token
    pub fn token(&self) -> Option<&str> {
        match self {
            ParseError::UnopenedGroup { token, .. }
            | ParseError::UnopenedPrimary { token, .. }
            | ParseError::UnclosedGroup { token, .. }
            | ParseError::UnclosedPrimary { token, .. }
            | ParseError::NestedPrimary { token, .. }
            | ParseError::DuplicatePitchChange { token, .. }
            | ParseError::DuplicateSuffix { token, .. }
            | ParseError::DuplicateMultiplierMarker { token, .. }
            | ParseError::DuplicateCountMarker { token, .. }
            | ParseError::DuplicateReferenceMarker { token, .. }
            | ParseError::InvalidNumber { token, .. }
            | ParseError::MisplacedText { token, .. } => Some(token),
            ParseError::InvalidWord { word, .. } | ParseError::UndefinedTerminal { word, .. } => {
                Some(word)
            }
            ParseError::UndefinedReference { name, .. } => Some(name),
            ParseError::EmptyPhrase { .. } | ParseError::DepthLimitExceeded { .. } => None,
        }
    }
}
