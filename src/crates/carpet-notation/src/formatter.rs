// Formatter: convert a phrase tree back to notation
use crate::error::Result;
use crate::parser::Parser;
use carpet_core::{LanguageContext, PhraseNode};

/// Format a phrase tree as a notation string
pub fn format(node: &PhraseNode) -> String {
    node.to_string()
}

/// Same as [`format`]
pub fn to_notation(node: &PhraseNode) -> String {
    format(node)
}

/// Parse `text` and print it back in canonical form
///
/// Canonical form puts the count before the multiplier, drops `#0` and
/// `*1`, and collapses redundant parentheses around a single phrase.
pub fn reformat(parser: &Parser<'_>, text: &str, context: &LanguageContext) -> Result<String> {
    let node = parser.parse(text, context)?;
    Ok(format(&node))
}
