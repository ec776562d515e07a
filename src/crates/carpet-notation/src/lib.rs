//! Carpet notation parser and formatter
//!
//! This crate turns the linear Carpet notation into phrase trees and back,
//! and keeps the named definitions that phrases can cross-reference.
//!
//! # Examples
//!
//! ```
//! use carpet_core::{LanguageContext, LanguageId, Lexicon, NoReferences};
//! use carpet_notation::{format, parse};
//!
//! let lexicon = Lexicon::with_words(&LanguageId::new("en"), ["run", "fast"]);
//! let context = LanguageContext::new("en");
//!
//! let phrase = parse("(run [fast])*2", &context, &lexicon, &NoReferences).unwrap();
//! assert_eq!(phrase.children.len(), 2);
//! assert_eq!(format(&phrase), "(run [fast])*2");
//! ```
//!
//! # Notation Syntax
//!
//! - Space-separated siblings: `dog cat`
//! - Groups: `(big dog)`
//! - Primary child, which absorbs the group's modifiers: `(run [fast])`
//! - Multiplier: `dog*3`
//! - Count: `dog#2`
//! - Pitch change, written first: `+dog`, `-dog`, `$dog`
//! - Suffix, written last: `dog?`, `dog!`
//! - Cross-reference to a dictionary entry: `@name`
//!
//! # Main Functions
//!
//! - [`parse`]: Parse notation into a phrase tree
//! - [`format()`]: Format a phrase tree back to notation
//! - [`Dictionary`]: Named definitions, loadable from YAML files

pub mod dictionary;
pub mod error;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod span;

#[cfg(test)]
mod parser_tests;

pub use dictionary::{Dictionary, DictionaryError, DictionaryResult};
pub use error::{ParseError, Result};
pub use formatter::{format, reformat, to_notation};
pub use lexer::{Lexer, Token};
pub use parser::{is_word, parse, ParseOptions, Parser};
pub use span::Span;
