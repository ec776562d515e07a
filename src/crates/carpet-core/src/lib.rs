//! Core types for the Carpet phrase notation
//!
//! This crate holds the phrase tree every other Carpet crate works on, the
//! collaborator traits the parser resolves words and cross-references
//! through, the modifier normalizer, and the lossless structured document.
//!
//! # Examples
//!
//! ```
//! use carpet_core::{normalize_children, PhraseNode, TerminalRef};
//!
//! let mut phrase = PhraseNode::group(vec![
//!     PhraseNode::leaf(TerminalRef::new(1, "dog")).into(),
//! ])
//! .with_multiplier(3);
//!
//! let children = normalize_children(&mut phrase);
//! assert_eq!(children[0].multiplier, 3);
//! ```
//!
//! # Main Components
//!
//! - **PhraseNode**: a terminal leaf or an ordered group of child phrases
//! - **PhraseChild**: owned children, or shared dictionary subtrees
//! - **TerminalLookup / ReferenceLookup**: the two external collaborators
//! - **Normalizer**: pushes multiplier, count and suffix onto absorbing children
//! - **Document**: the serde form used for storage and comparisons

pub mod document;
pub mod error;
pub mod language;
pub mod lookup;
pub mod normalize;
pub mod phrase;

pub use document::{from_json, to_document, to_json, Document};
pub use error::{DocumentError, InvariantError, NotFound};
pub use language::{LanguageContext, LanguageId};
pub use lookup::{Lexicon, LexiconFile, NoReferences, ReferenceLookup, TerminalLookup};
pub use normalize::{normalize_children, normalize_tree, propagate_modifiers, ModifierConflict};
pub use phrase::{PhraseChild, PhraseNode, PitchChange, Suffix, TerminalRef};
