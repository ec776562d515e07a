//! Collaborator contracts used by the parser.
//!
//! The parser never resolves words or cross-references itself; it asks a
//! [`TerminalLookup`] for lexemes and a [`ReferenceLookup`] for previously
//! defined subtrees. [`Lexicon`] and [`NoReferences`] are the in-memory
//! implementations shipped with the engine.

use crate::error::NotFound;
use crate::language::LanguageId;
use crate::phrase::{PhraseNode, TerminalRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Resolves a bare word to a terminal
///
/// Must be deterministic for a given `(word, language)` pair.
pub trait TerminalLookup {
    fn lookup_terminal(&self, word: &str, language: &LanguageId) -> Result<TerminalRef, NotFound>;
}

/// Resolves a cross-reference name to a previously built subtree
pub trait ReferenceLookup {
    fn lookup_reference(&self, name: &str) -> Result<Rc<PhraseNode>, NotFound>;
}

/// A reference lookup that knows no names
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReferences;

impl ReferenceLookup for NoReferences {
    fn lookup_reference(&self, name: &str) -> Result<Rc<PhraseNode>, NotFound> {
        Err(NotFound::new(name))
    }
}

/// In-memory word table keyed by language and spelling
///
/// Ids are handed out in insertion order and never reused, so the same
/// sequence of inserts always yields the same terminals.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<(LanguageId, String), TerminalRef>,
    next_id: u64,
}

/// On-disk lexicon layout: `{ "<language>": ["word", ...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LexiconFile(pub BTreeMap<LanguageId, Vec<String>>);

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a lexicon holding `words` for one language
    pub fn with_words<'a>(language: &LanguageId, words: impl IntoIterator<Item = &'a str>) -> Self {
        let mut lexicon = Lexicon::new();
        for word in words {
            lexicon.insert(language, word);
        }
        lexicon
    }

    /// Add a word, returning its terminal (existing entries are kept)
    pub fn insert(&mut self, language: &LanguageId, word: &str) -> TerminalRef {
        let key = (language.clone(), word.to_string());
        if let Some(existing) = self.entries.get(&key) {
            return existing.clone();
        }
        self.next_id += 1;
        let terminal = TerminalRef::new(self.next_id, word);
        self.entries.insert(key, terminal.clone());
        terminal
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_file(file: &LexiconFile) -> Self {
        let mut lexicon = Lexicon::new();
        for (language, words) in &file.0 {
            for word in words {
                lexicon.insert(language, word);
            }
        }
        lexicon
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: LexiconFile = serde_json::from_str(json)?;
        Ok(Lexicon::from_file(&file))
    }
}

impl TerminalLookup for Lexicon {
    fn lookup_terminal(&self, word: &str, language: &LanguageId) -> Result<TerminalRef, NotFound> {
        log::trace!("lookup_terminal {:?} in {}", word, language);
        self.entries
            .get(&(language.clone(), word.to_string()))
            .cloned()
            .ok_or_else(|| NotFound::new(word))
    }
}
