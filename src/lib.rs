//! Carpet: a compact phrase notation, its modifier normalizer, and a
//! relational composition store
//!
//! This crate ties the workspace together. The phrase tree lives in
//! `carpet-core`, the notation in `carpet-notation` and persistence in
//! `carpet-store`; [`Workbench`] bundles a lexicon, a dictionary and a store
//! built from a [`WorkbenchConfig`].
//!
//! # Examples
//!
//! ```
//! use carpet::{format, Workbench, WorkbenchConfig};
//!
//! let config = WorkbenchConfig {
//!     words: vec!["run".into(), "fast".into()],
//!     ..Default::default()
//! };
//! let mut bench = Workbench::open(config).unwrap();
//!
//! let phrase = bench.parse("(run [fast])*2").unwrap();
//! let id = bench.save(&phrase).unwrap();
//! assert_eq!(format(&bench.load(id).unwrap()), "(run [fast])*2");
//! ```

pub mod workbench;

pub use carpet_core::{
    from_json, normalize_children, normalize_tree, propagate_modifiers, to_document, to_json,
    Document, LanguageContext, LanguageId, Lexicon, ModifierConflict, PhraseChild, PhraseNode,
    PitchChange, Suffix, TerminalRef,
};
pub use carpet_notation::{format, parse, to_notation, Dictionary, ParseError, ParseOptions, Parser};
pub use carpet_store::{
    compose, load, save, CompositionEdge, CompositionRead, MemoryStore, NodeId, NodeRecord,
    StoreError,
};
pub use workbench::{Workbench, WorkbenchConfig, WorkbenchError};
