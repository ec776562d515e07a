//! Relational persistence for Carpet phrase trees
//!
//! Trees are stored as a node table plus an ordered edge table, the shape a
//! SQL schema would take. [`MemoryStore`] keeps both tables in memory behind
//! a staging [`Transaction`], so a save either lands completely or not at all.
//!
//! # Examples
//!
//! ```
//! use carpet_core::{PhraseNode, TerminalRef};
//! use carpet_store::{load, save, MemoryStore};
//!
//! let tree = PhraseNode::group(vec![
//!     PhraseNode::leaf(TerminalRef::new(1, "big")).into(),
//!     PhraseNode::leaf(TerminalRef::new(2, "dog")).primary().into(),
//! ]);
//!
//! let mut store = MemoryStore::new();
//! let id = save(&mut store, &tree).unwrap();
//! assert_eq!(store.edge_count(), 2);
//! assert_eq!(load(&store, id).unwrap(), tree);
//! ```

pub mod adapter;
pub mod error;
pub mod memory;
pub mod schema;

pub use adapter::{compose, load, reaches, save};
pub use error::{Result, StoreError};
pub use memory::{CompositionRead, CompositionStore, MemoryStore, StoreTransaction, Transaction};
pub use schema::{CompositionEdge, NodeId, NodeRecord};
