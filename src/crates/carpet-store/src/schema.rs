//! Row types of the composition schema.
//!
//! Two tables: `nodes (id, pitch_change, multiplier, count, suffix, terminal?)`
//! and `edges (parent_id, child_id, index, is_primary)` unique on
//! `(parent_id, index)`. Whether a node is primary belongs to the edge, not to
//! the node, so one stored node can be primary under one parent and not under
//! another.

use carpet_core::{PhraseNode, PitchChange, Suffix, TerminalRef};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub pitch_change: Option<PitchChange>,
    pub multiplier: u32,
    pub count: Option<u32>,
    pub suffix: Option<Suffix>,
    pub terminal: Option<TerminalRef>,
}

impl NodeRecord {
    /// The node's own columns; children become edges
    pub fn from_phrase(id: NodeId, node: &PhraseNode) -> Self {
        NodeRecord {
            id,
            pitch_change: node.pitch_change,
            multiplier: node.multiplier,
            count: node.count,
            suffix: node.suffix,
            terminal: node.terminal.clone(),
        }
    }

    /// A childless, non-primary node carrying this record's columns
    pub fn to_phrase(&self) -> PhraseNode {
        PhraseNode {
            pitch_change: self.pitch_change,
            multiplier: self.multiplier,
            count: self.count,
            suffix: self.suffix,
            terminal: self.terminal.clone(),
            ..Default::default()
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionEdge {
    pub parent_id: NodeId,
    pub child_id: NodeId,
    pub index: i16,
    pub is_primary: bool,
}
