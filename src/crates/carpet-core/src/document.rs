//! Lossless structured form of a phrase tree.
//!
//! This is the canonical storage and comparison format. Shared children are
//! written out in full, so a tree rebuilt from a document owns every node.

use crate::error::DocumentError;
use crate::phrase::{PhraseChild, PhraseNode, PitchChange, Suffix, TerminalRef};
use serde::{Deserialize, Serialize};

fn default_multiplier() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub pitch_change: Option<PitchChange>,
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub suffix: Option<Suffix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<TerminalRef>,
    #[serde(default)]
    pub children: Vec<Document>,
}

impl Document {
    /// Rebuild the phrase tree, checking the leaf and multiplier invariants
    pub fn into_node(self) -> Result<PhraseNode, DocumentError> {
        let node = self.into_node_unchecked();
        node.validate()?;
        Ok(node)
    }

    fn into_node_unchecked(self) -> PhraseNode {
        PhraseNode {
            pitch_change: self.pitch_change,
            multiplier: self.multiplier,
            count: self.count,
            suffix: self.suffix,
            is_primary: self.is_primary,
            terminal: self.terminal,
            children: self
                .children
                .into_iter()
                .map(|child| PhraseChild::Owned(child.into_node_unchecked()))
                .collect(),
        }
    }
}

pub fn to_document(node: &PhraseNode) -> Document {
    Document {
        is_primary: node.is_primary,
        pitch_change: node.pitch_change,
        multiplier: node.multiplier,
        count: node.count,
        suffix: node.suffix,
        terminal: node.terminal.clone(),
        children: node.child_nodes().map(to_document).collect(),
    }
}

pub fn to_json(node: &PhraseNode) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(&to_document(node))?)
}

pub fn from_json(json: &str) -> Result<PhraseNode, DocumentError> {
    let document: Document = serde_json::from_str(json)?;
    document.into_node()
}
