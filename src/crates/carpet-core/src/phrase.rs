use crate::error::InvariantError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Tone movement marker written before a phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchChange {
    #[serde(rename = "+")]
    Up,
    #[serde(rename = "-")]
    Down,
    #[serde(rename = "$")]
    Last,
}

impl PitchChange {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(PitchChange::Up),
            '-' => Some(PitchChange::Down),
            '$' => Some(PitchChange::Last),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            PitchChange::Up => '+',
            PitchChange::Down => '-',
            PitchChange::Last => '$',
        }
    }
}

impl fmt::Display for PitchChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Grammatical modal marker written after a phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suffix {
    #[serde(rename = "?")]
    What,
    #[serde(rename = "!")]
    Not,
}

impl Suffix {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '?' => Some(Suffix::What),
            '!' => Some(Suffix::Not),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Suffix::What => '?',
            Suffix::Not => '!',
        }
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Opaque handle to a word-level entry of an external vocabulary
///
/// The engine never looks inside `id`; `word` is only used for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerminalRef {
    pub id: u64,
    pub word: String,
}

impl TerminalRef {
    pub fn new(id: u64, word: impl Into<String>) -> Self {
        TerminalRef {
            id,
            word: word.into(),
        }
    }
}

impl fmt::Display for TerminalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.word)
    }
}

/// A node of the phrase tree
///
/// A node is either a leaf carrying a [`TerminalRef`] or an ordered group of
/// child phrases, never both and never neither (see [`PhraseNode::validate`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseNode {
    pub pitch_change: Option<PitchChange>,
    pub multiplier: u32,
    pub count: Option<u32>,
    pub suffix: Option<Suffix>,
    /// Set by the parent on the child that absorbs its modifiers
    pub is_primary: bool,
    pub terminal: Option<TerminalRef>,
    pub children: Vec<PhraseChild>,
}

impl Default for PhraseNode {
    fn default() -> Self {
        PhraseNode {
            pitch_change: None,
            multiplier: 1,
            count: None,
            suffix: None,
            is_primary: false,
            terminal: None,
            children: Vec::new(),
        }
    }
}

impl PhraseNode {
    pub fn leaf(terminal: TerminalRef) -> Self {
        PhraseNode {
            terminal: Some(terminal),
            ..Default::default()
        }
    }

    pub fn group(children: Vec<PhraseChild>) -> Self {
        PhraseNode {
            children,
            ..Default::default()
        }
    }

    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_suffix(mut self, suffix: Suffix) -> Self {
        self.suffix = Some(suffix);
        self
    }

    pub fn with_pitch_change(mut self, pitch_change: PitchChange) -> Self {
        self.pitch_change = Some(pitch_change);
        self
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.terminal.is_some()
    }

    /// Iterate over the children as plain nodes, shared or not
    pub fn child_nodes(&self) -> impl Iterator<Item = &PhraseNode> {
        self.children.iter().map(|child| child.as_node())
    }

    /// Number of nodes in the subtree rooted here
    pub fn size(&self) -> usize {
        1 + self.child_nodes().map(PhraseNode::size).sum::<usize>()
    }

    /// Check that every node in the subtree is a leaf or a group but not
    /// both, and that no multiplier is zero
    pub fn validate(&self) -> Result<(), InvariantError> {
        match (&self.terminal, self.children.is_empty()) {
            (Some(terminal), false) => {
                return Err(InvariantError::TerminalWithChildren {
                    word: terminal.word.clone(),
                    children: self.children.len(),
                })
            }
            (None, true) => return Err(InvariantError::Degenerate),
            _ => {}
        }
        if self.multiplier == 0 {
            return Err(InvariantError::ZeroMultiplier);
        }
        for child in self.child_nodes() {
            child.validate()?;
        }
        Ok(())
    }
}

/// Renders the node back into notation
///
/// Groups of anything but one child are parenthesised, primary nodes are
/// bracketed instead. Count comes before multiplier, and a zero count is
/// left out.
impl fmt::Display for PhraseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pitch) = self.pitch_change {
            write!(f, "{}", pitch)?;
        }

        let (open, close) = if self.is_primary {
            ("[", "]")
        } else if self.terminal.is_none() && self.children.len() != 1 {
            ("(", ")")
        } else {
            ("", "")
        };

        f.write_str(open)?;
        match &self.terminal {
            Some(terminal) => write!(f, "{}", terminal)?,
            None => {
                for (i, child) in self.child_nodes().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", child)?;
                }
            }
        }
        f.write_str(close)?;

        if let Some(count) = self.count.filter(|&n| n != 0) {
            write!(f, "#{}", count)?;
        }
        if self.multiplier != 1 {
            write!(f, "*{}", self.multiplier)?;
        }
        if let Some(suffix) = self.suffix {
            write!(f, "{}", suffix)?;
        }
        Ok(())
    }
}

/// A child slot: either exclusively owned or shared with other phrases
///
/// Shared children come from dictionary cross-references and are never
/// written to in place; see [`PhraseChild::make_owned`].
#[derive(Debug, Clone)]
pub enum PhraseChild {
    Owned(PhraseNode),
    Shared(Rc<PhraseNode>),
}

impl PhraseChild {
    pub fn as_node(&self) -> &PhraseNode {
        match self {
            PhraseChild::Owned(node) => node,
            PhraseChild::Shared(node) => node,
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, PhraseChild::Shared(_))
    }

    /// Get a mutable node, copying a shared subtree out first
    pub fn make_owned(&mut self) -> &mut PhraseNode {
        if let PhraseChild::Shared(shared) = self {
            let node = (**shared).clone();
            *self = PhraseChild::Owned(node);
        }
        match self {
            PhraseChild::Owned(node) => node,
            PhraseChild::Shared(_) => unreachable!("shared child was replaced above"),
        }
    }

    pub fn into_node(self) -> PhraseNode {
        match self {
            PhraseChild::Owned(node) => node,
            PhraseChild::Shared(node) => Rc::unwrap_or_clone(node),
        }
    }
}

impl Deref for PhraseChild {
    type Target = PhraseNode;

    fn deref(&self) -> &PhraseNode {
        self.as_node()
    }
}

impl PartialEq for PhraseChild {
    fn eq(&self, other: &Self) -> bool {
        self.as_node() == other.as_node()
    }
}

impl From<PhraseNode> for PhraseChild {
    fn from(node: PhraseNode) -> Self {
        PhraseChild::Owned(node)
    }
}

impl From<Rc<PhraseNode>> for PhraseChild {
    fn from(node: Rc<PhraseNode>) -> Self {
        PhraseChild::Shared(node)
    }
}

impl Serialize for PhraseChild {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_node().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PhraseChild {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        PhraseNode::deserialize(deserializer).map(PhraseChild::Owned)
    }
}
