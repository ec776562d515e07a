//! Modifier propagation.
//!
//! A parent's multiplier, count and suffix are pushed onto a child when that
//! child is the only one or is marked primary. Whatever is left on the parent
//! afterwards applies to the group as a whole.

use crate::phrase::{PhraseChild, PhraseNode, Suffix};

/// A suffix that could not be pushed down because the child already had one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierConflict {
    pub child_index: usize,
    pub parent_suffix: Suffix,
    pub child_suffix: Suffix,
}

/// Move `node`'s modifiers onto its absorbing children, in child order
///
/// The parent's multiplier resets to 1 and its count to `None` once a child
/// has absorbed them; the suffix only moves when the receiving child has none.
/// Shared children are copied out before they are written to. Products
/// saturate at `u32::MAX`.
pub fn propagate_modifiers(node: &mut PhraseNode) -> Vec<ModifierConflict> {
    let sole = node.children.len() == 1;
    let PhraseNode {
        children,
        multiplier,
        count,
        suffix,
        ..
    } = node;
    let mut conflicts = Vec::new();

    for (child_index, child) in children.iter_mut().enumerate() {
        if !(sole || child.is_primary) {
            continue;
        }

        let takes_suffix = suffix.is_some() && child.suffix.is_none();
        if *multiplier != 1 || count.is_some() || takes_suffix {
            let target = child.make_owned();
            target.multiplier = target.multiplier.saturating_mul(*multiplier);
            if takes_suffix {
                target.suffix = suffix.take();
            }
            if let Some(n) = count.take() {
                target.count = Some(target.count.unwrap_or(1).saturating_mul(n));
            }
        }
        *multiplier = 1;

        if let (Some(parent_suffix), Some(child_suffix)) = (*suffix, child.suffix) {
            log::warn!(
                "cannot add suffix '{}' to child {} which already has '{}'",
                parent_suffix,
                child_index,
                child_suffix
            );
            conflicts.push(ModifierConflict {
                child_index,
                parent_suffix,
                child_suffix,
            });
        }
    }

    conflicts
}

/// Normalize `node` and hand back its children for rendering
pub fn normalize_children(node: &mut PhraseNode) -> Vec<&PhraseNode> {
    propagate_modifiers(node);
    node.child_nodes().collect()
}

/// Normalize every node of the tree, parents before children
pub fn normalize_tree(node: &mut PhraseNode) -> Vec<ModifierConflict> {
    let mut conflicts = propagate_modifiers(node);
    for child in node.children.iter_mut() {
        if child.is_leaf() {
            continue;
        }
        let replacement = match child {
            PhraseChild::Owned(owned) => {
                conflicts.extend(normalize_tree(owned));
                None
            }
            PhraseChild::Shared(shared) => {
                let mut probe = PhraseNode::clone(shared);
                conflicts.extend(normalize_tree(&mut probe));
                (probe != **shared).then_some(probe)
            }
        };
        if let Some(node) = replacement {
            *child = PhraseChild::Owned(node);
        }
    }
    conflicts
}
