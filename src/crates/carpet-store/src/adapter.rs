//! Mapping between phrase trees and composition rows.

use crate::error::{Result, StoreError};
use crate::memory::{CompositionRead, CompositionStore, StoreTransaction};
use crate::schema::{CompositionEdge, NodeId, NodeRecord};
use carpet_core::{PhraseChild, PhraseNode};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Persist a whole tree in one transaction and return the root's id
///
/// The tree is validated before anything is staged, and any error while
/// staging rolls the transaction back. A shared subtree that appears more
/// than once is stored once and linked from every place it appears.
pub fn save<S: CompositionStore>(store: &mut S, node: &PhraseNode) -> Result<NodeId> {
    node.validate()?;

    let mut tx = store.transaction();
    let mut shared = HashMap::new();
    let root = save_node(&mut tx, node, &mut shared)?;
    tx.commit()?;

    log::debug!("saved {} nodes under {}", node.size(), root);
    Ok(root)
}

fn save_node<T: StoreTransaction>(
    tx: &mut T,
    node: &PhraseNode,
    shared: &mut HashMap<*const PhraseNode, NodeId>,
) -> Result<NodeId> {
    let id = tx.allocate_id();
    tx.insert_node(NodeRecord::from_phrase(id, node))?;

    for (i, child) in node.children.iter().enumerate() {
        let index = i16::try_from(i).map_err(|_| {
            StoreError::InvalidComposition(format!(
                "node {} has more than {} children",
                id,
                i16::MAX as usize + 1
            ))
        })?;
        let child_id = match child {
            PhraseChild::Owned(owned) => save_node(tx, owned, shared)?,
            PhraseChild::Shared(rc) => match shared.get(&Rc::as_ptr(rc)) {
                Some(&existing) => existing,
                None => {
                    let saved = save_node(tx, rc, shared)?;
                    shared.insert(Rc::as_ptr(rc), saved);
                    saved
                }
            },
        };
        tx.insert_edge(CompositionEdge {
            parent_id: id,
            child_id,
            index,
            is_primary: child.is_primary,
        })?;
    }

    Ok(id)
}

/// Rebuild the tree stored under `id`
///
/// Every node comes back owned. The root is never primary; a child's primary
/// flag is taken from the edge that links it.
pub fn load<S: CompositionRead + ?Sized>(store: &S, id: NodeId) -> Result<PhraseNode> {
    let mut ancestors = Vec::new();
    let node = load_node(store, id, &mut ancestors)?;
    node.validate()?;
    Ok(node)
}

fn load_node<S: CompositionRead + ?Sized>(
    store: &S,
    id: NodeId,
    ancestors: &mut Vec<NodeId>,
) -> Result<PhraseNode> {
    if ancestors.contains(&id) {
        return Err(StoreError::CyclicComposition(id));
    }
    let record = store.node(id).ok_or(StoreError::NodeNotFound(id))?;
    let mut node = record.to_phrase();
    if record.is_terminal() {
        return Ok(node);
    }

    ancestors.push(id);
    for edge in store.child_edges(id) {
        let mut child = load_node(store, edge.child_id, ancestors)?;
        child.is_primary = edge.is_primary;
        node.children.push(PhraseChild::Owned(child));
    }
    ancestors.pop();

    Ok(node)
}

/// Link already stored nodes under `parent`, after its existing children
///
/// All edges are staged in one transaction: if any child is unknown or would
/// close a cycle, none of them are added.
pub fn compose<S: CompositionStore>(
    store: &mut S,
    parent: NodeId,
    children: &[(NodeId, bool)],
) -> Result<Vec<CompositionEdge>> {
    let mut tx = store.transaction();
    let record = tx.node(parent).ok_or(StoreError::NodeNotFound(parent))?;
    if let Some(terminal) = &record.terminal {
        return Err(StoreError::InvalidComposition(format!(
            "node {} carries the lexeme '{}' and cannot have children",
            parent, terminal
        )));
    }

    let mut next = tx
        .child_edges(parent)
        .last()
        .map_or(0, |edge| i32::from(edge.index) + 1);
    let mut created = Vec::with_capacity(children.len());

    for &(child, is_primary) in children {
        if tx.node(child).is_none() {
            return Err(StoreError::NodeNotFound(child));
        }
        if reaches(&tx, child, parent) {
            return Err(StoreError::CyclicComposition(child));
        }
        let index = i16::try_from(next).map_err(|_| {
            StoreError::InvalidComposition(format!("node {} has no free child index", parent))
        })?;
        let edge = CompositionEdge {
            parent_id: parent,
            child_id: child,
            index,
            is_primary,
        };
        tx.insert_edge(edge)?;
        created.push(edge);
        next += 1;
    }

    tx.commit()?;
    log::debug!("composed {} children under {}", created.len(), parent);
    Ok(created)
}

/// True when `target` is `from` or lies below it
pub fn reaches<S: CompositionRead + ?Sized>(store: &S, from: NodeId, target: NodeId) -> bool {
    let mut seen = HashSet::new();
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        if id == target {
            return true;
        }
        if seen.insert(id) {
            stack.extend(store.child_edges(id).into_iter().map(|edge| edge.child_id));
        }
    }
    false
}
