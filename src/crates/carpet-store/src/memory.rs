//! Store traits and the in-memory relational implementation.

use crate::error::{Result, StoreError};
use crate::schema::{CompositionEdge, NodeId, NodeRecord};
use std::collections::BTreeMap;

/// Read access shared by stores and their open transactions
pub trait CompositionRead {
    fn node(&self, id: NodeId) -> Option<NodeRecord>;

    /// Edges below `parent`, ordered by index
    fn child_edges(&self, parent: NodeId) -> Vec<CompositionEdge>;
}

/// Staged writes against a store
///
/// Nothing is visible to the store until `commit`. Dropping the transaction
/// without committing discards every staged row.
pub trait StoreTransaction: CompositionRead {
    fn allocate_id(&mut self) -> NodeId;

    fn insert_node(&mut self, record: NodeRecord) -> Result<()>;

    fn insert_edge(&mut self, edge: CompositionEdge) -> Result<()>;

    fn commit(self) -> Result<()>
    where
        Self: Sized;

    fn rollback(self)
    where
        Self: Sized;
}

pub trait CompositionStore: CompositionRead {
    type Transaction<'a>: StoreTransaction
    where
        Self: 'a;

    fn transaction(&mut self) -> Self::Transaction<'_>;
}

type EdgeKey = (NodeId, i16);

fn edge_range(parent: NodeId) -> std::ops::RangeInclusive<EdgeKey> {
    (parent, i16::MIN)..=(parent, i16::MAX)
}

/// Node and edge tables held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: BTreeMap<NodeId, NodeRecord>,
    edges: BTreeMap<EdgeKey, CompositionEdge>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &CompositionEdge> {
        self.edges.values()
    }
}

impl CompositionRead for MemoryStore {
    fn node(&self, id: NodeId) -> Option<NodeRecord> {
        self.nodes.get(&id).cloned()
    }

    fn child_edges(&self, parent: NodeId) -> Vec<CompositionEdge> {
        self.edges.range(edge_range(parent)).map(|(_, edge)| *edge).collect()
    }
}

impl CompositionStore for MemoryStore {
    type Transaction<'a> = Transaction<'a>
    where
        Self: 'a;

    fn transaction(&mut self) -> Transaction<'_> {
        Transaction::new(self)
    }
}

/// RAII transaction over a [`MemoryStore`]
///
/// Rows are checked against the table constraints as they are staged, so a
/// commit never fails halfway.
pub struct Transaction<'a> {
    store: &'a mut MemoryStore,
    nodes: BTreeMap<NodeId, NodeRecord>,
    edges: BTreeMap<EdgeKey, CompositionEdge>,
    next_id: u64,
    finished: bool,
}

impl<'a> Transaction<'a> {
    fn new(store: &'a mut MemoryStore) -> Self {
        let next_id = store.next_id;
        Transaction {
            store,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            next_id,
            finished: false,
        }
    }

    pub fn staged_rows(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id).or_else(|| self.store.nodes.get(&id))
    }
}

impl CompositionRead for Transaction<'_> {
    fn node(&self, id: NodeId) -> Option<NodeRecord> {
        self.record(id).cloned()
    }

    fn child_edges(&self, parent: NodeId) -> Vec<CompositionEdge> {
        let mut edges: Vec<CompositionEdge> = self
            .store
            .edges
            .range(edge_range(parent))
            .chain(self.edges.range(edge_range(parent)))
            .map(|(_, edge)| *edge)
            .collect();
        edges.sort_by_key(|edge| edge.index);
        edges
    }
}

impl StoreTransaction for Transaction<'_> {
    fn allocate_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    fn insert_node(&mut self, record: NodeRecord) -> Result<()> {
        if self.record(record.id).is_some() {
            return Err(StoreError::InvalidComposition(format!(
                "node {} already exists",
                record.id
            )));
        }
        if record.multiplier == 0 {
            return Err(StoreError::InvalidComposition(format!(
                "node {} has a zero multiplier",
                record.id
            )));
        }
        self.nodes.insert(record.id, record);
        Ok(())
    }

    fn insert_edge(&mut self, edge: CompositionEdge) -> Result<()> {
        let parent = self
            .record(edge.parent_id)
            .ok_or(StoreError::MissingEndpoint(edge.parent_id))?;
        if let Some(terminal) = &parent.terminal {
            return Err(StoreError::InvalidComposition(format!(
                "node {} carries the lexeme '{}' and cannot have children",
                edge.parent_id, terminal
            )));
        }
        if self.record(edge.child_id).is_none() {
            return Err(StoreError::MissingEndpoint(edge.child_id));
        }
        if edge.parent_id == edge.child_id {
            return Err(StoreError::CyclicComposition(edge.parent_id));
        }

        let key = (edge.parent_id, edge.index);
        if self.edges.contains_key(&key) || self.store.edges.contains_key(&key) {
            return Err(StoreError::DuplicateEdge {
                parent: edge.parent_id,
                index: edge.index,
            });
        }
        self.edges.insert(key, edge);
        Ok(())
    }

    fn commit(mut self) -> Result<()> {
        let staged = self.staged_rows();
        self.store.nodes.append(&mut self.nodes);
        self.store.edges.append(&mut self.edges);
        self.store.next_id = self.next_id;
        self.finished = true;
        log::debug!("committed {} rows", staged);
        Ok(())
    }

    fn rollback(mut self) {
        log::debug!("rolled back {} staged rows", self.staged_rows());
        self.finished = true;
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            log::debug!("dropped transaction, discarding {} staged rows", self.staged_rows());
        }
    }
}
