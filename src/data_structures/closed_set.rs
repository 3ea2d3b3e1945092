use rustc_hash::FxHashSet;

use crate::graph::NodeId;

/// Nodes whose expansion is final for the current search.
///
/// Closing is permanent. A closed node is never re-opened nor re-expanded,
/// which is what makes a search terminate on graphs with cycles.
#[derive(Debug, Default)]
pub struct ClosedSet {
    nodes: FxHashSet<NodeId>,
}

impl ClosedSet {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_capacity(s: usize) -> Self {
        Self {
            nodes: FxHashSet::with_capacity_and_hasher(s, Default::default()),
        }
    }

    /// Closes `node`. Returns whether it was still open.
    #[inline(always)]
    pub fn close(&mut self, node: NodeId) -> bool {
        self.nodes.insert(node)
    }

    #[inline(always)]
    pub fn is_closed(&self, node: &NodeId) -> bool {
        self.nodes.contains(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }
}
