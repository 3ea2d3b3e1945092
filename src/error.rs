use thiserror::Error;

use crate::graph::NodeId;

/// Ways of calling a search wrong.
///
/// Not finding a path is not an error; searches report that as a failed
/// outcome instead.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("Node {node} is not part of a graph of {node_count} nodes")]
    UnknownNode { node: NodeId, node_count: usize },
    #[error("A depth budget of 0 can't expand any node")]
    ZeroDepthBudget,
}
