//! The capabilities a graph must offer to be searched.
//!
//! Nodes are plain arena handles (`NodeId`). Everything a search learns about
//! a node (`g`, `h`, its parent) lives in the search itself, so the same graph
//! can be searched many times, even from several threads at once.

use std::fmt::Debug;

use nonmax::NonMaxU32;

/// A stable handle to a node in some graph arena.
///
/// Backed by a `NonMaxU32` so `Option<NodeId>` is as small as `NodeId`.
///
/// ```
/// use waypath::graph::NodeId;
/// assert_eq!(NodeId::new(3).unwrap().index(), 3usize);
/// assert!(NodeId::new(u32::MAX as usize).is_none());
/// assert_eq!(size_of::<Option<NodeId>>(), size_of::<NodeId>());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(NonMaxU32);

impl NodeId {
    #[inline(always)]
    #[must_use]
    pub fn new(index: usize) -> Option<Self> {
        let index = u32::try_from(index).ok()?;
        Some(Self(NonMaxU32::new(index)?))
    }

    #[inline(always)]
    #[must_use]
    pub fn index(&self) -> usize {
        self.0.get() as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.0.get())
    }
}

/// A location in the world a graph is embedded in.
pub trait Position: Clone + Debug {
    /// Squared distance to `other`.
    ///
    /// Used as the step cost between adjacent nodes, so it avoids a square
    /// root on the hot path. Paths are therefore ranked by the sum of squared
    /// step lengths, not by their euclidean length.
    fn sqr_distance(&self, other: &Self) -> f32;

    #[inline(always)]
    fn distance(&self, other: &Self) -> f32 {
        self.sqr_distance(other).sqrt()
    }
}

/// A searchable graph.
///
/// Each node exposes `directions(node)` neighbour slots. A slot may be vacant
/// (`None`), which lets grids keep a fixed fan-out at their borders.
///
/// The search does not validate `directions` against `neighbour`; whatever a
/// `neighbour` implementation does with an out-of-range slot (usually a
/// panic) reaches the caller unchanged.
pub trait Graph {
    type Position: Position;

    /// Number of nodes. Valid handles are `0..node_count()`.
    fn node_count(&self) -> usize;

    fn position(&self, node: NodeId) -> Self::Position;

    /// Fan-out of `node`.
    fn directions(&self, node: NodeId) -> usize;

    /// The neighbour in `slot`, for `slot` in `0..directions(node)`.
    fn neighbour(&self, node: NodeId, slot: usize) -> Option<NodeId>;

    /// Whether the node may ever be entered.
    fn is_traversable(&self, node: NodeId) -> bool;

    #[inline(always)]
    fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }
}

/// Estimates the remaining cost between two positions.
///
/// Optimality needs the estimate to never exceed the true remaining cost
/// (admissible), measured in the same squared-step units the search uses.
pub trait Heuristic<P: Position>: Debug {
    fn h(from: &P, to: &P) -> f32;
}

/// `h = sqr_distance(node, destination)`.
///
/// Pulls the search hard towards the destination. It is not admissible
/// once paths are longer than a single step, so paths are not guaranteed to
/// be optimal on graphs with obstacles.
#[derive(Copy, Clone, Debug, Default)]
pub struct SquaredDistance;

impl<P: Position> Heuristic<P> for SquaredDistance {
    #[inline(always)]
    fn h(from: &P, to: &P) -> f32 {
        from.sqr_distance(to)
    }
}

/// `h = distance(node, destination)`.
///
/// Admissible whenever steps are at least one unit long, like on unit grids.
#[derive(Copy, Clone, Debug, Default)]
pub struct Euclidean;

impl<P: Position> Heuristic<P> for Euclidean {
    #[inline(always)]
    fn h(from: &P, to: &P) -> f32 {
        from.distance(to)
    }
}
