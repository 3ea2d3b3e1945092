use derive_more::Display;
use smallvec::SmallVec;

use crate::graph::Graph;
use crate::graph::NodeId;
use crate::graph::Position;

/// Most waypoints have a handful of links, keep them inline.
const INLINE_NEIGHBOURS: usize = 6;

#[derive(Copy, Clone, Debug, Default, Display, PartialEq)]
#[display("({x},{y},{z})")]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Position for Point3 {
    #[inline(always)]
    fn sqr_distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

#[derive(Clone, Debug)]
pub struct Waypoint<P> {
    pub position: P,
    pub traversable: bool,
    neighbours: SmallVec<[NodeId; INLINE_NEIGHBOURS]>,
}

impl<P> Waypoint<P> {
    pub fn neighbours(&self) -> &[NodeId] {
        &self.neighbours
    }
}

/// A navigation graph of free-standing waypoints.
///
/// Waypoints live in an arena and refer to each other by `NodeId`. Links are
/// always bidirectional.
#[derive(Clone, Debug)]
pub struct WaypointGraph<P> {
    nodes: Vec<Waypoint<P>>,
}

impl<P> Default for WaypointGraph<P> {
    fn default() -> Self {
        Self { nodes: vec![] }
    }
}

impl<P: Position> WaypointGraph<P> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_capacity(s: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(s),
        }
    }

    /// Adds a traversable waypoint. `None` once the arena is full.
    pub fn add(&mut self, position: P) -> Option<NodeId> {
        let node = NodeId::new(self.nodes.len())?;
        self.nodes.push(Waypoint {
            position,
            traversable: true,
            neighbours: SmallVec::new(),
        });
        Some(node)
    }

    /// Links `a` and `b` both ways.
    ///
    /// Links are unique, linking twice is a no-op. Nothing gets linked to a
    /// blocked `b`, to an unknown node or to itself. Returns whether the two
    /// are linked afterwards.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || !self.contains(a) || !self.is_traversable(b) {
            return false;
        }

        for (from, to) in [(a, b), (b, a)] {
            let neighbours = &mut self.nodes[from.index()].neighbours;
            if !neighbours.contains(&to) {
                neighbours.push(to);
            }
        }
        true
    }

    /// Opens or blocks `node`. Existing links are kept.
    pub fn set_traversable(&mut self, node: NodeId, traversable: bool) -> bool {
        match self.nodes.get_mut(node.index()) {
            Some(w) => {
                w.traversable = traversable;
                true
            }
            None => false,
        }
    }

    pub fn waypoint(&self, node: NodeId) -> Option<&Waypoint<P>> {
        self.nodes.get(node.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<P: Position> Graph for WaypointGraph<P> {
    type Position = P;

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    fn position(&self, node: NodeId) -> P {
        self.nodes[node.index()].position.clone()
    }

    #[inline(always)]
    fn directions(&self, node: NodeId) -> usize {
        self.waypoint(node).map_or(0, |w| w.neighbours.len())
    }

    #[inline(always)]
    fn neighbour(&self, node: NodeId, slot: usize) -> Option<NodeId> {
        self.waypoint(node)?.neighbours.get(slot).copied()
    }

    #[inline(always)]
    fn is_traversable(&self, node: NodeId) -> bool {
        self.waypoint(node).is_some_and(|w| w.traversable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_are_bidirectional_and_unique() {
        let mut graph = WaypointGraph::new();
        let a = graph.add(Point3::new(0.0, 0.0, 0.0)).unwrap();
        let b = graph.add(Point3::new(0.0, 1.0, 2.0)).unwrap();

        assert!(graph.connect(a, b));
        assert!(graph.connect(b, a));
        assert!(graph.connect(a, b));
        assert_eq!(graph.waypoint(a).unwrap().neighbours(), &[b]);
        assert_eq!(graph.waypoint(b).unwrap().neighbours(), &[a]);
        assert_eq!(graph.directions(a), 1);
        assert_eq!(graph.neighbour(a, 0), Some(b));
        assert_eq!(graph.neighbour(a, 1), None);
        assert_eq!(graph.position(a).sqr_distance(&graph.position(b)), 5.0);
    }

    #[test]
    fn blocked_waypoints_refuse_links() {
        let mut graph = WaypointGraph::new();
        let a = graph.add(Point3::default()).unwrap();
        let b = graph.add(Point3::new(1.0, 0.0, 0.0)).unwrap();
        let unknown = NodeId::new(7).unwrap();

        assert!(graph.set_traversable(b, false));
        assert!(!graph.is_traversable(b));
        assert!(!graph.connect(a, b));
        assert_eq!(graph.directions(a), 0);

        // The blocked side can still point at an open one.
        assert!(graph.connect(b, a));
        assert_eq!(graph.directions(a), 1);

        assert!(!graph.connect(a, a));
        assert!(!graph.connect(a, unknown));
        assert!(!graph.set_traversable(unknown, true));
        assert!(!graph.is_traversable(unknown));
        assert_eq!(graph.len(), 2);
    }
}
