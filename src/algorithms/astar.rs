use std::fmt::Debug;
use std::marker::PhantomData;

use derive_more::Display;
use log::debug;
use log::info;
use log::trace;
use num_traits::Zero;
use rustc_hash::FxHashMap;

use crate::data_structures::closed_set::ClosedSet;
use crate::data_structures::indexed_heap::HeapEntry;
use crate::data_structures::indexed_heap::IndexedHeap;
use crate::diagnostics::SearchTimer;
use crate::diagnostics::pretty;
use crate::error::SearchError;
use crate::graph::Graph;
use crate::graph::Heuristic;
use crate::graph::NodeId;
use crate::graph::Position;
use crate::graph::SquaredDistance;
use crate::score::Score;

/// Default depth budget, large enough to never be the limiting factor on
/// graphs that fit in memory.
pub const DEFAULT_DEPTH_BUDGET: u32 = i32::MAX as u32;
/// Default size hint used to pre-size the open set.
pub const DEFAULT_EXPECTED_GRAPH_SIZE: usize = 10_000;

/// The ranking tuple for A*
///
/// We prefer better f-values, and tie break for lower h. Entries that still
/// tie are popped in insertion order by the heap.
///
/// ```
/// use waypath::algorithms::astar::AStarRank;
/// use waypath::score::Score;
///
/// let s0 = Score::new(0.0);
/// let s1 = Score::new(1.0);
/// let s2 = Score::new(2.0);
/// assert!(AStarRank::new(s2, s0) < AStarRank::new(s2, s1));
/// assert!(AStarRank::new(s2, s0) < AStarRank::new(s0, s2));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AStarRank {
    f: Score,
    h: Score,
}
impl AStarRank {
    pub fn new(g: Score, h: Score) -> Self {
        Self { f: g + h, h }
    }
    pub fn f(&self) -> Score {
        self.f
    }
    pub fn h(&self) -> Score {
        self.h
    }
}

/// What a search knows about a node it reached.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchRecord {
    /// Cost of the best known path from the origin.
    pub g: Score,
    /// Estimated cost left to the destination.
    pub h: Score,
    /// Previous node on the best known path. `None` for the origin.
    pub parent: Option<NodeId>,
}

impl SearchRecord {
    fn unseen() -> Self {
        Self {
            g: Score::infinity(),
            h: Score::infinity(),
            parent: None,
        }
    }

    pub fn f(&self) -> Score {
        self.g + self.h
    }
}

/// How a search run ended.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The destination was expanded.
    #[display("path found")]
    PathFound,
    /// The open set ran out before reaching the destination.
    #[display("no path")]
    NoPath,
    /// The depth budget ran out before reaching the destination.
    #[display("depth budget exhausted")]
    BudgetExhausted,
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        *self == SearchOutcome::PathFound
    }
}

/// Knobs for a single search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of node expansions. Must be positive.
    pub depth_budget: u32,
    /// Size hint for the search bookkeeping. Not a limit.
    pub expected_graph_size: usize,
    /// Time the search and log how long it took.
    pub diagnostics: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth_budget: DEFAULT_DEPTH_BUDGET,
            expected_graph_size: DEFAULT_EXPECTED_GRAPH_SIZE,
            diagnostics: false,
        }
    }
}

impl SearchConfig {
    pub fn with_depth_budget(mut self, depth_budget: u32) -> Self {
        self.depth_budget = depth_budget;
        self
    }
    pub fn with_expected_graph_size(mut self, expected_graph_size: usize) -> Self {
        self.expected_graph_size = expected_graph_size;
        self
    }
    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

pub type PathCallback<'a> = Box<dyn FnMut(&[NodeId]) + 'a>;

/// Optional hooks run once a search is over.
///
/// `on_path_found` gets the path from origin to destination.
/// `on_path_failed` gets the path towards the explored node closest to the
/// destination, which may be just the origin.
#[derive(Default)]
pub struct PathCallbacks<'a> {
    on_path_found: Option<PathCallback<'a>>,
    on_path_failed: Option<PathCallback<'a>>,
}

impl<'a> PathCallbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn on_path_found(mut self, f: impl FnMut(&[NodeId]) + 'a) -> Self {
        self.on_path_found = Some(Box::new(f));
        self
    }
    pub fn on_path_failed(mut self, f: impl FnMut(&[NodeId]) + 'a) -> Self {
        self.on_path_failed = Some(Box::new(f));
        self
    }

    fn found(&mut self, path: &[NodeId]) {
        if let Some(f) = self.on_path_found.as_mut() {
            f(path);
        }
    }
    fn failed(&mut self, partial_path: &[NodeId]) {
        if let Some(f) = self.on_path_failed.as_mut() {
            f(partial_path);
        }
    }
}

impl Debug for PathCallbacks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PathCallbacks")
            .field("on_path_found", &self.on_path_found.is_some())
            .field("on_path_failed", &self.on_path_failed.is_some())
            .finish()
    }
}

/// A* from `origin` to `destination`.
///
/// On success the path (origin first, destination last) is appended to
/// `path`, the success callback gets it, and `Ok(true)` is returned.
///
/// When the open set or the depth budget runs out first, `path` is left
/// untouched, the failure callback runs once, and `Ok(false)` is returned.
///
/// Calling it wrong (a zero budget or nodes outside the graph) returns an
/// error without running any callback.
pub fn astar<G, H>(
    graph: &G,
    origin: NodeId,
    destination: NodeId,
    path: &mut Vec<NodeId>,
    config: &SearchConfig,
    mut callbacks: PathCallbacks<'_>,
) -> Result<bool, SearchError>
where
    G: Graph,
    H: Heuristic<G::Position>,
{
    if config.depth_budget == 0 {
        return Err(SearchError::ZeroDepthBudget);
    }

    let mut timer = SearchTimer::new(config.diagnostics);
    let mut search =
        AStarSearch::<G, H>::new(graph, origin, destination, config.expected_graph_size)?;

    match search.run(config.depth_budget) {
        SearchOutcome::PathFound => {
            let search_time = timer.restart();
            let start = path.len();
            search.append_path(path);
            let finalize_time = timer.stop();
            if config.diagnostics {
                info!(
                    "Path {origin} -> {destination} found in {} ({} nodes, {} expansions). Path reversed in {}",
                    pretty(&search_time),
                    path.len() - start,
                    search.expanded(),
                    pretty(&finalize_time),
                );
            }

            callbacks.found(&path[start..]);
            Ok(true)
        }
        outcome => {
            let elapsed = timer.stop();
            debug!(
                "Path {origin} -> {destination} failed: {outcome} after {} expansions",
                search.expanded()
            );
            if config.diagnostics {
                info!(
                    "Path {origin} -> {destination} failed ({outcome}) in {}",
                    pretty(&elapsed)
                );
            }

            let partial_path = search.partial_path();
            callbacks.failed(&partial_path);
            Ok(false)
        }
    }
}

/// [`astar`] with the [`SquaredDistance`] heuristic.
pub fn find_path<G: Graph>(
    graph: &G,
    origin: NodeId,
    destination: NodeId,
    path: &mut Vec<NodeId>,
    config: &SearchConfig,
    callbacks: PathCallbacks<'_>,
) -> Result<bool, SearchError> {
    astar::<G, SquaredDistance>(graph, origin, destination, path, config, callbacks)
}

/// A single A* search over a borrowed graph.
///
/// All per-search state lives here, none on the graph:
/// - `open`: an indexed heap of `(NodeId, AStarRank)` that can re-rank a node
///   without a linear search for its entry.
/// - `closed`: nodes already expanded.
/// - `records`: `g`, `h` and the parent of every node reached so far.
#[derive(Debug)]
pub struct AStarSearch<'g, G, H = SquaredDistance>
where
    G: Graph,
    H: Heuristic<G::Position>,
{
    graph: &'g G,
    origin: NodeId,
    destination: NodeId,
    destination_position: G::Position,

    open: IndexedHeap<NodeId, AStarRank>,
    closed: ClosedSet,
    records: FxHashMap<NodeId, SearchRecord>,

    found: bool,

    _phantom_heuristic: PhantomData<H>,
}

impl<'g, G, H> AStarSearch<'g, G, H>
where
    G: Graph,
    H: Heuristic<G::Position>,
{
    /// Prepares a search with the origin already in the open set.
    ///
    /// `expected_graph_size` pre-sizes the bookkeeping, capped at the size of
    /// `graph`. The search still works when the hint is too small.
    pub fn new(
        graph: &'g G,
        origin: NodeId,
        destination: NodeId,
        expected_graph_size: usize,
    ) -> Result<Self, SearchError> {
        for node in [origin, destination] {
            if !graph.contains(node) {
                return Err(SearchError::UnknownNode {
                    node,
                    node_count: graph.node_count(),
                });
            }
        }

        let capacity = expected_graph_size.min(graph.node_count());
        let destination_position = graph.position(destination);
        let mut search = Self {
            graph,
            origin,
            destination,
            destination_position,

            open: IndexedHeap::with_capacity(capacity),
            closed: ClosedSet::with_capacity(capacity),
            records: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),

            found: false,

            _phantom_heuristic: PhantomData,
        };

        let g = Score::zero();
        let h = search.h(&graph.position(origin));
        search.records.insert(
            origin,
            SearchRecord {
                g,
                h,
                parent: None,
            },
        );
        search.open.push(origin, AStarRank::new(g, h));

        Ok(search)
    }

    /// Expands up to `depth_budget` nodes looking for the destination.
    ///
    /// Can be called again to keep searching with a fresh budget.
    pub fn run(&mut self, mut depth_budget: u32) -> SearchOutcome {
        #[cfg(feature = "coz_profile")]
        coz::scope!("AStarRun");

        if self.found {
            return SearchOutcome::PathFound;
        }

        while depth_budget != 0 {
            let Some((current, _rank)) = self.open.pop() else {
                return SearchOutcome::NoPath;
            };
            depth_budget -= 1;

            let newly_closed = self.closed.close(current);
            debug_assert!(newly_closed, "{current} was expanded twice");

            if current == self.destination {
                #[cfg(feature = "coz_profile")]
                coz::progress!("PathFound");
                self.found = true;
                return SearchOutcome::PathFound;
            }

            self.expand(current);
        }

        if self.open.is_empty() {
            SearchOutcome::NoPath
        } else {
            SearchOutcome::BudgetExhausted
        }
    }

    /// Relaxes the neighbours of `current`.
    fn expand(&mut self, current: NodeId) {
        #[cfg(feature = "coz_profile")]
        coz::scope!("NodeExpansion");

        let g = self.record(current).g;
        let current_position = self.graph.position(current);
        trace!("Expanding {current} (g={g})");

        for slot in 0..self.graph.directions(current) {
            let Some(neighbour) = self.graph.neighbour(current, slot) else {
                continue;
            };
            if !self.graph.is_traversable(neighbour) || self.closed.is_closed(&neighbour) {
                continue;
            }

            let neighbour_position = self.graph.position(neighbour);
            let tentative_g = g + Score::new(current_position.sqr_distance(&neighbour_position));

            let is_open = self.open.contains(&neighbour);
            let record = self
                .records
                .entry(neighbour)
                .or_insert_with(SearchRecord::unseen);
            if tentative_g < record.g || !is_open {
                // Found a better path to this node (or the first one).
                record.g = tentative_g;
                record.h = Score::new(H::h(&neighbour_position, &self.destination_position));
                record.parent = Some(current);

                let rank = AStarRank::new(record.g, record.h);
                if is_open {
                    self.open.update(neighbour, rank);
                } else {
                    self.open.push(neighbour, rank);
                }
            }
        }
    }

    #[inline(always)]
    #[must_use]
    fn h(&self, p: &G::Position) -> Score {
        Score::new(H::h(p, &self.destination_position))
    }

    #[inline(always)]
    fn record(&self, node: NodeId) -> SearchRecord {
        self.records
            .get(&node)
            .copied()
            .unwrap_or_else(SearchRecord::unseen)
    }

    /// Appends the path found (origin first) to `path`.
    ///
    /// Returns the number of nodes appended, which is 0 when no path has been
    /// found yet.
    pub fn append_path(&self, path: &mut Vec<NodeId>) -> usize {
        #[cfg(feature = "coz_profile")]
        coz::scope!("PathReconstruction");

        if !self.found {
            return 0;
        }

        let start = path.len();
        self.push_parent_chain(self.destination, path);
        path[start..].reverse();

        debug_assert_eq!(path.get(start), Some(&self.origin));
        debug_assert_eq!(path.last(), Some(&self.destination));
        path.len() - start
    }

    /// The path towards the expanded node that looked closest to the
    /// destination (lowest `h`, then lowest `g`).
    pub fn partial_path(&self) -> Vec<NodeId> {
        let closest = self
            .closed
            .iter()
            .map(|n| {
                let r = self.record(*n);
                (r.h, r.g, *n)
            })
            .min();

        let mut path = vec![];
        if let Some((_, _, node)) = closest {
            self.push_parent_chain(node, &mut path);
            path.reverse();
        }
        path
    }

    /// Pushes `node` and its ancestors, ending with the origin.
    ///
    /// Parents are always expanded before their children and never change
    /// after that, so the chain can't loop.
    fn push_parent_chain(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let mut next = Some(node);
        while let Some(n) = next {
            out.push(n);
            next = self.records.get(&n).and_then(|r| r.parent);
            debug_assert!(next != Some(n));
        }
    }

    pub fn origin(&self) -> NodeId {
        self.origin
    }
    pub fn destination(&self) -> NodeId {
        self.destination
    }
    pub fn is_found(&self) -> bool {
        self.found
    }
    /// What the search knows about `node`, if it was reached.
    pub fn search_record(&self, node: NodeId) -> Option<&SearchRecord> {
        self.records.get(&node)
    }
    pub fn is_open(&self, node: NodeId) -> bool {
        self.open.contains(&node)
    }
    pub fn is_closed(&self, node: NodeId) -> bool {
        self.closed.is_closed(&node)
    }
    /// Number of nodes expanded (closed) so far.
    pub fn expanded(&self) -> usize {
        self.closed.len()
    }
    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// Writes an estimate of the memory held by the search.
    ///
    /// Hash tables are counted as their entries plus one control byte per
    /// entry. Spare buckets and allocator overhead are not counted.
    pub fn write_memory_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "AStarSearch Stats:")?;
        let s = hash_entry_bytes::<(NodeId, SearchRecord)>();
        let l = self.records.len();
        let c = self.records.capacity();
        writeln!(
            out,
            "  - |Records|:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Records|*: {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let s = size_of::<HeapEntry<NodeId, AStarRank>>() + hash_entry_bytes::<(NodeId, usize)>();
        let l = self.open.len();
        let c = self.open.capacity();
        writeln!(
            out,
            "  - |Open|:     {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Open|*:    {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let s = hash_entry_bytes::<NodeId>();
        let l = self.closed.len();
        let c = self.closed.capacity();
        writeln!(
            out,
            "  - |Closed|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Closed|*:  {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        writeln!(
            out,
            "  - Expanded nodes: {}",
            self.expanded().separate_with_commas()
        )?;

        Ok(())
    }
    pub fn print_memory_stats(&self) -> std::io::Result<()> {
        self.write_memory_stats(std::io::stdout().lock())
    }
}

/// Bytes taken by one entry of a `FxHashMap`/`FxHashSet`, control byte
/// included.
#[inline(always)]
fn hash_entry_bytes<T>() -> usize {
    std::mem::size_of::<T>() + 1
}
