//! Deferred path requests.
//!
//! Callers queue requests whenever they need a path and drain the queue when
//! they have time to spare, a few requests per frame or tick.

use std::collections::VecDeque;

use log::debug;

use crate::algorithms::astar::PathCallbacks;
use crate::algorithms::astar::SearchConfig;
use crate::algorithms::astar::astar;
use crate::error::SearchError;
use crate::graph::Graph;
use crate::graph::Heuristic;
use crate::graph::NodeId;

/// A path waiting to be computed.
#[derive(Debug)]
pub struct PathRequest<'a> {
    pub origin: NodeId,
    pub destination: NodeId,
    pub callbacks: PathCallbacks<'a>,
}

/// First-in first-out queue of path requests.
///
/// Every request is searched with the queue's `SearchConfig`, and results
/// are only delivered through the request's callbacks.
#[derive(Debug, Default)]
pub struct PathQueue<'a> {
    pending: VecDeque<PathRequest<'a>>,
    config: SearchConfig,
}

impl<'a> PathQueue<'a> {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            pending: VecDeque::new(),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn request_path(
        &mut self,
        origin: NodeId,
        destination: NodeId,
        callbacks: PathCallbacks<'a>,
    ) {
        self.pending.push_back(PathRequest {
            origin,
            destination,
            callbacks,
        });
    }

    /// Computes the oldest request.
    ///
    /// Returns `Ok(false)` when there was nothing to compute. A request that
    /// errors is dropped.
    pub fn compute_next<G, H>(&mut self, graph: &G) -> Result<bool, SearchError>
    where
        G: Graph,
        H: Heuristic<G::Position>,
    {
        let Some(request) = self.pending.pop_front() else {
            return Ok(false);
        };

        let mut path = Vec::new();
        let found = astar::<G, H>(
            graph,
            request.origin,
            request.destination,
            &mut path,
            &self.config,
            request.callbacks,
        )?;
        debug!(
            "Request {} -> {} computed (found: {found}), {} pending",
            request.origin,
            request.destination,
            self.pending.len()
        );

        Ok(true)
    }

    /// Computes up to `n` requests, oldest first.
    ///
    /// Returns how many were computed, stopping early on an empty queue.
    pub fn compute_batch<G, H>(&mut self, graph: &G, n: usize) -> Result<usize, SearchError>
    where
        G: Graph,
        H: Heuristic<G::Position>,
    {
        let mut computed = 0;
        while computed < n && self.compute_next::<G, H>(graph)? {
            computed += 1;
        }
        Ok(computed)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use indoc::indoc;

    use crate::graph::SquaredDistance;
    use crate::graphs::grid::Grid;
    use crate::graphs::grid::GridProblem;

    fn problem() -> GridProblem {
        GridProblem::try_from(indoc! {"
            S..#.
            .#.#.
            ...#G
        "})
        .unwrap()
    }

    #[test]
    fn requests_are_computed_in_order() {
        let problem = problem();
        let grid = &problem.grid;
        let (s, g) = (problem.origin, problem.destination);
        let reachable = grid.node(2, 2).unwrap();
        let log = RefCell::new(vec![]);

        let mut queue = PathQueue::new(SearchConfig::default());
        assert!(queue.is_empty());
        queue.request_path(
            s,
            reachable,
            PathCallbacks::new().on_path_found(|p| log.borrow_mut().push(("first", p.len()))),
        );
        queue.request_path(
            s,
            g,
            PathCallbacks::new().on_path_failed(|p| log.borrow_mut().push(("second", p.len()))),
        );
        queue.request_path(
            reachable,
            reachable,
            PathCallbacks::new().on_path_found(|p| log.borrow_mut().push(("third", p.len()))),
        );
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.compute_next::<Grid, SquaredDistance>(grid), Ok(true));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.compute_batch::<Grid, SquaredDistance>(grid, 5), Ok(2));
        assert!(queue.is_empty());
        assert_eq!(queue.compute_next::<Grid, SquaredDistance>(grid), Ok(false));
        assert_eq!(queue.compute_batch::<Grid, SquaredDistance>(grid, 5), Ok(0));

        let log = log.borrow();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0], ("first", 5));
        assert_eq!(log[1].0, "second");
        assert_eq!(log[2], ("third", 1));
    }

    #[test]
    fn batches_are_bounded() {
        let problem = problem();
        let mut queue = PathQueue::new(SearchConfig::default());
        for _ in 0..4 {
            queue.request_path(problem.origin, problem.origin, PathCallbacks::new());
        }

        assert_eq!(
            queue.compute_batch::<Grid, SquaredDistance>(&problem.grid, 3),
            Ok(3)
        );
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn errors_drop_the_request() {
        let problem = problem();
        let mut queue = PathQueue::new(SearchConfig::default().with_depth_budget(0));
        queue.request_path(problem.origin, problem.destination, PathCallbacks::new());
        queue.request_path(problem.origin, problem.destination, PathCallbacks::new());

        assert_eq!(
            queue.compute_batch::<Grid, SquaredDistance>(&problem.grid, 2),
            Err(SearchError::ZeroDepthBudget)
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.config().depth_budget, 0);
    }
}
