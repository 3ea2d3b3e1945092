//! Reusable A* path-finding over caller-owned graphs.
//!
//! Graphs expose nodes through the [`graph::Graph`] trait. Searches keep all
//! their bookkeeping to themselves, so a graph can be searched concurrently.

use shadow_rs::shadow;

shadow!(build);

// Internals
// ---------
pub mod data_structures;
pub mod diagnostics;
pub mod error;
pub mod heap_primitives;
pub mod score;

// Graphs
// ------
pub mod graph;
pub mod graphs;

// Algorithms
// ----------
pub mod algorithms;
pub mod register;
