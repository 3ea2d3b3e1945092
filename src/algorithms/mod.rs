//! Implementation of search algorithms.
//!
//! These algorithms do path-finding on any `Graph`.

pub mod astar;
