//! Bookkeeping used by the search algorithms.
//!
//! - `indexed_heap`: the open set, a min-heap that can re-rank its keys.
//! - `closed_set`: the nodes a search is done with.

pub mod closed_set;
pub mod indexed_heap;
