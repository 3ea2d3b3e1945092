//! Ready-made graphs.
//!
//! - `grid`: 4 or 8-connected cell grids, parseable from text.
//! - `waypoint`: free-form waypoint networks.

pub mod grid;
pub mod waypoint;
