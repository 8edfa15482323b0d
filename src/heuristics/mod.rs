//! Heuristics module.
//!
//! Segment-reversal neighborhood, reheating schedule and the simulated
//! annealing driver built on them.

pub mod neighbor;
pub mod schedule;
pub mod annealing;

pub use neighbor::*;
pub use schedule::*;
pub use annealing::*;
