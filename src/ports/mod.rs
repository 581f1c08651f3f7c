//! Ports - trait boundaries between the solver core and its consumers

pub mod solver;

pub use solver::{PolicyEntry, Solver};
