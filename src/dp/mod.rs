//! Dynamic-programming solvers: policy iteration and value iteration, each
//! with synchronous (full-sweep) and asynchronous (single-random-state)
//! update variants.

mod core;
pub mod policy_iteration;
pub mod value_iteration;

pub use core::DpCore;
pub use policy_iteration::PolicyIterationSolver;
pub use value_iteration::ValueIterationSolver;

use serde::{Deserialize, Serialize};

/// Whether a DP solver sweeps every state per pass or perturbs a single
/// randomly drawn state, bounded by an iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sweep {
    Synchronous,
    Asynchronous { max_iterations: usize },
}
