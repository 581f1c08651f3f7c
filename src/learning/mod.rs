//! Model-free solvers: Monte Carlo control and one-step temporal-difference
//! control, all built on a shared episode-generation core.

mod core;
pub mod every_visit;
pub mod monte_carlo;
pub mod td;

pub use core::{EPISODE_TIMEOUT_FRACTION, LearningCore};
pub use every_visit::MonteCarloEveryVisitSolver;
pub use monte_carlo::{MonteCarloExploringStartsSolver, MonteCarloFirstVisitSolver};
pub use td::{TdControlSolver, TdRule};
