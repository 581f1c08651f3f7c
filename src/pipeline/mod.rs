//! Orchestration around the solver core: solver construction, single runs,
//! and batch experiments with CSV output.

pub mod datum;
pub mod experiment;
pub mod run;

pub use datum::{Datum, SolverReport};
pub use experiment::{Experiment, ExperimentConfig};
pub use run::Run;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    baseline::RandomSolver,
    dp::{PolicyIterationSolver, ValueIterationSolver},
    learning::{
        MonteCarloEveryVisitSolver, MonteCarloExploringStartsSolver, MonteCarloFirstVisitSolver,
        TdControlSolver,
    },
    maze::Maze,
    ports::Solver,
};

/// Every solver the orchestration layer can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum SolverKind {
    SyncPolicyIteration,
    AsyncPolicyIteration,
    SyncValueIteration,
    AsyncValueIteration,
    MonteCarloExploringStarts,
    MonteCarloFirstVisit,
    MonteCarloEveryVisit,
    Sarsa,
    QLearning,
    Random,
}

impl SolverKind {
    pub const ALL: [SolverKind; 10] = [
        SolverKind::SyncPolicyIteration,
        SolverKind::AsyncPolicyIteration,
        SolverKind::SyncValueIteration,
        SolverKind::AsyncValueIteration,
        SolverKind::MonteCarloExploringStarts,
        SolverKind::MonteCarloFirstVisit,
        SolverKind::MonteCarloEveryVisit,
        SolverKind::Sarsa,
        SolverKind::QLearning,
        SolverKind::Random,
    ];

    /// Short identifier used in CSV rows and file names.
    pub fn label(self) -> &'static str {
        match self {
            SolverKind::SyncPolicyIteration => "sync-pi",
            SolverKind::AsyncPolicyIteration => "async-pi",
            SolverKind::SyncValueIteration => "sync-vi",
            SolverKind::AsyncValueIteration => "async-vi",
            SolverKind::MonteCarloExploringStarts => "mc-es",
            SolverKind::MonteCarloFirstVisit => "mc-fv",
            SolverKind::MonteCarloEveryVisit => "mc-ev",
            SolverKind::Sarsa => "sarsa",
            SolverKind::QLearning => "q-learning",
            SolverKind::Random => "random",
        }
    }
}

impl std::fmt::Display for SolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Construction parameters covering every solver family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverParams {
    /// Discount factor.
    pub gamma: f64,
    /// Convergence threshold for the DP family.
    pub theta: f64,
    /// Episode budget for the learning family, and the iteration cap for
    /// the asynchronous DP variants.
    pub epochs: usize,
    /// Learning rate for the TD family.
    pub alpha: f64,
    /// Exploration rate for the epsilon-soft and TD solvers.
    pub epsilon: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            theta: 1e-3,
            epochs: 500,
            alpha: 0.1,
            epsilon: 0.1,
        }
    }
}

/// Build a boxed solver bound to its own maze instance.
///
/// Each solver must own its maze: episode-scoped activation state would be
/// corrupted if two solvers shared one.
pub fn build_solver(
    kind: SolverKind,
    maze: Maze,
    params: &SolverParams,
    seed: Option<u64>,
) -> Box<dyn Solver> {
    let SolverParams {
        gamma,
        theta,
        epochs,
        alpha,
        epsilon,
    } = *params;
    match kind {
        SolverKind::SyncPolicyIteration => {
            Box::new(PolicyIterationSolver::synchronous(maze, gamma, theta, seed))
        }
        SolverKind::AsyncPolicyIteration => Box::new(PolicyIterationSolver::asynchronous(
            maze, gamma, theta, epochs, seed,
        )),
        SolverKind::SyncValueIteration => {
            Box::new(ValueIterationSolver::synchronous(maze, gamma, theta, seed))
        }
        SolverKind::AsyncValueIteration => Box::new(ValueIterationSolver::asynchronous(
            maze, gamma, theta, epochs, seed,
        )),
        SolverKind::MonteCarloExploringStarts => Box::new(MonteCarloExploringStartsSolver::new(
            maze, gamma, epochs, seed,
        )),
        SolverKind::MonteCarloFirstVisit => Box::new(MonteCarloFirstVisitSolver::new(
            maze, gamma, epochs, epsilon, seed,
        )),
        SolverKind::MonteCarloEveryVisit => {
            Box::new(MonteCarloEveryVisitSolver::new(maze, gamma, epochs, seed))
        }
        SolverKind::Sarsa => Box::new(TdControlSolver::sarsa(
            maze, gamma, epochs, alpha, epsilon, seed,
        )),
        SolverKind::QLearning => Box::new(TdControlSolver::q_learning(
            maze, gamma, epochs, alpha, epsilon, seed,
        )),
        SolverKind::Random => Box::new(RandomSolver::new(maze)),
    }
}
