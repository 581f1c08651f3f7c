//! Grid-world MDP and classical reinforcement-learning solvers
//!
//! This crate provides:
//! - A grid-world maze model with stochastic movement, rewards and
//!   special-tile side effects (warp, lever/gate, snack)
//! - Dynamic-programming solvers: policy and value iteration, synchronous
//!   and asynchronous
//! - Model-free solvers: Monte Carlo control (exploring starts, first
//!   visit, off-policy every visit) and TD control (SARSA, Q-learning)
//! - Run/experiment orchestration with CSV export of timings, rewards and
//!   averaged policies

pub mod baseline;
pub mod cli;
pub mod dp;
pub mod error;
pub mod export;
pub mod learning;
pub mod maze;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod rng;

pub use error::{Error, Result};
pub use maze::{Action, Maze, Position, State, StateId, Tile};
pub use pipeline::{Datum, Experiment, ExperimentConfig, Run, SolverKind, SolverParams};
pub use policy::{PolicyTable, QTable, ValueTable};
pub use ports::{PolicyEntry, Solver};
pub use rng::SampleSource;
