//! Random baseline solver
//!
//! Keeps a uniform policy and performs a single trivial epoch, so it
//! participates uniformly in timing and policy data alongside the real
//! algorithms.

use crate::{
    error::Result,
    maze::Maze,
    policy::PolicyTable,
    ports::Solver,
};

#[derive(Debug, Clone)]
pub struct RandomSolver {
    maze: Maze,
    policy: PolicyTable,
    stepped: bool,
    epoch_timings: Vec<f64>,
}

impl RandomSolver {
    pub fn new(maze: Maze) -> Self {
        let policy = PolicyTable::stochastic(maze.state_count());
        Self {
            maze,
            policy,
            stepped: false,
            epoch_timings: Vec::new(),
        }
    }
}

impl Solver for RandomSolver {
    fn step(&mut self) -> Result<()> {
        self.stepped = true;
        Ok(())
    }

    fn converged(&self) -> bool {
        self.stepped
    }

    fn maze(&self) -> &Maze {
        &self.maze
    }

    fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    fn name(&self) -> &str {
        "random baseline"
    }

    fn epoch_timings(&self) -> &[f64] {
        &self.epoch_timings
    }

    fn record_epoch_timing(&mut self, micros: f64) {
        self.epoch_timings.push(micros);
    }
}
