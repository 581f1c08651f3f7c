//! Solver port - the uniform contract every algorithm implements
//!
//! The original design reached concrete algorithms through several levels of
//! virtual overriding. Here a single trait captures the capability surface:
//! an algorithm advances in [`Solver::step`] epochs until [`Solver::converged`],
//! optionally finalizes in [`Solver::finish`], and exposes its policy and
//! diagnostics. The provided [`Solver::solve`] drives that loop and times
//! each epoch, so concrete solvers only encode their update rule.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    maze::{Action, Maze},
    policy::PolicyTable,
};

/// One row of the `(x, y, action) -> probability` view of a final policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub x: i32,
    pub y: i32,
    pub action: Action,
    pub probability: f64,
}

/// Unified interface for all maze solvers.
///
/// The orchestration layer consumes solvers exclusively through this trait:
/// it calls [`Solver::solve`] once, then reads the policy and the optional
/// diagnostic series.
pub trait Solver {
    /// Advance one epoch: a DP sweep, a single asynchronous backup, or one
    /// learning episode.
    fn step(&mut self) -> Result<()>;

    /// Whether the algorithm's own stopping rule has fired.
    fn converged(&self) -> bool;

    /// One-shot work after convergence (e.g. value iteration's greedy
    /// policy construction).
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// The maze this solver is bound to.
    fn maze(&self) -> &Maze;

    /// The current policy table.
    fn policy(&self) -> &PolicyTable;

    /// Human-readable algorithm name.
    fn name(&self) -> &str;

    /// Per-epoch durations in microseconds, one entry per completed epoch.
    fn epoch_timings(&self) -> &[f64];

    /// Record one epoch duration. Called by the provided `solve` loop.
    fn record_epoch_timing(&mut self, micros: f64);

    /// Total reward accumulated per episode, for learning-curve
    /// diagnostics. Empty for solvers that do not generate episodes.
    fn total_reward_per_episode(&self) -> &[f64] {
        &[]
    }

    /// Run the algorithm to completion.
    fn solve(&mut self) -> Result<()> {
        while !self.converged() {
            let onset = Instant::now();
            self.step()?;
            self.record_epoch_timing(onset.elapsed().as_secs_f64() * 1e6);
        }
        self.finish()
    }

    /// The final policy as `(x, y, action) -> probability` rows, the shape
    /// the orchestration layer stores and averages.
    fn policy_entries(&self) -> Vec<PolicyEntry> {
        let maze = self.maze();
        let policy = self.policy();
        let mut entries = Vec::with_capacity(maze.state_count() * Action::ALL.len());
        for id in maze.state_ids() {
            let position = maze.state(id).position();
            for action in Action::ALL {
                entries.push(PolicyEntry {
                    x: position.x,
                    y: position.y,
                    action,
                    probability: policy.action_probability(id, action),
                });
            }
        }
        entries
    }
}
