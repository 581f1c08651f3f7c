//! A single run: one maze, a set of solvers, one datum

use crate::{error::Result, maze::Maze};

use super::{Datum, SolverKind, SolverParams, SolverReport, build_solver};

/// Builds the selected solvers against one maze and runs each to
/// completion.
pub struct Run {
    run_index: usize,
    maze: Maze,
    kinds: Vec<SolverKind>,
    params: SolverParams,
    seed: Option<u64>,
}

impl Run {
    pub fn new(
        run_index: usize,
        maze: Maze,
        kinds: Vec<SolverKind>,
        params: SolverParams,
        seed: Option<u64>,
    ) -> Self {
        Self {
            run_index,
            maze,
            kinds,
            params,
            seed,
        }
    }

    /// Solve the maze with every selected solver and collect the results.
    ///
    /// Each solver gets its own maze clone (episode-scoped activation state
    /// must not be shared) and its own seed offset, so solvers stay
    /// independent and reproducible.
    pub fn conduct(&self) -> Result<Datum> {
        let mut reports = Vec::with_capacity(self.kinds.len());
        for (offset, &kind) in self.kinds.iter().enumerate() {
            let seed = self.seed.map(|seed| seed.wrapping_add(offset as u64));
            let mut solver = build_solver(kind, self.maze.clone(), &self.params, seed);
            solver.solve()?;
            reports.push(SolverReport {
                kind,
                epoch_timings: solver.epoch_timings().to_vec(),
                total_reward_per_episode: solver.total_reward_per_episode().to_vec(),
                policy: solver.policy_entries(),
            });
        }
        Ok(Datum {
            run: self.run_index,
            maze_identifier: self.maze.identifier().to_string(),
            maze_width: self.maze.width(),
            maze_height: self.maze.height(),
            reports,
        })
    }
}
