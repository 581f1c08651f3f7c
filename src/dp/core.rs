//! State shared by both dynamic-programming families

use crate::{
    error::{Error, Result},
    maze::{Maze, StateId},
    policy::ValueTable,
    rng::SampleSource,
};

/// Double-buffered value tables plus the convergence parameters.
///
/// `values` holds the sweep in progress; `old_values` holds the previous
/// sweep and is what backups read from. Terminal states are seeded with
/// their reward at construction and never written again.
#[derive(Debug, Clone)]
pub struct DpCore {
    pub maze: Maze,
    pub values: ValueTable,
    pub old_values: ValueTable,
    pub gamma: f64,
    pub theta: f64,
}

impl DpCore {
    pub fn new(maze: Maze, gamma: f64, theta: f64) -> Self {
        let values = ValueTable::seeded_from(&maze);
        let old_values = values.clone();
        Self {
            maze,
            values,
            old_values,
            gamma,
            theta,
        }
    }

    /// Copy the working values into the previous-sweep buffer.
    pub fn sync_buffers(&mut self) {
        self.old_values.copy_from(&self.values);
    }

    /// Whether value updates must leave this state untouched.
    pub fn skip(&self, id: StateId) -> bool {
        self.maze.is_terminal(id) || self.maze.is_intraversible(id)
    }

    /// Draw a uniformly random state that is neither terminal nor
    /// intraversible, for the asynchronous variants.
    pub fn random_nontrivial_state(&self, rng: &mut SampleSource) -> Result<StateId> {
        if self.maze.state_ids().all(|id| self.skip(id)) {
            return Err(Error::NoStartableState);
        }
        loop {
            let candidate = StateId::from_index(rng.index(self.maze.state_count()));
            if !self.skip(candidate) {
                return Ok(candidate);
            }
        }
    }
}
