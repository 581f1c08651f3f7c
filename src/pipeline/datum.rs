//! Per-run result records

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::Result, ports::PolicyEntry};

use super::SolverKind;

/// Results of one solver within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverReport {
    pub kind: SolverKind,
    /// Per-epoch durations in microseconds.
    pub epoch_timings: Vec<f64>,
    /// Total reward per episode; empty for non-episodic solvers.
    pub total_reward_per_episode: Vec<f64>,
    /// Final policy as (x, y, action) -> probability rows.
    pub policy: Vec<PolicyEntry>,
}

/// Everything recorded about a single run over one maze.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datum {
    /// Index of the run within its experiment.
    pub run: usize,
    pub maze_identifier: String,
    pub maze_width: i32,
    pub maze_height: i32,
    pub reports: Vec<SolverReport>,
}

impl Datum {
    /// Save to a pretty-printed JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let datum = serde_json::from_reader(file)?;
        Ok(datum)
    }
}
