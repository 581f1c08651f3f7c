//! Batch experiments: repeated runs over a maze selection, with policy
//! averaging and CSV output

use std::{
    collections::{BTreeMap, btree_map::Entry},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    export,
    maze::Maze,
    ports::PolicyEntry,
};

use super::{Datum, Run, SolverKind, SolverParams};

/// Configuration of a batch experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Maze files to run over; each file is visited `runs` times.
    pub mazes: Vec<PathBuf>,
    pub solvers: Vec<SolverKind>,
    pub params: SolverParams,
    /// Repetitions per maze.
    pub runs: usize,
    pub seed: Option<u64>,
    /// Show an indicatif progress bar over runs.
    pub progress: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            mazes: Vec::new(),
            solvers: SolverKind::ALL.to_vec(),
            params: SolverParams::default(),
            runs: 1,
            seed: None,
            progress: false,
        }
    }
}

/// Conducts repeated runs and aggregates their results.
pub struct Experiment {
    config: ExperimentConfig,
    data: Vec<Datum>,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Self {
        Self {
            config,
            data: Vec::new(),
        }
    }

    pub fn data(&self) -> &[Datum] {
        &self.data
    }

    /// Conduct every run: each maze is loaded once per repetition so runs
    /// never share activation state, and each run gets its own seed offset.
    pub fn conduct(&mut self) -> Result<&[Datum]> {
        if self.config.mazes.is_empty() {
            return Err(crate::error::Error::InvalidConfiguration {
                message: "experiment needs at least one maze".to_string(),
            });
        }
        if self.config.runs == 0 {
            return Err(crate::error::Error::InvalidConfiguration {
                message: "experiment needs at least one run per maze".to_string(),
            });
        }
        let total_runs = self.config.mazes.len() * self.config.runs;
        let bar = self
            .config
            .progress
            .then(|| crate::cli::output::create_run_progress(total_runs as u64));

        let mut run_index = 0;
        for maze_path in &self.config.mazes {
            for _ in 0..self.config.runs {
                let maze = Maze::from_file(maze_path)?;
                let seed = self
                    .config
                    .seed
                    .map(|seed| seed.wrapping_add((run_index * 1000) as u64));
                let run = Run::new(
                    run_index,
                    maze,
                    self.config.solvers.clone(),
                    self.config.params,
                    seed,
                );
                self.data.push(run.conduct()?);
                run_index += 1;
                if let Some(bar) = &bar {
                    bar.inc(1);
                }
            }
        }
        if let Some(bar) = &bar {
            bar.finish();
        }
        Ok(&self.data)
    }

    /// Average the final policies per (maze, solver) across repeated runs.
    pub fn average_policies(&self) -> BTreeMap<(String, String), Vec<PolicyEntry>> {
        let mut accumulated: BTreeMap<(String, String), (Vec<PolicyEntry>, usize)> =
            BTreeMap::new();
        for datum in &self.data {
            for report in &datum.reports {
                let key = (
                    datum.maze_identifier.clone(),
                    report.kind.label().to_string(),
                );
                match accumulated.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert((report.policy.clone(), 1));
                    }
                    Entry::Occupied(mut slot) => {
                        let (sums, count) = slot.get_mut();
                        for (sum, entry) in sums.iter_mut().zip(&report.policy) {
                            sum.probability += entry.probability;
                        }
                        *count += 1;
                    }
                }
            }
        }
        accumulated
            .into_iter()
            .map(|(key, (mut sums, count))| {
                for entry in &mut sums {
                    entry.probability /= count as f64;
                }
                (key, sums)
            })
            .collect()
    }

    /// Write timings.csv, rewards.csv and policies.csv into a directory.
    pub fn write_csv<P: AsRef<Path>>(&self, directory: P) -> Result<()> {
        let directory = directory.as_ref();
        std::fs::create_dir_all(directory).map_err(|source| crate::error::Error::Io {
            operation: format!("create output directory '{}'", directory.display()),
            source,
        })?;
        export::write_timings_csv(directory.join("timings.csv"), &self.data)?;
        export::write_rewards_csv(directory.join("rewards.csv"), &self.data)?;
        export::write_policies_csv(directory.join("policies.csv"), &self.average_policies())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn maze_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("maze-1.in");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "3 1\n*.1\n").unwrap();
        path
    }

    fn small_config(maze: PathBuf) -> ExperimentConfig {
        ExperimentConfig {
            mazes: vec![maze],
            solvers: vec![SolverKind::SyncValueIteration, SolverKind::Sarsa],
            params: SolverParams {
                epochs: 2,
                ..SolverParams::default()
            },
            runs: 3,
            seed: Some(1),
            progress: false,
        }
    }

    #[test]
    fn conducts_runs_per_maze_and_repetition() {
        let dir = tempfile::tempdir().unwrap();
        let mut experiment = Experiment::new(small_config(maze_file(&dir)));
        experiment.conduct().unwrap();
        assert_eq!(experiment.data().len(), 3);
    }

    #[test]
    fn averaged_policies_stay_normalized_per_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut experiment = Experiment::new(small_config(maze_file(&dir)));
        experiment.conduct().unwrap();

        let averages = experiment.average_policies();
        assert_eq!(averages.len(), 2);
        for entries in averages.values() {
            // Group the 4 action rows per state and check the mass.
            for state_rows in entries.chunks(4) {
                let sum: f64 = state_rows.iter().map(|entry| entry.probability).sum();
                assert!(
                    (sum - 1.0).abs() < 1e-9,
                    "averaged policy must stay a distribution, got {sum}"
                );
            }
        }
    }

    #[test]
    fn writes_the_three_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut experiment = Experiment::new(small_config(maze_file(&dir)));
        experiment.conduct().unwrap();

        let out = dir.path().join("out");
        experiment.write_csv(&out).unwrap();
        for name in ["timings.csv", "rewards.csv", "policies.csv"] {
            let metadata = std::fs::metadata(out.join(name)).unwrap();
            assert!(metadata.len() > 0, "{name} should not be empty");
        }
    }
}
