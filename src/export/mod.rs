//! CSV export of experiment data
//!
//! Three files mirror the three diagnostic series: per-epoch timings,
//! per-episode rewards, and the averaged final policies.

use std::{collections::BTreeMap, path::Path};

use serde::Serialize;

use crate::{error::Result, pipeline::Datum, ports::PolicyEntry};

#[derive(Debug, Serialize)]
struct TimingRow<'a> {
    run: usize,
    maze: &'a str,
    solver: &'a str,
    epoch: usize,
    micros: f64,
}

#[derive(Debug, Serialize)]
struct RewardRow<'a> {
    run: usize,
    maze: &'a str,
    solver: &'a str,
    episode: usize,
    total_reward: f64,
}

#[derive(Debug, Serialize)]
struct PolicyRow<'a> {
    maze: &'a str,
    solver: &'a str,
    x: i32,
    y: i32,
    action: String,
    probability: f64,
}

/// Write one row per (run, solver, epoch) timing.
pub fn write_timings_csv<P: AsRef<Path>>(path: P, data: &[Datum]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for datum in data {
        for report in &datum.reports {
            for (epoch, &micros) in report.epoch_timings.iter().enumerate() {
                writer.serialize(TimingRow {
                    run: datum.run,
                    maze: &datum.maze_identifier,
                    solver: report.kind.label(),
                    epoch,
                    micros,
                })?;
            }
        }
    }
    writer.flush().map_err(|source| crate::error::Error::Io {
        operation: "flush timings CSV".to_string(),
        source,
    })?;
    Ok(())
}

/// Write one row per (run, solver, episode) total reward.
pub fn write_rewards_csv<P: AsRef<Path>>(path: P, data: &[Datum]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for datum in data {
        for report in &datum.reports {
            for (episode, &total_reward) in report.total_reward_per_episode.iter().enumerate() {
                writer.serialize(RewardRow {
                    run: datum.run,
                    maze: &datum.maze_identifier,
                    solver: report.kind.label(),
                    episode,
                    total_reward,
                })?;
            }
        }
    }
    writer.flush().map_err(|source| crate::error::Error::Io {
        operation: "flush rewards CSV".to_string(),
        source,
    })?;
    Ok(())
}

/// Write one row per (maze, solver, x, y, action) averaged probability.
pub fn write_policies_csv<P: AsRef<Path>>(
    path: P,
    averages: &BTreeMap<(String, String), Vec<PolicyEntry>>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for ((maze, solver), entries) in averages {
        for entry in entries {
            writer.serialize(PolicyRow {
                maze,
                solver,
                x: entry.x,
                y: entry.y,
                action: entry.action.to_string(),
                probability: entry.probability,
            })?;
        }
    }
    writer.flush().map_err(|source| crate::error::Error::Io {
        operation: "flush policies CSV".to_string(),
        source,
    })?;
    Ok(())
}
