//! Experiment command - batch runs over mazes with CSV output

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::output::{print_kv, print_section},
    pipeline::{Experiment, ExperimentConfig, SolverKind, SolverParams},
};

#[derive(Parser, Debug)]
#[command(about = "Run a batch experiment and export CSV data")]
pub struct ExperimentArgs {
    /// Maze files to run over
    #[arg(long, short = 'm', required = true, num_args = 1..)]
    pub mazes: Vec<PathBuf>,

    /// Solvers to include (defaults to all of them)
    #[arg(long, short = 's', value_enum, num_args = 1..)]
    pub solvers: Vec<SolverKind>,

    /// Repetitions per maze
    #[arg(long, short = 'r', default_value_t = 10)]
    pub runs: usize,

    /// Output directory for timings.csv, rewards.csv and policies.csv
    #[arg(long, short = 'o', default_value = "output/data")]
    pub output: PathBuf,

    /// Discount factor
    #[arg(long, default_value_t = 0.9)]
    pub gamma: f64,

    /// Convergence threshold for the DP solvers
    #[arg(long, default_value_t = 1e-3)]
    pub theta: f64,

    /// Episode budget (learning family) / iteration cap (async DP)
    #[arg(long, default_value_t = 500)]
    pub epochs: usize,

    /// Learning rate for the TD solvers
    #[arg(long, default_value_t = 0.1)]
    pub alpha: f64,

    /// Exploration rate for the epsilon-soft and TD solvers
    #[arg(long, default_value_t = 0.1)]
    pub epsilon: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

pub fn execute(args: ExperimentArgs) -> Result<()> {
    let solvers = if args.solvers.is_empty() {
        SolverKind::ALL.to_vec()
    } else {
        args.solvers.clone()
    };
    let config = ExperimentConfig {
        mazes: args.mazes.clone(),
        solvers,
        params: SolverParams {
            gamma: args.gamma,
            theta: args.theta,
            epochs: args.epochs,
            alpha: args.alpha,
            epsilon: args.epsilon,
        },
        runs: args.runs,
        seed: args.seed,
        progress: !args.quiet,
    };

    let mut experiment = Experiment::new(config);
    experiment.conduct()?;
    experiment.write_csv(&args.output)?;

    print_section("Experiment complete");
    print_kv("mazes", &args.mazes.len().to_string());
    print_kv("runs", &experiment.data().len().to_string());
    print_kv("output", &args.output.display().to_string());
    Ok(())
}
