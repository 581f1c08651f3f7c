//! mazerl CLI - grid-world RL toolkit
//!
//! This CLI provides a unified interface for:
//! - Solving a single maze with any of the implemented solvers
//! - Running batch experiments over maze selections with CSV output

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mazerl")]
#[command(version, about = "Grid-world MDP solvers toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one maze with one solver
    Solve(mazerl::cli::commands::solve::SolveArgs),

    /// Run a batch experiment and export CSV data
    Experiment(mazerl::cli::commands::experiment::ExperimentArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve(args) => mazerl::cli::commands::solve::execute(args),
        Commands::Experiment(args) => mazerl::cli::commands::experiment::execute(args),
    }
}
