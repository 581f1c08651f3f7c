//! Solve command - run a single solver over a single maze

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::output::{print_kv, print_section},
    maze::{ACTION_COUNT, Action, Maze},
    pipeline::{SolverKind, SolverParams, build_solver},
    ports::Solver,
};

#[derive(Parser, Debug)]
#[command(about = "Solve one maze with one solver")]
pub struct SolveArgs {
    /// Maze file, or '-' to read the maze from stdin
    pub maze: String,

    /// Solver to run
    #[arg(long, short = 's', value_enum, default_value_t = SolverKind::SyncValueIteration)]
    pub solver: SolverKind,

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

    /// Use deterministic movement instead of the default slip distribution
    #[arg(long, default_value_t = false)]
    pub deterministic: bool,
}

fn load_maze(args: &SolveArgs) -> crate::Result<Maze> {
    let maze = if args.maze == "-" {
        Maze::from_reader(std::io::stdin().lock(), "<stdin>")?
    } else {
        Maze::from_file(&args.maze)?
    };
    if args.deterministic {
        maze.with_slip_distribution([1.0, 0.0, 0.0, 0.0])
    } else {
        Ok(maze)
    }
}

/// Render the greedy action per state as an arrow grid.
fn render_policy_grid(solver: &dyn Solver) -> String {
    let maze = solver.maze();
    let policy = solver.policy();
    let mut grid = String::new();
    for y in 0..maze.height() {
        for x in 0..maze.width() {
            let id = maze.state_id_at(x, y).expect("in-bounds coordinates");
            if maze.is_terminal(id) || maze.is_intraversible(id) {
                grid.push(maze.state(id).effective_tile().as_char());
                continue;
            }
            let distribution = policy.distribution(id);
            let mut best = 0;
            for index in 1..ACTION_COUNT {
                if distribution[index] > distribution[best] {
                    best = index;
                }
            }
            grid.push(match Action::from_index(best) {
                Action::Up => '^',
                Action::Right => '>',
                Action::Down => 'v',
                Action::Left => '<',
            });
        }
        grid.push('\n');
    }
    grid
}

pub fn execute(args: SolveArgs) -> Result<()> {
    let maze = load_maze(&args)?;
    let params = SolverParams {
        gamma: args.gamma,
        theta: args.theta,
        epochs: args.epochs,
        alpha: args.alpha,
        epsilon: args.epsilon,
    };

    let goal_count = maze.goal_states().len();
    let mut solver = build_solver(args.solver, maze, &params, args.seed);
    solver.solve()?;

    print_section(&format!("Solved with {}", solver.name()));
    print_kv("maze", solver.maze().identifier());
    print_kv(
        "size",
        &format!("{}x{}", solver.maze().width(), solver.maze().height()),
    );
    print_kv("goals", &goal_count.to_string());
    print_kv("epochs", &solver.epoch_timings().len().to_string());
    let total_micros: f64 = solver.epoch_timings().iter().sum();
    print_kv("total time", &format!("{:.1} us", total_micros));
    if !solver.total_reward_per_episode().is_empty() {
        let last = solver.total_reward_per_episode().last().copied().unwrap_or(0.0);
        print_kv("last episode reward", &format!("{last:.2}"));
    }

    println!("\nGreedy policy (terminal and blocked tiles shown as-is):");
    print!("{}", render_policy_grid(solver.as_ref()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_grid_marks_terminals_and_arrows() {
        let maze: Maze = "3 1\n*.1"
            .parse::<Maze>()
            .unwrap()
            .with_slip_distribution([1.0, 0.0, 0.0, 0.0])
            .unwrap();
        let params = SolverParams::default();
        let mut solver = build_solver(SolverKind::SyncValueIteration, maze, &params, Some(2));
        solver.solve().unwrap();
        let grid = render_policy_grid(solver.as_ref());
        assert_eq!(grid, ">>1\n");
    }
}
