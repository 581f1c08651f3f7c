//! Monte Carlo control: exploring starts and first-visit epsilon-soft

use std::collections::HashMap;

use crate::{
    error::Result,
    maze::{ACTION_COUNT, Action, Maze, StateId},
    policy::PolicyTable,
    ports::Solver,
    rng::SampleSource,
};

use super::LearningCore;

type ReturnHistories = HashMap<(StateId, Action), Vec<f64>>;

/// Sample mean of a pair's return history; an empty history averages to
/// zero, since early in training most pairs have no samples yet.
fn returns_average(returns: &ReturnHistories, pair: (StateId, Action)) -> f64 {
    match returns.get(&pair) {
        Some(history) if !history.is_empty() => {
            history.iter().sum::<f64>() / history.len() as f64
        }
        _ => 0.0,
    }
}

/// Monte Carlo control with exploring starts.
///
/// Every episode starts from a uniformly random non-terminal traversible
/// state paired with a uniformly random action; the exploring-start
/// assumption replaces a soft policy, so the policy itself stays greedy.
#[derive(Debug, Clone)]
pub struct MonteCarloExploringStartsSolver {
    core: LearningCore,
    returns: ReturnHistories,
    rng: SampleSource,
    epoch_timings: Vec<f64>,
}

impl MonteCarloExploringStartsSolver {
    pub fn new(maze: Maze, gamma: f64, max_epochs: usize, seed: Option<u64>) -> Self {
        let mut rng = SampleSource::new(seed);
        let policy = PolicyTable::deterministic(maze.state_count(), &mut rng);
        Self {
            core: LearningCore::new(maze, gamma, max_epochs, policy),
            returns: HashMap::new(),
            rng,
            epoch_timings: Vec::new(),
        }
    }

    fn random_state_action_pair(&mut self) -> Result<(StateId, Action)> {
        let maze = &self.core.maze;
        if maze
            .state_ids()
            .all(|id| maze.is_terminal(id) || maze.is_intraversible(id))
        {
            return Err(crate::error::Error::NoStartableState);
        }
        let state = loop {
            let candidate = StateId::from_index(self.rng.index(maze.state_count()));
            if !maze.is_terminal(candidate) && !maze.is_intraversible(candidate) {
                break candidate;
            }
        };
        let action = Action::from_index(self.rng.index(ACTION_COUNT));
        Ok((state, action))
    }

    fn generate_episode(&mut self, start: (StateId, Action)) {
        let cap = self.core.episode_cap();
        let mut pair = start;
        self.core.episode.push(pair);
        self.core.rewards.push(0.0);
        for _ in 0..cap {
            let (next, _) = self.core.transition_from(pair, &mut self.rng);
            pair = (next, self.core.policy.choose_action(next, &mut self.rng));
            self.core.episode.push(pair);
            if self.core.maze.is_terminal(next) {
                break;
            }
        }
    }

    fn update_from_episode(&mut self) {
        for index in 0..self.core.episode.len() {
            let pair = self.core.episode[index];
            let episode_return = self.core.episode_return(index + 1);
            self.returns.entry(pair).or_default().push(episode_return);
            self.core
                .q
                .set(pair.0, pair.1, returns_average(&self.returns, pair));
        }
        for index in 0..self.core.episode.len() {
            let (state, _) = self.core.episode[index];
            let greedy = self.core.q.greedy_action(state);
            self.core.policy.set_greedy(state, greedy);
        }
    }
}

impl Solver for MonteCarloExploringStartsSolver {
    fn step(&mut self) -> Result<()> {
        let start = self.random_state_action_pair()?;
        self.generate_episode(start);
        self.update_from_episode();
        self.core.finish_episode()
    }

    fn converged(&self) -> bool {
        self.core.epochs_exhausted()
    }

    fn maze(&self) -> &Maze {
        &self.core.maze
    }

    fn policy(&self) -> &PolicyTable {
        &self.core.policy
    }

    fn name(&self) -> &str {
        "Monte Carlo exploring starts"
    }

    fn epoch_timings(&self) -> &[f64] {
        &self.epoch_timings
    }

    fn record_epoch_timing(&mut self, micros: f64) {
        self.epoch_timings.push(micros);
    }

    fn total_reward_per_episode(&self) -> &[f64] {
        &self.core.total_reward_per_episode
    }
}

/// First-visit Monte Carlo control with an epsilon-soft policy.
///
/// The policy starts uniform (epsilon-soft by construction) and every
/// improvement keeps it epsilon-greedy rather than collapsing to one-hot,
/// so no separate behavior policy is needed.
#[derive(Debug, Clone)]
pub struct MonteCarloFirstVisitSolver {
    core: LearningCore,
    returns: ReturnHistories,
    epsilon: f64,
    rng: SampleSource,
    epoch_timings: Vec<f64>,
}

impl MonteCarloFirstVisitSolver {
    pub fn new(
        maze: Maze,
        gamma: f64,
        max_epochs: usize,
        epsilon: f64,
        seed: Option<u64>,
    ) -> Self {
        let policy = PolicyTable::stochastic(maze.state_count());
        Self {
            core: LearningCore::new(maze, gamma, max_epochs, policy),
            returns: HashMap::new(),
            epsilon,
            rng: SampleSource::new(seed),
            epoch_timings: Vec::new(),
        }
    }

    fn initial_state_action_pair(&mut self) -> Result<(StateId, Action)> {
        let state = self.core.maze.starting_state(&mut self.rng)?;
        let action = self.core.policy.choose_action(state, &mut self.rng);
        Ok((state, action))
    }

    fn generate_episode(&mut self, start: (StateId, Action)) {
        let cap = self.core.episode_cap();
        let mut pair = start;
        self.core.episode.push(pair);
        self.core.rewards.push(0.0);
        for _ in 0..cap {
            let (next, _) = self.core.transition_from(pair, &mut self.rng);
            pair = (next, self.core.policy.choose_action(next, &mut self.rng));
            self.core.episode.push(pair);
            if self.core.maze.is_terminal(next) {
                break;
            }
        }
    }

    fn update_from_episode(&mut self) {
        for index in 0..self.core.episode.len() {
            let pair = self.core.episode[index];
            let episode_return = self.core.episode_return(index + 1);
            self.returns.entry(pair).or_default().push(episode_return);
            self.core
                .q
                .set(pair.0, pair.1, returns_average(&self.returns, pair));
        }
        for index in 0..self.core.episode.len() {
            let (state, _) = self.core.episode[index];
            let greedy = self.core.q.greedy_action(state);
            self.core
                .policy
                .set_epsilon_greedy(state, greedy, self.epsilon);
        }
    }
}

impl Solver for MonteCarloFirstVisitSolver {
    fn step(&mut self) -> Result<()> {
        let start = self.initial_state_action_pair()?;
        self.generate_episode(start);
        self.update_from_episode();
        self.core.finish_episode()
    }

    fn converged(&self) -> bool {
        self.core.epochs_exhausted()
    }

    fn maze(&self) -> &Maze {
        &self.core.maze
    }

    fn policy(&self) -> &PolicyTable {
        &self.core.policy
    }

    fn name(&self) -> &str {
        "Monte Carlo first visit"
    }

    fn epoch_timings(&self) -> &[f64] {
        &self.epoch_timings
    }

    fn record_epoch_timing(&mut self, micros: f64) {
        self.epoch_timings.push(micros);
    }

    fn total_reward_per_episode(&self) -> &[f64] {
        &self.core.total_reward_per_episode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maze() -> Maze {
        "4 2\n*..1\n..#.".parse().unwrap()
    }

    #[test]
    fn exploring_starts_episodes_stay_bounded() {
        let mut solver = MonteCarloExploringStartsSolver::new(maze(), 0.9, 5, Some(31));
        let cap = solver.core.episode_cap();
        for _ in 0..5 {
            let start = solver.random_state_action_pair().unwrap();
            solver.generate_episode(start);
            assert!(
                solver.core.episode.len() <= cap + 1,
                "episode of length {} exceeds cap {}",
                solver.core.episode.len(),
                cap
            );
            solver.core.episode.clear();
            solver.core.rewards.clear();
            solver.core.maze.reset();
        }
    }

    #[test]
    fn exploring_starts_runs_its_epoch_budget() {
        let mut solver = MonteCarloExploringStartsSolver::new(maze(), 0.9, 8, Some(5));
        solver.solve().unwrap();
        assert_eq!(solver.core.current_epoch, 8);
        assert_eq!(solver.total_reward_per_episode().len(), 8);
        assert_eq!(solver.epoch_timings().len(), 8);
    }

    #[test]
    fn exploring_starts_policy_stays_one_hot() {
        let mut solver = MonteCarloExploringStartsSolver::new(maze(), 0.9, 10, Some(11));
        solver.solve().unwrap();
        for state in solver.maze().state_ids() {
            let sum: f64 = solver.policy().distribution(state).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn returns_average_of_empty_history_is_zero() {
        let returns = ReturnHistories::new();
        assert_eq!(
            returns_average(&returns, (StateId::from_index(0), Action::Up)),
            0.0
        );
    }

    #[test]
    fn first_visit_policy_stays_epsilon_soft() {
        let mut solver = MonteCarloFirstVisitSolver::new(maze(), 0.9, 10, 0.2, Some(13));
        solver.solve().unwrap();
        for state in solver.maze().state_ids() {
            let distribution = solver.policy().distribution(state);
            let sum: f64 = distribution.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
            for probability in distribution {
                assert!(
                    probability >= 0.2 / 4.0 - 1e-12,
                    "epsilon-soft policy must keep mass on every action"
                );
            }
        }
    }

    #[test]
    fn first_visit_starts_from_a_starting_state() {
        let mut solver = MonteCarloFirstVisitSolver::new(maze(), 0.9, 1, 0.1, Some(3));
        let (state, _) = solver.initial_state_action_pair().unwrap();
        let position = solver.maze().state(state).position();
        assert_eq!((position.x, position.y), (0, 0));
    }
}
