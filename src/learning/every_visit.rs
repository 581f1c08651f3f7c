//! Off-policy every-visit Monte Carlo control with weighted importance
//! sampling
//!
//! Episodes are traversed under a separate exploration policy that blends
//! toward the greedy action as a temperature cools linearly across epochs;
//! the target policy itself is refreshed greedily during the backward pass.

use crate::{
    error::Result,
    maze::{ACTION_COUNT, Action, Maze, StateId},
    policy::{PolicyTable, QTable},
    ports::Solver,
    rng::SampleSource,
};

use super::LearningCore;

const STARTING_TEMPERATURE: f64 = 1.0;
const ENDING_TEMPERATURE: f64 = 0.0;

/// Every-visit off-policy Monte Carlo solver.
#[derive(Debug, Clone)]
pub struct MonteCarloEveryVisitSolver {
    core: LearningCore,
    /// Behavior policy the episodes are sampled from.
    exploration: PolicyTable,
    /// Cumulative importance weights C(s, a).
    cumulative_weights: QTable,
    temperature: f64,
    rng: SampleSource,
    epoch_timings: Vec<f64>,
}

impl MonteCarloEveryVisitSolver {
    pub fn new(maze: Maze, gamma: f64, max_epochs: usize, seed: Option<u64>) -> Self {
        let mut rng = SampleSource::new(seed);
        let policy = PolicyTable::deterministic(maze.state_count(), &mut rng);
        let exploration = PolicyTable::stochastic(maze.state_count());
        let cumulative_weights = QTable::zeroed(maze.state_count());
        Self {
            core: LearningCore::new(maze, gamma, max_epochs, policy),
            exploration,
            cumulative_weights,
            temperature: STARTING_TEMPERATURE,
            rng,
            epoch_timings: Vec::new(),
        }
    }

    fn initial_state_action_pair(&mut self) -> Result<(StateId, Action)> {
        let state = self.core.maze.starting_state(&mut self.rng)?;
        let action = self.exploration.choose_action(state, &mut self.rng);
        Ok((state, action))
    }

    fn generate_episode(&mut self, start: (StateId, Action)) {
        let cap = self.core.episode_cap();
        let mut pair = start;
        self.core.episode.push(pair);
        self.core.rewards.push(0.0);
        for _ in 0..cap {
            let (next, _) = self.core.transition_from(pair, &mut self.rng);
            pair = (next, self.exploration.choose_action(next, &mut self.rng));
            self.core.episode.push(pair);
            if self.core.maze.is_terminal(next) {
                break;
            }
        }
    }

    /// Blend the exploration policy toward the greedy action under the
    /// current temperature: `t / 4` everywhere plus `1 - t` on the greedy
    /// action.
    fn refresh_exploration_policy(&mut self, state: StateId, greedy: Action) {
        let mut distribution = [self.temperature / ACTION_COUNT as f64; ACTION_COUNT];
        distribution[greedy.index()] += 1.0 - self.temperature;
        self.exploration.set_distribution(state, distribution);
    }

    /// The backward pass over the episode, from the highest-indexed
    /// visited pair down to the first.
    fn update_from_episode(&mut self) {
        let mut episode_return = 0.0;
        let mut importance_weight = 1.0;
        if self.core.episode.len() < 2 {
            return;
        }
        for index in (0..=self.core.episode.len() - 2).rev() {
            let (state, action) = self.core.episode[index];
            episode_return = self.core.gamma * episode_return + self.core.rewards[index + 1];

            let cumulative =
                self.cumulative_weights.get(state, action) + importance_weight;
            self.cumulative_weights.set(state, action, cumulative);

            let current_q = self.core.q.get(state, action);
            self.core.q.set(
                state,
                action,
                current_q + (importance_weight / cumulative) * (episode_return - current_q),
            );

            let greedy = self.core.q.greedy_action(state);
            self.core.policy.set_greedy(state, greedy);
            self.refresh_exploration_policy(state, greedy);

            importance_weight *= self.exploration.action_probability(state, action);
            if importance_weight == 0.0 {
                break;
            }
        }
    }

    /// Cool the temperature linearly across the epoch budget, clamped at
    /// the ending temperature.
    fn cool_temperature(&mut self) {
        if self.core.max_epochs > 1 {
            let cooled = STARTING_TEMPERATURE
                - (STARTING_TEMPERATURE - ENDING_TEMPERATURE)
                    * (self.core.current_epoch as f64 / (self.core.max_epochs as f64 - 1.0));
            self.temperature = cooled.max(ENDING_TEMPERATURE);
        } else {
            self.temperature = ENDING_TEMPERATURE;
        }
    }
}

impl Solver for MonteCarloEveryVisitSolver {
    fn step(&mut self) -> Result<()> {
        let start = self.initial_state_action_pair()?;
        self.generate_episode(start);
        self.update_from_episode();
        self.core.finish_episode()?;
        self.cool_temperature();
        Ok(())
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
        "Monte Carlo every visit"
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
        "4 1\n*..1".parse().unwrap()
    }

    #[test]
    fn temperature_cools_linearly_to_zero() {
        let mut solver = MonteCarloEveryVisitSolver::new(maze(), 0.9, 5, Some(23));
        assert_eq!(solver.temperature, 1.0);
        solver.solve().unwrap();
        assert!(
            (solver.temperature - ENDING_TEMPERATURE).abs() < 1e-12,
            "temperature should reach {ENDING_TEMPERATURE}, got {}",
            solver.temperature
        );
    }

    #[test]
    fn exploration_and_target_policies_stay_normalized() {
        let mut solver = MonteCarloEveryVisitSolver::new(maze(), 0.9, 6, Some(29));
        solver.solve().unwrap();
        for state in solver.maze().state_ids() {
            let target_sum: f64 = solver.core.policy.distribution(state).iter().sum();
            let exploration_sum: f64 = solver.exploration.distribution(state).iter().sum();
            assert!((target_sum - 1.0).abs() < 1e-12);
            assert!((exploration_sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn importance_weight_zero_stops_the_backward_pass() {
        let mut solver = MonteCarloEveryVisitSolver::new(maze(), 0.9, 2, Some(41));
        // Force a cold exploration policy so any non-greedy taken action
        // has probability zero.
        solver.temperature = 0.0;
        let start = solver.initial_state_action_pair().unwrap();
        solver.generate_episode(start);
        // The pass must terminate without touching pairs before the break.
        solver.update_from_episode();
        solver.core.finish_episode().unwrap();
    }

    #[test]
    fn runs_the_full_epoch_budget() {
        let mut solver = MonteCarloEveryVisitSolver::new(maze(), 0.9, 7, Some(19));
        solver.solve().unwrap();
        assert_eq!(solver.core.current_epoch, 7);
        assert_eq!(solver.total_reward_per_episode().len(), 7);
    }
}
