//! One-step temporal-difference control: SARSA and Q-learning
//!
//! Both algorithms share the transition loop and the epsilon-greedy policy
//! refresh; they differ only in the bootstrap term of the Q update, captured
//! by [`TdRule`].

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    maze::{Maze, StateId},
    policy::PolicyTable,
    ports::Solver,
    rng::SampleSource,
};

use super::LearningCore;

/// The per-transition update rule of a TD solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TdRule {
    /// On-policy: bootstrap on the action actually selected at s'.
    Sarsa,
    /// Off-policy: bootstrap on the greedy action at s'.
    QLearning,
}

/// One-step TD control solver.
#[derive(Debug, Clone)]
pub struct TdControlSolver {
    core: LearningCore,
    rule: TdRule,
    alpha: f64,
    epsilon: f64,
    rng: SampleSource,
    epoch_timings: Vec<f64>,
}

impl TdControlSolver {
    pub fn sarsa(
        maze: Maze,
        gamma: f64,
        max_epochs: usize,
        alpha: f64,
        epsilon: f64,
        seed: Option<u64>,
    ) -> Self {
        Self::build(maze, gamma, max_epochs, alpha, epsilon, TdRule::Sarsa, seed)
    }

    pub fn q_learning(
        maze: Maze,
        gamma: f64,
        max_epochs: usize,
        alpha: f64,
        epsilon: f64,
        seed: Option<u64>,
    ) -> Self {
        Self::build(
            maze,
            gamma,
            max_epochs,
            alpha,
            epsilon,
            TdRule::QLearning,
            seed,
        )
    }

    fn build(
        maze: Maze,
        gamma: f64,
        max_epochs: usize,
        alpha: f64,
        epsilon: f64,
        rule: TdRule,
        seed: Option<u64>,
    ) -> Self {
        let mut rng = SampleSource::new(seed);
        let policy = PolicyTable::deterministic(maze.state_count(), &mut rng);
        let mut solver = Self {
            core: LearningCore::new(maze, gamma, max_epochs, policy),
            rule,
            alpha,
            epsilon,
            rng,
            epoch_timings: Vec::new(),
        };
        // Replace the arbitrary initial policy with the epsilon-greedy view
        // of the zero-initialized Q-table.
        for state in solver.core.maze.state_ids().collect::<Vec<_>>() {
            solver.refresh_policy(state);
        }
        solver
    }

    /// Make the state's policy epsilon-greedy with respect to the current
    /// Q-table.
    fn refresh_policy(&mut self, state: StateId) {
        let greedy = self.core.q.greedy_action(state);
        self.core
            .policy
            .set_epsilon_greedy(state, greedy, self.epsilon);
    }

    fn generate_episode(&mut self) -> Result<()> {
        let state = self.core.maze.starting_state(&mut self.rng)?;
        let action = self.core.policy.choose_action(state, &mut self.rng);
        let mut pair = (state, action);
        let cap = self.core.episode_cap();

        for _ in 0..cap {
            let (next, reward) = self.core.transition_from(pair, &mut self.rng);
            let next_action = self.core.policy.choose_action(next, &mut self.rng);

            match self.rule {
                TdRule::Sarsa => self.core.q.sarsa_update(
                    pair.0,
                    pair.1,
                    reward,
                    next,
                    next_action,
                    self.core.gamma,
                    self.alpha,
                ),
                TdRule::QLearning => self.core.q.q_learning_update(
                    pair.0,
                    pair.1,
                    reward,
                    next,
                    self.core.gamma,
                    self.alpha,
                ),
            }
            self.refresh_policy(pair.0);

            pair = (next, next_action);
            if self.core.maze.is_terminal(next) {
                break;
            }
        }
        Ok(())
    }
}

impl Solver for TdControlSolver {
    fn step(&mut self) -> Result<()> {
        self.generate_episode()?;
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
        match self.rule {
            TdRule::Sarsa => "SARSA",
            TdRule::QLearning => "Q-learning",
        }
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
