//! Policy iteration: alternate policy evaluation and greedy improvement
//! until the policy survives a full improvement pass unchanged.

use crate::{
    error::Result,
    maze::{ACTION_COUNT, Action, Maze, StateId},
    policy::PolicyTable,
    ports::Solver,
    rng::SampleSource,
};

use super::{DpCore, Sweep};

/// Policy-iteration solver, synchronous or asynchronous per [`Sweep`].
#[derive(Debug, Clone)]
pub struct PolicyIterationSolver {
    core: DpCore,
    policy: PolicyTable,
    rng: SampleSource,
    sweep: Sweep,
    /// State perturbed by the latest asynchronous evaluation pass.
    current_state: Option<StateId>,
    iteration: usize,
    epochs: usize,
    policy_is_stable: bool,
    epoch_timings: Vec<f64>,
    name: &'static str,
}

impl PolicyIterationSolver {
    pub fn synchronous(maze: Maze, gamma: f64, theta: f64, seed: Option<u64>) -> Self {
        Self::build(maze, gamma, theta, Sweep::Synchronous, seed)
    }

    pub fn asynchronous(
        maze: Maze,
        gamma: f64,
        theta: f64,
        max_iterations: usize,
        seed: Option<u64>,
    ) -> Self {
        Self::build(maze, gamma, theta, Sweep::Asynchronous { max_iterations }, seed)
    }

    fn build(maze: Maze, gamma: f64, theta: f64, sweep: Sweep, seed: Option<u64>) -> Self {
        let mut rng = SampleSource::new(seed);
        let policy = PolicyTable::deterministic(maze.state_count(), &mut rng);
        let name = match sweep {
            Sweep::Synchronous => "synchronous policy iteration",
            Sweep::Asynchronous { .. } => "asynchronous policy iteration",
        };
        Self {
            core: DpCore::new(maze, gamma, theta),
            policy,
            rng,
            sweep,
            current_state: None,
            iteration: 0,
            epochs: 0,
            policy_is_stable: false,
            epoch_timings: Vec::new(),
            name,
        }
    }

    /// Expected next-state value of committing to `action`, marginalized
    /// over the slip rotations.
    fn state_value(&self, state: StateId, action: Action) -> f64 {
        let slip = self.core.maze.slip_distribution();
        let mut value = 0.0;
        for (rotation, probability) in slip.iter().enumerate() {
            let next = self
                .core
                .maze
                .next_state_deterministic(state, action.rotated(rotation));
            value += probability * self.core.old_values.get(next);
        }
        value
    }

    fn updated_state_value(&self, state: StateId, action: Action) -> f64 {
        self.core.maze.reward(state) + self.core.gamma * self.state_value(state, action)
    }

    /// Greedy action under the current value estimates; ties keep the
    /// lowest action index.
    fn greedy_action_for_state(&self, state: StateId) -> Action {
        let mut best_index = 0;
        let mut best_value = self.state_value(state, Action::from_index(0));
        for index in 1..ACTION_COUNT {
            let value = self.state_value(state, Action::from_index(index));
            if value > best_value {
                best_index = index;
                best_value = value;
            }
        }
        Action::from_index(best_index)
    }

    fn evaluate(&mut self) -> Result<()> {
        match self.sweep {
            Sweep::Synchronous => loop {
                let mut delta: f64 = 0.0;
                for state in self.core.maze.state_ids().collect::<Vec<_>>() {
                    if self.core.skip(state) {
                        continue;
                    }
                    let old_value = self.core.values.get(state);
                    let action = self.policy.choose_action(state, &mut self.rng);
                    let new_value = self.updated_state_value(state, action);
                    self.core.values.set(state, new_value);
                    delta = delta.max((old_value - new_value).abs());
                }
                self.core.sync_buffers();
                if delta < self.core.theta {
                    return Ok(());
                }
            },
            Sweep::Asynchronous { .. } => loop {
                let state = self.core.random_nontrivial_state(&mut self.rng)?;
                let old_value = self.core.values.get(state);
                let action = self.policy.choose_action(state, &mut self.rng);
                let new_value = self.updated_state_value(state, action);
                self.core.values.set(state, new_value);
                let delta = (old_value - new_value).abs();
                self.core.sync_buffers();
                self.current_state = Some(state);
                if delta < self.core.theta {
                    return Ok(());
                }
            },
        }
    }

    fn improve(&mut self) {
        match self.sweep {
            Sweep::Synchronous => {
                for state in self.core.maze.state_ids().collect::<Vec<_>>() {
                    if self.core.skip(state) {
                        continue;
                    }
                    let current = self.policy.choose_action(state, &mut self.rng);
                    let greedy = self.greedy_action_for_state(state);
                    self.policy.set_greedy(state, greedy);
                    if current != greedy {
                        self.policy_is_stable = false;
                    }
                }
            }
            Sweep::Asynchronous { max_iterations } => {
                if let Some(state) = self.current_state {
                    let greedy = self.greedy_action_for_state(state);
                    self.policy.set_greedy(state, greedy);
                }
                if self.iteration < max_iterations {
                    self.policy_is_stable = false;
                }
                self.iteration += 1;
            }
        }
    }
}

impl Solver for PolicyIterationSolver {
    fn step(&mut self) -> Result<()> {
        self.policy_is_stable = true;
        self.evaluate()?;
        self.improve();
        self.epochs += 1;
        Ok(())
    }

    fn converged(&self) -> bool {
        self.epochs > 0 && self.policy_is_stable
    }

    fn maze(&self) -> &Maze {
        &self.core.maze
    }

    fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    fn name(&self) -> &str {
        self.name
    }

    fn epoch_timings(&self) -> &[f64] {
        &self.epoch_timings
    }

    fn record_epoch_timing(&mut self, micros: f64) {
        self.epoch_timings.push(micros);
    }
}
