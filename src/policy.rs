//! Policy, state-value and state-action-value tables
//!
//! All three tables are dense arenas indexed by [`StateId`], matching the
//! maze's state arena. The TD update rules live on the Q-table itself.

use serde::{Deserialize, Serialize};

use crate::{
    maze::{ACTION_COUNT, Action, Maze, StateId},
    rng::SampleSource,
};

/// A probability distribution over the four actions.
pub type ActionDistribution = [f64; ACTION_COUNT];

/// A one-hot distribution putting all mass on `action`.
pub fn one_hot(action: Action) -> ActionDistribution {
    let mut distribution = [0.0; ACTION_COUNT];
    distribution[action.index()] = 1.0;
    distribution
}

/// The uniform distribution over all four actions.
pub fn uniform() -> ActionDistribution {
    [1.0 / ACTION_COUNT as f64; ACTION_COUNT]
}

/// An epsilon-greedy distribution: `eps / 4` everywhere plus `1 - eps`
/// extra mass on the greedy action.
pub fn epsilon_greedy(greedy: Action, epsilon: f64) -> ActionDistribution {
    let mut distribution = [epsilon / ACTION_COUNT as f64; ACTION_COUNT];
    distribution[greedy.index()] += 1.0 - epsilon;
    distribution
}

/// Per-state action-probability table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyTable {
    distributions: Vec<ActionDistribution>,
}

impl PolicyTable {
    /// Deterministic initialization: one random one-hot vector per state.
    pub fn deterministic(state_count: usize, rng: &mut SampleSource) -> Self {
        let distributions = (0..state_count)
            .map(|_| one_hot(Action::from_index(rng.index(ACTION_COUNT))))
            .collect();
        Self { distributions }
    }

    /// Stochastic initialization: uniform over all four actions per state.
    pub fn stochastic(state_count: usize) -> Self {
        Self {
            distributions: vec![uniform(); state_count],
        }
    }

    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }

    pub fn distribution(&self, state: StateId) -> ActionDistribution {
        self.distributions[state.index()]
    }

    pub fn set_distribution(&mut self, state: StateId, distribution: ActionDistribution) {
        self.distributions[state.index()] = distribution;
    }

    pub fn set_greedy(&mut self, state: StateId, action: Action) {
        self.set_distribution(state, one_hot(action));
    }

    pub fn set_epsilon_greedy(&mut self, state: StateId, action: Action, epsilon: f64) {
        self.set_distribution(state, epsilon_greedy(action, epsilon));
    }

    pub fn action_probability(&self, state: StateId, action: Action) -> f64 {
        self.distributions[state.index()][action.index()]
    }

    /// Sample an action from the state's distribution.
    ///
    /// Draws a bar in [0, 1) and walks the actions in index order,
    /// returning the first whose cumulative mass meets the bar; floating
    /// shortfall falls back to the last action.
    pub fn choose_action(&self, state: StateId, rng: &mut SampleSource) -> Action {
        let bar = rng.uniform01();
        let mut cumulative = 0.0;
        for (index, probability) in self.distributions[state.index()].iter().enumerate() {
            cumulative += probability;
            if cumulative >= bar {
                return Action::from_index(index);
            }
        }
        Action::from_index(ACTION_COUNT - 1)
    }
}

/// Per-state scalar value table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueTable {
    values: Vec<f64>,
}

impl ValueTable {
    /// Seed values from a maze: terminal states start at their reward and
    /// are never updated afterwards, everything else starts at zero.
    pub fn seeded_from(maze: &Maze) -> Self {
        let values = maze
            .state_ids()
            .map(|id| if maze.is_terminal(id) { maze.reward(id) } else { 0.0 })
            .collect();
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, state: StateId) -> f64 {
        self.values[state.index()]
    }

    pub fn set(&mut self, state: StateId, value: f64) {
        self.values[state.index()] = value;
    }

    /// Overwrite this table with another's contents (the DP double-buffer
    /// copy step).
    pub fn copy_from(&mut self, source: &ValueTable) {
        self.values.copy_from_slice(&source.values);
    }
}

/// Per-(state, action) value table, zero-initialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QTable {
    values: Vec<ActionDistribution>,
}

impl QTable {
    pub fn zeroed(state_count: usize) -> Self {
        Self {
            values: vec![[0.0; ACTION_COUNT]; state_count],
        }
    }

    pub fn get(&self, state: StateId, action: Action) -> f64 {
        self.values[state.index()][action.index()]
    }

    pub fn set(&mut self, state: StateId, action: Action, value: f64) {
        self.values[state.index()][action.index()] = value;
    }

    /// The action with maximum Q for a state; ties keep the lowest index
    /// thanks to the strictly-greater left-to-right scan.
    pub fn greedy_action(&self, state: StateId) -> Action {
        let row = &self.values[state.index()];
        let mut best = 0;
        for index in 1..ACTION_COUNT {
            if row[index] > row[best] {
                best = index;
            }
        }
        Action::from_index(best)
    }

    pub fn max_q(&self, state: StateId) -> f64 {
        self.values[state.index()]
            .iter()
            .fold(f64::NEG_INFINITY, |best, &q| best.max(q))
    }

    /// SARSA update: on-policy TD control.
    ///
    /// Q(s,a) += alpha * (r + gamma * Q(s',a') - Q(s,a))
    pub fn sarsa_update(
        &mut self,
        state: StateId,
        action: Action,
        reward: f64,
        next_state: StateId,
        next_action: Action,
        gamma: f64,
        alpha: f64,
    ) {
        let current = self.get(state, action);
        let bootstrap = self.get(next_state, next_action);
        let updated = current + alpha * (reward + gamma * bootstrap - current);
        self.set(state, action, updated);
    }

    /// Q-learning update: off-policy TD control.
    ///
    /// Q(s,a) += alpha * (r + gamma * max_a' Q(s',a') - Q(s,a))
    pub fn q_learning_update(
        &mut self,
        state: StateId,
        action: Action,
        reward: f64,
        next_state: StateId,
        gamma: f64,
        alpha: f64,
    ) {
        let greedy = self.greedy_action(next_state);
        self.sarsa_update(state, action, reward, next_state, greedy, gamma, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(index: usize) -> StateId {
        let maze: Maze = "4 1\n*..1".parse().unwrap();
        let id = maze.state_ids().nth(index).unwrap();
        id
    }

    fn assert_normalized(distribution: &ActionDistribution) {
        let sum: f64 = distribution.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12, "distribution sums to {sum}");
    }

    #[test]
    fn initializations_are_normalized() {
        let mut rng = SampleSource::seeded(21);
        let deterministic = PolicyTable::deterministic(8, &mut rng);
        let stochastic = PolicyTable::stochastic(8);
        for index in 0..8 {
            let id = StateId(index);
            assert_normalized(&deterministic.distribution(id));
            assert_normalized(&stochastic.distribution(id));
        }
    }

    #[test]
    fn updates_stay_normalized() {
        let mut policy = PolicyTable::stochastic(4);
        policy.set_greedy(state(0), Action::Down);
        policy.set_epsilon_greedy(state(1), Action::Left, 0.2);
        assert_normalized(&policy.distribution(state(0)));
        assert_normalized(&policy.distribution(state(1)));
        assert_eq!(policy.action_probability(state(0), Action::Down), 1.0);
        assert!((policy.action_probability(state(1), Action::Left) - 0.85).abs() < 1e-12);
        assert!((policy.action_probability(state(1), Action::Up) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn choose_action_is_deterministic_for_one_hot() {
        let mut policy = PolicyTable::stochastic(1);
        policy.set_distribution(StateId(0), [1.0, 0.0, 0.0, 0.0]);
        let mut rng = SampleSource::seeded(37);
        for _ in 0..100 {
            assert_eq!(policy.choose_action(StateId(0), &mut rng), Action::Up);
        }
    }

    #[test]
    fn greedy_action_ties_break_to_lowest_index() {
        let mut table = QTable::zeroed(1);
        assert_eq!(table.greedy_action(StateId(0)), Action::Up);
        table.set(StateId(0), Action::Down, 1.0);
        table.set(StateId(0), Action::Left, 1.0);
        assert_eq!(table.greedy_action(StateId(0)), Action::Down);
    }

    #[test]
    fn sarsa_update_matches_recurrence() {
        let mut table = QTable::zeroed(2);
        table.set(StateId(0), Action::Up, 0.5);
        table.set(StateId(1), Action::Right, 0.2);
        table.sarsa_update(
            StateId(0),
            Action::Up,
            1.0,
            StateId(1),
            Action::Right,
            0.9,
            0.1,
        );
        assert!((table.get(StateId(0), Action::Up) - 0.568).abs() < 1e-12);
    }

    #[test]
    fn q_learning_bootstraps_on_the_maximum() {
        let mut table = QTable::zeroed(2);
        table.set(StateId(1), Action::Up, 0.5);
        table.set(StateId(1), Action::Left, 2.0);
        table.q_learning_update(StateId(0), Action::Right, 0.0, StateId(1), 0.9, 0.5);
        // 0 + 0.5 * (0 + 0.9 * 2.0 - 0) = 0.9
        assert!((table.get(StateId(0), Action::Right) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn value_table_seeds_terminals_with_reward() {
        let maze: Maze = "3 1\n*#1".parse().unwrap();
        let values = ValueTable::seeded_from(&maze);
        assert_eq!(values.get(maze.state_id_at(0, 0).unwrap()), 0.0);
        assert_eq!(
            values.get(maze.state_id_at(1, 0).unwrap()),
            crate::maze::REWARD_PIT
        );
        assert_eq!(
            values.get(maze.state_id_at(2, 0).unwrap()),
            crate::maze::REWARD_GOAL
        );
    }
}
