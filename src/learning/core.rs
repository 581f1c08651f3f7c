//! Machinery shared by every model-free solver

use crate::{
    error::Result,
    maze::{Action, Maze, StateId},
    policy::{PolicyTable, QTable},
    rng::SampleSource,
};

/// Episode length cap as a fraction of the maze's state count. Guarantees
/// termination even when no terminal state is ever reached.
pub const EPISODE_TIMEOUT_FRACTION: f64 = 1.2;

/// Q-table, episode buffers and epoch bookkeeping shared by the Monte
/// Carlo and TD families.
#[derive(Debug, Clone)]
pub struct LearningCore {
    pub maze: Maze,
    pub q: QTable,
    pub policy: PolicyTable,
    pub gamma: f64,
    pub max_epochs: usize,
    pub current_epoch: usize,
    /// (state, action) trace of the episode in progress.
    pub episode: Vec<(StateId, Action)>,
    /// Reward trace parallel to `episode`; index 0 is the zero placeholder
    /// for the initial pair.
    pub rewards: Vec<f64>,
    pub total_reward_per_episode: Vec<f64>,
}

impl LearningCore {
    pub fn new(maze: Maze, gamma: f64, max_epochs: usize, policy: PolicyTable) -> Self {
        let q = QTable::zeroed(maze.state_count());
        Self {
            maze,
            q,
            policy,
            gamma,
            max_epochs,
            current_epoch: 0,
            episode: Vec::new(),
            rewards: Vec::new(),
            total_reward_per_episode: Vec::new(),
        }
    }

    /// Maximum number of transitions per episode.
    pub fn episode_cap(&self) -> usize {
        (EPISODE_TIMEOUT_FRACTION * self.maze.state_count() as f64).ceil() as usize
    }

    /// Whether the caller-supplied epoch budget is spent.
    pub fn epochs_exhausted(&self) -> bool {
        self.current_epoch >= self.max_epochs
    }

    /// Apply one environment transition from `pair`, recording the reward.
    pub fn transition_from(
        &mut self,
        pair: (StateId, Action),
        rng: &mut SampleSource,
    ) -> (StateId, f64) {
        let (next, reward) = self.maze.transition(pair.0, pair.1, rng);
        self.rewards.push(reward);
        (next, reward)
    }

    /// Discounted return from `onset` to the end of the reward trace:
    /// sum_k gamma^k * reward[onset + k].
    pub fn episode_return(&self, onset: usize) -> f64 {
        let mut total = 0.0;
        for (offset, reward) in self.rewards[onset.min(self.rewards.len())..].iter().enumerate() {
            total += self.gamma.powi(offset as i32) * reward;
        }
        total
    }

    /// Close out the episode: record its total reward, advance the epoch,
    /// clear the traces and reset the maze's activations.
    pub fn finish_episode(&mut self) -> Result<()> {
        self.total_reward_per_episode
            .push(self.rewards.iter().sum());
        self.current_epoch += 1;
        self.episode.clear();
        self.rewards.clear();
        self.maze.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> LearningCore {
        let maze: Maze = "4 1\n*..1".parse().unwrap();
        let policy = PolicyTable::stochastic(maze.state_count());
        LearningCore::new(maze, 0.9, 10, policy)
    }

    #[test]
    fn episode_cap_rounds_up() {
        let core = core();
        assert_eq!(core.episode_cap(), 5); // ceil(1.2 * 4)
    }

    #[test]
    fn backward_and_forward_returns_agree() {
        let mut core = core();
        core.rewards = vec![0.0, -1.0, -1.0, 10.0];

        // Forward weighted sum from index 0.
        let forward = core.episode_return(0);

        // Backward accumulation G = gamma * G + r, walked from the tail.
        let mut backward = 0.0;
        for reward in core.rewards.iter().rev() {
            backward = core.gamma * backward + reward;
        }

        assert!((forward - backward).abs() < 1e-12);
        let by_hand = 0.0 + 0.9 * -1.0 + 0.81 * -1.0 + 0.729 * 10.0;
        assert!((forward - by_hand).abs() < 1e-12);
    }

    #[test]
    fn finish_episode_records_totals_and_resets() {
        let mut core = core();
        core.rewards = vec![0.0, -0.1, 10.0];
        core.episode = vec![];
        core.finish_episode().unwrap();
        assert_eq!(core.current_epoch, 1);
        assert!(core.rewards.is_empty());
        assert_eq!(core.total_reward_per_episode.len(), 1);
        assert!((core.total_reward_per_episode[0] - 9.9).abs() < 1e-12);
    }
}
