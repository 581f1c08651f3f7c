//! The grid-world model: states, stochastic movement, rewards and
//! special-tile side effects
//!
//! A maze owns an arena of states indexed by `y * width + x`, a slip
//! distribution over relative rotations of the intended action, and the
//! derived starting/gate/goal subsets. Every solver consumes the maze
//! through [`Maze::transition`] and the traversability predicates.

mod parser;
pub mod position;
pub mod state;
pub mod tile;

use std::{io::BufRead, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    rng::SampleSource,
};

pub use position::Position;
pub use state::{State, StateId};
pub use tile::Tile;

/// Number of movement actions.
pub const ACTION_COUNT: usize = 4;

/// Reward for entering a goal state.
pub const REWARD_GOAL: f64 = 10.0;
/// Reward for entering a pit state.
pub const REWARD_PIT: f64 = -10.0;
/// Reward for entering an unconsumed snack state.
pub const REWARD_SNACK: f64 = 2.0;
/// Step cost for every other move, giving the shortest-path incentive.
pub const REWARD_STEP: f64 = -0.1;

/// Default slip distribution over (intended, +90, +180, +270).
pub const DEFAULT_SLIP: [f64; 4] = [0.8, 0.1, 0.0, 0.1];

/// A movement action. The discriminants are laid out so that rotating
/// clockwise by 90 degrees is index arithmetic modulo four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Up,
    Right,
    Down,
    Left,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [Action::Up, Action::Right, Action::Down, Action::Left];

    /// Map an index to an action, wrapping modulo four.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % ACTION_COUNT]
    }

    pub fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Right => 1,
            Action::Down => 2,
            Action::Left => 3,
        }
    }

    /// The action rotated clockwise by `steps` quarter turns.
    pub fn rotated(self, steps: usize) -> Self {
        Self::from_index(self.index() + steps)
    }

    /// The unit movement delta for this action.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Action::Up => (0, -1),
            Action::Right => (1, 0),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Up => "up",
            Action::Right => "right",
            Action::Down => "down",
            Action::Left => "left",
        };
        write!(f, "{name}")
    }
}

/// The grid-world Markov decision process.
#[derive(Debug, Clone)]
pub struct Maze {
    width: i32,
    height: i32,
    states: Vec<State>,
    starting: Vec<StateId>,
    gates: Vec<StateId>,
    goals: Vec<StateId>,
    slip: [f64; 4],
    identifier: String,
}

impl Maze {
    /// Read a maze from any buffered byte stream.
    pub fn from_reader<R: BufRead>(reader: R, identifier: impl Into<String>) -> Result<Self> {
        let parsed = parser::parse(reader)?;
        let mut maze = Self {
            width: parsed.width,
            height: parsed.height,
            states: parsed.states,
            starting: Vec::new(),
            gates: Vec::new(),
            goals: Vec::new(),
            slip: DEFAULT_SLIP,
            identifier: identifier.into(),
        };
        maze.partition_states();
        Ok(maze)
    }

    /// Read a maze from a text file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open maze file '{}'", path.display()),
            source,
        })?;
        Self::from_reader(
            std::io::BufReader::new(file),
            path.display().to_string(),
        )
    }

    /// Replace the slip distribution, validating that it sums to one.
    pub fn with_slip_distribution(mut self, slip: [f64; 4]) -> Result<Self> {
        let sum: f64 = slip.iter().sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(Error::InvalidSlipDistribution { sum });
        }
        self.slip = slip;
        Ok(self)
    }

    fn partition_states(&mut self) {
        for (index, state) in self.states.iter().enumerate() {
            let id = StateId(index);
            match state.original_tile() {
                Tile::Start => self.starting.push(id),
                Tile::Gate => self.gates.push(id),
                Tile::Goal => self.goals.push(id),
                _ => {}
            }
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    /// All state ids in arena order.
    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.states.len()).map(StateId)
    }

    pub fn starting_states(&self) -> &[StateId] {
        &self.starting
    }

    pub fn gate_states(&self) -> &[StateId] {
        &self.gates
    }

    pub fn goal_states(&self) -> &[StateId] {
        &self.goals
    }

    pub fn slip_distribution(&self) -> [f64; 4] {
        self.slip
    }

    /// Look up the state at a position, failing on out-of-bounds access.
    pub fn state_id_at(&self, x: i32, y: i32) -> Result<StateId> {
        if self.is_out_of_bounds(x, y) {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(StateId((y * self.width + x) as usize))
    }

    pub fn is_out_of_bounds(&self, x: i32, y: i32) -> bool {
        x < 0 || x >= self.width || y < 0 || y >= self.height
    }

    pub fn is_terminal(&self, id: StateId) -> bool {
        self.state(id).is_terminal()
    }

    pub fn is_intraversible(&self, id: StateId) -> bool {
        self.state(id).is_intraversible()
    }

    /// Whether a move to (x, y) bumps: out of bounds, or into an
    /// intraversible tile.
    pub fn move_should_fail(&self, x: i32, y: i32) -> bool {
        match self.state_id_at(x, y) {
            Ok(id) => self.is_intraversible(id),
            Err(_) => true,
        }
    }

    /// Perturb the intended action according to the slip distribution.
    ///
    /// Walks the cumulative distribution over relative rotations; if
    /// floating error leaves the cumulative sum short of the drawn bar, the
    /// final rotation is returned.
    pub fn actual_action(&self, intended: Action, rng: &mut SampleSource) -> Action {
        let bar = rng.uniform01();
        let mut cumulative = 0.0;
        for (rotation, probability) in self.slip.iter().enumerate() {
            cumulative += probability;
            if bar < cumulative {
                return intended.rotated(rotation);
            }
        }
        intended.rotated(ACTION_COUNT - 1)
    }

    /// Apply the unit delta for an action; a failing move keeps the player
    /// in place.
    pub fn next_state_deterministic(&self, id: StateId, action: Action) -> StateId {
        let (dx, dy) = action.delta();
        let target = self.state(id).position().offset(dx, dy);
        if self.move_should_fail(target.x, target.y) {
            id
        } else {
            StateId((target.y * self.width + target.x) as usize)
        }
    }

    /// Stochastic movement: slip the intended action, then move.
    pub fn next_state(&self, id: StateId, action: Action, rng: &mut SampleSource) -> StateId {
        let actual = self.actual_action(action, rng);
        self.next_state_deterministic(id, actual)
    }

    /// The reward for entering a state, judged by its effective tile.
    pub fn reward(&self, id: StateId) -> f64 {
        match self.state(id).effective_tile() {
            Tile::Goal => REWARD_GOAL,
            Tile::Snack => REWARD_SNACK,
            Tile::Pit => REWARD_PIT,
            _ => REWARD_STEP,
        }
    }

    /// Apply the side effect of the entered state, returning where the
    /// player actually ends up.
    ///
    /// Warp teleports to a free tile next to a randomly chosen goal; lever
    /// opens every gate; snack is consumed. Everything else passes through.
    pub fn special_effect(&mut self, id: StateId, rng: &mut SampleSource) -> StateId {
        match self.state(id).effective_tile() {
            Tile::Warp => self.warp_target(id, rng),
            Tile::Lever => {
                self.states[id.index()].activate();
                for gate in self.gates.clone() {
                    self.states[gate.index()].activate();
                }
                id
            }
            Tile::Snack => {
                self.states[id.index()].activate();
                id
            }
            _ => id,
        }
    }

    fn warp_target(&self, warp: StateId, rng: &mut SampleSource) -> StateId {
        if self.goals.is_empty() {
            return warp;
        }
        let goal = self.goals[rng.index(self.goals.len())];
        let goal_position = self.state(goal).position();
        for action in Action::ALL {
            let (dx, dy) = action.delta();
            let neighbour = goal_position.offset(dx, dy);
            if !self.move_should_fail(neighbour.x, neighbour.y) {
                return StateId((neighbour.y * self.width + neighbour.x) as usize);
            }
        }
        // A goal with no free neighbour should not exist in a solvable
        // maze, but the fallback keeps the operation total.
        warp
    }

    /// One full environment step: move, collect the reward of the reached
    /// state, then apply its side effect.
    pub fn transition(
        &mut self,
        id: StateId,
        action: Action,
        rng: &mut SampleSource,
    ) -> (StateId, f64) {
        let next = self.next_state(id, action, rng);
        let reward = self.reward(next);
        let settled = self.special_effect(next, rng);
        (settled, reward)
    }

    /// Draw a legal episode start: uniform over the explicit starting
    /// states when present, over all states otherwise, rejecting terminal
    /// and intraversible draws.
    pub fn starting_state(&self, rng: &mut SampleSource) -> Result<StateId> {
        let has_legal = if self.starting.is_empty() {
            self.state_ids()
                .any(|id| !self.is_terminal(id) && !self.is_intraversible(id))
        } else {
            self.starting
                .iter()
                .any(|&id| !self.is_terminal(id) && !self.is_intraversible(id))
        };
        if !has_legal {
            return Err(Error::NoStartableState);
        }
        loop {
            let candidate = if self.starting.is_empty() {
                StateId(rng.index(self.states.len()))
            } else {
                self.starting[rng.index(self.starting.len())]
            };
            if !self.is_terminal(candidate) && !self.is_intraversible(candidate) {
                return Ok(candidate);
            }
        }
    }

    /// Clear every activation flag so gates lock and snacks reappear for
    /// the next episode.
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.clear_activation();
        }
    }
}

impl FromStr for Maze {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes(), "<inline>")
    }
}
