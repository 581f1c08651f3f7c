//! Maze states and their activation lifecycle

use serde::{Deserialize, Serialize};

use super::{position::Position, tile::Tile};

/// Index of a state in a maze's arena, equal to `y * width + x`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StateId(pub(crate) usize);

impl StateId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A single maze cell: its position, original tile type, and whether a
/// special effect has activated it during the current episode.
///
/// Activation flips the *effective* type of the dynamic tiles (gate, lever,
/// snack) to `Path` without discarding the original type, so a maze can be
/// reset between episodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    position: Position,
    tile: Tile,
    activated: bool,
}

impl State {
    pub(crate) fn new(position: Position, tile: Tile) -> Self {
        Self {
            position,
            tile,
            activated: false,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// The tile as it was loaded, ignoring activation.
    pub fn original_tile(&self) -> Tile {
        self.tile
    }

    /// The tile as it currently behaves.
    pub fn effective_tile(&self) -> Tile {
        match self.tile {
            Tile::Gate | Tile::Lever | Tile::Snack if self.activated => Tile::Path,
            tile => tile,
        }
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub(crate) fn activate(&mut self) {
        self.activated = true;
    }

    pub(crate) fn clear_activation(&mut self) {
        self.activated = false;
    }

    /// Whether the state ends an episode.
    pub fn is_terminal(&self) -> bool {
        self.effective_tile().is_terminal()
    }

    /// Whether the state cannot be entered: a hole in the grid, or a gate
    /// that no lever has opened yet.
    pub fn is_intraversible(&self) -> bool {
        matches!(self.effective_tile(), Tile::None | Tile::Gate)
    }
}
