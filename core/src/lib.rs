#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use types::board_size;

pub use cell::*;
pub use controller::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use persist::*;
pub use store::*;
pub use types::*;

mod cell;
mod controller;
mod engine;
mod error;
mod generator;
mod persist;
mod store;
mod types;

/// Board dimensions as `(rows, cols)` plus the requested number of mines.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Rejects empty boards and boards where mines would fill every cell.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let (rows, cols) = self.size;
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyBoard.into());
        }
        let cells = self.total_cells();
        if self.mines >= cells {
            return Err(ConfigError::TooManyMines {
                mines: self.mines,
                cells,
            }
            .into());
        }
        Ok(())
    }

    pub const fn rows(&self) -> Coord {
        self.size.0
    }

    pub const fn cols(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked((9, 9), 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked((16, 16), 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked((16, 30), 99)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked((10, 10), 15)
    }
}

/// Mine positions together with the adjacency counts derived from them.
///
/// Counts are computed once when the layout is built and never change afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    adjacency: Array2<u8>,
    mine_count: CellCount,
}

impl MineLayout {
    /// A layout without mines, used before the first reveal.
    pub fn empty(size: Coord2) -> Self {
        Self {
            mine_mask: Array2::default(size.to_nd_index()),
            adjacency: Array2::default(size.to_nd_index()),
            mine_count: 0,
        }
    }

    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        let adjacency = compute_adjacency(&mine_mask);
        Self {
            mine_mask,
            adjacency,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::OutOfBounds);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn size(&self) -> Coord2 {
        board_size(&self.mine_mask)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    /// Number of mines around `coords`, meaningless for a mine cell.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.adjacency[coords.to_nd_index()]
    }

    pub fn iter_mine_coords(&self) -> impl Iterator<Item = Coord2> + '_ {
        let size = self.size();
        self.mine_mask
            .iter()
            .enumerate()
            .filter(|&(_, &is_mine)| is_mine)
            .filter_map(move |(index, _)| coords_of(index, size))
    }

    pub(crate) fn mine_mask(&self) -> &Array2<bool> {
        &self.mine_mask
    }

    pub(crate) fn adjacency(&self) -> &Array2<u8> {
        &self.adjacency
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.mine_mask[(row as usize, col as usize)]
    }
}

/// One pass over the board counting mines in each non-mine cell's neighborhood.
pub fn compute_adjacency(mine_mask: &Array2<bool>) -> Array2<u8> {
    let mut adjacency: Array2<u8> = Array2::zeros(mine_mask.raw_dim());
    for ((row, col), &is_mine) in mine_mask.indexed_iter() {
        if is_mine {
            continue;
        }
        let coords: Coord2 = (row as Coord, col as Coord);
        adjacency[(row, col)] = mine_mask
            .iter_neighbors(coords)
            .filter(|&pos| mine_mask[pos.to_nd_index()])
            .count() as u8;
    }
    adjacency
}

/// How many mines the first reveal asked for and how many were actually placed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MinePlacement {
    pub requested: CellCount,
    pub placed: CellCount,
}

impl MinePlacement {
    pub const fn was_clamped(&self) -> bool {
        self.placed != self.requested
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkKind {
    NoChange,
    Changed,
}

impl MarkKind {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealKind {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealKind {
    pub const fn has_update(self) -> bool {
        use RevealKind::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

/// Result of a reveal command, enough for a front end to redraw incrementally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealOutcome {
    pub kind: RevealKind,
    /// Every cell whose visible state changed during the command.
    pub changed: Vec<Coord2>,
    pub status: GameStatus,
    /// Set only on the command that placed the mines.
    pub placement: Option<MinePlacement>,
}

impl RevealOutcome {
    pub(crate) fn no_change(status: GameStatus) -> Self {
        Self {
            kind: RevealKind::NoChange,
            changed: Vec::new(),
            status,
            placement: None,
        }
    }

    pub const fn has_update(&self) -> bool {
        self.kind.has_update()
    }
}

/// Result of a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub kind: MarkKind,
    pub changed: Option<Coord2>,
    pub flags_placed: CellCount,
    /// `mine_count - flags_placed`, negative when over-flagged.
    pub flags_remaining: i32,
}

impl ToggleOutcome {
    pub const fn has_update(&self) -> bool {
        self.kind.has_update()
    }
}
