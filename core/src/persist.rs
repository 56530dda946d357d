//! Saved-game format shared with the browser front end.
//!
//! A session is stored as one JSON object:
//!
//! ```json
//! {"rows":2,"cols":2,"bombs":1,"boardState":[1,2,0,4],"adjacentCounts":[1,0,1,1],
//!  "isFirstMove":false,"elapsedSeconds":12,"gameActive":true,"isPaused":false}
//! ```
//!
//! `boardState` holds one [`CellBits`] byte per cell in row-major order.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use bitflags::bitflags;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::corrupt;
use crate::*;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct CellBits: u8 {
        const REVEALED = 1;
        const MINE     = 1 << 1;
        const FLAGGED  = 1 << 2;
    }
}

impl CellBits {
    fn from_cell(cell: EngineCell, is_mine: bool) -> Self {
        let mut bits = match cell {
            EngineCell::Hidden => Self::empty(),
            EngineCell::Flagged => Self::FLAGGED,
            EngineCell::Revealed => Self::REVEALED,
        };
        bits.set(Self::MINE, is_mine);
        bits
    }

    /// Revealed wins over flagged, older saves wrote both after a loss.
    fn to_cell(self) -> EngineCell {
        if self.contains(Self::REVEALED) {
            EngineCell::Revealed
        } else if self.contains(Self::FLAGGED) {
            EngineCell::Flagged
        } else {
            EngineCell::Hidden
        }
    }
}

impl StorageKey for GameSession {
    const KEY: &'static str = "minesweeperState";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub rows: u32,
    pub cols: u32,
    pub bombs: u32,
    pub board_state: Vec<u8>,
    pub adjacent_counts: Vec<u8>,
    pub is_first_move: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
}

impl PersistedState {
    pub fn capture(session: &GameSession) -> Self {
        let (rows, cols) = session.size();
        let layout = session.layout();
        let board_state = session
            .board()
            .iter()
            .zip(layout.mine_mask().iter())
            .map(|(&cell, &is_mine)| CellBits::from_cell(cell, is_mine).bits())
            .collect();

        Self {
            rows: rows.into(),
            cols: cols.into(),
            bombs: session.mine_count().into(),
            board_state,
            adjacent_counts: layout.adjacency().iter().copied().collect(),
            is_first_move: session.first_move_pending(),
            elapsed_seconds: session.elapsed_secs(),
            game_active: Some(session.status().is_active()),
            is_paused: session.paused(),
        }
    }

    /// Validates the record and rebuilds the session, `seed` drives any pending mine placement.
    pub fn restore(self, seed: u64) -> Result<GameSession> {
        let rows = Coord::try_from(self.rows)
            .map_err(|_| corrupt(format!("rows out of range: {}", self.rows)))?;
        let cols = Coord::try_from(self.cols)
            .map_err(|_| corrupt(format!("cols out of range: {}", self.cols)))?;
        if rows == 0 || cols == 0 {
            return Err(corrupt("board has no cells"));
        }
        let size = (rows, cols);
        let total = usize::from(mult(rows, cols));

        if self.board_state.len() != total {
            return Err(corrupt(format!(
                "boardState has {} cells, expected {}",
                self.board_state.len(),
                total
            )));
        }
        if self.adjacent_counts.len() != total {
            return Err(corrupt(format!(
                "adjacentCounts has {} cells, expected {}",
                self.adjacent_counts.len(),
                total
            )));
        }

        let bits = self
            .board_state
            .iter()
            .map(|&byte| {
                CellBits::from_bits(byte)
                    .ok_or_else(|| corrupt(format!("unknown cell bits {byte:#04b}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mine_mask = to_grid(size, bits.iter().map(|b| b.contains(CellBits::MINE)))?;
        let board = to_grid(size, bits.iter().map(|b| b.to_cell()))?;
        let adjacency = to_grid(size, self.adjacent_counts.iter().copied())?;

        let layout = MineLayout::from_mine_mask(mine_mask);
        let bombs = CellCount::try_from(self.bombs)
            .map_err(|_| corrupt(format!("bombs out of range: {}", self.bombs)))?;

        let config = if self.is_first_move {
            let config = GameConfig::new(size, bombs)
                .map_err(|err| corrupt(format!("saved configuration rejected: {err}")))?;
            if layout.mine_count() != 0 {
                return Err(corrupt("mines present before the first move"));
            }
            if board.iter().any(|cell| cell.is_revealed()) {
                return Err(corrupt("revealed cells before the first move"));
            }
            if adjacency.iter().any(|&count| count != 0) {
                return Err(corrupt("adjacency counts before the first move"));
            }
            config
        } else {
            if &adjacency != layout.adjacency() {
                return Err(corrupt("adjacentCounts do not match the mines"));
            }
            if usize::from(layout.mine_count()) >= total {
                return Err(corrupt("mines fill the whole board"));
            }
            if layout.mine_count() != bombs {
                log::warn!(
                    "Saved game declares {} bombs but holds {}, using the board",
                    bombs,
                    layout.mine_count()
                );
            }
            GameConfig::new_unchecked(size, layout.mine_count())
        };

        let mut session =
            GameSession::from_parts(config, layout, board, self.is_first_move, seed);
        if let Some(active) = self.game_active {
            if active != session.status().is_active() {
                log::warn!(
                    "Saved game says active={} but the board is {:?}",
                    active,
                    session.status()
                );
            }
        }
        if let Some(secs) = self.elapsed_seconds {
            session.set_elapsed_secs(secs);
        }
        if let Some(paused) = self.is_paused {
            session.set_paused(paused);
        }
        Ok(session)
    }
}

fn to_grid<T>(size: Coord2, cells: impl Iterator<Item = T>) -> Result<Array2<T>> {
    Array2::from_shape_vec(size.to_nd_index(), cells.collect())
        .map_err(|err| corrupt(format!("bad board shape: {err}")))
}

pub fn serialize(session: &GameSession) -> Result<String> {
    serde_json::to_string(&PersistedState::capture(session))
        .map_err(|err| corrupt(format!("could not encode session: {err}")))
}

pub fn deserialize(data: &str, seed: u64) -> Result<GameSession> {
    let state: PersistedState =
        serde_json::from_str(data).map_err(|err| corrupt(format!("{err}")))?;
    state.restore(seed)
}
