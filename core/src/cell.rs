use serde::{Deserialize, Serialize};

/// Player-visible state of one cell.
///
/// Revealed and flagged are separate variants, so a cell can never be both.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineCell {
    #[default]
    Hidden,
    Flagged,
    Revealed,
}

impl EngineCell {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }
}

/// What a front end may know about a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellView {
    pub revealed: bool,
    pub flagged: bool,
    /// Only disclosed once the cell is revealed or the game is over.
    pub is_mine: Option<bool>,
    /// Only disclosed for revealed cells without a mine.
    pub adjacent_count: Option<u8>,
    /// The mine that ended the game, when known.
    pub triggered: bool,
}
