use crate::*;
pub use random::*;

mod random;

pub trait MinefieldGenerator {
    /// Places mines for a game whose first reveal is at `start`.
    fn generate(self, config: GameConfig, start: Coord2) -> MineLayout;
}

/// Mine count actually placed when only `eligible` cells may hold one.
///
/// Asking for as many mines as there are eligible cells leaves one of them free, and with
/// nothing eligible no mine is placed at all.
pub const fn clamp_mine_count(requested: CellCount, eligible: CellCount) -> CellCount {
    if eligible == 0 {
        0
    } else if requested >= eligible {
        let reduced = eligible - 1;
        if reduced > 1 { reduced } else { 1 }
    } else {
        requested
    }
}
