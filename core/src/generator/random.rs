use super::*;
use alloc::vec::Vec;
use smallvec::SmallVec;

/// Random generation that keeps the first revealed cell and its neighbors free of mines.
#[derive(Clone, Debug, PartialEq)]
pub struct SafeZoneGenerator {
    seed: u64,
}

impl SafeZoneGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for SafeZoneGenerator {
    fn generate(self, config: GameConfig, start: Coord2) -> MineLayout {
        use rand::prelude::*;

        let size = config.size;
        let mut mines: Array2<bool> = Array2::default(size.to_nd_index());

        let safe_zone: SmallVec<[usize; 9]> = mines
            .iter_block(start)
            .map(|coords| flat_index(coords, size))
            .collect();
        let mut eligible: Vec<usize> = (0..usize::from(config.total_cells()))
            .filter(|index| !safe_zone.contains(index))
            .collect();

        let eligible_count = CellCount::try_from(eligible.len()).unwrap_or(CellCount::MAX);
        let mine_count = clamp_mine_count(config.mines, eligible_count);
        if mine_count != config.mines {
            log::warn!(
                "Not enough room outside the safe zone, requested {} mines but placing {} ({} eligible cells)",
                config.mines,
                mine_count,
                eligible_count
            );
        }

        // partial Fisher-Yates: the first `mine_count` slots end up a uniform sample
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let cells = mines
            .as_slice_mut()
            .expect("freshly allocated board is in standard layout");
        for slot in 0..usize::from(mine_count) {
            let pick = rng.random_range(slot..eligible.len());
            eligible.swap(slot, pick);
            cells[eligible[slot]] = true;
        }

        let layout = MineLayout::from_mine_mask(mines);
        log::debug!(
            "Placed {} mines on a {}x{} board, safe zone around {:?}",
            layout.mine_count(),
            size.0,
            size.1,
            start
        );
        layout
    }
}
