use alloc::vec::Vec;
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Active,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One game from creation to win or loss.
///
/// Mines are placed lazily by the first successful [`reveal`](Self::reveal), so the first
/// cell opened and its neighbors never hold a mine.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSession {
    config: GameConfig,
    layout: MineLayout,
    board: Array2<EngineCell>,
    flagged_count: CellCount,
    first_move_pending: bool,
    status: GameStatus,
    triggered_mine: Option<Coord2>,
    elapsed_secs: Option<u32>,
    paused: Option<bool>,
    seed: u64,
}

impl GameSession {
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "New {}x{} game with {} mines",
            config.rows(),
            config.cols(),
            config.mines
        );
        Ok(Self {
            config,
            layout: MineLayout::empty(config.size),
            board: Array2::default(config.size.to_nd_index()),
            flagged_count: 0,
            first_move_pending: true,
            status: GameStatus::Active,
            triggered_mine: None,
            elapsed_secs: None,
            paused: None,
            seed,
        })
    }

    /// A session whose mines are already known, as if the first reveal had placed them.
    pub fn with_layout(layout: MineLayout) -> Self {
        let size = layout.size();
        Self {
            config: GameConfig::new_unchecked(size, layout.mine_count()),
            layout,
            board: Array2::default(size.to_nd_index()),
            flagged_count: 0,
            first_move_pending: false,
            status: GameStatus::Active,
            triggered_mine: None,
            elapsed_secs: None,
            paused: None,
            seed: 0,
        }
    }

    /// Rebuilds a session from already validated parts, status is derived from the board.
    pub(crate) fn from_parts(
        config: GameConfig,
        layout: MineLayout,
        board: Array2<EngineCell>,
        first_move_pending: bool,
        seed: u64,
    ) -> Self {
        let flagged_count = board
            .iter()
            .filter(|cell| cell.is_flagged())
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        let mut session = Self {
            config,
            layout,
            board,
            flagged_count,
            first_move_pending,
            status: GameStatus::Active,
            triggered_mine: None,
            elapsed_secs: None,
            paused: None,
            seed,
        };
        session.status = session.derive_status();
        session
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn first_move_pending(&self) -> bool {
        self.first_move_pending
    }

    /// Mines on the board, or the requested amount while placement is still pending.
    pub fn mine_count(&self) -> CellCount {
        if self.first_move_pending {
            self.config.mines
        } else {
            self.layout.mine_count()
        }
    }

    pub fn flags_placed(&self) -> CellCount {
        self.flagged_count
    }

    /// Mines minus flags, negative when the player placed more flags than mines.
    pub fn flags_remaining(&self) -> i32 {
        i32::from(self.mine_count()) - i32::from(self.flagged_count)
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn elapsed_secs(&self) -> Option<u32> {
        self.elapsed_secs
    }

    pub fn set_elapsed_secs(&mut self, secs: u32) {
        self.elapsed_secs = Some(secs);
    }

    pub fn paused(&self) -> Option<bool> {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = Some(paused);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn layout(&self) -> &MineLayout {
        &self.layout
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<EngineCell> {
        in_bounds(coords, self.size()).then(|| self.board[coords.to_nd_index()])
    }

    pub fn cell_view(&self, coords: Coord2) -> Option<CellView> {
        let cell = self.cell_at(coords)?;
        let revealed = cell.is_revealed();
        let has_mine = self.layout.contains_mine(coords);
        let disclosed = revealed || self.is_finished();

        Some(CellView {
            revealed,
            flagged: cell.is_flagged(),
            is_mine: disclosed.then_some(has_mine),
            adjacent_count: (revealed && !has_mine)
                .then(|| self.layout.adjacent_mine_count(coords)),
            triggered: self.triggered_mine == Some(coords),
        })
    }

    pub fn cell_view_at_index(&self, index: usize) -> Option<CellView> {
        self.cell_view(coords_of(index, self.size())?)
    }

    pub(crate) fn board(&self) -> &Array2<EngineCell> {
        &self.board
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> ToggleOutcome {
        let changed = self.do_toggle_flag(coords);
        ToggleOutcome {
            kind: if changed.is_some() {
                MarkKind::Changed
            } else {
                MarkKind::NoChange
            },
            changed,
            flags_placed: self.flagged_count,
            flags_remaining: self.flags_remaining(),
        }
    }

    fn do_toggle_flag(&mut self, coords: Coord2) -> Option<Coord2> {
        use EngineCell::*;

        if !self.accepts_moves_at(coords) {
            return None;
        }

        let cell = &mut self.board[coords.to_nd_index()];
        match *cell {
            Hidden => {
                *cell = Flagged;
                self.flagged_count += 1;
            }
            Flagged => {
                *cell = Hidden;
                self.flagged_count -= 1;
            }
            Revealed => return None,
        }
        log::trace!("Toggled flag at {:?}, {} flags", coords, self.flagged_count);
        Some(coords)
    }

    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        if !self.accepts_moves_at(coords) {
            return RevealOutcome::no_change(self.status);
        }
        if !matches!(self.board[coords.to_nd_index()], EngineCell::Hidden) {
            log::trace!("Ignoring reveal on open or flagged cell {:?}", coords);
            return RevealOutcome::no_change(self.status);
        }

        let placement = if self.first_move_pending {
            Some(self.place_mines(coords))
        } else {
            None
        };

        if self.layout.contains_mine(coords) {
            let changed = self.reveal_all();
            self.triggered_mine = Some(coords);
            self.status = GameStatus::Lost;
            log::debug!("Hit a mine at {:?}", coords);
            return RevealOutcome {
                kind: RevealKind::HitMine,
                changed,
                status: self.status,
                placement,
            };
        }

        let changed = self.flood_reveal(coords);

        let kind = if self.all_safe_cells_revealed() {
            self.status = GameStatus::Won;
            log::debug!("All safe cells revealed, game won");
            RevealKind::Won
        } else {
            RevealKind::Revealed
        };

        RevealOutcome {
            kind,
            changed,
            status: self.status,
            placement,
        }
    }

    fn place_mines(&mut self, start: Coord2) -> MinePlacement {
        self.layout = SafeZoneGenerator::new(self.seed).generate(self.config, start);
        self.first_move_pending = false;
        MinePlacement {
            requested: self.config.mines,
            placed: self.layout.mine_count(),
        }
    }

    /// Opens `start` and, while the opened cell has no adjacent mines, its neighbors.
    ///
    /// Flagged cells stop the fill.
    fn flood_reveal(&mut self, start: Coord2) -> Vec<Coord2> {
        let mut changed = Vec::new();
        let mut visited = HashSet::new();
        let mut to_visit = Vec::from([start]);

        while let Some(coords) = to_visit.pop() {
            if !visited.insert(coords) {
                continue;
            }

            let cell = &mut self.board[coords.to_nd_index()];
            if !matches!(*cell, EngineCell::Hidden) || self.layout.contains_mine(coords) {
                continue;
            }

            *cell = EngineCell::Revealed;
            changed.push(coords);

            let count = self.layout.adjacent_mine_count(coords);
            log::trace!("Opened {:?}, {} adjacent mines", coords, count);
            if count == 0 {
                to_visit.extend(
                    self.board
                        .iter_neighbors(coords)
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }

        changed
    }

    /// Discloses the whole board after a loss, flags included.
    fn reveal_all(&mut self) -> Vec<Coord2> {
        let size = self.size();
        let mut changed = Vec::new();
        for (index, cell) in self.board.iter_mut().enumerate() {
            if cell.is_revealed() {
                continue;
            }
            *cell = EngineCell::Revealed;
            changed.extend(coords_of(index, size));
        }
        self.flagged_count = 0;
        changed
    }

    fn all_safe_cells_revealed(&self) -> bool {
        self.board
            .iter()
            .zip(self.layout.mine_mask().iter())
            .all(|(cell, &is_mine)| is_mine || cell.is_revealed())
    }

    fn derive_status(&self) -> GameStatus {
        let mine_revealed = self
            .board
            .iter()
            .zip(self.layout.mine_mask().iter())
            .any(|(cell, &is_mine)| is_mine && cell.is_revealed());

        if mine_revealed {
            GameStatus::Lost
        } else if !self.first_move_pending && self.all_safe_cells_revealed() {
            GameStatus::Won
        } else {
            GameStatus::Active
        }
    }

    fn accepts_moves_at(&self, coords: Coord2) -> bool {
        if !in_bounds(coords, self.size()) {
            log::trace!("Ignoring move outside the board at {:?}", coords);
            return false;
        }
        if self.status.is_finished() {
            log::trace!("Ignoring move at {:?}, game is over", coords);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: Coord2, mines: &[Coord2]) -> MineLayout {
        MineLayout::from_mine_coords(size, mines).unwrap()
    }

    fn count_mines(session: &GameSession) -> usize {
        session.layout().iter_mine_coords().count()
    }

    #[test]
    fn new_session_is_blank() {
        let session = GameSession::new(GameConfig::beginner(), 0).unwrap();

        assert!(session.first_move_pending());
        assert_eq!(session.status(), GameStatus::Active);
        assert_eq!(count_mines(&session), 0);
        assert!(session.board().iter().all(|&cell| cell == EngineCell::Hidden));
        assert!(session.layout().adjacency().iter().all(|&count| count == 0));
    }

    #[test]
    fn new_session_rejects_too_many_mines() {
        let config = GameConfig::new_unchecked((2, 2), 4);
        assert!(matches!(
            GameSession::new(config, 0),
            Err(GameError::InvalidConfiguration(ConfigError::TooManyMines { .. }))
        ));
    }

    #[test]
    fn first_reveal_places_requested_mines_outside_safe_zone() {
        let config = GameConfig::intermediate();
        for seed in 0..50 {
            let mut session = GameSession::new(config, seed).unwrap();
            let start = ((seed % 16) as Coord, (seed * 7 % 16) as Coord);

            let outcome = session.reveal(start);

            assert_eq!(
                outcome.placement,
                Some(MinePlacement {
                    requested: 40,
                    placed: 40
                })
            );
            assert_eq!(count_mines(&session), 40);
            assert!(!session.first_move_pending());
            assert_ne!(outcome.kind, RevealKind::HitMine);
            for coords in NeighborIter::new(start, config.size, true) {
                assert!(!session.layout().contains_mine(coords));
            }
            // the safe zone guarantees the opened cell is a zero, so the fill happened
            assert_eq!(session.layout().adjacent_mine_count(start), 0);
            for &coords in &outcome.changed {
                assert!(!session.layout().contains_mine(coords));
            }
        }
    }

    #[test]
    fn second_reveal_does_not_place_again() {
        let mut session = GameSession::new(GameConfig::expert(), 9).unwrap();
        session.reveal((8, 15));
        let before = session.layout().clone();

        let target = (0..16)
            .flat_map(|row| (0..30).map(move |col| (row, col)))
            .find(|&coords| session.cell_at(coords) == Some(EngineCell::Hidden))
            .unwrap();
        let outcome = session.reveal(target);

        assert_eq!(outcome.placement, None);
        assert_eq!(session.layout(), &before);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_border() {
        // . . . .
        // . . . .
        // . . 1 1
        // . . 1 *
        let mut session = GameSession::with_layout(layout((4, 4), &[(3, 3)]));

        let outcome = session.reveal((0, 0));

        assert_eq!(outcome.kind, RevealKind::Won);
        assert_eq!(outcome.changed.len(), 15);
        assert_eq!(session.cell_at((3, 3)), Some(EngineCell::Hidden));
        assert_eq!(
            session.cell_view((2, 2)).unwrap().adjacent_count,
            Some(1)
        );
    }

    #[test]
    fn flood_fill_stops_at_flags() {
        // . . . *
        // . . . .
        // . . . .
        let mut session = GameSession::with_layout(layout((3, 4), &[(0, 3)]));
        session.toggle_flag((2, 0));

        let outcome = session.reveal((2, 1));

        assert_eq!(outcome.kind, RevealKind::Revealed);
        assert_eq!(session.cell_at((2, 0)), Some(EngineCell::Flagged));
        assert_eq!(session.cell_at((0, 0)), Some(EngineCell::Revealed));
        assert!(!outcome.changed.contains(&(2, 0)));
    }

    #[test]
    fn numbered_cell_opens_alone() {
        let mut session = GameSession::with_layout(layout((3, 3), &[(0, 0)]));

        let outcome = session.reveal((1, 1));

        assert_eq!(outcome.kind, RevealKind::Revealed);
        assert_eq!(outcome.changed, [(1, 1)]);
    }

    #[test]
    fn hitting_a_mine_reveals_everything() {
        let mut session = GameSession::with_layout(layout((2, 3), &[(0, 0), (1, 2)]));
        session.toggle_flag((1, 2));
        session.reveal((0, 2));

        let outcome = session.reveal((0, 0));

        assert_eq!(outcome.kind, RevealKind::HitMine);
        assert_eq!(outcome.status, GameStatus::Lost);
        assert_eq!(outcome.changed.len(), 5);
        assert!(session.board().iter().all(|cell| cell.is_revealed()));
        assert_eq!(session.triggered_mine(), Some((0, 0)));
        assert_eq!(session.flags_placed(), 0);
        assert!(session.cell_view((0, 0)).unwrap().triggered);
    }

    #[test]
    fn finished_game_ignores_commands() {
        let mut session = GameSession::with_layout(layout((1, 3), &[(0, 0)]));
        session.reveal((0, 0));
        assert_eq!(session.status(), GameStatus::Lost);

        assert_eq!(session.reveal((0, 2)).kind, RevealKind::NoChange);
        assert_eq!(session.toggle_flag((0, 2)).kind, MarkKind::NoChange);
    }

    #[test]
    fn revealing_last_safe_cell_wins_in_same_command() {
        let mut session = GameSession::with_layout(layout((1, 3), &[(0, 0)]));

        assert_eq!(session.reveal((0, 1)).kind, RevealKind::Revealed);
        let outcome = session.reveal((0, 2));

        assert_eq!(outcome.kind, RevealKind::Won);
        assert_eq!(outcome.status, GameStatus::Won);
        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.cell_at((0, 0)), Some(EngineCell::Hidden));
    }

    #[test]
    fn flagged_cell_cannot_be_revealed_and_revealed_cell_cannot_be_flagged() {
        let mut session = GameSession::with_layout(layout((2, 2), &[(0, 0)]));

        session.toggle_flag((1, 1));
        assert_eq!(session.reveal((1, 1)).kind, RevealKind::NoChange);
        assert_eq!(session.cell_at((1, 1)), Some(EngineCell::Flagged));

        session.reveal((0, 1));
        let outcome = session.toggle_flag((0, 1));
        assert_eq!(outcome.kind, MarkKind::NoChange);
        assert_eq!(outcome.changed, None);
        assert_eq!(session.cell_at((0, 1)), Some(EngineCell::Revealed));
    }

    #[test]
    fn toggling_twice_restores_initial_state() {
        let initial = GameSession::new(GameConfig::beginner(), 5).unwrap();
        let mut session = initial.clone();

        let first = session.toggle_flag((4, 4));
        assert_eq!(first.kind, MarkKind::Changed);
        assert_eq!(first.flags_placed, 1);
        assert_eq!(first.flags_remaining, 9);

        let second = session.toggle_flag((4, 4));
        assert_eq!(second.flags_placed, 0);
        assert_eq!(session, initial);
    }

    #[test]
    fn over_flagging_goes_negative() {
        let mut session = GameSession::with_layout(layout((2, 2), &[(0, 0)]));
        session.toggle_flag((0, 0));
        session.toggle_flag((0, 1));
        let outcome = session.toggle_flag((1, 0));

        assert_eq!(outcome.flags_placed, 3);
        assert_eq!(outcome.flags_remaining, -2);
        assert_eq!(session.flags_remaining(), -2);
    }

    #[test]
    fn out_of_bounds_is_a_no_op() {
        let mut session = GameSession::new(GameConfig::beginner(), 0).unwrap();

        assert_eq!(session.reveal((9, 0)).kind, RevealKind::NoChange);
        assert_eq!(session.toggle_flag((0, 200)).kind, MarkKind::NoChange);
        assert!(session.first_move_pending());
        assert_eq!(session.cell_view((9, 9)), None);
    }

    #[test]
    fn first_reveal_on_flag_does_not_place_mines() {
        let mut session = GameSession::new(GameConfig::beginner(), 0).unwrap();
        session.toggle_flag((3, 3));

        let outcome = session.reveal((3, 3));

        assert_eq!(outcome.kind, RevealKind::NoChange);
        assert!(session.first_move_pending());
    }

    #[test]
    fn one_by_two_board_is_won_immediately() {
        let config = GameConfig::new((1, 2), 1).unwrap();
        let mut session = GameSession::new(config, 0).unwrap();

        let outcome = session.reveal((0, 0));

        assert_eq!(
            outcome.placement,
            Some(MinePlacement {
                requested: 1,
                placed: 0
            })
        );
        assert!(outcome.placement.unwrap().was_clamped());
        assert_eq!(outcome.kind, RevealKind::Won);
        assert_eq!(session.mine_count(), 0);
    }

    #[test]
    fn center_of_three_by_three_leaves_nothing_eligible() {
        let config = GameConfig::new((3, 3), 8).unwrap();
        let mut session = GameSession::new(config, 11).unwrap();

        let outcome = session.reveal((1, 1));

        assert_eq!(outcome.placement.map(|p| p.placed), Some(0));
        assert_eq!(outcome.changed.len(), 9);
        assert_eq!(session.status(), GameStatus::Won);
    }

    #[test]
    fn clamped_count_is_surfaced_as_mine_count() {
        // corner start on 3x3 keeps 5 cells eligible, so 8 requested becomes 4
        let config = GameConfig::new((3, 3), 8).unwrap();
        let mut session = GameSession::new(config, 2).unwrap();
        assert_eq!(session.mine_count(), 8);

        let outcome = session.reveal((0, 0));

        assert_eq!(outcome.placement.map(|p| p.placed), Some(4));
        assert_eq!(session.mine_count(), 4);
        assert_eq!(count_mines(&session), 4);
    }

    #[test]
    fn cell_view_hides_mines_until_game_over() {
        let mut session = GameSession::with_layout(layout((1, 3), &[(0, 2)]));

        let hidden = session.cell_view((0, 2)).unwrap();
        assert_eq!(hidden.is_mine, None);
        assert_eq!(hidden.adjacent_count, None);

        session.reveal((0, 1));
        let open = session.cell_view_at_index(1).unwrap();
        assert!(open.revealed);
        assert_eq!(open.is_mine, Some(false));
        assert_eq!(open.adjacent_count, Some(1));

        session.reveal((0, 0));
        assert_eq!(session.status(), GameStatus::Won);
        let mine = session.cell_view((0, 2)).unwrap();
        assert!(!mine.revealed);
        assert_eq!(mine.is_mine, Some(true));
        assert_eq!(mine.adjacent_count, None);
    }

    #[test]
    fn reveal_never_leaves_cell_both_flagged_and_revealed() {
        for seed in 0..30 {
            let mut session = GameSession::new(GameConfig::beginner(), seed).unwrap();
            session.toggle_flag((0, 0));
            session.toggle_flag((8, 8));
            session.reveal((4, 4));
            let flags = session
                .board()
                .iter()
                .filter(|cell| cell.is_flagged())
                .count();
            assert_eq!(flags, usize::from(session.flags_placed()));
        }
    }
}
