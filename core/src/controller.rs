use rand::prelude::*;

use crate::*;

/// Front-end facing driver: runs commands against the current session and saves it after
/// every change.
#[derive(Debug)]
pub struct GameController<S> {
    store: S,
    session: GameSession,
    default_config: GameConfig,
    rng: SmallRng,
}

impl<S: KeyValueStore> GameController<S> {
    /// Resumes the saved game, or starts a `default_config` game when there is none or it
    /// cannot be read.
    pub fn restore(store: S, default_config: GameConfig, seed: u64) -> Result<Self> {
        default_config.validate()?;
        let mut rng = SmallRng::seed_from_u64(seed);

        let saved = match store.get(GameSession::KEY) {
            Ok(saved) => saved,
            Err(err) => {
                log::warn!("Could not read saved game, starting fresh: {}", err);
                None
            }
        };
        let restored = saved.and_then(|data| match deserialize(&data, rng.random()) {
            Ok(session) => {
                log::debug!("Resumed saved game, status {:?}", session.status());
                Some(session)
            }
            Err(err) => {
                log::warn!("Discarding saved game: {}", err);
                None
            }
        });

        let session = match restored {
            Some(session) => session,
            None => GameSession::new(default_config, rng.random())?,
        };

        Ok(Self {
            store,
            session,
            default_config,
            rng,
        })
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn new_game(&mut self, config: GameConfig) -> Result<()> {
        self.session = GameSession::new(config, self.rng.random())?;
        self.save()
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let outcome = self.session.reveal(coords);
        if outcome.has_update() {
            self.save()?;
        }
        Ok(outcome)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<ToggleOutcome> {
        let outcome = self.session.toggle_flag(coords);
        if outcome.has_update() {
            self.save()?;
        }
        Ok(outcome)
    }

    /// Replaces the current game with a serialized one, the current game is kept on error.
    pub fn load_session(&mut self, data: &str) -> Result<()> {
        let session = deserialize(data, self.rng.random())?;
        self.store.set(GameSession::KEY, serialize(&session)?)?;
        self.session = session;
        Ok(())
    }

    /// Forgets the saved game and starts over with the default configuration.
    pub fn reset_session(&mut self) -> Result<()> {
        self.store.remove(GameSession::KEY)?;
        self.session = GameSession::new(self.default_config, self.rng.random())?;
        log::debug!("Session reset");
        Ok(())
    }

    pub fn set_elapsed_secs(&mut self, secs: u32) -> Result<()> {
        self.session.set_elapsed_secs(secs);
        self.save()
    }

    pub fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.session.set_paused(paused);
        self.save()
    }

    pub fn status(&self) -> GameStatus {
        self.session.status()
    }

    pub fn flags_remaining(&self) -> i32 {
        self.session.flags_remaining()
    }

    pub fn cell_view(&self, index: usize) -> Option<CellView> {
        self.session.cell_view_at_index(index)
    }

    fn save(&mut self) -> Result<()> {
        let data = serialize(&self.session)?;
        self.store.set(GameSession::KEY, data)
    }
}
