//! Game facade: owns both stores over one shared key-value backend.
//!
//! ```no_run
//! # use zonequest_core::{Game, GameConfig, ZoneId};
//! # use zonequest_core::interaction::HeadlessPrompt;
//! let mut game = Game::open(&GameConfig::default())?;
//! game.zones_mut().complete_zone(ZoneId(1));
//! game.lobbies().add_npc(ZoneId(2))?;
//! game.reset_progress(&HeadlessPrompt::accepting())?;
//! # Ok::<(), zonequest_core::error::ZoneError>(())
//! ```

use std::sync::Arc;

use tracing::info;

use crate::config::GameConfig;
use crate::error::Result;
use crate::interaction::UserPrompt;
use crate::lobby::LobbyStore;
use crate::persistence::{self, KvStore};
use crate::zones::{ResetOutcome, ZoneProgress};

/// Zone progress and lobbies sharing one storage backend.
#[derive(Debug)]
pub struct Game {
    zones: ZoneProgress,
    lobbies: LobbyStore,
}

impl Game {
    /// Open the backend named in `config` and start a fresh session.
    ///
    /// # Errors
    ///
    /// Returns `ZoneError::Config` for invalid settings or the backend's
    /// error if it cannot be opened.
    pub fn open(config: &GameConfig) -> Result<Self> {
        config.validate()?;
        let store = persistence::open_store(&config.persistence)?;
        info!(backend = ?config.persistence.backend, "Game session opened");
        Ok(Self::with_store(store, config))
    }

    /// Start a session over an existing backend.
    #[must_use]
    pub fn with_store(store: Arc<dyn KvStore>, config: &GameConfig) -> Self {
        Self {
            zones: ZoneProgress::new(store.clone()),
            lobbies: LobbyStore::new(store, config.capture.clone()),
        }
    }

    /// Zone progress.
    #[must_use]
    pub fn zones(&self) -> &ZoneProgress {
        &self.zones
    }

    /// Mutable zone progress.
    pub fn zones_mut(&mut self) -> &mut ZoneProgress {
        &mut self.zones
    }

    /// Lobby store handle.
    #[must_use]
    pub fn lobbies(&self) -> &LobbyStore {
        &self.lobbies
    }

    /// Reset zone progress and stored lobbies after confirmation.
    ///
    /// On confirmation the lobby cache is dropped as well, so no cached
    /// lobby or pending capture timer writes over the deleted entries.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if deleting a stored lobby fails.
    pub fn reset_progress(&mut self, prompt: &dyn UserPrompt) -> Result<ResetOutcome> {
        let outcome = self.zones.reset_progress(prompt)?;
        if outcome == ResetOutcome::Reset {
            self.lobbies.forget_all();
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use crate::interaction::testing::RecordingPrompt;
    use crate::persistence::MemoryKvStore;
    use crate::types::{LobbyState, ZoneId, ZoneState};

    #[test]
    fn open_with_memory_backend() {
        let mut config = GameConfig::default();
        config.persistence.backend = StorageBackend::Memory;
        let game = Game::open(&config).expect("open");
        assert_eq!(game.zones().zones().len(), 5);
    }

    #[test]
    fn open_rejects_invalid_config() {
        let mut config = GameConfig::default();
        config.persistence.backend = StorageBackend::Memory;
        config.capture.success_chance = -0.1;
        assert!(Game::open(&config).is_err());
    }

    #[test]
    fn reset_clears_cached_lobbies() {
        let store = Arc::new(MemoryKvStore::new());
        let mut game = Game::with_store(store.clone(), &GameConfig::default());
        game.zones_mut().complete_zone(ZoneId(1));
        game.lobbies().add_npc(ZoneId(1)).expect("add");
        game.lobbies().add_npc(ZoneId(3)).expect("add");

        let outcome = game.reset_progress(&RecordingPrompt::answering(true)).expect("reset");
        assert_eq!(outcome, ResetOutcome::Reset);
        assert!(store.is_empty());
        assert_eq!(game.zones().zone(ZoneId(2)).map(|z| z.state), Some(ZoneState::Locked));
        assert_eq!(game.lobbies().lobby_state(ZoneId(1)).expect("state"), LobbyState::default());
    }

    #[test]
    fn declined_reset_keeps_cached_lobbies() {
        let store = Arc::new(MemoryKvStore::new());
        let mut game = Game::with_store(store.clone(), &GameConfig::default());
        game.lobbies().add_npc(ZoneId(1)).expect("add");

        let outcome = game.reset_progress(&RecordingPrompt::answering(false)).expect("reset");
        assert_eq!(outcome, ResetOutcome::Declined);
        assert_eq!(store.len(), 1);
        assert_eq!(game.lobbies().lobby_state(ZoneId(1)).expect("state").npcs.len(), 3);
    }
}
