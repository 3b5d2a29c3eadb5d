//! Zone progress: the locked → unlocked → completed state machine.
//!
//! Zones are seeded from [`catalog::ZONE_SEEDS`] with only the first one
//! unlocked.  Completing a zone unlocks the next one if it is still locked.
//! No transition ever moves a zone backwards; only [`ZoneProgress::reset_progress`]
//! restores the seed list.

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog;
use crate::error::Result;
use crate::interaction::{UserPrompt, RESET_CONFIRMATION, RESET_DONE};
use crate::persistence::{self, KvStore};
use crate::types::{Zone, ZoneId, ZoneState};

/// Result of [`ZoneProgress::reset_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The user declined; nothing changed.
    Declined,
    /// Zones were restored and stored lobbies deleted.
    Reset,
}

/// Owner of the zone list.
pub struct ZoneProgress {
    zones: Vec<Zone>,
    store: Arc<dyn KvStore>,
}

impl std::fmt::Debug for ZoneProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneProgress")
            .field("zones", &self.zones)
            .finish_non_exhaustive()
    }
}

impl ZoneProgress {
    /// Start from the seed zones.  `store` is where lobbies live, so a reset
    /// can clear them.
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            zones: catalog::seed_zones(),
            store,
        }
    }

    /// All zones in progression order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Look up a zone by id.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Whether the zone exists and is not locked.
    #[must_use]
    pub fn is_zone_accessible(&self, id: ZoneId) -> bool {
        self.zone(id).is_some_and(|z| z.state != ZoneState::Locked)
    }

    /// Mark a zone completed and unlock the following one if it is locked.
    ///
    /// Returns `false` if no zone has this id.
    pub fn complete_zone(&mut self, id: ZoneId) -> bool {
        let Some(index) = self.zones.iter().position(|z| z.id == id) else {
            return false;
        };

        self.zones[index].state = ZoneState::Completed;

        if let Some(next) = self.zones.get_mut(index + 1) {
            if next.state == ZoneState::Locked {
                next.state = ZoneState::Unlocked;
                debug!(zone = %next.id, "Zone unlocked");
            }
        }

        debug!(zone = %id, "Zone completed");
        true
    }

    /// Wipe all progress after confirmation.
    ///
    /// Restores the seed zones and deletes the stored lobby of every known
    /// zone, then notifies the user.  A declined confirmation changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if deleting a stored lobby fails.
    pub fn reset_progress(&mut self, prompt: &dyn UserPrompt) -> Result<ResetOutcome> {
        if !prompt.confirm(RESET_CONFIRMATION) {
            debug!("Progress reset declined");
            return Ok(ResetOutcome::Declined);
        }

        self.zones = catalog::seed_zones();

        let mut deleted = 0_usize;
        for zone in catalog::known_zone_ids() {
            if persistence::delete_lobby(self.store.as_ref(), zone)? {
                deleted += 1;
            }
        }

        info!(lobbies_deleted = deleted, "Progress reset");
        prompt.notify(RESET_DONE);
        Ok(ResetOutcome::Reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::testing::RecordingPrompt;
    use crate::persistence::MemoryKvStore;
    use crate::types::LobbyState;

    fn progress() -> (ZoneProgress, Arc<MemoryKvStore>) {
        let store = Arc::new(MemoryKvStore::new());
        (ZoneProgress::new(store.clone()), store)
    }

    fn states(progress: &ZoneProgress) -> Vec<ZoneState> {
        progress.zones().iter().map(|z| z.state).collect()
    }

    #[test]
    fn unknown_zone_is_absent_and_inaccessible() {
        let (progress, _) = progress();
        for id in [0, 6, 42, u32::MAX] {
            assert!(progress.zone(ZoneId(id)).is_none());
            assert!(!progress.is_zone_accessible(ZoneId(id)));
        }
    }

    #[test]
    fn only_first_zone_accessible_at_start() {
        let (progress, _) = progress();
        assert!(progress.is_zone_accessible(ZoneId(1)));
        for id in 2..=5 {
            assert!(!progress.is_zone_accessible(ZoneId(id)));
        }
    }

    #[test]
    fn completing_first_zone_unlocks_second() {
        let (mut progress, _) = progress();
        assert!(progress.complete_zone(ZoneId(1)));
        assert_eq!(
            states(&progress),
            vec![
                ZoneState::Completed,
                ZoneState::Unlocked,
                ZoneState::Locked,
                ZoneState::Locked,
                ZoneState::Locked,
            ]
        );
    }

    #[test]
    fn completing_again_is_a_no_op() {
        let (mut progress, _) = progress();
        progress.complete_zone(ZoneId(1));
        progress.complete_zone(ZoneId(2));
        let before = states(&progress);
        progress.complete_zone(ZoneId(1));
        assert_eq!(states(&progress), before);
        assert_eq!(progress.zone(ZoneId(2)).map(|z| z.state), Some(ZoneState::Completed));
    }

    #[test]
    fn next_zone_already_unlocked_is_left_alone() {
        let (mut progress, _) = progress();
        progress.complete_zone(ZoneId(1));
        progress.complete_zone(ZoneId(2));
        // Zone 3 is unlocked now; re-completing 2 must not touch it.
        progress.complete_zone(ZoneId(2));
        assert_eq!(progress.zone(ZoneId(3)).map(|z| z.state), Some(ZoneState::Unlocked));
    }

    #[test]
    fn completing_last_zone_has_no_unlock_side_effect() {
        let (mut progress, _) = progress();
        assert!(progress.complete_zone(ZoneId(5)));
        assert_eq!(progress.zone(ZoneId(5)).map(|z| z.state), Some(ZoneState::Completed));
        assert_eq!(states(&progress)[..4], [
            ZoneState::Unlocked,
            ZoneState::Locked,
            ZoneState::Locked,
            ZoneState::Locked,
        ]);
    }

    #[test]
    fn completing_unknown_zone_changes_nothing() {
        let (mut progress, _) = progress();
        let before = states(&progress);
        assert!(!progress.complete_zone(ZoneId(9)));
        assert_eq!(states(&progress), before);
    }

    #[test]
    fn declined_reset_changes_nothing() {
        let (mut progress, store) = progress();
        progress.complete_zone(ZoneId(1));
        persistence::save_lobby(store.as_ref(), ZoneId(1), &LobbyState::default()).expect("save");

        let prompt = RecordingPrompt::answering(false);
        let outcome = progress.reset_progress(&prompt).expect("reset");

        assert_eq!(outcome, ResetOutcome::Declined);
        assert_eq!(progress.zone(ZoneId(1)).map(|z| z.state), Some(ZoneState::Completed));
        assert_eq!(store.len(), 1);
        assert_eq!(prompt.confirmations.borrow().len(), 1);
        assert!(prompt.notifications.borrow().is_empty());
    }

    #[test]
    fn confirmed_reset_restores_seed_and_clears_lobbies() {
        let (mut progress, store) = progress();
        for id in 1..=4 {
            progress.complete_zone(ZoneId(id));
        }
        for id in 1..=5 {
            persistence::save_lobby(store.as_ref(), ZoneId(id), &LobbyState::default()).expect("save");
        }
        store.put("unrelated", "kept").expect("put");

        let prompt = RecordingPrompt::answering(true);
        let outcome = progress.reset_progress(&prompt).expect("reset");

        assert_eq!(outcome, ResetOutcome::Reset);
        assert_eq!(progress.zones(), catalog::seed_zones().as_slice());
        assert_eq!(store.keys(), vec!["unrelated".to_string()]);
        assert_eq!(prompt.notifications.borrow().as_slice(), [RESET_DONE.to_string()]);
    }
}
