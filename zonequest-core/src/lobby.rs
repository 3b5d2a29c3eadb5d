//! Lobby store: per-zone NPC rosters, trainer toggle and the capture flow.
//!
//! Each zone's [`LobbyState`] is materialized on first access, from storage
//! when a well-formed entry exists and from [`LobbyState::default`]
//! otherwise.  Every operation follows the same contract: mutate the cached
//! state, then write the whole lobby back if anything changed.
//!
//! ## Capture timers
//!
//! [`LobbyStore::start_capture`] spawns a one-shot Tokio task that resolves
//! the search after [`CaptureConfig::search_delay`].  Timers are never
//! aborted.  Instead every start or cancel stamps the lobby with a fresh
//! generation; a timer only resolves if the lobby still carries the
//! generation it was spawned with *and* is still searching.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::catalog;
use crate::config::CaptureConfig;
use crate::error::{Result, ZoneError};
use crate::interaction::{UserPrompt, CATCH_ESCAPED, CATCH_SUCCESS};
use crate::persistence::{self, KvStore};
use crate::types::{CapturePhase, LobbyState, Npc, Sighting, ZoneId};

/// Result of [`LobbyStore::attempt_catch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The creature was caught.  `creature` is whatever the lobby had found,
    /// if anything.
    Caught {
        /// The caught creature.
        creature: Option<Sighting>,
    },
    /// The creature got away.
    Escaped,
}

impl CaptureOutcome {
    /// Whether the attempt succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Caught { .. })
    }
}

struct LobbyEntry {
    state: LobbyState,
    /// Token of the last start/cancel; 0 until the first one.
    generation: u64,
}

struct CaptureContext {
    rng: StdRng,
    last_generation: u64,
}

impl CaptureContext {
    fn next_generation(&mut self) -> u64 {
        self.last_generation += 1;
        self.last_generation
    }
}

struct Inner {
    lobbies: HashMap<ZoneId, LobbyEntry>,
    ctx: CaptureContext,
}

/// Owner of every zone's lobby.
///
/// Cloning yields another handle to the same lobbies.
#[derive(Clone)]
pub struct LobbyStore {
    inner: Arc<Mutex<Inner>>,
    store: Arc<dyn KvStore>,
    capture: CaptureConfig,
}

impl std::fmt::Debug for LobbyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self.inner.lock().lobbies.len();
        f.debug_struct("LobbyStore")
            .field("cached_lobbies", &cached)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}

impl LobbyStore {
    /// Create a store over `store`.  The RNG is seeded from
    /// `capture.rng_seed` when set.
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, capture: CaptureConfig) -> Self {
        let rng = match capture.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            inner: Arc::new(Mutex::new(Inner {
                lobbies: HashMap::new(),
                ctx: CaptureContext {
                    rng,
                    last_generation: 0,
                },
            })),
            store,
            capture,
        }
    }

    /// Snapshot of a zone's lobby, loading it on first access.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the initial read fails.
    pub fn lobby_state(&self, zone: ZoneId) -> Result<LobbyState> {
        let mut inner = self.inner.lock();
        let entry = materialize(&mut inner.lobbies, self.store.as_ref(), zone)?;
        Ok(entry.state.clone())
    }

    /// Current capture phase of a zone's lobby.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the initial read fails.
    pub fn capture_phase(&self, zone: ZoneId) -> Result<CapturePhase> {
        let mut inner = self.inner.lock();
        let entry = materialize(&mut inner.lobbies, self.store.as_ref(), zone)?;
        Ok(entry.state.capture_phase())
    }

    /// Append a visitor NPC and advance the lobby's NPC counter.
    ///
    /// # Errors
    ///
    /// Returns `ZoneError::RosterFull` once the counter cannot advance
    /// without reaching `u32::MAX`, or the backend's error if loading or
    /// saving fails.
    pub fn add_npc(&self, zone: ZoneId) -> Result<Npc> {
        let added = self.update(zone, |entry, _| {
            let next = entry
                .state
                .npc_counter
                .checked_add(1)
                .filter(|next| *next < u32::MAX)?;
            let npc = catalog::visitor(entry.state.npc_counter);
            entry.state.npc_counter = next;
            entry.state.npcs.push(npc.clone());
            Some(npc)
        })?;
        let Some(npc) = added else {
            warn!(zone = %zone, "NPC counter exhausted");
            return Err(ZoneError::RosterFull(zone));
        };
        debug!(zone = %zone, npc = npc.id, "Visitor joined lobby");
        Ok(npc)
    }

    /// Flip trainer visibility.  Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if loading or saving fails.
    pub fn toggle_trainers(&self, zone: ZoneId) -> Result<bool> {
        self.update(zone, |entry, _| {
            entry.state.trainers_visible = !entry.state.trainers_visible;
            entry.state.trainers_visible
        })
    }

    /// Set trainer visibility.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if loading or saving fails.
    pub fn set_trainers_visible(&self, zone: ZoneId, value: bool) -> Result<()> {
        self.update(zone, |entry, _| entry.state.trainers_visible = value)
    }

    /// Enter the searching phase and schedule the search resolution.
    ///
    /// Restarting an ongoing capture clears any found creature and
    /// invalidates the earlier timer.  The returned handle completes once
    /// the timer has fired, whether or not it still applied.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::NoRuntime`] when called outside a Tokio runtime
    /// (the lobby is left untouched), or the backend's error if saving fails.
    pub fn start_capture(&self, zone: ZoneId) -> Result<JoinHandle<()>> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ZoneError::NoRuntime)?;

        let token = self.update(zone, |entry, ctx| {
            entry.state.capture_active = true;
            entry.state.capture_searching = true;
            entry.state.capture_found = false;
            entry.state.found_creature = None;
            entry.generation = ctx.next_generation();
            entry.generation
        })?;

        let delay = self.capture.search_delay();
        debug!(zone = %zone, generation = token, delay_ms = delay.as_millis(), "Capture search started");

        let lobbies = self.clone();
        Ok(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = lobbies.resolve_search(zone, token) {
                warn!(zone = %zone, error = %e, "Failed to persist capture search result");
            }
        }))
    }

    /// Try to catch the creature.  The outcome is reported through `prompt`
    /// and the capture flow is reset either way.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if loading or saving fails.
    pub fn attempt_catch(&self, zone: ZoneId, prompt: &dyn UserPrompt) -> Result<CaptureOutcome> {
        let outcome = {
            let mut inner = self.inner.lock();
            let Inner { lobbies, ctx } = &mut *inner;
            let entry = materialize(lobbies, self.store.as_ref(), zone)?;
            if ctx.rng.gen_range(0.0..1.0) < self.capture.success_chance {
                CaptureOutcome::Caught {
                    creature: entry.state.found_creature.clone(),
                }
            } else {
                CaptureOutcome::Escaped
            }
        };

        debug!(zone = %zone, success = outcome.is_success(), "Catch attempted");
        prompt.notify(if outcome.is_success() { CATCH_SUCCESS } else { CATCH_ESCAPED });

        self.cancel_capture(zone)?;
        Ok(outcome)
    }

    /// Leave the capture flow.  Any pending search timer becomes stale.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if loading or saving fails.
    pub fn cancel_capture(&self, zone: ZoneId) -> Result<()> {
        self.update(zone, |entry, ctx| {
            entry.state.reset_capture();
            entry.generation = ctx.next_generation();
        })
    }

    /// Drop every cached lobby.  Pending timers for dropped lobbies become
    /// no-ops and later accesses reload from storage.
    pub fn forget_all(&self) {
        let mut inner = self.inner.lock();
        let dropped = inner.lobbies.len();
        inner.lobbies.clear();
        debug!(dropped, "Lobby cache cleared");
    }

    /// Timer body: move a still-current search to the found phase.
    ///
    /// Returns `true` if the search was resolved.
    fn resolve_search(&self, zone: ZoneId, token: u64) -> Result<bool> {
        let mut inner = self.inner.lock();
        let Inner { lobbies, ctx } = &mut *inner;

        let Some(entry) = lobbies.get_mut(&zone) else {
            debug!(zone = %zone, "Capture timer fired for an unloaded lobby");
            return Ok(false);
        };
        if entry.generation != token || !entry.state.capture_searching {
            debug!(zone = %zone, generation = token, "Stale capture timer ignored");
            return Ok(false);
        }
        let Some(creature) = catalog::CAPTURE_CANDIDATES.choose(&mut ctx.rng) else {
            return Ok(false);
        };

        entry.state.capture_searching = false;
        entry.state.capture_found = true;
        entry.state.found_creature = Some(creature.to_sighting());
        persistence::save_lobby(self.store.as_ref(), zone, &entry.state)?;

        debug!(zone = %zone, creature = creature.name, "Creature found");
        Ok(true)
    }

    /// Mutate a lobby, then persist it if anything visible changed.
    fn update<R>(
        &self,
        zone: ZoneId,
        f: impl FnOnce(&mut LobbyEntry, &mut CaptureContext) -> R,
    ) -> Result<R> {
        let mut inner = self.inner.lock();
        let Inner { lobbies, ctx } = &mut *inner;
        let entry = materialize(lobbies, self.store.as_ref(), zone)?;

        let before = entry.state.clone();
        let out = f(entry, ctx);
        if entry.state != before {
            persistence::save_lobby(self.store.as_ref(), zone, &entry.state)?;
        }
        Ok(out)
    }
}

fn materialize<'a>(
    lobbies: &'a mut HashMap<ZoneId, LobbyEntry>,
    store: &dyn KvStore,
    zone: ZoneId,
) -> Result<&'a mut LobbyEntry> {
    match lobbies.entry(zone) {
        Entry::Occupied(occupied) => Ok(occupied.into_mut()),
        Entry::Vacant(vacant) => {
            let state = persistence::load_lobby(store, zone)?.unwrap_or_default();
            Ok(vacant.insert(LobbyEntry {
                state,
                generation: 0,
            }))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
