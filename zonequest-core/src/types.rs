//! Core type definitions for zones, lobbies and the capture flow.
//!
//! Everything that is persisted derives `Serialize`/`Deserialize`; the JSON
//! field names are camelCase so stored lobbies stay readable by hand.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Identifier of a zone.  Seed zones are numbered densely from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u32);

impl ZoneId {
    /// Key under which this zone's lobby is persisted (`lobby_zone_<id>`).
    #[must_use]
    pub fn lobby_key(self) -> String {
        format!("lobby_zone_{}", self.0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ZoneId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Progression state of a zone.  Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneState {
    /// Not yet reachable.
    Locked,
    /// Reachable but not finished.
    Unlocked,
    /// Finished.
    Completed,
}

impl fmt::Display for ZoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// A discrete progression unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Unique, dense id.
    pub id: ZoneId,
    /// Display name.
    pub name: String,
    /// Suggested player level.
    pub recommended_level: u32,
    /// Current progression state.
    pub state: ZoneState,
}

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

/// A character standing around in a zone lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    /// Per-lobby id, assigned from [`LobbyState::npc_counter`].
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Role label shown under the name.
    pub role: String,
    /// Avatar sprite URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A creature spotted during a capture search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sighting {
    /// Creature name.
    pub name: String,
    /// Sprite URL.
    pub sprite: String,
    /// Elemental type label (e.g. `"Fuego"`).
    pub kind: String,
    /// Rarity label (e.g. `"Raro"`).
    pub rarity: String,
}

/// Phase of the capture mini-game, derived from the lobby's capture flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// No capture in progress.
    Idle,
    /// Search started, waiting for the timer.
    Searching,
    /// A creature has been found and can be caught.
    Found,
}

/// Per-zone lobby state.
///
/// Invariants (checked by [`LobbyState::is_consistent`]):
/// - `capture_found` implies `found_creature.is_some()`;
/// - `!capture_active` implies every other capture field is cleared;
/// - NPC ids strictly increase and `npc_counter` is above all of them,
///   with room left for at least one more visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyState {
    /// NPC roster in insertion order.
    pub npcs: Vec<Npc>,
    /// Whether the trainer list is shown.
    pub trainers_visible: bool,
    /// A capture flow is in progress.
    pub capture_active: bool,
    /// The capture flow is waiting for its search timer.
    pub capture_searching: bool,
    /// The search finished and a creature is available.
    pub capture_found: bool,
    /// The creature found by the last search.
    pub found_creature: Option<Sighting>,
    /// Id handed to the next added NPC.
    pub npc_counter: u32,
}

impl Default for LobbyState {
    fn default() -> Self {
        Self {
            npcs: crate::catalog::seed_npcs(),
            trainers_visible: false,
            capture_active: false,
            capture_searching: false,
            capture_found: false,
            found_creature: None,
            npc_counter: crate::catalog::FIRST_VISITOR_ID,
        }
    }
}

impl LobbyState {
    /// Current capture phase.
    #[must_use]
    pub fn capture_phase(&self) -> CapturePhase {
        if self.capture_found {
            CapturePhase::Found
        } else if self.capture_searching {
            CapturePhase::Searching
        } else {
            CapturePhase::Idle
        }
    }

    /// Whether the roster and capture fields satisfy the lobby invariants.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if !self.npcs.windows(2).all(|w| w[0].id < w[1].id) {
            return false;
        }
        let highest_id = self.npcs.last().map_or(0, |n| n.id);
        if self.npc_counter <= highest_id || self.npc_counter == u32::MAX {
            return false;
        }
        if self.capture_found && self.found_creature.is_none() {
            return false;
        }
        if self.capture_searching && self.capture_found {
            return false;
        }
        if !self.capture_active {
            return !self.capture_searching && !self.capture_found && self.found_creature.is_none();
        }
        true
    }

    /// Clear every capture field.
    pub(crate) fn reset_capture(&mut self) {
        self.capture_active = false;
        self.capture_searching = false;
        self.capture_found = false;
        self.found_creature = None;
    }
}
