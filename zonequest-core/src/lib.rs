//! # ZoneQuest Core Library
//!
//! State management for a creature-exploration game front-end.
//!
//! The crate tracks two independent pieces of state:
//!
//! - **Zone progress**: five zones that unlock one after another as the
//!   player completes them ([`ZoneProgress`]).
//! - **Lobbies**: one per zone, holding an NPC roster, a trainer-visibility
//!   toggle and a timed capture mini-game ([`LobbyStore`]).
//!
//! Lobbies are loaded lazily from a key-value store ([`persistence::KvStore`])
//! under `lobby_zone_<id>` and written back after every mutation.  The
//! [`Game`] facade wires both stores over one shared backend.
//!
//! ## Capture flow
//!
//! ```text
//!  Idle ──start_capture──▶ Searching ──timer (same generation)──▶ Found
//!   ▲                          │                                    │
//!   └──────── cancel_capture / attempt_catch ◀──────────────────────┘
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod game;
pub mod interaction;
pub mod lobby;
pub mod persistence;
pub mod types;
pub mod zones;

pub use config::GameConfig;
pub use error::ZoneError;
pub use game::Game;
pub use lobby::LobbyStore;
pub use zones::ZoneProgress;
pub use types::*;
