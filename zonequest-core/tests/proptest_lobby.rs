//! Property-Based Tests for lobbies and zone progress
//!
//! Uses `proptest` to check store invariants under arbitrary operation
//! sequences: persisted lobbies reload unchanged, NPC ids keep increasing,
//! capture flags stay consistent and zone states never move backwards.
//!
//! Lobby sequences run on a paused current-thread runtime so capture
//! searches can be started and their timers fired by advancing the clock.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use zonequest_core::config::CaptureConfig;
use zonequest_core::interaction::HeadlessPrompt;
use zonequest_core::persistence::MemoryKvStore;
use zonequest_core::{LobbyStore, ZoneId, ZoneProgress, ZoneState};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum LobbyOp {
    AddNpc(u32),
    Toggle(u32),
    SetVisible(u32, bool),
    StartCapture(u32),
    Cancel(u32),
    Catch(u32),
    Advance(u64),
}

fn arb_zone() -> impl Strategy<Value = u32> {
    1..=5u32
}

fn arb_op() -> impl Strategy<Value = LobbyOp> {
    prop_oneof![
        arb_zone().prop_map(LobbyOp::AddNpc),
        arb_zone().prop_map(LobbyOp::Toggle),
        (arb_zone(), any::<bool>()).prop_map(|(z, v)| LobbyOp::SetVisible(z, v)),
        arb_zone().prop_map(LobbyOp::StartCapture),
        arb_zone().prop_map(LobbyOp::Cancel),
        arb_zone().prop_map(LobbyOp::Catch),
        (0..4000u64).prop_map(LobbyOp::Advance),
    ]
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("runtime")
}

async fn apply(lobbies: &LobbyStore, op: &LobbyOp) {
    let prompt = HeadlessPrompt::accepting();
    match *op {
        LobbyOp::AddNpc(z) => {
            lobbies.add_npc(ZoneId(z)).expect("add");
        }
        LobbyOp::Toggle(z) => {
            lobbies.toggle_trainers(ZoneId(z)).expect("toggle");
        }
        LobbyOp::SetVisible(z, v) => lobbies.set_trainers_visible(ZoneId(z), v).expect("set"),
        LobbyOp::StartCapture(z) => {
            lobbies.start_capture(ZoneId(z)).expect("start");
        }
        LobbyOp::Advance(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
        LobbyOp::Cancel(z) => lobbies.cancel_capture(ZoneId(z)).expect("cancel"),
        LobbyOp::Catch(z) => {
            lobbies.attempt_catch(ZoneId(z), &prompt).expect("catch");
        }
    }
}

fn config() -> CaptureConfig {
    CaptureConfig {
        rng_seed: Some(11),
        ..CaptureConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property: a new session sees exactly the last written lobby
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn reload_matches_last_state(ops in prop::collection::vec(arb_op(), 0..40)) {
        paused_runtime().block_on(async {
            let store = Arc::new(MemoryKvStore::new());
            let session = LobbyStore::new(store.clone(), config());
            for op in &ops {
                apply(&session, op).await;
            }

            // No await below: pending timers cannot run while states are compared.
            let fresh = LobbyStore::new(store, config());
            for id in 1..=5 {
                let live = session.lobby_state(ZoneId(id)).expect("live");
                let reloaded = fresh.lobby_state(ZoneId(id)).expect("reloaded");
                prop_assert!(live.is_consistent());
                prop_assert_eq!(live, reloaded);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}

// ---------------------------------------------------------------------------
// Property: NPC ids strictly increase and the counter stays ahead of them
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn npc_ids_strictly_increase(ops in prop::collection::vec(arb_op(), 0..60)) {
        paused_runtime().block_on(async {
            let lobbies = LobbyStore::new(Arc::new(MemoryKvStore::new()), config());
            for op in &ops {
                apply(&lobbies, op).await;
            }

            for id in 1..=5 {
                let state = lobbies.lobby_state(ZoneId(id)).expect("state");
                prop_assert!(state.npcs.windows(2).all(|w| w[0].id < w[1].id));
                let last = state.npcs.last().map_or(0, |n| n.id);
                prop_assert!(state.npc_counter > last);
                prop_assert!(state.is_consistent());
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}

// ---------------------------------------------------------------------------
// Property: zone states never move backwards
// ---------------------------------------------------------------------------

fn rank(state: ZoneState) -> u8 {
    match state {
        ZoneState::Locked => 0,
        ZoneState::Unlocked => 1,
        ZoneState::Completed => 2,
    }
}

proptest! {
    #[test]
    fn zone_progress_is_monotonic(completions in prop::collection::vec(0..8u32, 0..20)) {
        let mut progress = ZoneProgress::new(Arc::new(MemoryKvStore::new()));
        for id in completions {
            let before: Vec<u8> = progress.zones().iter().map(|z| rank(z.state)).collect();
            progress.complete_zone(ZoneId(id));
            let after: Vec<u8> = progress.zones().iter().map(|z| rank(z.state)).collect();
            prop_assert!(before.iter().zip(&after).all(|(b, a)| a >= b));
            prop_assert_eq!(progress.zones().len(), 5);
        }
    }
}
