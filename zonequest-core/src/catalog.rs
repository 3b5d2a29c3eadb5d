//! Static reference data: seed zones, per-zone creatures, the capture
//! candidate pool and NPC seed rosters.
//!
//! All tables are `'static` and read-only.  Lookups by unknown zone id return
//! an empty slice rather than an error.

use crate::types::{Npc, Sighting, Zone, ZoneId, ZoneState};

/// Base URL for creature sprites.
pub const SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Id given to the first NPC added on top of the seed roster.
pub const FIRST_VISITOR_ID: u32 = 3;

/// Role label of every added visitor.
pub const VISITOR_ROLE: &str = "Explorador";

/// Sprite ids cycled through for added visitors' avatars.
pub const VISITOR_AVATARS: [u16; 3] = [6, 150, 94];

/// Build the sprite URL for a creature number.
#[must_use]
pub fn sprite_url(sprite_id: u16) -> String {
    format!("{SPRITE_BASE_URL}/{sprite_id}.png")
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Static description of a seed zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneSeed {
    /// Zone id.
    pub id: u32,
    /// Display name.
    pub name: &'static str,
    /// Suggested player level.
    pub recommended_level: u32,
    /// State at the start of a fresh game.
    pub initial_state: ZoneState,
}

/// The five zones of a fresh game, in progression order.
pub const ZONE_SEEDS: [ZoneSeed; 5] = [
    ZoneSeed { id: 1, name: "Bosque Verde", recommended_level: 5, initial_state: ZoneState::Unlocked },
    ZoneSeed { id: 2, name: "Cueva Oscura", recommended_level: 10, initial_state: ZoneState::Locked },
    ZoneSeed { id: 3, name: "Monte Plateado", recommended_level: 15, initial_state: ZoneState::Locked },
    ZoneSeed { id: 4, name: "Lago Cristalino", recommended_level: 20, initial_state: ZoneState::Locked },
    ZoneSeed { id: 5, name: "Torre Final", recommended_level: 25, initial_state: ZoneState::Locked },
];

/// Materialize the seed zone list.
#[must_use]
pub fn seed_zones() -> Vec<Zone> {
    ZONE_SEEDS
        .iter()
        .map(|seed| Zone {
            id: ZoneId(seed.id),
            name: seed.name.to_string(),
            recommended_level: seed.recommended_level,
            state: seed.initial_state,
        })
        .collect()
}

/// Every zone id known to the catalog.
pub fn known_zone_ids() -> impl Iterator<Item = ZoneId> {
    ZONE_SEEDS.iter().map(|seed| ZoneId(seed.id))
}

// ---------------------------------------------------------------------------
// Creatures
// ---------------------------------------------------------------------------

/// A creature entry in the static tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Creature {
    /// Creature name.
    pub name: &'static str,
    /// Sprite number, see [`sprite_url`].
    pub sprite_id: u16,
    /// Elemental type label.
    pub kind: &'static str,
    /// Rarity label.
    pub rarity: &'static str,
}

impl Creature {
    /// Full sprite URL.
    #[must_use]
    pub fn sprite_url(&self) -> String {
        sprite_url(self.sprite_id)
    }

    /// Owned copy suitable for attaching to a lobby.
    #[must_use]
    pub fn to_sighting(&self) -> Sighting {
        Sighting {
            name: self.name.to_string(),
            sprite: self.sprite_url(),
            kind: self.kind.to_string(),
            rarity: self.rarity.to_string(),
        }
    }
}

const fn creature(name: &'static str, sprite_id: u16, kind: &'static str, rarity: &'static str) -> Creature {
    Creature { name, sprite_id, kind, rarity }
}

const BOSQUE_VERDE: &[Creature] = &[
    creature("Caterpie", 10, "Bicho", "Común"),
    creature("Weedle", 13, "Bicho/Veneno", "Común"),
    creature("Pidgey", 16, "Volador", "Común"),
    creature("Pikachu", 25, "Eléctrico", "Raro"),
];

const CUEVA_OSCURA: &[Creature] = &[
    creature("Zubat", 41, "Volador/Veneno", "Común"),
    creature("Geodude", 74, "Roca/Tierra", "Común"),
    creature("Onix", 95, "Roca/Tierra", "Raro"),
];

const MONTE_PLATEADO: &[Creature] = &[
    creature("Machop", 66, "Lucha", "Común"),
    creature("Rhyhorn", 111, "Tierra/Roca", "Raro"),
    creature("Graveler", 75, "Roca/Tierra", "Común"),
];

const LAGO_CRISTALINO: &[Creature] = &[
    creature("Magikarp", 129, "Agua", "Común"),
    creature("Goldeen", 118, "Agua", "Común"),
    creature("Staryu", 120, "Agua", "Raro"),
    creature("Lapras", 131, "Agua/Hielo", "Muy Raro"),
];

const TORRE_FINAL: &[Creature] = &[
    creature("Gastly", 92, "Fantasma/Veneno", "Raro"),
    creature("Haunter", 93, "Fantasma/Veneno", "Raro"),
    creature("Gengar", 94, "Fantasma/Veneno", "Muy Raro"),
];

/// Creatures that a capture search can turn up, regardless of zone.
pub const CAPTURE_CANDIDATES: &[Creature] = &[
    creature("Rattata", 19, "Normal", "Común"),
    creature("Pidgey", 16, "Volador", "Común"),
    creature("Pikachu", 25, "Eléctrico", "Raro"),
    creature("Charmander", 4, "Fuego", "Raro"),
];

/// Creatures living in a zone.  Unknown zones have none.
#[must_use]
pub fn creatures_for_zone(zone: ZoneId) -> &'static [Creature] {
    match zone.0 {
        1 => BOSQUE_VERDE,
        2 => CUEVA_OSCURA,
        3 => MONTE_PLATEADO,
        4 => LAGO_CRISTALINO,
        5 => TORRE_FINAL,
        _ => &[],
    }
}

// ---------------------------------------------------------------------------
// NPCs
// ---------------------------------------------------------------------------

/// The two NPCs every fresh lobby starts with.
#[must_use]
pub fn seed_npcs() -> Vec<Npc> {
    vec![
        Npc {
            id: 1,
            name: "Prof. Roble".to_string(),
            role: "Investigador".to_string(),
            avatar: Some(sprite_url(1)),
        },
        Npc {
            id: 2,
            name: "Líder Flama".to_string(),
            role: "Líder de Gimnasio".to_string(),
            avatar: Some(sprite_url(6)),
        },
    ]
}

/// Build the visitor NPC that takes id `id`.
///
/// Visitor ids start at [`FIRST_VISITOR_ID`], so the first visitor is
/// `Visitante #1` and wears the first avatar of [`VISITOR_AVATARS`].
#[must_use]
pub fn visitor(id: u32) -> Npc {
    let ordinal = id.saturating_sub(FIRST_VISITOR_ID);
    let avatar = VISITOR_AVATARS[ordinal as usize % VISITOR_AVATARS.len()];
    Npc {
        id,
        name: format!("Visitante #{}", ordinal + 1),
        role: VISITOR_ROLE.to_string(),
        avatar: Some(sprite_url(avatar)),
    }
}
