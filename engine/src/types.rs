// ═══════════════════════════════════════════════════════════════════════
// Core types — board, teams, canonical match state
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::CardState;
use crate::grid::Hex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum (and headquarters) shield value.
pub const MAX_SHIELD: u8 = 5;

/// Shield a headquarters sector carries at match start. A shield of exactly
/// this value is what marks a sector as an HQ.
pub const HQ_SHIELD: u8 = 5;

// ── Teams ──────────────────────────────────────────────────────────────

/// The fixed four-slot team palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamId {
    Red,
    Blue,
    Green,
    Yellow,
}

impl TeamId {
    pub const ALL: [TeamId; 4] = [TeamId::Red, TeamId::Blue, TeamId::Green, TeamId::Yellow];
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamId::Red => write!(f, "Red"),
            TeamId::Blue => write!(f, "Blue"),
            TeamId::Green => write!(f, "Green"),
            TeamId::Yellow => write!(f, "Yellow"),
        }
    }
}

// ── Tiles ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Normal,
    /// Self-reinforcement grants +2 instead of +1.
    Energy,
    /// Starts at shield 1 when captured.
    Unstable,
    /// Regenerates same-team neighbors after each turn rotation.
    Relay,
    /// Reserved; no resolution effect.
    Research,
}

/// Immutable per-hex generation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    /// Question difficulty, 1-3. HQs are always 1.
    pub difficulty: u8,
    pub difficulty_visible: bool,
}

// ── Board ──────────────────────────────────────────────────────────────

/// Ownership and shields over a fixed set of generated tiles.
///
/// Invariant: a hex has an `owners` entry iff it has a `shields` entry >= 1.
/// All maps are ordered so iteration (and the relay pass) is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub radius: i32,
    pub tiles: BTreeMap<Hex, Tile>,
    pub owners: BTreeMap<Hex, TeamId>,
    pub shields: BTreeMap<Hex, u8>,
}

impl Board {
    pub fn contains(&self, hex: Hex) -> bool {
        self.tiles.contains_key(&hex)
    }

    pub fn tile(&self, hex: Hex) -> Option<Tile> {
        self.tiles.get(&hex).copied()
    }

    pub fn owner(&self, hex: Hex) -> Option<TeamId> {
        self.owners.get(&hex).copied()
    }

    /// Shield of a hex; absent entries read as 0 (neutral).
    pub fn shield(&self, hex: Hex) -> u8 {
        self.shields.get(&hex).copied().unwrap_or(0)
    }

    /// Give `hex` to `team` at the given shield (clamped to [1, MAX_SHIELD]).
    pub fn occupy(&mut self, hex: Hex, team: TeamId, shield: u8) {
        self.owners.insert(hex, team);
        self.shields.insert(hex, shield.clamp(1, MAX_SHIELD));
    }

    /// Raise a hex's shield, capped. No-op on neutral hexes.
    pub fn raise_shield(&mut self, hex: Hex, by: u8) {
        if let Some(shield) = self.shields.get_mut(&hex) {
            *shield = (*shield + by).min(MAX_SHIELD);
        }
    }

    /// Drop a hex's shield; at 0 the hex goes neutral (ownership removed).
    pub fn lower_shield(&mut self, hex: Hex, by: u8) {
        let left = self.shield(hex).saturating_sub(by);
        if left == 0 {
            self.owners.remove(&hex);
            self.shields.remove(&hex);
        } else {
            self.shields.insert(hex, left);
        }
    }

    /// True iff some neighbor of `hex` is `team`'s headquarters
    /// (owned by `team` at full shield).
    pub fn adjacent_to_hq(&self, hex: Hex, team: TeamId) -> bool {
        hex.neighbors()
            .iter()
            .any(|n| self.owner(*n) == Some(team) && self.shield(*n) == HQ_SHIELD)
    }

    /// Hexes a team currently owns, in canonical order.
    pub fn owned_by(&self, team: TeamId) -> Vec<Hex> {
        self.owners
            .iter()
            .filter(|(_, &owner)| owner == team)
            .map(|(&hex, _)| hex)
            .collect()
    }
}

// ── Match state ────────────────────────────────────────────────────────

/// The canonical match snapshot. Owned and mutated exclusively by the host;
/// clients hold disposable copies replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Teams in fixed rotation order (palette order, non-empty rosters only).
    pub teams: Vec<TeamId>,
    /// Player names per team. Bots are recognized by naming convention.
    pub rosters: BTreeMap<TeamId, Vec<String>>,
    /// Per-team hand / streak / shield-turns bookkeeping.
    pub cards: BTreeMap<TeamId, CardState>,
    pub board: Board,
    /// Index into `teams` of the team whose turn it is.
    pub active_idx: usize,
    /// Match seed; paired with `rng_counter` for reproducible draws.
    pub seed: u64,
    pub rng_counter: u64,
}

impl GameState {
    pub fn active_team(&self) -> TeamId {
        self.teams[self.active_idx]
    }

    /// The team a player belongs to, if they are in this match.
    pub fn team_of(&self, player: &str) -> Option<TeamId> {
        self.rosters
            .iter()
            .find(|(_, roster)| roster.iter().any(|name| name == player))
            .map(|(&team, _)| team)
    }

    pub fn card_state(&self, team: TeamId) -> &CardState {
        &self.cards[&team]
    }

    pub fn card_state_mut(&mut self, team: TeamId) -> &mut CardState {
        self.cards.get_mut(&team).expect("every rotation team has card state")
    }

    /// A fresh deterministic RNG stream for one draw. Advancing the counter
    /// keeps replayed snapshots drawing identically.
    pub fn next_rng(&mut self) -> rand_chacha::ChaCha8Rng {
        use rand::SeedableRng;
        self.rng_counter += 1;
        let stream = self.seed.wrapping_add(self.rng_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        rand_chacha::ChaCha8Rng::seed_from_u64(stream)
    }
}
