// ═══════════════════════════════════════════════════════════════════════
// Match setup — builds the initial canonical state from a lobby roster
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{self, CardState, INITIAL_HAND};
use crate::grid::{self, Hex, DIRECTIONS};
use crate::lobby::Lobby;
use crate::types::{Board, GameState, TeamId, Tile, TileKind, HQ_SHIELD};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Tile-kind roll weights at generation time.
const TILE_WEIGHTS: [(TileKind, u32); 5] = [
    (TileKind::Normal, 60),
    (TileKind::Energy, 10),
    (TileKind::Unstable, 10),
    (TileKind::Relay, 10),
    (TileKind::Research, 10),
];

fn roll_tile_kind(rng: &mut impl Rng) -> TileKind {
    let total: u32 = TILE_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for &(kind, weight) in &TILE_WEIGHTS {
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    unreachable!("cumulative weights cover the roll range");
}

/// Headquarters corner for team `at` of `of`: evenly spaced board corners,
/// maximally separated for two teams.
fn hq_corner(at: usize, of: usize, radius: i32) -> Hex {
    let (dq, dr, ds) = DIRECTIONS[(12 * at + of) / (2 * of)];
    Hex::new(dq * radius, dr * radius, ds * radius)
}

/// Create the initial game state for the lobby's non-empty teams.
/// The seed controls tile rolls and starting hands for reproducibility.
pub fn create_initial_state(lobby: &Lobby, seed: u64) -> GameState {
    let teams = lobby.active_teams();
    assert!(!teams.is_empty(), "cannot start a match with no teams");

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let radius = grid::radius_for_teams(teams.len());

    let mut tiles = BTreeMap::new();
    for hex in grid::generate(radius) {
        tiles.insert(
            hex,
            Tile {
                kind: roll_tile_kind(&mut rng),
                difficulty: rng.gen_range(1..=3),
                difficulty_visible: rng.gen_bool(0.5),
            },
        );
    }

    let mut board = Board { radius, tiles, owners: BTreeMap::new(), shields: BTreeMap::new() };

    // One HQ per team on a board corner: full shield, easy, always visible.
    for (at, &team) in teams.iter().enumerate() {
        let hq = hq_corner(at, teams.len(), radius);
        board.tiles.insert(
            hq,
            Tile { kind: TileKind::Normal, difficulty: 1, difficulty_visible: true },
        );
        board.occupy(hq, team, HQ_SHIELD);
    }

    let mut cards = BTreeMap::new();
    for &team in &teams {
        let mut state = CardState::default();
        for _ in 0..INITIAL_HAND {
            state.grant(cards::draw_random_card(&mut rng));
        }
        cards.insert(team, state);
    }

    let rosters: BTreeMap<TeamId, Vec<String>> = teams
        .iter()
        .map(|&team| (team, lobby.teams()[&team].clone()))
        .collect();

    GameState { teams, rosters, cards, board, active_idx: 0, seed, rng_counter: 0 }
}

/// Rebuild a canonical state from a serialized snapshot (host restart path).
pub fn resume(snapshot: &str) -> Result<GameState, serde_json::Error> {
    serde_json::from_str(snapshot)
}
