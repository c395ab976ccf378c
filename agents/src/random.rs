// ═══════════════════════════════════════════════════════════════════════
// Random bot — uniform target choice, simulated 70% correctness.
// Serves as the built-in opponent and exercises engine stability.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Agent;
use nova_engine::engine::Action;
use nova_engine::{GameState, Hex, TeamId};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Chance the bot "answers" its question correctly. Flat, independent of
/// tile difficulty.
pub const BOT_ACCURACY: f64 = 0.7;

pub struct RandomBot {
    rng: ChaCha8Rng,
}

impl RandomBot {
    pub fn new(seed: u64) -> RandomBot {
        RandomBot { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl Agent for RandomBot {
    fn name(&self) -> &str {
        "Random"
    }

    fn decide(&mut self, state: &GameState, _team: TeamId) -> Action {
        let hexes: Vec<Hex> = state.board.tiles.keys().copied().collect();
        let &hex = hexes.choose(&mut self.rng).expect("board is never empty");
        Action::Attack { hex, correct: self.rng.gen_bool(BOT_ACCURACY), card: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_engine::lobby::Lobby;
    use nova_engine::setup;

    fn sample_state() -> GameState {
        let mut lobby = Lobby::new();
        lobby.add_bot().unwrap();
        lobby.add_bot().unwrap();
        setup::create_initial_state(&lobby, 42)
    }

    #[test]
    fn test_bot_targets_cells_on_the_board() {
        let state = sample_state();
        let mut bot = RandomBot::new(9);
        for _ in 0..50 {
            match bot.decide(&state, state.active_team()) {
                Action::Attack { hex, card, .. } => {
                    assert!(state.board.tiles.contains_key(&hex));
                    assert!(card.is_none());
                }
                other => panic!("bot should only attack, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_bot_accuracy_hovers_around_seventy_percent() {
        let state = sample_state();
        let mut bot = RandomBot::new(1234);
        let mut correct = 0u32;
        for _ in 0..2000 {
            if let Action::Attack { correct: hit, .. } = bot.decide(&state, state.active_team()) {
                correct += u32::from(hit);
            }
        }
        let rate = f64::from(correct) / 2000.0;
        assert!((0.65..0.75).contains(&rate), "rate {rate} out of range");
    }
}
