// ═══════════════════════════════════════════════════════════════════════
// Territory state machine — validates and applies one action at a time
//
// Architecture:
//   The engine is a pure state machine. It never does I/O and never talks
//   to a transport. The host feeds it one action per message, it either
//   rejects (no mutation at all) or resolves atomically and reports an
//   Outcome the caller can turn into notifications.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{self, CardId, STREAK_TARGET};
use crate::grid::Hex;
use crate::types::{GameState, TeamId, TileKind, MAX_SHIELD};
use serde::{Deserialize, Serialize};

/// Shield a freshly captured hex starts with (1 on unstable tiles).
const CAPTURE_SHIELD: u8 = 2;

/// An owned hex at or above this shield absorbs a hit instead of flipping.
const BREAK_THRESHOLD: u8 = 3;

/// One request from a member of the active team. Serialized flat into
/// TERRITORY_ACTION messages under the "action" discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// The only board-mutating action: an answered capture attempt.
    Attack {
        #[serde(rename = "hexId")]
        hex: Hex,
        #[serde(rename = "isCorrect")]
        correct: bool,
        #[serde(rename = "usedCard", default, skip_serializing_if = "Option::is_none")]
        card: Option<CardId>,
    },
    /// Standalone card declaration around a question. Presentation-layer
    /// cards just leave the hand; board-affecting cards apply immediately.
    UseCard {
        #[serde(rename = "usedCard")]
        card: CardId,
        #[serde(rename = "targetId", default, skip_serializing_if = "Option::is_none")]
        target: Option<Hex>,
    },
}

/// Why an action was refused. Rejections are protocol violations, not game
/// outcomes: nothing mutates and the turn pointer stays put.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("player {0:?} is not part of this match")]
    UnknownPlayer(String),
    #[error("team {0} acted out of turn")]
    NotYourTurn(TeamId),
    #[error("hex {0} is not on the board")]
    UnknownHex(Hex),
    #[error("card {0:?} is not in hand")]
    CardNotHeld(CardId),
}

/// What a resolved attack did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackResult {
    /// Own hex reinforced to the given shield.
    Reinforced { shield: u8 },
    /// Target team is under a galactic shield; nothing happened.
    Blocked,
    /// High shield absorbed the hit; owner keeps the hex.
    ShieldBroken { shield: u8 },
    Captured { from: Option<TeamId> },
    /// Wrong answer, no board change.
    Missed,
}

/// Why a team was handed a bonus card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusReason {
    Streak,
    HqBreach,
}

/// Everything the caller needs to narrate a resolved action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub team: Option<TeamId>,
    pub attack: Option<AttackResult>,
    /// Bonus cards granted during resolution (already in hand).
    pub bonus_cards: Vec<(TeamId, CardId, BonusReason)>,
    /// Hex drained to nothing by an asteroid barrage.
    pub destroyed: Option<Hex>,
}

impl Outcome {
    fn for_team(team: TeamId) -> Outcome {
        Outcome { team: Some(team), ..Outcome::default() }
    }
}

/// Resolve one action against the canonical state.
///
/// All rejection checks run before the first mutation, so an Err means the
/// state is untouched. An Ok means the full resolution landed, including
/// shield decay and (for attacks) turn rotation + the relay pass.
pub fn resolve(state: &mut GameState, player: &str, action: Action) -> Result<Outcome, ActionError> {
    let team = state
        .team_of(player)
        .ok_or_else(|| ActionError::UnknownPlayer(player.to_string()))?;
    if team != state.active_team() {
        return Err(ActionError::NotYourTurn(team));
    }

    match action {
        Action::Attack { hex, correct, card } => resolve_attack(state, team, hex, correct, card),
        Action::UseCard { card, target } => resolve_card_use(state, team, card, target),
    }
}

fn resolve_attack(
    state: &mut GameState,
    team: TeamId,
    hex: Hex,
    correct: bool,
    card: Option<CardId>,
) -> Result<Outcome, ActionError> {
    if !state.board.contains(hex) {
        return Err(ActionError::UnknownHex(hex));
    }
    if let Some(card) = card {
        if !state.card_state(team).holds(card) {
            return Err(ActionError::CardNotHeld(card));
        }
    }

    // Validation done; mutations start here. The card leaves the hand before
    // any of its effects run, and its pre-effects hit the target before
    // capture resolution.
    let mut outcome = Outcome::for_team(team);
    if let Some(card) = card {
        state.card_state_mut(team).take(card);
        apply_card_effect(state, team, card, Some(hex), &mut outcome);
    }

    let effective = correct || card == Some(CardId::Supernova);
    let owner = state.board.owner(hex);
    let shield = state.board.shield(hex);
    let tile = state.board.tile(hex).expect("target hex exists");

    let result = match owner {
        Some(own) if own == team => {
            if effective {
                let gain = if tile.kind == TileKind::Energy { 2 } else { 1 };
                state.board.raise_shield(hex, gain);
                AttackResult::Reinforced { shield: state.board.shield(hex) }
            } else {
                AttackResult::Missed
            }
        }
        Some(enemy) if state.card_state(enemy).shield_turns > 0 => AttackResult::Blocked,
        _ if effective => {
            if owner.is_some() && shield >= BREAK_THRESHOLD && card != Some(CardId::Supernova) {
                state.board.lower_shield(hex, 1);
                AttackResult::ShieldBroken { shield: state.board.shield(hex) }
            } else {
                let start = if tile.kind == TileKind::Unstable { 1 } else { CAPTURE_SHIELD };
                state.board.occupy(hex, team, start);
                if let Some(enemy) = owner {
                    if state.board.adjacent_to_hq(hex, enemy) {
                        grant_bonus(state, team, BonusReason::HqBreach, &mut outcome);
                    }
                }
                AttackResult::Captured { from: owner }
            }
        }
        _ => AttackResult::Missed,
    };
    outcome.attack = Some(result);

    // Streak bookkeeping follows the actual answer, supernova or not.
    update_streak(state, team, correct, &mut outcome);
    decay_shield_turns(state);
    rotate_turn(state);
    apply_relay_aura(state);

    Ok(outcome)
}

fn resolve_card_use(
    state: &mut GameState,
    team: TeamId,
    card: CardId,
    target: Option<Hex>,
) -> Result<Outcome, ActionError> {
    if !state.card_state(team).holds(card) {
        return Err(ActionError::CardNotHeld(card));
    }
    if let Some(target) = target {
        if !state.board.contains(target) {
            return Err(ActionError::UnknownHex(target));
        }
    }

    let mut outcome = Outcome::for_team(team);
    state.card_state_mut(team).take(card);
    apply_card_effect(state, team, card, target, &mut outcome);
    decay_shield_turns(state);
    // Card declarations happen inside the active team's turn: no rotation.

    Ok(outcome)
}

/// Global card effects. Presentation-only cards (probe, hyperspace, time
/// dilation, wormhole) change nothing here; their work lives in the
/// question layer.
fn apply_card_effect(
    state: &mut GameState,
    team: TeamId,
    card: CardId,
    target: Option<Hex>,
    outcome: &mut Outcome,
) {
    match card {
        CardId::Asteroid => {
            if let Some(hex) = target {
                let had_owner = state.board.owner(hex).is_some();
                state.board.lower_shield(hex, 2);
                if had_owner && state.board.owner(hex).is_none() {
                    outcome.destroyed = Some(hex);
                }
            }
        }
        CardId::ForceField => {
            if let Some(hex) = target {
                if state.board.owner(hex) == Some(team) {
                    state.board.raise_shield(hex, 3);
                }
            }
        }
        CardId::GalacticShield => {
            let rounds = state.teams.len() as u32 * 2;
            state.card_state_mut(team).shield_turns = rounds;
        }
        _ => {}
    }
}

fn update_streak(state: &mut GameState, team: TeamId, correct: bool, outcome: &mut Outcome) {
    if !correct {
        state.card_state_mut(team).streak = 0;
        return;
    }
    state.card_state_mut(team).streak += 1;
    if state.card_state(team).streak >= STREAK_TARGET {
        // The streak only resets if the bonus actually fit in the hand.
        if grant_bonus(state, team, BonusReason::Streak, outcome) {
            state.card_state_mut(team).streak = 0;
        }
    }
}

fn grant_bonus(
    state: &mut GameState,
    team: TeamId,
    reason: BonusReason,
    outcome: &mut Outcome,
) -> bool {
    let card = cards::draw_random_card(&mut state.next_rng());
    if state.card_state_mut(team).grant(card) {
        outcome.bonus_cards.push((team, card, reason));
        true
    } else {
        false
    }
}

/// Every ATTACK or CARD_USE burns one round off every galactic shield.
fn decay_shield_turns(state: &mut GameState) {
    for card_state in state.cards.values_mut() {
        card_state.shield_turns = card_state.shield_turns.saturating_sub(1);
    }
}

fn rotate_turn(state: &mut GameState) {
    state.active_idx = (state.active_idx + 1) % state.teams.len();
}

/// Relay tiles owned by the team coming into its turn pump +1 shield into
/// each neighbor that team also owns.
fn apply_relay_aura(state: &mut GameState) {
    let team = state.active_team();
    let relays: Vec<Hex> = state
        .board
        .owned_by(team)
        .into_iter()
        .filter(|&hex| state.board.tile(hex).map(|t| t.kind) == Some(TileKind::Relay))
        .collect();
    for relay in relays {
        for neighbor in relay.neighbors() {
            if state.board.owner(neighbor) == Some(team) && state.board.shield(neighbor) < MAX_SHIELD
            {
                state.board.raise_shield(neighbor, 1);
            }
        }
    }
}
