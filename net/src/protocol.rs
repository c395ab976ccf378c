// ═══════════════════════════════════════════════════════════════════════
// Wire contract — the closed set of host <-> client messages
//
// Every payload is a tagged union; anything that does not parse into it is
// dropped on receipt. Notifications are advisory: clients stay consistent
// even if every one of them is lost.
// ═══════════════════════════════════════════════════════════════════════

use nova_engine::engine::Action;
use nova_engine::lobby::Player;
use nova_engine::{CardId, GameState, TeamId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Room-code alphabet: 32 symbols, ambiguous glyphs (0/O, 1/I) excluded.
pub const ROOM_CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const ROOM_CODE_LEN: usize = 4;

pub fn generate_room_code(rng: &mut impl Rng) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Everything a client needs to render the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    pub code: String,
    pub players: Vec<Player>,
    pub teams: BTreeMap<TeamId, Vec<String>>,
    pub started: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum Message {
    /// Client -> host. Also the reconnect path: identity is the name.
    JoinRequest { player_name: String },
    /// Host -> joining client. `game_state` present iff a match is running.
    JoinAccept {
        room_state: RoomState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        game_state: Option<GameState>,
    },
    /// Host -> all clients, once, at match start. Question content rides
    /// through opaquely; the engine never looks inside it.
    StartGame {
        mode: String,
        #[serde(default)]
        topics: Vec<String>,
        #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
        questions: serde_json::Value,
        territory_state: GameState,
    },
    /// Client -> host: one member of the active team acting. The action
    /// body is flattened alongside playerId.
    TerritoryAction {
        player_id: String,
        #[serde(flatten)]
        action: Action,
    },
    /// Host -> all clients after every resolved action. Clients replace
    /// their whole view with this snapshot.
    UpdateState { game_state: GameState },
    /// Advisory: a team gained a card.
    CardNotification { team: TeamId, card_id: CardId, reason: String },
    /// Advisory: free-form toast.
    GameNotification {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        title: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_room_codes_use_the_safe_alphabet() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            let code = generate_room_code(&mut rng);
            assert_eq!(code.len(), ROOM_CODE_LEN);
            for byte in code.bytes() {
                assert!(ROOM_CODE_ALPHABET.contains(&byte));
                assert!(!b"01IO".contains(&byte));
            }
        }
    }

    #[test]
    fn test_messages_carry_screaming_tags_and_camel_fields() {
        let json =
            serde_json::to_string(&Message::JoinRequest { player_name: "ada".into() }).unwrap();
        assert_eq!(json, r#"{"type":"JOIN_REQUEST","playerName":"ada"}"#);

        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Message::JoinRequest { player_name: "ada".into() });
    }

    #[test]
    fn test_unknown_message_types_fail_to_parse() {
        assert!(serde_json::from_str::<Message>(r#"{"type":"EVIL","x":1}"#).is_err());
        assert!(serde_json::from_str::<Message>(r#"{"playerName":"ada"}"#).is_err());
    }

    #[test]
    fn test_territory_action_flattens_the_action_body() {
        use nova_engine::Hex;

        let message = Message::TerritoryAction {
            player_id: "ada".into(),
            action: Action::Attack {
                hex: Hex::new(1, 0, -1),
                correct: true,
                card: Some(CardId::Supernova),
            },
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "TERRITORY_ACTION");
        assert_eq!(json["playerId"], "ada");
        assert_eq!(json["action"], "attack");
        assert_eq!(json["hexId"], "1,0,-1");
        assert_eq!(json["isCorrect"], true);
        assert_eq!(json["usedCard"], "supernova");

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }
}
