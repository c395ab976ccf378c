// ═══════════════════════════════════════════════════════════════════════
// Client session — a disposable mirror of the host's canonical state
//
// Clients never merge or predict: every UPDATE_STATE replaces the whole
// view, so replaying a duplicate snapshot changes nothing. A dropped
// connection is retried a bounded number of times before the failure is
// surfaced for manual retry.
// ═══════════════════════════════════════════════════════════════════════

use crate::protocol::{Message, RoomState};
use crate::SyncError;
use nova_engine::engine::Action;
use nova_engine::GameState;

/// Transport session attempts before giving up. Exhaustion surfaces to the
/// user for manual retry; it is never fatal to the match.
pub const MAX_JOIN_ATTEMPTS: u32 = 5;

#[derive(Debug)]
pub struct ClientSession {
    name: String,
    room: Option<RoomState>,
    game: Option<GameState>,
    attempts: u32,
}

impl ClientSession {
    pub fn new(name: impl Into<String>) -> ClientSession {
        ClientSession { name: name.into(), room: None, game: None, attempts: 0 }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn room(&self) -> Option<&RoomState> {
        self.room.as_ref()
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    /// The join (or rejoin) message for this identity.
    pub fn join_request(&self) -> Message {
        Message::JoinRequest { player_name: self.name.clone() }
    }

    /// Wrap an action for the wire.
    pub fn action(&self, action: Action) -> Message {
        Message::TerritoryAction { player_id: self.name.clone(), action }
    }

    /// Raw wire text in; malformed payloads are dropped on the floor.
    pub fn handle_data(&mut self, text: &str) {
        match serde_json::from_str::<Message>(text) {
            Ok(message) => self.handle_message(message),
            Err(error) => tracing::warn!(%error, "dropping malformed message"),
        }
    }

    pub fn handle_message(&mut self, message: Message) {
        match message {
            Message::JoinAccept { room_state, game_state } => {
                self.attempts = 0;
                self.room = Some(room_state);
                // Present iff we reconnected into a running match.
                if game_state.is_some() {
                    self.game = game_state;
                }
            }
            Message::StartGame { territory_state, .. } => {
                if let Some(room) = self.room.as_mut() {
                    room.started = true;
                }
                self.game = Some(territory_state);
            }
            Message::UpdateState { game_state } => {
                // Wholesale replacement; no merging with the old view.
                self.game = Some(game_state);
            }
            Message::CardNotification { team, card_id, reason } => {
                tracing::debug!(%team, ?card_id, %reason, "card notification");
            }
            Message::GameNotification { title, message, .. } => {
                tracing::debug!(%title, %message, "game notification");
            }
            other => {
                tracing::warn!(?other, "unexpected message from host");
            }
        }
    }

    /// The transport dropped. Returns the rejoin message to send once the
    /// session is re-established, or the terminal error past the bound.
    pub fn handle_disconnect(&mut self) -> Result<Message, SyncError> {
        self.attempts += 1;
        if self.attempts > MAX_JOIN_ATTEMPTS {
            return Err(SyncError::RetriesExhausted(MAX_JOIN_ATTEMPTS));
        }
        tracing::info!(player = %self.name, attempt = self.attempts, "rejoining room");
        Ok(self.join_request())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_engine::lobby::Lobby;
    use nova_engine::setup;

    fn sample_game() -> GameState {
        let mut lobby = Lobby::new();
        lobby.add_player("ada");
        lobby.add_player("grace");
        setup::create_initial_state(&lobby, 42)
    }

    #[test]
    fn test_update_replacement_is_idempotent() {
        let mut client = ClientSession::new("ada");
        let game = sample_game();

        client.handle_message(Message::UpdateState { game_state: game.clone() });
        let first = client.game().cloned();
        client.handle_message(Message::UpdateState { game_state: game.clone() });
        assert_eq!(client.game().cloned(), first);
        assert_eq!(client.game(), Some(&game));
    }

    #[test]
    fn test_start_game_installs_snapshot_and_flags_room() {
        let mut client = ClientSession::new("ada");
        client.handle_message(Message::JoinAccept {
            room_state: RoomState {
                code: "WXYZ".into(),
                players: Vec::new(),
                teams: Default::default(),
                started: false,
            },
            game_state: None,
        });
        client.handle_message(Message::StartGame {
            mode: "classic".into(),
            topics: Vec::new(),
            questions: serde_json::Value::Null,
            territory_state: sample_game(),
        });
        assert!(client.room().unwrap().started);
        assert!(client.game().is_some());
    }

    #[test]
    fn test_join_accept_resets_the_retry_counter() {
        let mut client = ClientSession::new("ada");
        for _ in 0..MAX_JOIN_ATTEMPTS {
            client.handle_disconnect().unwrap();
        }
        client.handle_message(Message::JoinAccept {
            room_state: RoomState {
                code: "WXYZ".into(),
                players: Vec::new(),
                teams: Default::default(),
                started: false,
            },
            game_state: None,
        });
        // Counter cleared: the full budget is available again.
        for _ in 0..MAX_JOIN_ATTEMPTS {
            client.handle_disconnect().unwrap();
        }
    }

    #[test]
    fn test_retries_are_bounded() {
        let mut client = ClientSession::new("ada");
        for _ in 0..MAX_JOIN_ATTEMPTS {
            let message = client.handle_disconnect().unwrap();
            assert_eq!(message, client.join_request());
        }
        assert!(matches!(
            client.handle_disconnect(),
            Err(SyncError::RetriesExhausted(_))
        ));
    }

    #[test]
    fn test_malformed_wire_text_is_ignored() {
        let mut client = ClientSession::new("ada");
        client.handle_data("“quotes”");
        client.handle_data(r#"{"type":"UPDATE_STATE"}"#); // missing payload
        assert!(client.game().is_none());
    }
}
