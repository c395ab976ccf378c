// ═══════════════════════════════════════════════════════════════════════
// Host session — the single authority over one room
//
// Flow:
//   1. Transport hands the session one BrokerEvent at a time
//   2. Valid TERRITORY_ACTIONs run through the engine; every resolved
//      action produces exactly one UPDATE_STATE broadcast
//   3. Rejections are logged and answered to the submitter only
//   4. tick() fires the bot for the active team once its delay elapses
//
// Processing is serialized by construction: one event, one full resolution,
// then the next event. Nothing here is partially applied.
// ═══════════════════════════════════════════════════════════════════════

use crate::broker::{BrokerEvent, ConnectionBroker, PeerId};
use crate::protocol::{self, Message, RoomState};
use crate::SyncError;
use nova_agents::{Agent, RandomBot};
use nova_engine::engine::{self, Action, BonusReason};
use nova_engine::lobby::{is_bot_name, Lobby};
use nova_engine::{setup, GameState, TeamId};
use rand::Rng;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Grace period before the bot moves, leaving human teammates first shot.
pub const BOT_DELAY: Duration = Duration::from_millis(2500);

pub struct HostSession<B: ConnectionBroker> {
    broker: B,
    code: String,
    lobby: Lobby,
    game: Option<GameState>,
    /// Live transport connection per player name, and the reverse.
    peers: HashMap<PeerId, String>,
    /// One decision-maker per bot-named roster member.
    bots: HashMap<String, Box<dyn Agent>>,
    bot_delay: Duration,
    bot_due: Option<Instant>,
}

impl<B: ConnectionBroker> HostSession<B> {
    /// Open a fresh room with a generated code.
    pub fn open(broker: B, rng: &mut impl Rng) -> HostSession<B> {
        Self::with_code(broker, protocol::generate_room_code(rng))
    }

    /// Re-create a room under a persisted code (host restart): the lobby is
    /// empty and clients are expected to rejoin by name.
    pub fn with_code(broker: B, code: String) -> HostSession<B> {
        HostSession {
            broker,
            code,
            lobby: Lobby::new(),
            game: None,
            peers: HashMap::new(),
            bots: HashMap::new(),
            bot_delay: BOT_DELAY,
            bot_due: None,
        }
    }

    /// Restart a host mid-match from a serialized canonical snapshot.
    pub fn resume(broker: B, code: String, snapshot: &str) -> Result<HostSession<B>, SyncError> {
        let game = setup::resume(snapshot)?;
        let mut session = Self::with_code(broker, code);
        for (&team, roster) in &game.rosters {
            for name in roster {
                session.lobby.add_player(name);
                session.lobby.move_player(name, team);
            }
        }
        session.spawn_bots(game.seed);
        session.game = Some(game);
        session.arm_bot_timer();
        tracing::info!(room = %session.code, "resumed room from snapshot");
        Ok(session)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn broker_mut(&mut self) -> &mut B {
        &mut self.broker
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn room_state(&self) -> RoomState {
        RoomState {
            code: self.code.clone(),
            players: self.lobby.players().to_vec(),
            teams: self.lobby.teams().clone(),
            started: self.game.is_some(),
        }
    }

    /// Lobby controls, driven by the host's own UI.
    pub fn add_bot(&mut self) -> Option<String> {
        self.lobby.add_bot()
    }

    pub fn move_player(&mut self, name: &str, to: TeamId) -> bool {
        self.lobby.move_player(name, to)
    }

    pub fn randomize_teams(&mut self, rng: &mut impl Rng) {
        self.lobby.randomize(rng);
    }

    /// Shorten (or zero) the bot grace period; the runner uses this.
    pub fn set_bot_delay(&mut self, delay: Duration) {
        self.bot_delay = delay;
    }

    /// Start the match over the current lobby. Host-only; broadcast once.
    pub fn start_game(&mut self, mode: &str, topics: Vec<String>, seed: u64) {
        let state = setup::create_initial_state(&self.lobby, seed);
        tracing::info!(room = %self.code, teams = state.teams.len(), seed, "match started");
        self.broker.broadcast(&Message::StartGame {
            mode: mode.to_string(),
            topics,
            questions: serde_json::Value::Null,
            territory_state: state.clone(),
        });
        self.spawn_bots(seed);
        self.game = Some(state);
        self.arm_bot_timer();
    }

    fn spawn_bots(&mut self, seed: u64) {
        self.bots.clear();
        for (at, player) in self.lobby.players().iter().enumerate() {
            if player.bot {
                let bot: Box<dyn Agent> = Box::new(RandomBot::new(seed.wrapping_add(at as u64)));
                self.bots.insert(player.name.clone(), bot);
            }
        }
    }

    /// Feed one transport event through the session.
    pub fn handle_event(&mut self, event: BrokerEvent) {
        match event {
            BrokerEvent::Connected(peer) => {
                tracing::debug!(room = %self.code, peer, "peer connected");
            }
            BrokerEvent::Disconnected(peer) => {
                if let Some(name) = self.peers.remove(&peer) {
                    tracing::info!(room = %self.code, player = %name, "player disconnected");
                }
            }
            BrokerEvent::Data(peer, text) => match serde_json::from_str::<Message>(&text) {
                Ok(message) => self.handle_message(peer, message),
                Err(error) => {
                    tracing::warn!(room = %self.code, peer, %error, "dropping malformed message");
                }
            },
        }
    }

    fn handle_message(&mut self, peer: PeerId, message: Message) {
        match message {
            Message::JoinRequest { player_name } => self.handle_join(peer, &player_name),
            Message::TerritoryAction { player_id, action } => {
                self.resolve_action(Some(peer), &player_id, action);
            }
            other => {
                tracing::warn!(room = %self.code, peer, ?other, "unexpected message from client");
            }
        }
    }

    /// Join is keyed by name, not connection: a known name re-binds its
    /// connection and resumes its team and cards untouched.
    fn handle_join(&mut self, peer: PeerId, name: &str) {
        let rejoin = self.lobby.contains(name);
        if rejoin {
            self.peers.retain(|_, bound| bound != name);
            tracing::info!(room = %self.code, player = %name, "player reconnected");
        } else {
            let team = self.lobby.add_player(name);
            tracing::info!(room = %self.code, player = %name, %team, "player joined");
        }
        self.peers.insert(peer, name.to_string());
        self.broker.send(
            peer,
            &Message::JoinAccept { room_state: self.room_state(), game_state: self.game.clone() },
        );
    }

    fn resolve_action(&mut self, peer: Option<PeerId>, player: &str, action: Action) {
        let Some(game) = self.game.as_mut() else {
            tracing::warn!(room = %self.code, player, "action before match start");
            return;
        };
        match engine::resolve(game, player, action) {
            Ok(outcome) => {
                let snapshot = game.clone();
                self.broker.broadcast(&Message::UpdateState { game_state: snapshot });
                for (team, card, reason) in &outcome.bonus_cards {
                    self.broker.broadcast(&Message::CardNotification {
                        team: *team,
                        card_id: *card,
                        reason: match reason {
                            BonusReason::Streak => "streak".to_string(),
                            BonusReason::HqBreach => "hq_breach".to_string(),
                        },
                    });
                }
                if let Some(hex) = outcome.destroyed {
                    self.broker.broadcast(&Message::GameNotification {
                        icon: Some("💥".to_string()),
                        title: "Sector destroyed".to_string(),
                        message: format!("Asteroid barrage levelled {hex}"),
                        color: None,
                    });
                }
                self.arm_bot_timer();
            }
            Err(error) => {
                // Protocol violation: no broadcast, submitter only.
                tracing::warn!(room = %self.code, player, %error, "action rejected");
                if let Some(peer) = peer {
                    self.broker.send(
                        peer,
                        &Message::GameNotification {
                            icon: None,
                            title: "Action rejected".to_string(),
                            message: error.to_string(),
                            color: Some("warning".to_string()),
                        },
                    );
                }
            }
        }
    }

    /// Schedule the active team's bot, if it has one.
    fn arm_bot_timer(&mut self) {
        self.bot_due = self.active_bot().map(|_| Instant::now() + self.bot_delay);
    }

    fn active_bot(&self) -> Option<String> {
        let game = self.game.as_ref()?;
        game.rosters[&game.active_team()]
            .iter()
            .find(|name| is_bot_name(name) && self.bots.contains_key(*name))
            .cloned()
    }

    /// Drive time-based work: at most one bot action per turn. Humans on the
    /// same team can still beat the bot to it; whoever resolves first wins
    /// via the active-team check.
    pub fn tick(&mut self, now: Instant) {
        match self.bot_due {
            Some(due) if due <= now => {}
            _ => return,
        }
        self.bot_due = None;
        let Some(name) = self.active_bot() else { return };
        let Some(game) = self.game.as_ref() else { return };
        let team = game.active_team();
        let action = match self.bots.get_mut(&name) {
            Some(bot) => bot.decide(game, team),
            None => return,
        };
        tracing::debug!(room = %self.code, player = %name, %team, "bot acting");
        self.resolve_action(None, &name, action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::LoopbackBroker;
    use nova_engine::Hex;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn wire(message: &Message) -> String {
        serde_json::to_string(message).expect("messages always serialize")
    }

    fn join(host: &mut HostSession<LoopbackBroker>, peer: PeerId, name: &str) {
        host.broker_mut().attach(peer);
        host.handle_event(BrokerEvent::Data(
            peer,
            wire(&Message::JoinRequest { player_name: name.to_string() }),
        ));
    }

    fn host_with_two_players() -> HostSession<LoopbackBroker> {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut host = HostSession::open(LoopbackBroker::new(), &mut rng);
        join(&mut host, 1, "ada");
        join(&mut host, 2, "grace");
        host
    }

    fn attack_message(player: &str, hex: Hex, correct: bool) -> String {
        wire(&Message::TerritoryAction {
            player_id: player.to_string(),
            action: Action::Attack { hex, correct, card: None },
        })
    }

    #[test]
    fn test_join_assigns_teams_and_replies() {
        let mut host = host_with_two_players();
        let inbox = host.broker_mut().drain(1);
        assert_eq!(inbox.len(), 1);
        let Message::JoinAccept { room_state: room, game_state: game } = &inbox[0] else {
            panic!("expected JoinAccept, got {:?}", inbox[0]);
        };
        assert!(!room.started);
        assert!(game.is_none());
        assert_eq!(room.players.len(), 1); // snapshot taken at ada's join
        assert_eq!(host.room_state().players.len(), 2);
    }

    #[test]
    fn test_rejoin_is_idempotent() {
        let mut host = host_with_two_players();
        let team_before = host.room_state().teams.clone();

        // Same name, new transport connection.
        join(&mut host, 7, "ada");
        let room = host.room_state();
        assert_eq!(room.players.len(), 2);
        assert_eq!(room.teams, team_before);
    }

    #[test]
    fn test_reconnect_into_running_match_gets_snapshot() {
        let mut host = host_with_two_players();
        host.start_game("classic", Vec::new(), 42);

        join(&mut host, 9, "ada");
        let inbox = host.broker_mut().drain(9);
        let Message::JoinAccept { room_state: room, game_state: game } = &inbox[inbox.len() - 1] else {
            panic!("expected JoinAccept");
        };
        assert!(room.started);
        let game = game.as_ref().expect("mid-match join carries the snapshot");
        assert_eq!(game, host.game().unwrap());
    }

    #[test]
    fn test_resolved_action_broadcasts_one_update() {
        let mut host = host_with_two_players();
        host.start_game("classic", Vec::new(), 42);
        host.broker_mut().drain(1);
        host.broker_mut().drain(2);

        let origin = Hex::new(0, 0, 0);
        host.handle_event(BrokerEvent::Data(1, attack_message("ada", origin, true)));

        for peer in [1, 2] {
            let updates: Vec<Message> = host
                .broker_mut()
                .drain(peer)
                .into_iter()
                .filter(|m| matches!(m, Message::UpdateState { .. }))
                .collect();
            assert_eq!(updates.len(), 1, "peer {peer} should see exactly one update");
            let Message::UpdateState { game_state: game } = &updates[0] else { unreachable!() };
            assert_eq!(game, host.game().unwrap());
        }
    }

    #[test]
    fn test_rejected_action_reaches_submitter_only() {
        let mut host = host_with_two_players();
        host.start_game("classic", Vec::new(), 42);
        host.broker_mut().drain(1);
        host.broker_mut().drain(2);
        let before = host.game().unwrap().clone();

        // grace plays Blue; Red is active.
        host.handle_event(BrokerEvent::Data(2, attack_message("grace", Hex::new(0, 0, 0), true)));

        assert_eq!(host.game().unwrap(), &before);
        assert!(host.broker_mut().drain(1).is_empty(), "no broadcast on rejection");
        let inbox = host.broker_mut().drain(2);
        assert!(inbox
            .iter()
            .all(|m| matches!(m, Message::GameNotification { .. })));
        assert_eq!(inbox.len(), 1);
    }

    #[test]
    fn test_malformed_data_is_dropped() {
        let mut host = host_with_two_players();
        host.handle_event(BrokerEvent::Data(1, "{definitely not json".to_string()));
        host.handle_event(BrokerEvent::Data(1, r#"{"type":"WARP_CORE"}"#.to_string()));
        assert_eq!(host.room_state().players.len(), 2);
    }

    #[test]
    fn test_bot_ticks_one_action_per_turn() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut host = HostSession::open(LoopbackBroker::new(), &mut rng);
        host.broker_mut().attach(1);
        host.add_bot().unwrap();
        host.add_bot().unwrap();
        host.set_bot_delay(Duration::ZERO);
        host.start_game("classic", Vec::new(), 42);

        let first = host.game().unwrap().active_team();
        host.tick(Instant::now());
        let second = host.game().unwrap().active_team();
        assert_ne!(first, second);

        // Each tick resolves exactly one bot attack.
        host.tick(Instant::now());
        host.tick(Instant::now());
        let updates = host
            .broker_mut()
            .drain(1)
            .into_iter()
            .filter(|m| matches!(m, Message::UpdateState { .. }))
            .count();
        assert_eq!(updates, 3);
    }

    #[test]
    fn test_resume_restores_room_and_bots() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut host = HostSession::open(LoopbackBroker::new(), &mut rng);
        host.add_bot().unwrap();
        host.add_bot().unwrap();
        host.start_game("classic", Vec::new(), 42);
        let code = host.code().to_string();
        let snapshot = serde_json::to_string(host.game().unwrap()).unwrap();

        let restored =
            HostSession::resume(LoopbackBroker::new(), code.clone(), &snapshot).unwrap();
        assert_eq!(restored.code(), code);
        assert_eq!(restored.game(), host.game());
        assert_eq!(restored.room_state().teams, host.room_state().teams);
        assert!(restored.room_state().started);
    }

    #[test]
    fn test_action_before_start_is_ignored() {
        let mut host = host_with_two_players();
        host.broker_mut().drain(1);
        host.handle_event(BrokerEvent::Data(1, attack_message("ada", Hex::new(0, 0, 0), true)));
        assert!(host.game().is_none());
        assert!(host.broker_mut().drain(1).is_empty());
    }
}
