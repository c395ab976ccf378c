// ═══════════════════════════════════════════════════════════════════════
// Lobby — flat player roster and team assignment before match start
// ═══════════════════════════════════════════════════════════════════════

use crate::types::TeamId;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Names handed to host-controlled players, in claim order.
pub const BOT_NAMES: [&str; 8] = [
    "Bot Vega",
    "Bot Altair",
    "Bot Rigel",
    "Bot Sirius",
    "Bot Capella",
    "Bot Deneb",
    "Bot Castor",
    "Bot Polaris",
];

/// Bots are flagged purely by naming convention.
pub fn is_bot_name(name: &str) -> bool {
    name.starts_with("Bot ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub bot: bool,
}

/// Pre-match roster. Every palette slot exists; empty slots are simply not
/// part of the rotation once the match starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lobby {
    players: Vec<Player>,
    teams: BTreeMap<TeamId, Vec<String>>,
}

impl Default for Lobby {
    fn default() -> Self {
        Lobby::new()
    }
}

impl Lobby {
    pub fn new() -> Lobby {
        Lobby {
            players: Vec::new(),
            teams: TeamId::ALL.iter().map(|&team| (team, Vec::new())).collect(),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn teams(&self) -> &BTreeMap<TeamId, Vec<String>> {
        &self.teams
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    pub fn team_of(&self, name: &str) -> Option<TeamId> {
        self.teams
            .iter()
            .find(|(_, roster)| roster.iter().any(|n| n == name))
            .map(|(&team, _)| team)
    }

    /// Add a player into the currently smallest team (ties broken by palette
    /// order). Re-adding a known name is a no-op returning their team —
    /// names are the stable identity a reconnect keys on.
    pub fn add_player(&mut self, name: &str) -> TeamId {
        if let Some(team) = self.team_of(name) {
            return team;
        }
        let team = TeamId::ALL
            .iter()
            .copied()
            .min_by_key(|team| self.teams[team].len())
            .expect("palette is non-empty");
        self.players.push(Player { name: name.to_string(), bot: is_bot_name(name) });
        self.teams.get_mut(&team).expect("all palette slots exist").push(name.to_string());
        team
    }

    /// Add a host-controlled player under the next free bot name.
    /// Pool exhausted → no-op (capacity violations are never errors).
    pub fn add_bot(&mut self) -> Option<String> {
        let name = BOT_NAMES.iter().find(|&&name| !self.contains(name))?;
        self.add_player(name);
        Some(name.to_string())
    }

    /// Move a single player to another team. Unknown names are ignored.
    pub fn move_player(&mut self, name: &str, to: TeamId) -> bool {
        let Some(from) = self.team_of(name) else { return false };
        if from == to {
            return true;
        }
        self.teams.get_mut(&from).expect("all palette slots exist").retain(|n| n != name);
        self.teams.get_mut(&to).expect("all palette slots exist").push(name.to_string());
        true
    }

    /// Shuffle the whole roster and deal it round-robin across
    /// max(2, min(4, n/2)) teams.
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        let mut names: Vec<String> = self.players.iter().map(|p| p.name.clone()).collect();
        names.shuffle(rng);

        let team_count = (names.len() / 2).clamp(2, 4);
        for roster in self.teams.values_mut() {
            roster.clear();
        }
        for (at, name) in names.into_iter().enumerate() {
            let team = TeamId::ALL[at % team_count];
            self.teams.get_mut(&team).expect("all palette slots exist").push(name);
        }
    }

    /// Teams that will actually play: palette order, non-empty rosters.
    pub fn active_teams(&self) -> Vec<TeamId> {
        TeamId::ALL
            .iter()
            .copied()
            .filter(|team| !self.teams[team].is_empty())
            .collect()
    }
}
