// ═══════════════════════════════════════════════════════════════════════
// Agent trait — interface for host-controlled players
//
// Agents only ever see the broadcast snapshot (the same read-only copy a
// client holds); they never touch the canonical state. The host asks the
// agent for one action when its team's turn comes up.
// ═══════════════════════════════════════════════════════════════════════

use nova_engine::engine::Action;
use nova_engine::{GameState, TeamId};

pub trait Agent: Send {
    /// Human-readable label (e.g. "Random").
    fn name(&self) -> &str;

    /// Produce one action for `team` given the current snapshot.
    fn decide(&mut self, state: &GameState, team: TeamId) -> Action;
}
