// ═══════════════════════════════════════════════════════════════════════
// Card catalog and per-team card bookkeeping — static data + weighted draw
// ═══════════════════════════════════════════════════════════════════════

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Hands never grow past this many cards; further grants are silent no-ops.
pub const HAND_LIMIT: usize = 5;

/// Cards dealt to every team at match start.
pub const INITIAL_HAND: usize = 2;

/// A team earns a bonus card when its correct-answer streak hits this.
pub const STREAK_TARGET: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardId {
    NavProbe,
    Hyperspace,
    TimeDilation,
    Asteroid,
    Wormhole,
    ForceField,
    Supernova,
    GalacticShield,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tactical,
    Offensive,
    Defensive,
}

/// When the question UI may offer the card. The engine itself applies card
/// effects atomically when an action declares one; timing only gates the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    BeforeQuestion,
    DuringQuestion,
    Passive,
}

#[derive(Debug, Clone, Copy)]
pub struct CardDef {
    pub id: CardId,
    pub name: &'static str,
    pub blurb: &'static str,
    pub category: Category,
    pub timing: Timing,
    pub weight: u32,
}

pub static CATALOG: [CardDef; 8] = [
    CardDef {
        id: CardId::NavProbe,
        name: "Navigation Probe",
        blurb: "Scans the question and discards one wrong option.",
        category: Category::Tactical,
        timing: Timing::DuringQuestion,
        weight: 4,
    },
    CardDef {
        id: CardId::Hyperspace,
        name: "Hyperspace Jump",
        blurb: "Jettisons the current question and pulls a fresh one.",
        category: Category::Tactical,
        timing: Timing::DuringQuestion,
        weight: 3,
    },
    CardDef {
        id: CardId::TimeDilation,
        name: "Time Dilation",
        blurb: "Stretches the answer timer.",
        category: Category::Tactical,
        timing: Timing::DuringQuestion,
        weight: 3,
    },
    CardDef {
        id: CardId::Asteroid,
        name: "Asteroid Barrage",
        blurb: "Pummels the target sector for 2 shield before the attack lands.",
        category: Category::Offensive,
        timing: Timing::BeforeQuestion,
        weight: 2,
    },
    CardDef {
        id: CardId::Wormhole,
        name: "Wormhole",
        blurb: "Opens a passage: target any sector, adjacency be damned.",
        category: Category::Tactical,
        timing: Timing::BeforeQuestion,
        weight: 2,
    },
    CardDef {
        id: CardId::ForceField,
        name: "Force Field",
        blurb: "Reinforces one of your sectors with 3 shield.",
        category: Category::Defensive,
        timing: Timing::BeforeQuestion,
        weight: 2,
    },
    CardDef {
        id: CardId::Supernova,
        name: "Supernova",
        blurb: "The attack succeeds no matter what you answer.",
        category: Category::Offensive,
        timing: Timing::DuringQuestion,
        weight: 1,
    },
    CardDef {
        id: CardId::GalacticShield,
        name: "Galactic Shield",
        blurb: "Your whole territory shrugs off attacks for a few rounds.",
        category: Category::Defensive,
        timing: Timing::Passive,
        weight: 1,
    },
];

pub fn card_def(id: CardId) -> &'static CardDef {
    CATALOG.iter().find(|def| def.id == id).expect("every card id is in the catalog")
}

/// Weighted random draw over the catalog. Draws are independent; there is
/// no deck to exhaust.
pub fn draw_random_card(rng: &mut impl Rng) -> CardId {
    let total: u32 = CATALOG.iter().map(|def| def.weight).sum();
    let mut roll = rng.gen_range(0..total);
    for def in &CATALOG {
        if roll < def.weight {
            return def.id;
        }
        roll -= def.weight;
    }
    unreachable!("cumulative weights cover the roll range");
}

/// Per-team card economy state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardState {
    /// Cards held, in draw order. Never longer than HAND_LIMIT.
    pub hand: Vec<CardId>,
    /// Consecutive correct answers.
    pub streak: u32,
    /// Remaining rounds of galactic-shield immunity. 0 = inactive.
    pub shield_turns: u32,
}

impl CardState {
    /// Add a card, respecting the hand cap. Returns whether it went in.
    pub fn grant(&mut self, card: CardId) -> bool {
        if self.hand.len() >= HAND_LIMIT {
            return false;
        }
        self.hand.push(card);
        true
    }

    /// Remove one copy of `card` from the hand. Returns whether it was held.
    pub fn take(&mut self, card: CardId) -> bool {
        match self.hand.iter().position(|&held| held == card) {
            Some(at) => {
                self.hand.remove(at);
                true
            }
            None => false,
        }
    }

    pub fn holds(&self, card: CardId) -> bool {
        self.hand.contains(&card)
    }
}
