//! Score, moves, tier and charge bookkeeping

use serde::{Deserialize, Serialize};

use crate::consts::{CHARGE_MAX, INITIAL_MOVES, TIER_BONUS_MOVES, TIER_THRESHOLD};

/// Career titles by tier (tier 1 = first entry); the last one repeats
pub const TITLES: [&str; 6] = [
    "Intern",
    "Junior Engineer",
    "Engineer",
    "Senior Architect",
    "CTO",
    "Indie Developer",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub score: u64,
    pub moves_remaining: i32,
    /// Starts at 1, never decreases within a game
    pub tier: u32,
    /// Charge meter, 0..=CHARGE_MAX
    pub charge: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self {
            score: 0,
            moves_remaining: INITIAL_MOVES,
            tier: 1,
            charge: 0,
        }
    }

    /// Add points, advancing at most one tier per call.
    /// Returns true on a tier up.
    pub fn add_score(&mut self, delta: u64) -> bool {
        self.score += delta;
        if self.score < u64::from(self.tier) * TIER_THRESHOLD {
            return false;
        }
        self.tier += 1;
        self.moves_remaining += TIER_BONUS_MOVES;
        true
    }

    pub fn add_charge(&mut self, delta: u32) {
        self.charge = (self.charge + delta).min(CHARGE_MAX);
    }

    pub fn is_charged(&self) -> bool {
        self.charge >= CHARGE_MAX
    }

    pub fn consume_move(&mut self) {
        self.moves_remaining -= 1;
    }

    pub fn out_of_moves(&self) -> bool {
        self.moves_remaining <= 0
    }

    pub fn title(&self) -> &'static str {
        title_for_tier(self.tier)
    }
}

pub fn title_for_tier(tier: u32) -> &'static str {
    let idx = (tier.max(1) - 1) as usize;
    TITLES[idx.min(TITLES.len() - 1)]
}

/// Callout shown while a cascade chains
pub fn combo_callout(combo: u32) -> Option<&'static str> {
    match combo {
        0 | 1 => None,
        2 => Some("DEBUGGED"),
        3 => Some("REFACTORED"),
        _ => Some("DEPLOYED!"),
    }
}
