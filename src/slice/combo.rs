//! Combo streak
//!
//! Registrations within [`COMBO_WINDOW_MS`] of the previous one accumulate;
//! a later one starts a new streak at its own hit count.

use serde::{Deserialize, Serialize};

use crate::consts::COMBO_WINDOW_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComboPhase {
    Idle,
    Active,
}

/// Callout earned by a streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComboTier {
    /// 3..=8 hits
    Great,
    /// More than 8 hits
    Extreme,
}

impl ComboTier {
    pub fn for_count(count: u32) -> Option<Self> {
        match count {
            c if c > 8 => Some(ComboTier::Extreme),
            c if c >= 3 => Some(ComboTier::Great),
            _ => None,
        }
    }

    pub fn banner_text(self, count: u32) -> String {
        match self {
            ComboTier::Great => format!("⚡ GREAT {count} ⚡"),
            ComboTier::Extreme => format!("🔥 EXTREME {count} 🔥"),
        }
    }

    pub fn scale(self) -> f32 {
        match self {
            ComboTier::Great => 1.4,
            ComboTier::Extreme => 2.0,
        }
    }

    pub fn shake(self) -> f32 {
        match self {
            ComboTier::Great => 5.0,
            ComboTier::Extreme => 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub count: u32,
    pub last_hit_ms: f64,
}

impl ComboState {
    /// Register `hits` at `now_ms`, returning the streak length
    pub fn register(&mut self, hits: u32, now_ms: f64) -> u32 {
        if self.count > 0 && now_ms - self.last_hit_ms <= COMBO_WINDOW_MS {
            self.count += hits;
        } else {
            self.count = hits;
        }
        self.last_hit_ms = now_ms;
        self.count
    }

    /// Drop the streak once the window has passed
    pub fn expire(&mut self, now_ms: f64) {
        if self.count > 0 && now_ms - self.last_hit_ms > COMBO_WINDOW_MS {
            self.count = 0;
        }
    }

    pub fn phase(&self) -> ComboPhase {
        if self.count == 0 {
            ComboPhase::Idle
        } else {
            ComboPhase::Active
        }
    }

    pub fn tier(&self) -> Option<ComboTier> {
        ComboTier::for_count(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accumulates_inside_window() {
        let mut combo = ComboState::default();
        assert_eq!(combo.register(2, 0.0), 2);
        assert_eq!(combo.register(1, 200.0), 3);
        // Window is inclusive
        assert_eq!(combo.register(1, 200.0 + COMBO_WINDOW_MS), 4);
        assert_eq!(combo.tier(), Some(ComboTier::Great));
    }

    #[test]
    fn test_gap_restarts_at_batch_size() {
        let mut combo = ComboState::default();
        combo.register(5, 0.0);
        assert_eq!(combo.register(2, COMBO_WINDOW_MS + 1.0), 2);
    }

    #[test]
    fn test_expire_returns_to_idle() {
        let mut combo = ComboState::default();
        combo.register(1, 100.0);
        combo.expire(100.0 + COMBO_WINDOW_MS);
        assert_eq!(combo.phase(), ComboPhase::Active);
        combo.expire(101.0 + COMBO_WINDOW_MS);
        assert_eq!(combo.phase(), ComboPhase::Idle);
    }

    #[test]
    fn test_tiers() {
        assert_eq!(ComboTier::for_count(2), None);
        assert_eq!(ComboTier::for_count(3), Some(ComboTier::Great));
        assert_eq!(ComboTier::for_count(8), Some(ComboTier::Great));
        assert_eq!(ComboTier::for_count(9), Some(ComboTier::Extreme));
        assert!(ComboTier::Extreme.banner_text(9).contains("EXTREME 9"));
    }

    proptest! {
        #[test]
        fn prop_streak_matches_gaps(
            batches in prop::collection::vec((1u32..5, 0u32..700), 1..40)
        ) {
            let mut combo = ComboState::default();
            let mut now = 0.0;
            let mut expected = 0;
            for (i, (hits, gap)) in batches.into_iter().enumerate() {
                let gap = f64::from(gap);
                now += gap;
                expected = if i > 0 && gap <= COMBO_WINDOW_MS { expected + hits } else { hits };
                prop_assert_eq!(combo.register(hits, now), expected);
            }
        }
    }
}
