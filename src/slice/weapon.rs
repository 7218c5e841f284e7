//! Weapon variants and their tuning
//!
//! Behaviour differences live in [`WeaponConfig`], looked up by kind.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Melee blade
    #[default]
    Katana,
    /// Area blast
    Cannon,
    /// Ranged, fires projectiles
    Bow,
}

/// How an input sample turns into hits
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionMode {
    /// Everything within `impact_radius` of the pointer is hit on the spot
    Immediate { impact_radius: f32 },
    /// An upward projectile is spawned and collides as it flies
    Projectile { speed: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponConfig {
    /// Minimum time between accepted input samples
    pub cooldown_ms: f64,
    pub mode: CollisionMode,
    /// Points for a benign target before the critical multiplier
    pub base_points: i64,
    pub crit_chance: f32,
    /// Trail colour (0xRRGGBB)
    pub trail_color: u32,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Katana, WeaponKind::Cannon, WeaponKind::Bow];

    pub fn config(self) -> WeaponConfig {
        match self {
            WeaponKind::Katana => WeaponConfig {
                cooldown_ms: 50.0,
                mode: CollisionMode::Immediate { impact_radius: 40.0 },
                base_points: 10,
                crit_chance: 0.15,
                trail_color: 0x00f2ff,
            },
            WeaponKind::Cannon => WeaponConfig {
                cooldown_ms: 800.0,
                mode: CollisionMode::Immediate { impact_radius: 160.0 },
                base_points: 10,
                crit_chance: 0.15,
                trail_color: 0xff0000,
            },
            WeaponKind::Bow => WeaponConfig {
                cooldown_ms: 300.0,
                // 25 px/frame at 60 fps
                mode: CollisionMode::Projectile { speed: 1500.0 },
                base_points: 15,
                crit_chance: 0.25,
                trail_color: 0x38bdf8,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeaponKind::Katana => "Katana",
            WeaponKind::Cannon => "Cannon",
            WeaponKind::Bow => "Bow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s))
    }

    pub fn is_ranged(self) -> bool {
        matches!(self.config().mode, CollisionMode::Projectile { .. })
    }
}
