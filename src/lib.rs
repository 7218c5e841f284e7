//! DevLife Arcade - match-3 board and slicing mini-game engines
//!
//! Core modules:
//! - `board`: Match-3 grid, cascade resolution, progression and game-over flow
//! - `slice`: Continuous slicing world (targets, projectiles, particles, combos)
//! - `sched`: Delay queue and interval timer driving scheduled continuations
//! - `rng`: Injectable random source
//! - `leaderboard`, `ad`, `platform`: External collaborators (storage, interstitial)
//! - `settings`: Player preferences

pub mod ad;
pub mod board;
pub mod error;
pub mod leaderboard;
pub mod platform;
pub mod rng;
pub mod sched;
pub mod settings;
pub mod slice;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{BoardError, StorageError};
pub use leaderboard::{Leaderboard, LeaderboardStore, ScoreEntry};
pub use rng::{GameRng, RandomSource};
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    // === Timing ===
    /// Fixed slice simulation timestep (60 Hz, the rate the tuning was authored at)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    // === Board ===
    /// Board is GRID_SIZE x GRID_SIZE
    pub const GRID_SIZE: usize = 6;
    /// Moves granted at the start of a game
    pub const INITIAL_MOVES: i32 = 25;
    /// Points per matched cell, scaled by the combo multiplier
    pub const BASE_POINTS: u64 = 150;
    /// Score needed per tier (tier N ends at N * TIER_THRESHOLD)
    pub const TIER_THRESHOLD: u64 = 2000;
    /// Moves granted on each tier up
    pub const TIER_BONUS_MOVES: i32 = 8;
    /// Charge gained per matched cell
    pub const CHARGE_RATE: u32 = 8;
    /// Charge needed for the special action
    pub const CHARGE_MAX: u32 = 100;
    /// Per-cell clear probability of the special action
    pub const SPECIAL_CLEAR_CHANCE: f32 = 0.5;
    /// Matches stay highlighted this long before removal
    pub const HIGHLIGHT_DELAY_MS: u32 = 200;
    /// Pause between a refill and the next match check
    pub const SETTLE_DELAY_MS: u32 = 200;
    /// A swap that matches nothing is shown this long before reverting
    pub const REVERT_DELAY_MS: u32 = 150;
    /// Special action screen flash duration
    pub const SPECIAL_FLASH_MS: u32 = 600;
    /// Hard cap on resolution passes per move
    pub const MAX_CASCADE_PASSES: u32 = 50;
    /// Rejection-sampling attempts per cell during generation
    pub const MAX_GENERATION_ATTEMPTS: u32 = 64;

    // === Slice world ===
    /// Gravity on targets and juice particles (0.25 px/frame² at 60 fps)
    pub const GRAVITY: f32 = 900.0;
    /// A target spawns every SPAWN_INTERVAL_MS
    pub const SPAWN_INTERVAL_MS: f64 = 125.0;
    /// Chance a spawned target is a hazard
    pub const HAZARD_CHANCE: f32 = 0.08;
    /// Target radius
    pub const TARGET_RADIUS: f32 = 35.0;
    /// Targets spawn this far below the bottom edge
    pub const SPAWN_DEPTH: f32 = 50.0;
    /// Targets are dropped once this far below the bottom edge
    pub const TARGET_EXIT_MARGIN: f32 = 150.0;
    /// Projectiles are dropped once this far above the top edge
    pub const PROJECTILE_EXIT_MARGIN: f32 = 100.0;
    /// Decorative entities are dropped once this far outside the world
    pub const EFFECT_EXIT_MARGIN: f32 = 200.0;
    /// Extra radius added to targets for projectile hits
    pub const PROJECTILE_HIT_RADIUS: f32 = 20.0;
    /// Consecutive hits within this window accumulate into one combo
    pub const COMBO_WINDOW_MS: f64 = 350.0;
    /// Score lost when slicing a hazard
    pub const HAZARD_PENALTY: i64 = 50;
    /// Score multiplier on a critical slice
    pub const CRIT_MULTIPLIER: i64 = 3;

    // === Decay rates (life per second) ===
    pub const LABEL_DECAY: f32 = 0.9;
    pub const PARTICLE_DECAY: f32 = 1.2;
    pub const TRAIL_DECAY: f32 = 4.8;
    pub const BANNER_DECAY: f32 = 1.5;
    /// Combo banners drift upward at this speed
    pub const BANNER_RISE_SPEED: f32 = 60.0;
    /// Screen shake keeps this fraction per 60 Hz frame
    pub const SHAKE_RETENTION: f32 = 0.9;
}
