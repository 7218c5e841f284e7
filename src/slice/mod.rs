//! Slicing mini-game engine
//!
//! Continuous-time world of launched targets, player input and decorative
//! juice. Everything is driven by a fixed timestep and an injectable RNG:
//! - Fixed timestep via `SliceEngine::update` / `tick`
//! - No rendering or platform dependencies

pub mod collision;
pub mod combo;
pub mod engine;
pub mod state;
pub mod weapon;

pub use collision::{circles_overlap, first_hit, targets_within};
pub use combo::{ComboPhase, ComboState, ComboTier};
pub use engine::{EffectLimits, InputOutcome, SliceEngine, SliceEvent};
pub use state::{
    ComboBanner, FloatingLabel, Layer, Particle, Projectile, RENDER_LAYERS, SliceState, Target,
    TargetKind, TrailPoint, WorldBounds,
};
pub use weapon::{CollisionMode, WeaponConfig, WeaponKind};
