//! Slice world state
//!
//! Everything the renderer draws lives in [`SliceState`]. Units are pixels
//! and seconds, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combo::ComboState;
use super::weapon::WeaponKind;

/// Benign target colours (0xRRGGBB)
pub const TARGET_PALETTE: [u32; 4] = [0x00f2ff, 0xff00ff, 0x00ff41, 0xffea00];
pub const HAZARD_COLOR: u32 = 0xff0000;
/// Debris colour when a hazard is sliced
pub const HAZARD_DEBRIS_COLOR: u32 = 0x000000;
pub const LABEL_COLOR: u32 = 0xffffff;
pub const CRIT_LABEL_COLOR: u32 = 0xffff00;
pub const PENALTY_LABEL_COLOR: u32 = 0xff0000;

/// Draw order, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Layer {
    Projectiles,
    Labels,
    Particles,
    Trail,
    Targets,
    ComboBanner,
}

pub const RENDER_LAYERS: [Layer; 6] = [
    Layer::Projectiles,
    Layer::Labels,
    Layer::Particles,
    Layer::Trail,
    Layer::Targets,
    Layer::ComboBanner,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Benign,
    /// Slicing costs points
    Hazard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub kind: TargetKind,
    pub color: u32,
    /// Sliced targets keep falling but can't be hit again
    pub sliced: bool,
    pub rotation: f32,
    /// Radians per second
    pub rotation_speed: f32,
}

impl Target {
    pub fn new(id: u32, kind: TargetKind, pos: Vec2, vel: Vec2, color: u32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius: crate::consts::TARGET_RADIUS,
            kind,
            color,
            sliced: false,
            rotation: 0.0,
            rotation_speed: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    /// 1 while flying, 0 once consumed
    pub life: f32,
}

/// Juice particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub color: u32,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub life: f32,
}

/// Floating "+10" style score text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingLabel {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub text: String,
    pub color: u32,
    pub size: f32,
}

/// "GREAT 4" / "EXTREME 9" callout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboBanner {
    pub pos: Vec2,
    pub life: f32,
    pub text: String,
    pub scale: f32,
    pub extreme: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Inside the world grown by `margin` on every side
    pub fn contains(&self, pos: Vec2, margin: f32) -> bool {
        pos.x >= -margin
            && pos.x <= self.width + margin
            && pos.y >= -margin
            && pos.y <= self.height + margin
    }
}

/// Complete slice world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceState {
    pub bounds: WorldBounds,
    pub playing: bool,
    pub weapon: WeaponKind,
    /// Round score; hazards can drive it negative
    pub score: i64,
    /// Engine clock (ms since construction)
    pub clock_ms: f64,
    /// Shake intensity in pixels
    pub screen_shake: f32,
    pub pointer: Vec2,
    pub combo: ComboState,
    pub targets: Vec<Target>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub trail: Vec<TrailPoint>,
    pub labels: Vec<FloatingLabel>,
    pub banners: Vec<ComboBanner>,
    next_id: u32,
}

impl SliceState {
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            playing: false,
            weapon: WeaponKind::default(),
            score: 0,
            clock_ms: 0.0,
            screen_shake: 0.0,
            pointer: Vec2::ZERO,
            combo: ComboState::default(),
            targets: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            trail: Vec::new(),
            labels: Vec::new(),
            banners: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Drop every transient entity and the combo streak
    pub fn clear_world(&mut self) {
        self.targets.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.trail.clear();
        self.labels.clear();
        self.banners.clear();
        self.combo = ComboState::default();
        self.screen_shake = 0.0;
    }

    pub fn entity_count(&self) -> usize {
        self.targets.len()
            + self.projectiles.len()
            + self.particles.len()
            + self.trail.len()
            + self.labels.len()
            + self.banners.len()
    }

    /// Raise shake to at least `amount`
    pub fn shake(&mut self, amount: f32) {
        self.screen_shake = self.screen_shake.max(amount);
    }
}
