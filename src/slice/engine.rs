//! Slice world simulation
//!
//! [`SliceEngine::tick`] advances one fixed step in a fixed order: clock and
//! spawner, projectiles, decorative effects, targets. Input samples resolve
//! immediately against the current target positions.

use glam::Vec2;
use serde::Serialize;

use super::collision::{first_hit, targets_within};
use super::combo::ComboTier;
use super::state::*;
use super::weapon::{CollisionMode, WeaponKind};
use crate::consts::*;
use crate::rng::{GameRng, RandomSource};
use crate::sched::IntervalTimer;
use crate::settings::Settings;

/// Engine output, drained by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SliceEvent {
    /// Negative only for hazards
    ScoreDelta { amount: i64, critical: bool },
    TargetSliced {
        id: u32,
        kind: TargetKind,
        points: i64,
    },
    /// One per melee/area sample that hit, one per projectile hit
    ComboRegistered { count: u32, hits: u32 },
    /// An active round was stopped
    GameOver { score: i64 },
}

/// What an input sample did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Not playing
    Ignored,
    /// Weapon still cooling down
    OnCooldown,
    /// Immediate weapon swung, hitting this many targets
    Swung { hits: usize },
    /// Ranged weapon fired this projectile
    Fired { projectile: u32 },
}

/// Cosmetic output limits taken from [`Settings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectLimits {
    pub screen_shake: bool,
    pub trails: bool,
    pub max_particles: usize,
}

impl Default for EffectLimits {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for EffectLimits {
    fn from(settings: &Settings) -> Self {
        Self {
            screen_shake: settings.effective_screen_shake(),
            trails: settings.trails,
            max_particles: settings.max_particles(),
        }
    }
}

pub struct SliceEngine<R = GameRng> {
    state: SliceState,
    rng: R,
    spawner: IntervalTimer,
    last_shot_ms: Option<f64>,
    /// Unsimulated frame time (seconds)
    accumulator: f32,
    limits: EffectLimits,
    events: Vec<SliceEvent>,
}

impl<R: RandomSource> SliceEngine<R> {
    pub fn new(rng: R, width: f32, height: f32) -> Self {
        Self {
            state: SliceState::new(WorldBounds::new(width, height)),
            rng,
            spawner: IntervalTimer::new(SPAWN_INTERVAL_MS),
            last_shot_ms: None,
            accumulator: 0.0,
            limits: EffectLimits::default(),
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &SliceState {
        &self.state
    }

    pub fn drain_events(&mut self) -> Vec<SliceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.limits = EffectLimits::from(settings);
        if !self.limits.screen_shake {
            self.state.screen_shake = 0.0;
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.bounds = WorldBounds::new(width, height);
    }

    pub fn set_weapon(&mut self, weapon: WeaponKind) {
        if self.state.weapon != weapon {
            log::info!("Weapon switched to {}", weapon.as_str());
            self.state.weapon = weapon;
        }
    }

    /// Start or stop a round. Stopping clears the world and reports the score.
    pub fn set_playing(&mut self, playing: bool) {
        if playing == self.state.playing {
            return;
        }
        self.state.clear_world();
        self.spawner.reset();
        self.last_shot_ms = None;
        self.state.playing = playing;

        if playing {
            self.state.score = 0;
            log::info!("Slice round started ({})", self.state.weapon.as_str());
        } else {
            let score = self.state.score;
            log::info!("Slice round over: {score}");
            self.events.push(SliceEvent::GameOver { score });
        }
    }

    /// Pointer sample in world coordinates
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> InputOutcome {
        if !self.state.playing {
            return InputOutcome::Ignored;
        }
        let pos = Vec2::new(x, y);
        self.state.pointer = pos;

        let config = self.state.weapon.config();
        let now = self.state.clock_ms;
        if self
            .last_shot_ms
            .is_some_and(|last| now - last < config.cooldown_ms)
        {
            return InputOutcome::OnCooldown;
        }
        self.last_shot_ms = Some(now);

        match config.mode {
            CollisionMode::Projectile { speed } => {
                let id = self.state.next_entity_id();
                self.state.projectiles.push(Projectile {
                    id,
                    pos,
                    vel: Vec2::new(0.0, -speed),
                    angle: -std::f32::consts::FRAC_PI_2,
                    life: 1.0,
                });
                InputOutcome::Fired { projectile: id }
            }
            CollisionMode::Immediate { impact_radius } => {
                if self.limits.trails {
                    self.state.trail.push(TrailPoint { pos, life: 1.0 });
                }
                let hits = targets_within(&self.state.targets, pos, impact_radius);
                for &i in &hits {
                    self.slice_target(i);
                }
                if !hits.is_empty() {
                    self.register_combo(hits.len() as u32, pos);
                }
                InputOutcome::Swung { hits: hits.len() }
            }
        }
    }

    /// Run fixed ticks for a frame of `frame_dt` seconds
    pub fn update(&mut self, frame_dt: f32) {
        self.accumulator += frame_dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    /// Advance the world by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let dt_ms = f64::from(dt) * 1000.0;
        self.state.clock_ms += dt_ms;

        if self.state.playing {
            for _ in 0..self.spawner.advance(dt_ms) {
                self.spawn_target();
            }
        }

        // Decay screen shake
        self.state.screen_shake *= SHAKE_RETENTION.powf(dt * 60.0);
        if self.state.screen_shake < 0.01 {
            self.state.screen_shake = 0.0;
        }
        self.state.combo.expire(self.state.clock_ms);

        self.update_projectiles(dt);
        self.update_effects(dt);
        self.update_targets(dt);
    }

    fn spawn_target(&mut self) {
        let WorldBounds { width, height } = self.state.bounds;
        let rng = &mut self.rng;

        let hazard = rng.chance(HAZARD_CHANCE);
        let (kind, color) = if hazard {
            (TargetKind::Hazard, HAZARD_COLOR)
        } else {
            (TargetKind::Benign, TARGET_PALETTE[rng.below(TARGET_PALETTE.len())])
        };

        // Launch from the outer 30% of either side, toward the centre
        let from_left = rng.chance(0.5);
        let offset = rng.next_f32() * width * 0.3;
        let lateral = rng.range(180.0, 480.0);
        let (x, vx) = if from_left {
            (offset, lateral)
        } else {
            (width - offset, -lateral)
        };
        let vy = -rng.range(840.0, 1320.0);
        let rotation_speed = rng.spread(4.5);

        let id = self.state.next_entity_id();
        let mut target = Target::new(
            id,
            kind,
            Vec2::new(x, height + SPAWN_DEPTH),
            Vec2::new(vx, vy),
            color,
        );
        target.rotation_speed = rotation_speed;
        self.state.targets.push(target);
    }

    /// Projectiles fly, then hit at most one target each
    fn update_projectiles(&mut self, dt: f32) {
        for i in 0..self.state.projectiles.len() {
            let projectile = &mut self.state.projectiles[i];
            projectile.pos += projectile.vel * dt;
            let pos = projectile.pos;

            if let Some(t) = first_hit(&self.state.targets, pos, PROJECTILE_HIT_RADIUS) {
                self.state.projectiles[i].life = 0.0;
                self.slice_target(t);
                self.register_combo(1, pos);
            }
        }
        self.state
            .projectiles
            .retain(|p| p.life > 0.0 && p.pos.y >= -PROJECTILE_EXIT_MARGIN);
    }

    fn update_effects(&mut self, dt: f32) {
        let bounds = self.state.bounds;

        for label in &mut self.state.labels {
            label.pos += label.vel * dt;
            label.life -= LABEL_DECAY * dt;
        }
        self.state
            .labels
            .retain(|l| l.life > 0.0 && bounds.contains(l.pos, EFFECT_EXIT_MARGIN));

        for particle in &mut self.state.particles {
            particle.pos += particle.vel * dt;
            particle.vel.y += GRAVITY * dt;
            particle.life -= PARTICLE_DECAY * dt;
        }
        self.state
            .particles
            .retain(|p| p.life > 0.0 && bounds.contains(p.pos, EFFECT_EXIT_MARGIN));

        for point in &mut self.state.trail {
            point.life -= TRAIL_DECAY * dt;
        }
        self.state.trail.retain(|p| p.life > 0.0);

        for banner in &mut self.state.banners {
            banner.pos.y -= BANNER_RISE_SPEED * dt;
            banner.life -= BANNER_DECAY * dt;
        }
        self.state
            .banners
            .retain(|b| b.life > 0.0 && bounds.contains(b.pos, EFFECT_EXIT_MARGIN));
    }

    fn update_targets(&mut self, dt: f32) {
        for target in &mut self.state.targets {
            target.pos += target.vel * dt;
            target.vel.y += GRAVITY * dt;
            target.rotation += target.rotation_speed * dt;
        }
        // Unsliced targets falling out are silent misses
        let floor = self.state.bounds.height + TARGET_EXIT_MARGIN;
        self.state.targets.retain(|t| t.pos.y < floor);
    }

    fn slice_target(&mut self, index: usize) {
        let target = &mut self.state.targets[index];
        target.sliced = true;
        let (id, kind, pos, color) = (target.id, target.kind, target.pos, target.color);

        let (points, critical) = match kind {
            TargetKind::Hazard => {
                self.shake(20.0);
                self.juice(pos, HAZARD_DEBRIS_COLOR, 30);
                self.state.labels.push(FloatingLabel {
                    pos,
                    vel: Vec2::new(0.0, -120.0),
                    life: 1.0,
                    text: format!("-{HAZARD_PENALTY}"),
                    color: PENALTY_LABEL_COLOR,
                    size: 40.0,
                });
                (-HAZARD_PENALTY, false)
            }
            TargetKind::Benign => {
                let config = self.state.weapon.config();
                let critical = self.rng.chance(config.crit_chance);
                let points = config.base_points * if critical { CRIT_MULTIPLIER } else { 1 };
                self.juice(pos, color, if critical { 25 } else { 10 });

                let vel = Vec2::new(self.rng.spread(60.0), -self.rng.range(180.0, 300.0));
                self.state.labels.push(FloatingLabel {
                    pos,
                    vel,
                    life: 1.0,
                    text: format!("+{points}{}", if critical { "!" } else { "" }),
                    color: if critical { CRIT_LABEL_COLOR } else { LABEL_COLOR },
                    size: if critical { 28.0 } else { 20.0 },
                });
                (points, critical)
            }
        };

        log::debug!("Sliced {kind:?} #{id} for {points}");
        self.state.score += points;
        self.events.push(SliceEvent::ScoreDelta {
            amount: points,
            critical,
        });
        self.events.push(SliceEvent::TargetSliced { id, kind, points });
    }

    fn register_combo(&mut self, hits: u32, at: Vec2) {
        let count = self.state.combo.register(hits, self.state.clock_ms);
        if let Some(tier) = ComboTier::for_count(count) {
            self.state.banners.push(ComboBanner {
                pos: at - Vec2::new(0.0, 50.0),
                life: 1.0,
                text: tier.banner_text(count),
                scale: tier.scale(),
                extreme: tier == ComboTier::Extreme,
            });
            self.shake(tier.shake());
        }
        self.events.push(SliceEvent::ComboRegistered { count, hits });
    }

    /// Burst of juice particles, oldest dropped past the cap
    fn juice(&mut self, pos: Vec2, color: u32, count: usize) {
        let cap = self.limits.max_particles;
        if cap == 0 {
            return;
        }
        for _ in 0..count {
            let vel = Vec2::new(self.rng.spread(360.0), self.rng.spread(360.0) - 180.0);
            let size = self.rng.range(2.0, 7.0);
            self.state.particles.push(Particle {
                pos,
                vel,
                life: 1.0,
                color,
                size,
            });
        }
        let excess = self.state.particles.len().saturating_sub(cap);
        if excess > 0 {
            self.state.particles.drain(..excess);
        }
    }

    fn shake(&mut self, amount: f32) {
        if self.limits.screen_shake {
            self.state.shake(amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::testing::{Constant, Script};
    use crate::settings::QualityPreset;
    use crate::slice::combo::ComboPhase;

    const WIDTH: f32 = 2000.0;
    const HEIGHT: f32 = 800.0;

    fn playing_engine(seed: u64, weapon: WeaponKind) -> SliceEngine {
        let mut engine = SliceEngine::new(GameRng::new(seed), WIDTH, HEIGHT);
        engine.set_weapon(weapon);
        engine.set_playing(true);
        engine
    }

    fn place<R: RandomSource>(engine: &mut SliceEngine<R>, kind: TargetKind, x: f32, y: f32) -> u32 {
        let id = engine.state.next_entity_id();
        engine
            .state
            .targets
            .push(Target::new(id, kind, Vec2::new(x, y), Vec2::ZERO, TARGET_PALETTE[1]));
        id
    }

    fn combo_events(events: &[SliceEvent]) -> Vec<(u32, u32)> {
        events
            .iter()
            .filter_map(|e| match e {
                SliceEvent::ComboRegistered { count, hits } => Some((*count, *hits)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_melee_sample_over_two_targets_is_one_combo() {
        let mut engine = playing_engine(1, WeaponKind::Katana);
        let a = place(&mut engine, TargetKind::Benign, 1000.0, 400.0);
        let b = place(&mut engine, TargetKind::Benign, 1030.0, 400.0);

        assert_eq!(engine.pointer_moved(1015.0, 400.0), InputOutcome::Swung { hits: 2 });
        let sliced: Vec<u32> = engine
            .state()
            .targets
            .iter()
            .filter(|t| t.sliced)
            .map(|t| t.id)
            .collect();
        assert_eq!(sliced, vec![a, b]);

        let events = engine.drain_events();
        assert_eq!(combo_events(&events), vec![(2, 2)]);
        let scored = events
            .iter()
            .filter(|e| matches!(e, SliceEvent::ScoreDelta { amount, .. } if *amount > 0))
            .count();
        assert_eq!(scored, 2);
    }

    #[test]
    fn test_sliced_targets_cannot_be_hit_again() {
        let mut engine = playing_engine(2, WeaponKind::Katana);
        place(&mut engine, TargetKind::Benign, 1000.0, 400.0);
        engine.pointer_moved(1000.0, 400.0);
        engine.tick(0.1);
        let y = engine.state().targets[0].pos.y;
        assert_eq!(engine.pointer_moved(1000.0, y), InputOutcome::Swung { hits: 0 });
    }

    #[test]
    fn test_critical_slice_triples_points() {
        let mut engine = SliceEngine::new(Constant(0.0), WIDTH, HEIGHT);
        engine.set_playing(true);
        place(&mut engine, TargetKind::Benign, 1000.0, 400.0);
        engine.pointer_moved(1000.0, 400.0);

        let base = WeaponKind::Katana.config().base_points;
        let events = engine.drain_events();
        assert_eq!(
            events[0],
            SliceEvent::ScoreDelta {
                amount: base * CRIT_MULTIPLIER,
                critical: true
            }
        );
        assert_eq!(engine.state().labels[0].text, format!("+{}!", base * CRIT_MULTIPLIER));
        assert_eq!(engine.state().particles.len(), 25);
    }

    #[test]
    fn test_scripted_spawn() {
        // hazard roll, side roll, then offset, lateral, vertical and spin at midpoint
        let script = Script::new(&[0.0, 0.0, 0.5, 0.5, 0.5, 0.5]);
        let mut engine = SliceEngine::new(script, WIDTH, HEIGHT);
        engine.spawn_target();

        let t = &engine.state().targets[0];
        assert_eq!(t.kind, TargetKind::Hazard);
        assert_eq!(t.color, HAZARD_COLOR);
        assert!((t.pos.x - WIDTH * 0.15).abs() < 1e-2);
        assert_eq!(t.pos.y, HEIGHT + SPAWN_DEPTH);
        assert!((t.vel.x - 330.0).abs() < 1e-3);
        assert!((t.vel.y + 1080.0).abs() < 1e-3);
        assert_eq!(t.rotation_speed, 0.0);
    }

    #[test]
    fn test_hazard_costs_penalty_and_shakes() {
        let mut engine = playing_engine(3, WeaponKind::Katana);
        place(&mut engine, TargetKind::Hazard, 1000.0, 400.0);
        engine.pointer_moved(1000.0, 400.0);

        let events = engine.drain_events();
        assert!(events.contains(&SliceEvent::ScoreDelta {
            amount: -HAZARD_PENALTY,
            critical: false
        }));
        assert_eq!(engine.state().score, -HAZARD_PENALTY);
        assert!(engine.state().screen_shake >= 20.0);
        assert_eq!(engine.state().labels[0].text, "-50");
        assert_eq!(engine.state().particles.len(), 30);
    }

    #[test]
    fn test_only_hazards_score_negative() {
        let mut engine = playing_engine(4, WeaponKind::Cannon);
        for frame in 0..3000 {
            engine.tick(SIM_DT);
            // Sweep the pointer across the launch zones
            let x = (frame * 37 % 2000) as f32;
            let y = (frame * 53 % 800) as f32;
            engine.pointer_moved(x, y);
        }

        let events = engine.drain_events();
        let mut sliced = 0;
        for pair in events.windows(2) {
            if let [
                SliceEvent::ScoreDelta { amount, .. },
                SliceEvent::TargetSliced { kind, points, .. },
            ] = pair
            {
                sliced += 1;
                assert_eq!(amount, points);
                assert_eq!(*amount < 0, *kind == TargetKind::Hazard);
            }
        }
        assert!(sliced > 0);
    }

    #[test]
    fn test_ranged_registers_combo_per_hit() {
        let mut engine = playing_engine(5, WeaponKind::Bow);
        place(&mut engine, TargetKind::Benign, 1000.0, 370.0);

        let fired = engine.pointer_moved(1000.0, 400.0);
        assert!(matches!(fired, InputOutcome::Fired { .. }));
        // No hit until the projectile moves
        assert!(engine.drain_events().is_empty());

        engine.tick(SIM_DT);
        assert!(engine.state().projectiles.is_empty());
        assert_eq!(combo_events(&engine.drain_events()), vec![(1, 1)]);

        engine.tick(0.3);
        place(&mut engine, TargetKind::Benign, 1000.0, 370.0);
        assert!(matches!(
            engine.pointer_moved(1000.0, 400.0),
            InputOutcome::Fired { .. }
        ));
        engine.tick(SIM_DT);
        assert_eq!(combo_events(&engine.drain_events()), vec![(2, 1)]);
    }

    #[test]
    fn test_projectiles_leave_through_the_top() {
        let mut engine = playing_engine(6, WeaponKind::Bow);
        engine.pointer_moved(1000.0, 10.0);
        // 1500 px/s clears the 100 px margin within a tenth of a second
        for _ in 0..10 {
            engine.tick(SIM_DT);
        }
        assert!(engine.state().projectiles.is_empty());
    }

    #[test]
    fn test_cooldown_limits_samples() {
        let mut engine = playing_engine(7, WeaponKind::Katana);
        assert_eq!(engine.pointer_moved(10.0, 10.0), InputOutcome::Swung { hits: 0 });
        assert_eq!(engine.pointer_moved(12.0, 10.0), InputOutcome::OnCooldown);
        engine.tick(0.06);
        assert_eq!(engine.pointer_moved(14.0, 10.0), InputOutcome::Swung { hits: 0 });
        assert_eq!(engine.state().trail.len(), 2);
    }

    #[test]
    fn test_input_ignored_when_not_playing() {
        let mut engine = SliceEngine::new(GameRng::new(8), WIDTH, HEIGHT);
        assert_eq!(engine.pointer_moved(10.0, 10.0), InputOutcome::Ignored);
        engine.tick(1.0);
        assert!(engine.state().targets.is_empty());
    }

    #[test]
    fn test_spawner_rate() {
        let mut engine = playing_engine(9, WeaponKind::Katana);
        for _ in 0..8 {
            engine.tick(0.125);
        }
        // Slowest launch stays on screen for almost two seconds
        assert_eq!(engine.state().targets.len(), 8);
    }

    #[test]
    fn test_spawns_from_outer_thirds_toward_centre() {
        let mut engine = playing_engine(16, WeaponKind::Katana);
        for _ in 0..500 {
            engine.spawn_target();
        }
        let targets = &engine.state().targets;
        for t in targets {
            if t.vel.x > 0.0 {
                assert!(t.pos.x <= WIDTH * 0.3, "left spawn at {}", t.pos.x);
            } else {
                assert!(t.pos.x >= WIDTH * 0.7, "right spawn at {}", t.pos.x);
            }
            assert!((180.0..=480.0).contains(&t.vel.x.abs()));
            assert!((-1320.0..=-840.0).contains(&t.vel.y));
            assert_eq!(t.pos.y, HEIGHT + SPAWN_DEPTH);
            assert_eq!(t.kind == TargetKind::Hazard, t.color == HAZARD_COLOR);
        }
        let hazards = targets.iter().filter(|t| t.kind == TargetKind::Hazard).count();
        assert!((10..=90).contains(&hazards), "{hazards} hazards");
    }

    #[test]
    fn test_stop_clears_world_and_reports_once() {
        let mut engine = playing_engine(10, WeaponKind::Bow);
        engine.tick(0.5);
        engine.pointer_moved(1000.0, 400.0);
        assert!(engine.state().entity_count() > 0);

        engine.set_playing(false);
        engine.set_playing(false);
        assert_eq!(engine.state().entity_count(), 0);
        assert_eq!(engine.state().combo.phase(), ComboPhase::Idle);

        let game_overs = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SliceEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);

        // Nothing spawns while stopped
        engine.tick(1.0);
        assert!(engine.state().targets.is_empty());
    }

    #[test]
    fn test_new_round_resets_score() {
        let mut engine = playing_engine(11, WeaponKind::Katana);
        place(&mut engine, TargetKind::Hazard, 1000.0, 400.0);
        engine.pointer_moved(1000.0, 400.0);
        engine.set_playing(false);
        engine.set_playing(true);
        assert_eq!(engine.state().score, 0);
    }

    #[test]
    fn test_big_streak_extreme_banner() {
        let mut engine = playing_engine(12, WeaponKind::Cannon);
        for i in 0..9 {
            place(&mut engine, TargetKind::Benign, 900.0 + i as f32 * 20.0, 400.0);
        }
        assert_eq!(engine.pointer_moved(980.0, 400.0), InputOutcome::Swung { hits: 9 });
        let banner = &engine.state().banners[0];
        assert!(banner.extreme);
        assert_eq!(banner.scale, 2.0);
        assert_eq!(banner.pos.y, 350.0);
    }

    #[test]
    fn test_settings_limit_effects() {
        let mut engine = playing_engine(13, WeaponKind::Katana);
        let mut settings = Settings::from_preset(QualityPreset::Low);
        settings.reduced_motion = true;
        engine.apply_settings(&settings);

        place(&mut engine, TargetKind::Hazard, 1000.0, 400.0);
        engine.pointer_moved(1000.0, 400.0);
        assert_eq!(engine.state().screen_shake, 0.0);
        assert!(engine.state().trail.is_empty());

        settings.particles = false;
        engine.apply_settings(&settings);
        engine.tick(0.1);
        place(&mut engine, TargetKind::Hazard, 500.0, 400.0);
        let before = engine.state().particles.len();
        engine.pointer_moved(500.0, 400.0);
        assert!(engine.state().particles.len() <= before);
    }

    #[test]
    fn test_effects_decay_away() {
        let mut engine = playing_engine(14, WeaponKind::Katana);
        place(&mut engine, TargetKind::Benign, 1000.0, 400.0);
        engine.pointer_moved(1000.0, 400.0);
        // Stop spawning so only the burst remains
        engine.state.playing = false;
        for _ in 0..120 {
            engine.tick(SIM_DT);
        }
        let state = engine.state();
        assert!(state.particles.is_empty());
        assert!(state.trail.is_empty());
        assert!(state.labels.is_empty());
    }

    #[test]
    fn test_missed_target_falls_out_silently() {
        let mut engine = playing_engine(16, WeaponKind::Katana);
        engine.state.playing = false;
        let floor = HEIGHT + TARGET_EXIT_MARGIN;
        let falling = place(&mut engine, TargetKind::Benign, 800.0, floor - 1.0);
        engine.state.targets[0].vel = Vec2::new(0.0, 300.0);
        let kept = place(&mut engine, TargetKind::Benign, 800.0, 400.0);

        engine.tick(SIM_DT);
        let ids: Vec<u32> = engine.state().targets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![kept]);
        assert_ne!(falling, kept);
        assert!(engine.drain_events().is_empty());
        assert_eq!(engine.state().score, 0);
    }

    #[test]
    fn test_effects_leaving_the_margin_are_dropped() {
        let mut engine = playing_engine(17, WeaponKind::Katana);
        engine.state.playing = false;
        let edge = EFFECT_EXIT_MARGIN - 1.0;

        let particle = |pos: Vec2, vel: Vec2| Particle {
            pos,
            vel,
            life: 1.0,
            color: LABEL_COLOR,
            size: 4.0,
        };
        engine.state.particles.push(particle(
            Vec2::new(WIDTH + edge, 400.0),
            Vec2::new(600.0, 0.0),
        ));
        engine
            .state
            .particles
            .push(particle(Vec2::new(1000.0, 400.0), Vec2::ZERO));
        engine.state.labels.push(FloatingLabel {
            pos: Vec2::new(1000.0, -edge),
            vel: Vec2::new(0.0, -600.0),
            life: 1.0,
            text: "+10".into(),
            color: LABEL_COLOR,
            size: 24.0,
        });
        engine.state.banners.push(ComboBanner {
            pos: Vec2::new(1000.0, -EFFECT_EXIT_MARGIN + 0.5),
            life: 1.0,
            text: ComboTier::Great.banner_text(3),
            scale: ComboTier::Great.scale(),
            extreme: false,
        });

        engine.tick(SIM_DT);
        let state = engine.state();
        assert_eq!(state.particles.len(), 1);
        assert_eq!(state.particles[0].pos.x, 1000.0);
        assert!(state.labels.is_empty());
        assert!(state.banners.is_empty());
    }

    #[test]
    fn test_update_clamps_long_frames() {
        let mut engine = SliceEngine::new(GameRng::new(15), WIDTH, HEIGHT);
        engine.update(5.0);
        let clock = engine.state().clock_ms;
        assert!(clock > 0.0 && clock <= 100.0 + 1e-3, "clock {clock}");
    }
}
