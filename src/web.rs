//! Browser bindings
//!
//! Thin `wasm_bindgen` handles over both engines. The page renders from the
//! JSON snapshots and drains JSON event lists each frame.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::ad::{AdGate, Interstitial};
use crate::board::{BoardEngine, Coord};
use crate::leaderboard::{LeaderboardStore, StoredLeaderboard};
use crate::platform::{now_ms, LocalStorage};
use crate::rng::GameRng;
use crate::settings::Settings;
use crate::slice::{SliceEngine, WeaponKind};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("DevLife Arcade starting...");
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn entropy_rng() -> GameRng {
    let seed = js_sys::Date::now() as u64;
    log::info!("Seeded with {seed}");
    GameRng::new(seed)
}

/// Overlay state exposed to the page
#[derive(Serialize)]
struct AdView {
    showing: bool,
    seconds_left: u32,
    phase: crate::ad::InterstitialPhase,
}

#[wasm_bindgen]
pub struct BoardHandle {
    engine: BoardEngine,
    ad: Rc<RefCell<Interstitial>>,
    leaderboard: Rc<RefCell<StoredLeaderboard<LocalStorage>>>,
}

#[wasm_bindgen]
impl BoardHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(auto_close_ad: bool) -> BoardHandle {
        let settings = Settings::load(&LocalStorage);
        let ad = Rc::new(RefCell::new(Interstitial::new(auto_close_ad)));
        let leaderboard = Rc::new(RefCell::new(StoredLeaderboard::new(LocalStorage)));
        let engine = BoardEngine::new(
            entropy_rng(),
            Box::new(leaderboard.clone()),
            Box::new(ad.clone()),
        )
        .with_player_name(settings.player_name);
        BoardHandle {
            engine,
            ad,
            leaderboard,
        }
    }

    pub fn request_swap(&mut self, r1: usize, c1: usize, r2: usize, c2: usize) -> Result<bool, JsValue> {
        self.engine
            .request_swap(Coord::new(r1, c1), Coord::new(r2, c2))
            .map(|outcome| outcome == crate::board::SwapOutcome::Accepted)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Returns the number of cleared cells
    pub fn request_special_action(&mut self) -> Result<usize, JsValue> {
        self.engine
            .request_special_action()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn tick(&mut self, elapsed_ms: u32) {
        self.engine.tick(elapsed_ms);
    }

    pub fn close_ad(&mut self) -> bool {
        self.ad.borrow_mut().close()
    }

    pub fn snapshot(&self) -> Result<String, JsValue> {
        to_json(&self.engine.snapshot())
    }

    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        to_json(&self.engine.drain_events())
    }

    pub fn ad_state(&self) -> Result<String, JsValue> {
        let ad = self.ad.borrow();
        to_json(&AdView {
            showing: ad.is_showing(),
            seconds_left: ad.seconds_left(),
            phase: ad.phase(),
        })
    }

    pub fn leaderboard(&mut self) -> Result<String, JsValue> {
        let board = self.leaderboard.leaderboard(now_ms());
        to_json(&board)
    }
}

#[wasm_bindgen]
pub struct SliceHandle {
    engine: SliceEngine,
    last_time: f64,
}

#[wasm_bindgen]
impl SliceHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> SliceHandle {
        let settings = Settings::load(&LocalStorage);
        let mut engine = SliceEngine::new(entropy_rng(), width, height);
        engine.apply_settings(&settings);
        engine.set_weapon(settings.weapon);
        SliceHandle {
            engine,
            last_time: 0.0,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.engine.resize(width, height);
    }

    /// Returns false for an unknown weapon name
    pub fn set_weapon(&mut self, name: &str) -> bool {
        match WeaponKind::parse(name) {
            Some(weapon) => {
                self.engine.set_weapon(weapon);
                let mut settings = Settings::load(&LocalStorage);
                settings.weapon = weapon;
                settings.save(&mut LocalStorage);
                true
            }
            None => {
                log::warn!("Unknown weapon {name}");
                false
            }
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.engine.set_playing(playing);
        self.last_time = 0.0;
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.engine.pointer_moved(x, y);
    }

    /// Animation frame callback with the rAF timestamp (ms)
    pub fn frame(&mut self, time: f64) {
        let dt = if self.last_time > 0.0 {
            ((time - self.last_time) / 1000.0) as f32
        } else {
            crate::consts::SIM_DT
        };
        self.last_time = time;
        self.engine.update(dt);
    }

    pub fn state(&self) -> Result<String, JsValue> {
        to_json(self.engine.state())
    }

    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        to_json(&self.engine.drain_events())
    }

    /// Reload settings (after the page edited them)
    pub fn reload_settings(&mut self) {
        let settings = Settings::load(&LocalStorage);
        self.engine.apply_settings(&settings);
    }
}
