//! DevLife Arcade entry point
//!
//! The browser build is driven from JS through the `web` handles. Natively
//! this runs a seeded headless session of both engines and logs the outcome.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use devlife_arcade::ad::Interstitial;
    use devlife_arcade::board::{BoardEngine, BoardEvent, Coord, Grid, has_matches};
    use devlife_arcade::consts::*;
    use devlife_arcade::leaderboard::{LeaderboardStore, StoredLeaderboard};
    use devlife_arcade::platform::{MemoryStorage, now_ms};
    use devlife_arcade::slice::{SliceEngine, SliceEvent, WeaponKind};
    use devlife_arcade::{GameRng, Settings};

    /// First swap that completes a match, scanning row-major
    fn find_move(grid: &Grid) -> Option<(Coord, Coord)> {
        let n = grid.size();
        for at in grid.coords() {
            let neighbours = [
                (at.col + 1 < n).then(|| Coord::new(at.row, at.col + 1)),
                (at.row + 1 < n).then(|| Coord::new(at.row + 1, at.col)),
            ];
            for other in neighbours.into_iter().flatten() {
                let mut trial = grid.clone();
                trial.swap(at, other);
                if has_matches(&trial) {
                    return Some((at, other));
                }
            }
        }
        None
    }

    fn play_board(seed: u64, settings: &Settings) {
        let store = Rc::new(RefCell::new(StoredLeaderboard::new(MemoryStorage::new())));
        let mut engine = BoardEngine::new(
            GameRng::new(seed),
            Box::new(store.clone()),
            Box::new(Interstitial::new(true)),
        )
        .with_player_name(settings.player_name.clone());

        let mut moves = 0;
        let mut finished = false;
        loop {
            if !engine.fast_forward(600_000) {
                log::error!("Board never settled");
                return;
            }
            for event in engine.drain_events() {
                if let BoardEvent::TierUp { tier, .. } = event {
                    log::info!("Reached tier {tier}");
                }
                finished |= matches!(event, BoardEvent::GameOver { .. });
            }
            if finished {
                break;
            }

            match find_move(engine.grid()) {
                Some((a, b)) => {
                    if let Err(e) = engine.request_swap(a, b) {
                        log::warn!("Swap {a:?} <-> {b:?} rejected: {e}");
                        break;
                    }
                    moves += 1;
                }
                None if engine.progress().is_charged() => {
                    if let Err(e) = engine.request_special_action() {
                        log::warn!("Special action rejected: {e}");
                        break;
                    }
                }
                None => {
                    log::info!("No swap completes a match");
                    break;
                }
            }
        }

        let board = store.borrow_mut().leaderboard(now_ms());
        match board.entries.first() {
            Some(top) if finished => {
                log::info!("Board: {moves} moves, {} scored {}", top.name, top.score)
            }
            _ => log::info!("Board: {moves} moves, game did not finish"),
        }
    }

    fn play_slice(seed: u64, settings: &Settings) {
        let mut engine = SliceEngine::new(GameRng::new(seed), 1280.0, 720.0);
        engine.apply_settings(settings);

        for weapon in WeaponKind::ALL {
            engine.set_weapon(weapon);
            engine.set_playing(true);

            // 20 seconds, the pointer sweeping a figure eight
            let frames = (20.0 / SIM_DT) as u32;
            for frame in 0..frames {
                let t = frame as f32 * SIM_DT;
                let x = 640.0 + 500.0 * (t * 1.3).sin();
                let y = 360.0 + 250.0 * (t * 2.6).sin();
                engine.update(SIM_DT);
                engine.pointer_moved(x, y);
            }
            engine.set_playing(false);

            let mut sliced = 0;
            let mut best_combo = 0;
            let mut score = 0;
            for event in engine.drain_events() {
                match event {
                    SliceEvent::TargetSliced { .. } => sliced += 1,
                    SliceEvent::ComboRegistered { count, .. } => best_combo = best_combo.max(count),
                    SliceEvent::GameOver { score: s } => score = s,
                    SliceEvent::ScoreDelta { .. } => {}
                }
            }
            log::info!(
                "Slice ({}): {sliced} sliced, best combo {best_combo}, score {score}",
                weapon.as_str()
            );
        }
    }

    pub fn run() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let seed = std::env::args()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| now_ms() as u64);
        log::info!("DevLife Arcade (native) starting with seed {seed}");

        let settings = Settings::default();
        play_board(seed, &settings);
        play_slice(seed, &settings);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}
