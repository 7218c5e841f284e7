//! Board engine state machine
//!
//! Turns swap/special intents into cascades. Every delay (match highlight,
//! settle, swap revert) is a step on a [`DelayQueue`], fired from
//! [`BoardEngine::tick`]. Intents are rejected while anything is pending.

use serde::{Deserialize, Serialize};

use super::cascade::{apply_gravity, clear_random, refill, remove_and_refill, PassOutcome};
use super::grid::{find_matches, has_matches, Coord, Grid, MatchSet};
use super::progress::{combo_callout, Progress};
use crate::ad::AdGate;
use crate::consts::*;
use crate::error::BoardError;
use crate::leaderboard::{LeaderboardStore, ScoreEntry};
use crate::platform::now_ms;
use crate::rng::{GameRng, RandomSource};
use crate::sched::DelayQueue;

/// What the engine is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardPhase {
    /// Accepting intents
    Ready,
    /// Matches shown, removal pending
    Highlighting,
    /// Board refilled (or cleared by the special action), next check pending
    Settling,
    /// Showing a swap that matched nothing, revert pending
    Reverting,
    /// Out of moves, waiting for the interstitial before resetting
    AwaitingAd,
}

/// Scheduled continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoardStep {
    RemoveMatches,
    ContinueCascade,
    /// Gravity + refill after the special action, then continue
    Collapse,
    RevertSwap,
}

/// Engine output, drained by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BoardEvent {
    SwapAccepted {
        a: Coord,
        b: Coord,
        moves_remaining: i32,
    },
    /// Swap matched nothing; it is shown, then reverted
    SwapRejected { a: Coord, b: Coord },
    SwapReverted,
    MatchesHighlighted { cells: Vec<Coord>, combo: u32 },
    ScoreDelta {
        amount: u64,
        /// Always false on the board
        critical: bool,
        combo: u32,
        cleared: usize,
    },
    ChargeChanged { charge: u32 },
    TierUp { tier: u32, moves_remaining: i32 },
    CascadeSettled { passes: u32 },
    SpecialActivated { cleared: usize },
    GameOver { score: u64, tier: u32 },
    BoardReset,
    /// An invariant broke and the grid was regenerated
    Recovered { reason: String },
}

/// Per-frame view for rendering
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub grid: Grid,
    pub progress: Progress,
    pub phase: BoardPhase,
    pub combo: u32,
    pub highlighted: Vec<Coord>,
    /// Remaining special-action flash (ms)
    pub flash_ms: u32,
    pub title: &'static str,
    pub callout: Option<&'static str>,
}

/// Outcome of an accepted swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Move consumed, cascade started
    Accepted,
    /// No match; the swap will revert without consuming a move
    Reverting,
}

pub struct BoardEngine<R = GameRng> {
    grid: Grid,
    progress: Progress,
    phase: BoardPhase,
    /// Multiplier of the last resolved pass in the current move
    combo: u32,
    highlighted: MatchSet,
    revert_to: Option<Grid>,
    queue: DelayQueue<BoardStep>,
    flash_ms: u32,
    player_name: String,
    rng: R,
    store: Box<dyn LeaderboardStore>,
    ad_gate: Box<dyn AdGate>,
    events: Vec<BoardEvent>,
}

impl<R: RandomSource> BoardEngine<R> {
    pub fn new(mut rng: R, store: Box<dyn LeaderboardStore>, ad_gate: Box<dyn AdGate>) -> Self {
        let grid = Grid::generate(&mut rng);
        Self {
            grid,
            progress: Progress::new(),
            phase: BoardPhase::Ready,
            combo: 0,
            highlighted: MatchSet::new(),
            revert_to: None,
            queue: DelayQueue::new(),
            flash_ms: 0,
            player_name: "Senior_Dev".to_string(),
            rng,
            store,
            ad_gate,
            events: Vec::new(),
        }
    }

    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    /// Replace the grid (only while idle)
    pub fn load_grid(&mut self, grid: Grid) -> Result<(), BoardError> {
        if self.phase != BoardPhase::Ready {
            return Err(BoardError::Busy);
        }
        self.grid = grid;
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != BoardPhase::Ready
    }

    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            grid: self.grid.clone(),
            progress: self.progress.clone(),
            phase: self.phase,
            combo: self.combo,
            highlighted: self.highlighted.iter().copied().collect(),
            flash_ms: self.flash_ms,
            title: self.progress.title(),
            callout: combo_callout(self.combo),
        }
    }

    /// Swap two orthogonally adjacent cells
    pub fn request_swap(&mut self, a: Coord, b: Coord) -> Result<SwapOutcome, BoardError> {
        self.ensure_ready()?;
        for at in [a, b] {
            if !self.grid.contains(at) {
                return Err(BoardError::OutOfBounds(at));
            }
        }
        if !a.is_adjacent(b) {
            return Err(BoardError::NotAdjacent { a, b });
        }

        let mut swapped = self.grid.clone();
        swapped.swap(a, b);

        if !has_matches(&swapped) {
            self.revert_to = Some(std::mem::replace(&mut self.grid, swapped));
            self.phase = BoardPhase::Reverting;
            self.queue.schedule(REVERT_DELAY_MS, BoardStep::RevertSwap);
            self.events.push(BoardEvent::SwapRejected { a, b });
            return Ok(SwapOutcome::Reverting);
        }

        self.grid = swapped;
        self.progress.consume_move();
        self.events.push(BoardEvent::SwapAccepted {
            a,
            b,
            moves_remaining: self.progress.moves_remaining,
        });
        self.combo = 0;
        self.begin_pass();
        Ok(SwapOutcome::Accepted)
    }

    /// Spend a full charge meter to clear about half the board.
    /// Returns how many cells were cleared.
    pub fn request_special_action(&mut self) -> Result<usize, BoardError> {
        self.ensure_ready()?;
        if !self.progress.is_charged() {
            return Err(BoardError::NotCharged {
                charge: self.progress.charge,
                required: CHARGE_MAX,
            });
        }

        self.progress.charge = 0;
        self.events.push(BoardEvent::ChargeChanged { charge: 0 });

        let cleared = clear_random(&mut self.grid, SPECIAL_CLEAR_CHANCE, &mut self.rng).len();
        log::info!("Special action cleared {cleared} cells");
        self.events.push(BoardEvent::SpecialActivated { cleared });
        self.flash_ms = SPECIAL_FLASH_MS;

        self.combo = 0;
        self.phase = BoardPhase::Settling;
        self.queue.schedule(SETTLE_DELAY_MS, BoardStep::Collapse);
        Ok(cleared)
    }

    /// Advance timers, firing every continuation that falls due
    pub fn tick(&mut self, elapsed_ms: u32) {
        let mut remaining = elapsed_ms;
        while let Some((spent, step)) = self.queue.pop_due(remaining) {
            remaining -= spent;
            self.run_step(step);
        }
        self.queue.advance(remaining);
        self.flash_ms = self.flash_ms.saturating_sub(elapsed_ms);

        // Only time left after the overlay went up counts toward it
        if self.phase == BoardPhase::AwaitingAd {
            let finished = self.ad_gate.advance(remaining);
            if finished || !self.ad_gate.is_showing() {
                self.reset();
            }
        }
    }

    /// Tick until idle. Returns false if still busy after `max_ms` of virtual time.
    pub fn fast_forward(&mut self, max_ms: u32) -> bool {
        const STEP_MS: u32 = 100;
        let mut spent = 0;
        while self.is_busy() && spent < max_ms {
            self.tick(STEP_MS);
            spent += STEP_MS;
        }
        !self.is_busy()
    }

    fn ensure_ready(&self) -> Result<(), BoardError> {
        match self.phase {
            BoardPhase::Ready if self.progress.out_of_moves() => Err(BoardError::GameOver),
            BoardPhase::Ready => Ok(()),
            BoardPhase::AwaitingAd => Err(BoardError::GameOver),
            _ => Err(BoardError::Busy),
        }
    }

    fn run_step(&mut self, step: BoardStep) {
        match step {
            BoardStep::RemoveMatches => {
                let matched = std::mem::take(&mut self.highlighted);
                let pass = remove_and_refill(&mut self.grid, matched, self.combo, &mut self.rng);
                self.apply_pass(pass);
                self.phase = BoardPhase::Settling;
                self.queue.schedule(SETTLE_DELAY_MS, BoardStep::ContinueCascade);
            }
            BoardStep::ContinueCascade => self.begin_pass(),
            BoardStep::Collapse => {
                apply_gravity(&mut self.grid);
                refill(&mut self.grid, &mut self.rng);
                self.begin_pass();
            }
            BoardStep::RevertSwap => {
                if let Some(original) = self.revert_to.take() {
                    self.grid = original;
                }
                self.phase = BoardPhase::Ready;
                self.events.push(BoardEvent::SwapReverted);
            }
        }
    }

    /// Check for matches; highlight them or finish the cascade
    fn begin_pass(&mut self) {
        let matched = find_matches(&self.grid);
        if matched.is_empty() {
            self.finish_cascade();
            return;
        }
        if self.combo >= MAX_CASCADE_PASSES {
            self.recover(BoardError::CascadeLimit { passes: self.combo });
            return;
        }

        self.combo += 1;
        log::debug!("Pass {}: {} cells matched", self.combo, matched.len());
        self.events.push(BoardEvent::MatchesHighlighted {
            cells: matched.iter().copied().collect(),
            combo: self.combo,
        });
        self.highlighted = matched;
        self.phase = BoardPhase::Highlighting;
        self.queue.schedule(HIGHLIGHT_DELAY_MS, BoardStep::RemoveMatches);
    }

    fn apply_pass(&mut self, pass: PassOutcome) {
        self.progress.add_charge(pass.charge_delta);
        let tiered_up = self.progress.add_score(pass.score_delta);

        self.events.push(BoardEvent::ScoreDelta {
            amount: pass.score_delta,
            critical: false,
            combo: pass.combo,
            cleared: pass.matched.len(),
        });
        self.events.push(BoardEvent::ChargeChanged {
            charge: self.progress.charge,
        });
        if tiered_up {
            log::info!(
                "Tier up to {} ({}), {} moves left",
                self.progress.tier,
                self.progress.title(),
                self.progress.moves_remaining
            );
            self.events.push(BoardEvent::TierUp {
                tier: self.progress.tier,
                moves_remaining: self.progress.moves_remaining,
            });
        }
    }

    fn finish_cascade(&mut self) {
        let passes = self.combo;
        self.combo = 0;
        self.phase = BoardPhase::Ready;
        self.events.push(BoardEvent::CascadeSettled { passes });

        if self.progress.out_of_moves() {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        let score = self.progress.score;
        log::info!("Game over: {} scored {score}", self.player_name);

        let now = now_ms();
        self.store.save_score(
            ScoreEntry {
                name: self.player_name.clone(),
                score,
                timestamp: now,
            },
            now,
        );
        self.events.push(BoardEvent::GameOver {
            score,
            tier: self.progress.tier,
        });

        if !self.ad_gate.show_interstitial() {
            log::warn!("Interstitial already showing, waiting for it");
        }
        self.phase = BoardPhase::AwaitingAd;
    }

    /// Fresh game: new grid, new progress, nothing pending
    fn reset(&mut self) {
        self.grid = Grid::generate(&mut self.rng);
        self.progress = Progress::new();
        self.combo = 0;
        self.highlighted.clear();
        self.revert_to = None;
        self.queue.clear();
        self.flash_ms = 0;
        self.phase = BoardPhase::Ready;
        log::info!("Board reset");
        self.events.push(BoardEvent::BoardReset);
    }

    /// Invariant violation: fatal in debug builds, otherwise restore
    fn recover(&mut self, error: BoardError) {
        log::error!("{error}; regenerating board");
        if cfg!(debug_assertions) {
            panic!("{error}");
        }
        self.restore_board(error);
    }

    /// Regenerate the grid, keep the earned progress, and settle as a
    /// finished cascade would
    fn restore_board(&mut self, error: BoardError) {
        self.grid = Grid::generate(&mut self.rng);
        self.combo = 0;
        self.highlighted.clear();
        self.queue.clear();
        self.phase = BoardPhase::Ready;
        self.events.push(BoardEvent::Recovered {
            reason: error.to_string(),
        });

        if self.progress.out_of_moves() {
            self.game_over();
        }
    }
}
