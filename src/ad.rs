//! Interstitial ad gate
//!
//! The board's game-over path shows one interstitial and waits for it to
//! finish before resetting. Only one presentation may run at a time.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

/// Countdown before the close button appears
pub const COUNTDOWN_MS: u32 = 3000;
/// Fade-out after closing
pub const FADE_OUT_MS: u32 = 500;

/// Interstitial collaborator
pub trait AdGate {
    /// Start a presentation. Returns false if one is already showing.
    fn show_interstitial(&mut self) -> bool;

    /// Advance presentation timers. Returns true exactly once, on the call
    /// where the presentation completes.
    fn advance(&mut self, elapsed_ms: u32) -> bool;

    fn is_showing(&self) -> bool;
}

/// Shared gate, so the presentation can drive the overlay the engine waits on
impl<G: AdGate> AdGate for Rc<RefCell<G>> {
    fn show_interstitial(&mut self) -> bool {
        self.borrow_mut().show_interstitial()
    }

    fn advance(&mut self, elapsed_ms: u32) -> bool {
        self.borrow_mut().advance(elapsed_ms)
    }

    fn is_showing(&self) -> bool {
        self.borrow().is_showing()
    }
}

/// Overlay state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InterstitialPhase {
    Hidden,
    /// Close button hidden, counting down
    Countdown { remaining_ms: u32 },
    /// Waiting for the player to close
    Closable,
    FadingOut { remaining_ms: u32 },
}

/// Timed overlay: countdown, close, fade
#[derive(Debug, Clone)]
pub struct Interstitial {
    phase: InterstitialPhase,
    /// Close automatically when the countdown ends (no player click needed)
    auto_close: bool,
    shown: u32,
}

impl Interstitial {
    pub fn new(auto_close: bool) -> Self {
        Self {
            phase: InterstitialPhase::Hidden,
            auto_close,
            shown: 0,
        }
    }

    pub fn phase(&self) -> InterstitialPhase {
        self.phase
    }

    /// Number of presentations started so far
    pub fn shown(&self) -> u32 {
        self.shown
    }

    /// Whole seconds left on the countdown badge
    pub fn seconds_left(&self) -> u32 {
        match self.phase {
            InterstitialPhase::Countdown { remaining_ms } => remaining_ms.div_ceil(1000),
            _ => 0,
        }
    }

    /// Player pressed close. Ignored until the countdown has finished.
    pub fn close(&mut self) -> bool {
        if self.phase == InterstitialPhase::Closable {
            self.phase = InterstitialPhase::FadingOut {
                remaining_ms: FADE_OUT_MS,
            };
            true
        } else {
            false
        }
    }
}

impl AdGate for Interstitial {
    fn show_interstitial(&mut self) -> bool {
        if self.is_showing() {
            return false;
        }
        self.shown += 1;
        self.phase = InterstitialPhase::Countdown {
            remaining_ms: COUNTDOWN_MS,
        };
        log::info!("Showing interstitial #{}", self.shown);
        true
    }

    fn advance(&mut self, mut elapsed_ms: u32) -> bool {
        loop {
            match self.phase {
                InterstitialPhase::Hidden | InterstitialPhase::Closable => return false,
                InterstitialPhase::Countdown { remaining_ms } => {
                    if elapsed_ms < remaining_ms {
                        self.phase = InterstitialPhase::Countdown {
                            remaining_ms: remaining_ms - elapsed_ms,
                        };
                        return false;
                    }
                    elapsed_ms -= remaining_ms;
                    self.phase = InterstitialPhase::Closable;
                    if self.auto_close {
                        self.close();
                    } else {
                        return false;
                    }
                }
                InterstitialPhase::FadingOut { remaining_ms } => {
                    if elapsed_ms < remaining_ms {
                        self.phase = InterstitialPhase::FadingOut {
                            remaining_ms: remaining_ms - elapsed_ms,
                        };
                        return false;
                    }
                    self.phase = InterstitialPhase::Hidden;
                    log::info!("Interstitial closed");
                    return true;
                }
            }
        }
    }

    fn is_showing(&self) -> bool {
        self.phase != InterstitialPhase::Hidden
    }
}
