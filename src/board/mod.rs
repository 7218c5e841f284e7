//! Match-3 board engine
//!
//! - `grid`: cells, generation and match detection
//! - `cascade`: remove/gravity/refill passes
//! - `progress`: score, moves, tiers, charge
//! - `engine`: the intent-driven state machine tying them together

pub mod cascade;
pub mod engine;
pub mod grid;
pub mod progress;

pub use cascade::{CascadeSummary, PassOutcome, resolve_cascade};
pub use engine::{BoardEngine, BoardEvent, BoardPhase, BoardSnapshot, SwapOutcome};
pub use grid::{Cell, CellId, CellKind, Coord, Grid, MatchSet, find_matches, has_matches};
pub use progress::{Progress, combo_callout, title_for_tier};
