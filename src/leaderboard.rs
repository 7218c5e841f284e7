//! Rolling leaderboard
//!
//! Top 10 scores, wiped every [`RESET_INTERVAL_MS`]. Persisted as JSON in a
//! [`KeyValueStore`]; storage is best effort, a bad read starts fresh and a
//! failed write is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::platform::KeyValueStore;

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 10;

/// Leaderboard lifetime before it resets (30 minutes)
pub const RESET_INTERVAL_MS: f64 = 30.0 * 60.0 * 1000.0;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    /// Sorted descending by score
    pub entries: Vec<ScoreEntry>,
    /// Unix timestamp (ms) after which the board is wiped
    pub next_reset: f64,
}

impl Leaderboard {
    /// Empty board expiring one interval from `now_ms`
    pub fn fresh(now_ms: f64) -> Self {
        Self {
            entries: Vec::new(),
            next_reset: now_ms + RESET_INTERVAL_MS,
        }
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms > self.next_reset
    }

    /// Get the rank a score would achieve (1-indexed, None if it wouldn't place)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        let pos = self.entries.iter().position(|e| score > e.score);
        match pos {
            Some(i) => Some(i + 1),
            None if self.entries.len() < MAX_ENTRIES => Some(self.entries.len() + 1),
            None => None,
        }
    }

    /// Insert, keep descending order, trim to [`MAX_ENTRIES`].
    /// Returns the rank achieved (1-indexed) or None if it fell off.
    pub fn insert(&mut self, entry: ScoreEntry) -> Option<usize> {
        // Earlier entries stay ahead on ties
        let pos = self
            .entries
            .iter()
            .position(|e| e.score < entry.score)
            .unwrap_or(self.entries.len());
        if pos >= MAX_ENTRIES {
            return None;
        }
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);
        Some(pos + 1)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Whole minutes until the reset (0 once due)
    pub fn minutes_until_reset(&self, now_ms: f64) -> u64 {
        ((self.next_reset - now_ms).max(0.0) / 60_000.0).floor() as u64
    }
}

/// Persistence collaborator for the leaderboard
pub trait LeaderboardStore {
    /// Current leaderboard, reset first if it has expired
    fn leaderboard(&mut self, now_ms: f64) -> Leaderboard;

    /// Insert an entry into the current leaderboard
    fn save_score(&mut self, entry: ScoreEntry, now_ms: f64);
}

impl<S: LeaderboardStore> LeaderboardStore for Rc<RefCell<S>> {
    fn leaderboard(&mut self, now_ms: f64) -> Leaderboard {
        self.borrow_mut().leaderboard(now_ms)
    }

    fn save_score(&mut self, entry: ScoreEntry, now_ms: f64) {
        self.borrow_mut().save_score(entry, now_ms)
    }
}

/// Leaderboard stored as a JSON record under one key
#[derive(Debug, Clone)]
pub struct StoredLeaderboard<K> {
    store: K,
}

impl<K: KeyValueStore> StoredLeaderboard<K> {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "devlife_arcade_leaderboard";

    pub fn new(store: K) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> K {
        self.store
    }

    fn read(&self) -> Option<Leaderboard> {
        match self.store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(board) => Some(board),
                Err(e) => {
                    log::warn!("Discarding malformed leaderboard: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("Leaderboard read failed: {e}");
                None
            }
        }
    }

    fn write(&mut self, board: &Leaderboard) {
        let result = serde_json::to_string(board)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(Self::STORAGE_KEY, &json));
        if let Err(e) = result {
            log::warn!("Leaderboard write failed: {e}");
        }
    }
}

impl<K: KeyValueStore> LeaderboardStore for StoredLeaderboard<K> {
    fn leaderboard(&mut self, now_ms: f64) -> Leaderboard {
        match self.read() {
            Some(board) if !board.is_expired(now_ms) => board,
            _ => {
                let board = Leaderboard::fresh(now_ms);
                log::info!("Leaderboard reset, next reset in 30 min");
                self.write(&board);
                board
            }
        }
    }

    fn save_score(&mut self, entry: ScoreEntry, now_ms: f64) {
        let mut board = self.leaderboard(now_ms);
        let (name, score) = (entry.name.clone(), entry.score);
        match board.insert(entry) {
            Some(rank) => log::info!("{name} placed #{rank} with {score}"),
            None => log::info!("{name} scored {score}, off the board"),
        }
        self.write(&board);
    }
}
