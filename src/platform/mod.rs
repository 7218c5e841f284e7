//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (wall clock for leaderboard timestamps)
//! - Storage (LocalStorage on web, in-memory on native)

pub mod storage;
pub mod time;

pub use storage::{KeyValueStore, MemoryStorage};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use time::now_ms;
