//! Error types
//!
//! Intent rejections and invariant violations for the board, and the
//! best-effort storage failures the collaborators swallow.

use thiserror::Error;

use crate::board::Coord;

/// Why the board engine refused an intent or aborted a resolution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// A cascade, revert or game-over sequence is still in flight
    #[error("board is busy resolving a previous move")]
    Busy,
    #[error("cell {0:?} is outside the board")]
    OutOfBounds(Coord),
    #[error("cells {a:?} and {b:?} are not orthogonally adjacent")]
    NotAdjacent { a: Coord, b: Coord },
    #[error("charge meter at {charge}, special action needs {required}")]
    NotCharged { charge: u32, required: u32 },
    #[error("no moves remaining")]
    GameOver,
    /// Resolution ran past its pass cap (refill logic is broken)
    #[error("cascade exceeded {passes} passes")]
    CascadeLimit { passes: u32 },
    #[error("grid must be {expected}x{expected}, got {rows} rows with a row of {cols}")]
    DimensionMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
    },
}

/// Storage backend failure
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("malformed stored record: {0}")]
    Serde(#[from] serde_json::Error),
}
