//! Error types for board operations.

use thiserror::Error;

use super::cell::Position;

/// Failure modes of `flip` (§7). All leave the board consistent: the
/// caller's turn state is reset, any held first-card control is released
/// with one waiter wake, and `previous` is set so the next cleanup runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlipError {
    #[error("no card at {0:?}")]
    NoCard(Position),

    #[error("cell {0:?} is controlled by another player")]
    Controlled(Position),

    #[error("position {0:?} is out of range for this board")]
    OutOfRange(Position),
}

/// Failure modes of [`super::Board::new`]: the constructor is the single
/// point where the external board-provider contract (§6 "Board input") is
/// enforced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardCreationError {
    #[error("board dimensions must be positive, got {rows}x{cols}")]
    EmptyDimensions { rows: usize, cols: usize },

    #[error("board declares {expected} cells ({rows}x{cols}) but {found} values were given")]
    WrongValueCount {
        rows: usize,
        cols: usize,
        expected: usize,
        found: usize,
    },

    #[error("value #{index} is empty or contains whitespace")]
    InvalidValue { index: usize },
}
