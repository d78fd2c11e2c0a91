//! Errors used by the board types.

use thiserror::Error;

use crate::board::BOARD_SIZE;

/// Error returned when a row or column falls outside the board.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("row and column must be in range [0,{max}], got ({row}, {col})", max = BOARD_SIZE - 1)]
pub struct CoordinateError {
    /// Row that was requested.
    row: usize,
    /// Column that was requested.
    col: usize,
}

impl CoordinateError {
    /// Create a [`CoordinateError`] for the given row and column.
    pub(super) fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The row that was requested.
    pub fn row(&self) -> usize {
        self.row
    }

    /// The column that was requested.
    pub fn col(&self) -> usize {
        self.col
    }
}
