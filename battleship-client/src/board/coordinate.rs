use std::{convert::TryFrom, fmt};

use crate::board::{CoordinateError, BOARD_SIZE};

/// The coordinates of a cell on a 10x10 board. Both components are always in
/// `[0, BOARD_SIZE)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Coordinate {
    row: u8,
    col: u8,
}

impl Coordinate {
    /// Construct a [`Coordinate`] from the given `row` and `col`, failing if either is
    /// off the board.
    pub fn new(row: usize, col: usize) -> Result<Self, CoordinateError> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            Err(CoordinateError::new(row, col))
        } else {
            Ok(Self {
                row: row as u8,
                col: col as u8,
            })
        }
    }

    /// Zero-based row of the cell.
    pub fn row(&self) -> usize {
        self.row as usize
    }

    /// Zero-based column of the cell.
    pub fn col(&self) -> usize {
        self.col as usize
    }

    /// Iterate every coordinate of the board in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..BOARD_SIZE).flat_map(|row| {
            (0..BOARD_SIZE).map(move |col| Coordinate {
                row: row as u8,
                col: col as u8,
            })
        })
    }
}

impl TryFrom<(usize, usize)> for Coordinate {
    type Error = CoordinateError;

    /// Construct a [`Coordinate`] from a `(row, col)` pair.
    fn try_from((row, col): (usize, usize)) -> Result<Self, Self::Error> {
        Self::new(row, col)
    }
}

impl From<Coordinate> for (usize, usize) {
    /// Convert the [`Coordinate`] into a `(row, col)` pair.
    fn from(coord: Coordinate) -> Self {
        (coord.row(), coord.col())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
