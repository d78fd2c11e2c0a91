//! Boards as they arrive from the service, and the masking that separates a player's
//! own fleet from the water they are shooting into.

use std::ops::Index;

use serde::Deserialize;
use tracing::warn;

pub use self::{
    coordinate::Coordinate,
    errors::CoordinateError,
    stats::{shooter_stats, visible_board, BoardSide, ShotStats, VisibleBoard},
};

mod coordinate;
mod errors;
mod stats;

/// Width and height of every board.
pub const BOARD_SIZE: usize = 10;

/// State of a single cell.
///
/// `Hit` and `Sunk` only ever replace a `Ship` cell, `Miss` only ever replaces an `Empty`
/// cell, and no cell ever reverts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellState {
    Empty,
    Ship,
    Hit,
    Miss,
    Sunk,
}

impl CellState {
    /// Whether a shot has landed on this cell.
    pub fn is_shot(self) -> bool {
        match self {
            CellState::Hit | CellState::Miss | CellState::Sunk => true,
            CellState::Empty | CellState::Ship => false,
        }
    }
}

impl Default for CellState {
    fn default() -> Self {
        CellState::Empty
    }
}

/// A full 10x10 grid of cells, indexed by [`Coordinate`].
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Board([[CellState; BOARD_SIZE]; BOARD_SIZE]);

impl Board {
    /// Construct a board where every cell is `Empty`.
    pub fn empty() -> Self {
        Board([[CellState::Empty; BOARD_SIZE]; BOARD_SIZE])
    }

    /// Get the state of the cell at the given coordinate.
    pub fn get(&self, coord: Coordinate) -> CellState {
        self.0[coord.row()][coord.col()]
    }

    /// Set the state of the cell at the given coordinate.
    pub fn set(&mut self, coord: Coordinate, state: CellState) {
        self.0[coord.row()][coord.col()] = state;
    }

    /// Get an iterator over the rows of this board.
    pub fn rows(&self) -> impl Iterator<Item = &[CellState; BOARD_SIZE]> {
        self.0.iter()
    }

    /// Get an iterator over every cell with its coordinate, in row-major order.
    pub fn cells(&self) -> impl '_ + Iterator<Item = (Coordinate, CellState)> {
        Coordinate::all().map(move |coord| (coord, self.get(coord)))
    }

    /// Count the cells in the given state.
    pub fn count(&self, state: CellState) -> usize {
        self.rows()
            .flat_map(|row| row.iter())
            .filter(|&&cell| cell == state)
            .count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index<Coordinate> for Board {
    type Output = CellState;

    fn index(&self, coord: Coordinate) -> &Self::Output {
        &self.0[coord.row()][coord.col()]
    }
}

/// A board as seen by the opponent: unshot ship cells are indistinguishable from empty
/// water. A `MaskedBoard` never contains a [`CellState::Ship`] cell.
///
/// The service masks boards before sending them. Converting from a [`Board`] masks it
/// again, so a misbehaving service can never leak a fleet into shot statistics or
/// rendering.
#[derive(Debug, Clone, Eq, PartialEq, Default, Deserialize)]
#[serde(from = "Board")]
pub struct MaskedBoard(Board);

impl MaskedBoard {
    /// Get the state of the cell at the given coordinate.
    pub fn get(&self, coord: Coordinate) -> CellState {
        self.0.get(coord)
    }

    /// Access the underlying board.
    pub fn board(&self) -> &Board {
        &self.0
    }

    /// Coordinates that have not been shot yet.
    pub fn unshot(&self) -> impl '_ + Iterator<Item = Coordinate> {
        self.0
            .cells()
            .filter(|(_, cell)| !cell.is_shot())
            .map(|(coord, _)| coord)
    }
}

impl From<Board> for MaskedBoard {
    fn from(mut board: Board) -> Self {
        let leaked = board.count(CellState::Ship);
        if leaked > 0 {
            warn!(leaked, "masked board contained unshot ship cells, masking locally");
            for row in board.0.iter_mut() {
                for cell in row.iter_mut() {
                    if *cell == CellState::Ship {
                        *cell = CellState::Empty;
                    }
                }
            }
        }
        MaskedBoard(board)
    }
}

impl Index<Coordinate> for MaskedBoard {
    type Output = CellState;

    fn index(&self, coord: Coordinate) -> &Self::Output {
        &self.0[coord]
    }
}
