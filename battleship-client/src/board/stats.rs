//! Selecting which board to show for a view, and the shot statistics derived from it.
//!
//! Statistics are shooter-perspective only. They are computed from the masked opponent
//! board of the shooter's own view, which is the only board that records that
//! shooter's outgoing shots. The [`MaskedBoard`] type is what makes it impossible to
//! count a fleet board by mistake.

use crate::{
    board::{Board, CellState, MaskedBoard},
    view::GameView,
};

/// Which of the two boards in a view the caller wants to render.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BoardSide {
    /// The viewer's own fleet, fully revealed.
    OwnFleet,
    /// The water the viewer is shooting into, masked.
    Opponent,
}

/// A board chosen for rendering, tagged with its visibility policy.
#[derive(Debug, Copy, Clone)]
pub enum VisibleBoard<'a> {
    /// Ships are visible.
    Fleet(&'a Board),
    /// Only shot cells are distinguishable.
    Target(&'a MaskedBoard),
}

impl<'a> VisibleBoard<'a> {
    /// Whether unshot ship cells may be drawn.
    pub fn shows_ships(&self) -> bool {
        match self {
            VisibleBoard::Fleet(_) => true,
            VisibleBoard::Target(_) => false,
        }
    }

    /// The underlying cells.
    pub fn board(&self) -> &'a Board {
        match *self {
            VisibleBoard::Fleet(board) => board,
            VisibleBoard::Target(masked) => masked.board(),
        }
    }
}

/// Select the board of `view` that should be rendered for `side`.
pub fn visible_board(view: &GameView, side: BoardSide) -> VisibleBoard<'_> {
    match side {
        BoardSide::OwnFleet => VisibleBoard::Fleet(view.own_fleet_board()),
        BoardSide::Opponent => VisibleBoard::Target(view.opponent_board_masked()),
    }
}

/// Shot statistics for the viewer of `view`, computed from their outgoing shots.
pub fn shooter_stats(view: &GameView) -> ShotStats {
    ShotStats::from_masked(view.opponent_board_masked())
}

/// Count of shots that landed on a ship and shots that fell into water.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShotStats {
    /// Cells that are `Hit` or `Sunk`.
    pub hits: u32,
    /// Cells that are `Miss`.
    pub misses: u32,
}

impl ShotStats {
    /// Scan a masked board, counting `Hit`/`Sunk` as hits and `Miss` as misses.
    pub fn from_masked(board: &MaskedBoard) -> Self {
        let mut stats = ShotStats::default();
        for (_, cell) in board.board().cells() {
            match cell {
                CellState::Hit | CellState::Sunk => stats.hits += 1,
                CellState::Miss => stats.misses += 1,
                CellState::Empty | CellState::Ship => {}
            }
        }
        stats
    }

    /// Total shots fired.
    pub fn shots(&self) -> u32 {
        self.hits + self.misses
    }

    /// Fraction of shots that hit, or `None` before the first shot.
    pub fn accuracy(&self) -> Option<f64> {
        match self.shots() {
            0 => None,
            shots => Some(f64::from(self.hits) / f64::from(shots)),
        }
    }

    /// True if `self` could follow `earlier` within the same game. Cells never revert, so
    /// neither counter may go down.
    pub fn follows(&self, earlier: &ShotStats) -> bool {
        self.hits >= earlier.hits && self.misses >= earlier.misses
    }
}
