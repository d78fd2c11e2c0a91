//! Client-side orchestration of one game.
//!
//! The pieces here hold no network code of their own. Each one decides which requests to
//! make and applies their results, guarding against results that arrive late. The
//! [`Controller`] combines them and the [`Driver`] performs the requests.

pub use self::{
    controller::{Controller, Effect, GameOverSummary, Msg, Scoreboard},
    dispatch::{Action, ActionOutcome, Surface},
    driver::Driver,
    phase::Mode,
    sync::Perspectives,
};

pub mod controller;
pub mod dispatch;
pub mod driver;
pub mod generation;
pub mod phase;
pub mod session;
pub mod sync;

/// A view with placeholder names and empty boards.
#[cfg(test)]
pub(crate) fn test_view(phase: crate::view::Phase) -> crate::view::GameView {
    use crate::board::Board;

    crate::view::GameView::new(phase, ("Alice", "Bob"), Board::empty(), Board::empty())
}
