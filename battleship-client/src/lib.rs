//! Client-side orchestration for a two-player, single-device game of Battleship played
//! against a remote authoritative game service.
//!
//! The service owns every game rule. This crate owns what happens on the client:
//!
//! [`game::session`] tracks which game is active and whose perspective is being looked
//! at.
//!
//! [`game::phase`] turns the phase reported by the service into the mode the front end
//! should be in.
//!
//! [`game::sync`] keeps both players' views of the game fetched during play.
//!
//! [`game::dispatch`] sends one mutating action at a time per surface and reconciles
//! afterwards.
//!
//! [`board`] derives the visible board and shot statistics from masked data only.
//!
//! All of these are driven through [`game::Controller`], a synchronous reducer that
//! turns [`game::Msg`]s into [`game::Effect`]s. [`game::Driver`] runs the effects against
//! a [`service::GameService`] on the caller's tokio runtime.

pub mod board;
pub mod config;
pub mod game;
pub mod service;
pub mod ships;
pub mod view;

pub use crate::{
    board::{Board, CellState, Coordinate, MaskedBoard, ShotStats},
    config::ClientConfig,
    game::{Action, Controller, Driver, Effect, Mode, Msg, Surface},
    service::{GameService, HttpGameService, ServiceError},
    ships::{Orientation, ShipType},
    view::{FireOutcome, GameId, GameView, Phase, Viewer},
};
