//! The remote game service the client plays against.
//!
//! The service owns every rule of the game. The client only asks it for views and sends
//! it actions, so the contract is small: create a game, fetch a view for one viewer,
//! place ships, and fire.

use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;

use crate::{
    board::Coordinate,
    ships::{Orientation, ShipType},
    view::{FireOutcome, GameId, GameView, Viewer},
};

pub use self::{
    errors::ServiceError,
    http::{error_message, HttpGameService},
};

mod errors;
mod http;

/// A request to place one ship.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShipPlacement {
    /// Player the ship belongs to.
    pub viewer: Viewer,
    pub ship: ShipType,
    /// Cell where the ship starts. It extends right or down from here.
    pub start: Coordinate,
    pub orientation: Orientation,
}

/// Operations consumed from the authoritative game service.
///
/// Implementations must be safe to call concurrently: the client issues both
/// perspective fetches at once.
#[async_trait]
pub trait GameService: Send + Sync {
    /// Create a game for the two named players. Callers validate that neither name is
    /// empty first.
    async fn create_game(&self, p1_name: &str, p2_name: &str) -> Result<GameId, ServiceError>;

    /// Fetch the game as seen by `viewer`.
    async fn game_view(&self, game: &GameId, viewer: Viewer) -> Result<GameView, ServiceError>;

    /// Place the whole fleet of `viewer` at random. Fails with
    /// [`ServiceError::AlreadyPlaced`] when that fleet is already placed.
    async fn place_random_fleet(&self, game: &GameId, viewer: Viewer)
        -> Result<(), ServiceError>;

    /// Place a single ship.
    async fn place_ship(&self, game: &GameId, placement: ShipPlacement)
        -> Result<(), ServiceError>;

    /// Fire a shot as `viewer` at the opponent's board.
    async fn fire_shot(
        &self,
        game: &GameId,
        viewer: Viewer,
        target: Coordinate,
    ) -> Result<FireOutcome, ServiceError>;
}

#[async_trait]
impl<S: GameService + ?Sized> GameService for Arc<S> {
    async fn create_game(&self, p1_name: &str, p2_name: &str) -> Result<GameId, ServiceError> {
        (**self).create_game(p1_name, p2_name).await
    }

    async fn game_view(&self, game: &GameId, viewer: Viewer) -> Result<GameView, ServiceError> {
        (**self).game_view(game, viewer).await
    }

    async fn place_random_fleet(
        &self,
        game: &GameId,
        viewer: Viewer,
    ) -> Result<(), ServiceError> {
        (**self).place_random_fleet(game, viewer).await
    }

    async fn place_ship(
        &self,
        game: &GameId,
        placement: ShipPlacement,
    ) -> Result<(), ServiceError> {
        (**self).place_ship(game, placement).await
    }

    async fn fire_shot(
        &self,
        game: &GameId,
        viewer: Viewer,
        target: Coordinate,
    ) -> Result<FireOutcome, ServiceError> {
        (**self).fire_shot(game, viewer, target).await
    }
}

/// Boxed error used for transport failures so that services other than the HTTP one
/// can report their own.
pub type TransportError = Box<dyn StdError + Send + Sync + 'static>;
