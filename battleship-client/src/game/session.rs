//! Which game is active and whose perspective is being looked at.
//!
//! A [`Session`] is an immutable value. Changes are expressed as [`SessionAction`]s and
//! produce a new session, so every component sees the same snapshot for the duration of
//! one update.

use crate::view::{GameId, Viewer};

/// The active game and the locally selected viewer.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Session {
    game_id: Option<GameId>,
    viewer: Viewer,
}

/// A change to the [`Session`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SessionAction {
    /// A game was created in the lobby.
    Created(GameId),
    /// Look at the game as the given viewer.
    ViewAs(Viewer),
    /// Return to start: forget the game and look as the first player again.
    Clear,
}

impl Session {
    /// Session with no game, looking as the first player.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game_id(&self) -> Option<&GameId> {
        self.game_id.as_ref()
    }

    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    /// Produce the session that results from `action`.
    pub fn apply(&self, action: SessionAction) -> Session {
        match action {
            SessionAction::Created(id) => Session {
                game_id: Some(id),
                viewer: self.viewer,
            },
            SessionAction::ViewAs(viewer) => Session {
                game_id: self.game_id.clone(),
                viewer,
            },
            SessionAction::Clear => Session::new(),
        }
    }

    /// Whether going from `self` to `next` discards the game. Dependent state must be
    /// dropped entirely when this is true.
    pub fn is_reset_by(&self, next: &Session) -> bool {
        self.game_id.is_some() && self.game_id != next.game_id
    }
}
