//! Keeps both players' perspectives of the game fetched while turns are being taken.
//!
//! The two views are fetched as independent requests, so they are eventually consistent
//! with each other and with the service but may disagree at any single instant. Both must
//! arrive before they replace the previous pair. A pair from a superseded request never
//! overwrites a newer one.

use tracing::{debug, warn};

use crate::{
    board::{shooter_stats, ShotStats},
    game::generation::{Generation, Token},
    service::ServiceError,
    view::{GameId, GameView, Viewer},
};

/// Scope marker for perspective-pair fetches.
#[derive(Debug)]
pub enum PairFetch {}

/// A pair fetch the caller must perform and report back with
/// [`PerspectiveSync::resolve`].
#[derive(Debug, Clone)]
pub struct PairRequest {
    pub token: Token<PairFetch>,
    pub game_id: GameId,
}

/// The game as seen by each player, fetched together.
#[derive(Debug, Clone, PartialEq)]
pub struct Perspectives {
    p1: GameView,
    p2: GameView,
}

impl Perspectives {
    pub fn new(p1: GameView, p2: GameView) -> Self {
        Self { p1, p2 }
    }

    /// The view fetched for `viewer`.
    pub fn of(&self, viewer: Viewer) -> &GameView {
        match viewer {
            Viewer::P1 => &self.p1,
            Viewer::P2 => &self.p2,
        }
    }

    /// Shot statistics of `shooter`, from that shooter's own view.
    pub fn stats(&self, shooter: Viewer) -> ShotStats {
        shooter_stats(self.of(shooter))
    }
}

/// Owner of the latest complete pair of perspectives.
#[derive(Debug, Default)]
pub struct PerspectiveSync {
    generation: Generation<PairFetch>,
    current: Option<Perspectives>,
    error: Option<String>,
    in_flight: bool,
}

impl PerspectiveSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest complete pair, if any.
    pub fn perspectives(&self) -> Option<&Perspectives> {
        self.current.as_ref()
    }

    /// Message from the last failed pair fetch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a current pair fetch is outstanding.
    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    /// Start fetching both perspectives of `game_id`, superseding any outstanding pair.
    pub fn request(&mut self, game_id: &GameId) -> PairRequest {
        let token = self.generation.next();
        self.in_flight = true;
        debug!(generation = token.value(), game = %game_id, "fetching both perspectives");
        PairRequest {
            token,
            game_id: game_id.clone(),
        }
    }

    /// Apply a resolved pair. Returns `None` if it was superseded, otherwise whether the
    /// pair replaced the previous one. If either side failed the previous pair is kept.
    pub fn resolve(
        &mut self,
        token: Token<PairFetch>,
        p1: Result<GameView, ServiceError>,
        p2: Result<GameView, ServiceError>,
    ) -> Option<bool> {
        if !self.generation.is_current(token) {
            debug!(generation = token.value(), "discarding stale perspectives");
            return None;
        }
        self.in_flight = false;
        match (p1, p2) {
            (Ok(p1), Ok(p2)) => {
                let next = Perspectives::new(p1, p2);
                if let Some(prev) = &self.current {
                    for &shooter in &Viewer::BOTH {
                        if !next.stats(shooter).follows(&prev.stats(shooter)) {
                            warn!(%shooter, "shot counters went backwards");
                        }
                    }
                }
                self.current = Some(next);
                self.error = None;
                Some(true)
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(%err, "failed to refresh perspectives");
                self.error = Some(err.to_string());
                Some(false)
            }
        }
    }

    /// Drop both perspectives. Outstanding fetches become stale.
    pub fn reset(&mut self) {
        self.generation.invalidate();
        self.current = None;
        self.error = None;
        self.in_flight = false;
    }
}
