//! Maps the phase reported by the service to the mode the front end is in.
//!
//! ```text
//! NoGame --game created--> Loading --view fetched--> Placing | Turn | Finished
//!    ^                                                            |
//!    +------------------------- reset ----------------------------+
//! ```
//!
//! The machine re-evaluates on every session change and every explicit refresh. Each
//! trigger issues exactly one fetch, and the transition happens atomically when that
//! fetch resolves. A fetch that resolves after a newer trigger started is discarded.

use tracing::{debug, info, warn};

use crate::{
    game::{
        generation::{Generation, Token},
        session::Session,
    },
    service::ServiceError,
    view::{GameId, GameView, Phase, Viewer},
};

/// What the front end should be showing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Mode {
    /// No game is active; show the lobby.
    NoGame,
    /// A game is active but no view has arrived yet.
    Loading,
    /// Either player is placing ships.
    Placing,
    /// Players are taking turns.
    Turn,
    /// The game is over.
    Finished,
}

impl Mode {
    /// The mode for a fetched phase.
    pub fn of(phase: Phase) -> Mode {
        match phase {
            Phase::PlacingP1 | Phase::PlacingP2 => Mode::Placing,
            Phase::TurnP1 | Phase::TurnP2 => Mode::Turn,
            Phase::Finished => Mode::Finished,
        }
    }

    /// Whether both players' perspectives are kept fetched in this mode.
    pub fn shows_perspectives(self) -> bool {
        match self {
            Mode::Turn | Mode::Finished => true,
            Mode::NoGame | Mode::Loading | Mode::Placing => false,
        }
    }
}

/// Scope marker for single-view fetches.
#[derive(Debug)]
pub enum PhaseFetch {}

/// A view fetch the caller must perform and report back with
/// [`PhaseMachine::resolve`].
#[derive(Debug, Clone)]
pub struct ViewRequest {
    pub token: Token<PhaseFetch>,
    pub game_id: GameId,
    pub viewer: Viewer,
}

/// What happened when a current fetch resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PhaseResolution {
    /// A new view replaced the old one.
    Applied {
        previous: Option<Phase>,
        current: Phase,
    },
    /// The fetch failed; the previous view, if any, is kept.
    Failed,
}

impl PhaseResolution {
    /// Whether the phase value differs from the one shown before this fetch.
    pub fn phase_changed(&self) -> bool {
        match *self {
            PhaseResolution::Applied { previous, current } => previous != Some(current),
            PhaseResolution::Failed => false,
        }
    }
}

/// Holds the single view fetched for the session's viewer and the mode derived from it.
#[derive(Debug, Default)]
pub struct PhaseMachine {
    generation: Generation<PhaseFetch>,
    /// Game the current view belongs to.
    game_id: Option<GameId>,
    view: Option<GameView>,
    error: Option<String>,
    loading: bool,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        match (&self.game_id, &self.view) {
            (None, _) => Mode::NoGame,
            (Some(_), None) => Mode::Loading,
            (Some(_), Some(view)) => Mode::of(view.phase()),
        }
    }

    /// The most recently applied view.
    pub fn view(&self) -> Option<&GameView> {
        self.view.as_ref()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.view.as_ref().map(GameView::phase)
    }

    /// Message from the last failed fetch, cleared by the next trigger.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a current fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Re-evaluate for `session`, returning the fetch to perform. Returns `None` and resets
    /// when the session has no game.
    pub fn trigger(&mut self, session: &Session) -> Option<ViewRequest> {
        let game_id = match session.game_id() {
            Some(id) => id.clone(),
            None => {
                self.reset();
                return None;
            }
        };
        if self.game_id.as_ref() != Some(&game_id) {
            self.view = None;
            self.game_id = Some(game_id.clone());
        }
        self.loading = true;
        self.error = None;
        let token = self.generation.next();
        debug!(generation = token.value(), game = %game_id, viewer = %session.viewer(), "fetching view");
        Some(ViewRequest {
            token,
            game_id,
            viewer: session.viewer(),
        })
    }

    /// Apply the result of a fetch. Returns `None` if the fetch was superseded, in which
    /// case nothing changes.
    pub fn resolve(
        &mut self,
        token: Token<PhaseFetch>,
        result: Result<GameView, ServiceError>,
    ) -> Option<PhaseResolution> {
        if !self.generation.is_current(token) {
            debug!(generation = token.value(), "discarding stale view");
            return None;
        }
        self.loading = false;
        Some(match result {
            Ok(view) => {
                let previous = self.phase();
                let current = view.phase();
                if previous != Some(current) {
                    info!(?previous, ?current, "phase changed");
                }
                self.view = Some(view);
                self.error = None;
                PhaseResolution::Applied { previous, current }
            }
            Err(err) => {
                warn!(%err, "failed to load game");
                self.error = Some(err.to_string());
                PhaseResolution::Failed
            }
        })
    }

    /// Forget the game. Outstanding fetches become stale.
    pub fn reset(&mut self) {
        self.generation.invalidate();
        self.game_id = None;
        self.view = None;
        self.error = None;
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{session::SessionAction, test_view};

    fn session() -> Session {
        Session::new().apply(SessionAction::Created(GameId::new("g")))
    }

    #[test]
    fn no_game_then_loading_then_phase() {
        let mut machine = PhaseMachine::new();
        assert_eq!(machine.mode(), Mode::NoGame);
        assert!(machine.trigger(&Session::new()).is_none());

        let req = machine.trigger(&session()).unwrap();
        assert_eq!(machine.mode(), Mode::Loading);
        assert!(machine.is_loading());
        assert_eq!(req.viewer, Viewer::P1);

        let res = machine.resolve(req.token, Ok(test_view(Phase::PlacingP1)));
        assert_eq!(
            res,
            Some(PhaseResolution::Applied {
                previous: None,
                current: Phase::PlacingP1
            })
        );
        assert_eq!(machine.mode(), Mode::Placing);
        assert!(!machine.is_loading());
    }

    #[test]
    fn stale_fetch_is_discarded() {
        let mut machine = PhaseMachine::new();
        let old = machine.trigger(&session()).unwrap();
        let new = machine
            .trigger(&session().apply(SessionAction::ViewAs(Viewer::P2)))
            .unwrap();
        assert_eq!(new.viewer, Viewer::P2);

        assert!(machine
            .resolve(new.token, Ok(test_view(Phase::TurnP1)))
            .is_some());
        assert!(machine
            .resolve(old.token, Ok(test_view(Phase::PlacingP1)))
            .is_none());
        assert_eq!(machine.phase(), Some(Phase::TurnP1));
    }

    #[test]
    fn failure_keeps_previous_view() {
        let mut machine = PhaseMachine::new();
        let req = machine.trigger(&session()).unwrap();
        machine.resolve(req.token, Ok(test_view(Phase::TurnP2)));

        let req = machine.trigger(&session()).unwrap();
        let res = machine.resolve(req.token, Err(ServiceError::transport("offline")));
        assert_eq!(res, Some(PhaseResolution::Failed));
        assert_eq!(machine.mode(), Mode::Turn);
        assert_eq!(machine.error(), Some("network error: offline"));

        // Retrying goes through the same trigger and clears the error.
        machine.trigger(&session()).unwrap();
        assert_eq!(machine.error(), None);
    }

    #[test]
    fn reset_stales_outstanding_fetch() {
        let mut machine = PhaseMachine::new();
        let req = machine.trigger(&session()).unwrap();
        machine.reset();
        assert!(machine
            .resolve(req.token, Ok(test_view(Phase::PlacingP1)))
            .is_none());
        assert_eq!(machine.mode(), Mode::NoGame);
    }

    #[test]
    fn new_game_drops_old_view() {
        let mut machine = PhaseMachine::new();
        let req = machine.trigger(&session()).unwrap();
        machine.resolve(req.token, Ok(test_view(Phase::Finished)));
        let other = Session::new().apply(SessionAction::Created(GameId::new("h")));
        machine.trigger(&other).unwrap();
        assert_eq!(machine.mode(), Mode::Loading);
    }

    #[test]
    fn phase_changed_only_on_new_value() {
        let same = PhaseResolution::Applied {
            previous: Some(Phase::TurnP1),
            current: Phase::TurnP1,
        };
        assert!(!same.phase_changed());
        assert!(!PhaseResolution::Failed.phase_changed());
    }
}
