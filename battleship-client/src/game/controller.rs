//! The reducer that ties the session, phase machine, synchronizer and dispatcher together.
//!
//! [`Controller::update`] is synchronous and never touches the network. User intents and
//! service completions both arrive as [`Msg`]s, and every request the controller wants
//! made leaves as an [`Effect`]. Whoever runs the effects (normally a
//! [`Driver`](crate::game::Driver)) reports each completion back as another `Msg`, in any
//! order. Completions that were superseded in the meantime are recognized by their tokens
//! and ignored.

use tracing::{debug, info};

use crate::{
    board::ShotStats,
    game::{
        dispatch::{
            Action, ActionOutcome, ActionRequest, ActionScope, Completion, Dispatcher, Surface,
        },
        generation::{Generation, Token},
        phase::{Mode, PhaseFetch, PhaseMachine, ViewRequest},
        session::{Session, SessionAction},
        sync::{PairFetch, PairRequest, PerspectiveSync, Perspectives},
    },
    service::ServiceError,
    ships::ShipType,
    view::{GameId, GameView, Viewer},
};

use enumflags2::BitFlags;

/// Shown when a game is requested without both names.
const NAMES_REQUIRED: &str = "Both player names are required.";

/// Shown when a player fires out of turn.
const NOT_YOUR_TURN: &str = "Not your turn";

/// Input to [`Controller::update`].
#[derive(Debug)]
pub enum Msg {
    /// Create a game for the two named players.
    CreateGame { p1: String, p2: String },
    /// Look at the game from `viewer`'s perspective.
    SelectViewer(Viewer),
    /// Fetch the view again, and the perspectives too while turns are being taken.
    Refresh,
    /// Perform a mutating action.
    Dispatch(Action),
    /// Return to start, discarding the game.
    Reset,

    /// Completion of [`Effect::CreateGame`].
    GameCreated {
        token: Token<LobbyScope>,
        result: Result<GameId, ServiceError>,
    },
    /// Completion of [`Effect::FetchView`].
    ViewFetched {
        token: Token<PhaseFetch>,
        result: Result<GameView, ServiceError>,
    },
    /// Completion of [`Effect::FetchPerspectives`].
    PerspectivesFetched {
        token: Token<PairFetch>,
        p1: Result<GameView, ServiceError>,
        p2: Result<GameView, ServiceError>,
    },
    /// Completion of [`Effect::Perform`].
    ActionFinished {
        token: Token<ActionScope>,
        surface: Surface,
        result: Result<ActionOutcome, ServiceError>,
    },
}

/// A request the controller wants made. Each one must eventually be answered with the
/// matching completion [`Msg`].
#[derive(Debug, Clone)]
pub enum Effect {
    /// Create a game, then send [`Msg::GameCreated`].
    CreateGame {
        token: Token<LobbyScope>,
        p1: String,
        p2: String,
    },
    /// Fetch one view, then send [`Msg::ViewFetched`].
    FetchView(ViewRequest),
    /// Fetch both perspectives, then send [`Msg::PerspectivesFetched`].
    FetchPerspectives(PairRequest),
    /// Perform an action, then send [`Msg::ActionFinished`].
    Perform(ActionRequest),
}

/// Scope marker for game creation.
#[derive(Debug)]
pub enum LobbyScope {}

#[derive(Debug, Default)]
struct Lobby {
    generation: Generation<LobbyScope>,
    creating: bool,
    error: Option<String>,
}

/// One shooter's line on the scoreboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Scoreboard<'a> {
    pub name: &'a str,
    pub stats: ShotStats,
    /// Ships this shooter sank during this session.
    pub sunk: &'a [ShipType],
}

/// What is shown once the game is over.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOverSummary {
    /// Display name of the winner, or `Unknown`.
    pub winner: String,
    pub turns: Option<u32>,
    /// Accuracy as a percentage with one decimal, e.g. `47.5%`.
    pub accuracy: Option<String>,
}

/// Client-side state of one hot-seat game.
#[derive(Debug, Default)]
pub struct Controller {
    session: Session,
    lobby: Lobby,
    phase: PhaseMachine,
    sync: PerspectiveSync,
    dispatch: Dispatcher,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `msg`, returning the requests to make as a result.
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::CreateGame { p1, p2 } => self.create_game(&p1, &p2),
            Msg::SelectViewer(viewer) => self.transition(SessionAction::ViewAs(viewer)),
            Msg::Refresh => self.refresh(),
            Msg::Dispatch(action) => self.dispatch(action),
            Msg::Reset => self.reset(),
            Msg::GameCreated { token, result } => self.game_created(token, result),
            Msg::ViewFetched { token, result } => self.view_fetched(token, result),
            Msg::PerspectivesFetched { token, p1, p2 } => {
                if self.sync.resolve(token, p1, p2).is_some() {
                    self.dispatch.perspectives_resolved();
                }
                Vec::new()
            }
            Msg::ActionFinished {
                token,
                surface,
                result,
            } => self.action_finished(token, surface, result),
        }
    }

    fn create_game(&mut self, p1: &str, p2: &str) -> Vec<Effect> {
        if self.lobby.creating {
            debug!("game creation already in progress");
            return Vec::new();
        }
        let (p1, p2) = (p1.trim(), p2.trim());
        if p1.is_empty() || p2.is_empty() {
            self.lobby.error = Some(NAMES_REQUIRED.to_string());
            return Vec::new();
        }
        self.lobby.creating = true;
        self.lobby.error = None;
        let token = self.lobby.generation.next();
        debug!(p1, p2, "creating game");
        vec![Effect::CreateGame {
            token,
            p1: p1.to_string(),
            p2: p2.to_string(),
        }]
    }

    fn game_created(
        &mut self,
        token: Token<LobbyScope>,
        result: Result<GameId, ServiceError>,
    ) -> Vec<Effect> {
        if !self.lobby.generation.is_current(token) {
            debug!(generation = token.value(), "discarding stale game creation");
            return Vec::new();
        }
        self.lobby.creating = false;
        match result {
            Ok(id) => {
                info!(game = %id, "game created");
                self.transition(SessionAction::Created(id))
            }
            Err(err) => {
                self.lobby.error = Some(err.to_string());
                Vec::new()
            }
        }
    }

    fn refresh(&mut self) -> Vec<Effect> {
        let mut effects: Vec<Effect> = self
            .phase
            .trigger(&self.session)
            .map(Effect::FetchView)
            .into_iter()
            .collect();
        if let Some(game_id) = self.session.game_id() {
            if self.phase.mode().shows_perspectives() {
                effects.push(Effect::FetchPerspectives(self.sync.request(game_id)));
            }
        }
        effects
    }

    fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let game_id = match self.session.game_id() {
            Some(id) => id.clone(),
            None => {
                debug!(?action, "no game, dropping action");
                return Vec::new();
            }
        };
        let surface = action.surface();
        if self.dispatch.is_busy(surface) {
            debug!(?surface, ?action, "surface busy, dropping action");
            return Vec::new();
        }
        if let Action::FireShot { viewer, .. } = action {
            if self.phase.phase().and_then(|phase| phase.turn()) != Some(viewer) {
                self.dispatch.refuse(surface, NOT_YOUR_TURN);
                return Vec::new();
            }
        }
        self.dispatch
            .begin(&game_id, action)
            .map(Effect::Perform)
            .into_iter()
            .collect()
    }

    fn reset(&mut self) -> Vec<Effect> {
        self.lobby.generation.invalidate();
        self.lobby.creating = false;
        self.lobby.error = None;
        let effects = self.transition(SessionAction::Clear);
        // A session without a game is not a reset by itself, but stale work may remain.
        self.phase.reset();
        self.sync.reset();
        self.dispatch.reset();
        effects
    }

    fn action_finished(
        &mut self,
        token: Token<ActionScope>,
        surface: Surface,
        result: Result<ActionOutcome, ServiceError>,
    ) -> Vec<Effect> {
        match self.dispatch.finish(token, surface, result) {
            Some(Completion::Refresh) => self
                .phase
                .trigger(&self.session)
                .map(Effect::FetchView)
                .into_iter()
                .collect(),
            Some(Completion::Failed) | None => Vec::new(),
        }
    }

    fn view_fetched(
        &mut self,
        token: Token<PhaseFetch>,
        result: Result<GameView, ServiceError>,
    ) -> Vec<Effect> {
        let resolution = match self.phase.resolve(token, result) {
            Some(resolution) => resolution,
            None => return Vec::new(),
        };
        let mut effects = Vec::new();
        let game_id = self.session.game_id().cloned();
        match game_id {
            Some(game_id) if self.phase.mode().shows_perspectives() => {
                let missing = self.sync.perspectives().is_none() && !self.sync.is_fetching();
                if resolution.phase_changed() || self.dispatch.awaiting_view() || missing {
                    effects.push(Effect::FetchPerspectives(self.sync.request(&game_id)));
                }
            }
            _ => {
                if self.sync.perspectives().is_some() || self.sync.is_fetching() {
                    debug!("left turn-taking, dropping perspectives");
                    self.sync.reset();
                }
            }
        }
        self.dispatch.view_resolved(!effects.is_empty());
        effects
    }

    fn transition(&mut self, action: SessionAction) -> Vec<Effect> {
        let next = self.session.apply(action);
        if next == self.session {
            return Vec::new();
        }
        if self.session.is_reset_by(&next) {
            info!("discarding game state");
            self.phase.reset();
            self.sync.reset();
            self.dispatch.reset();
        }
        self.session = next;
        self.phase
            .trigger(&self.session)
            .map(Effect::FetchView)
            .into_iter()
            .collect()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mode(&self) -> Mode {
        self.phase.mode()
    }

    /// The view fetched for the selected viewer.
    pub fn view(&self) -> Option<&GameView> {
        self.phase.view()
    }

    /// Both players' views, kept while turns are being taken.
    pub fn perspectives(&self) -> Option<&Perspectives> {
        self.sync.perspectives()
    }

    /// Whether a view fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    /// Message from the last failed view fetch.
    pub fn error(&self) -> Option<&str> {
        self.phase.error()
    }

    /// Message from the last failed perspectives fetch.
    pub fn perspectives_error(&self) -> Option<&str> {
        self.sync.error()
    }

    pub fn is_creating(&self) -> bool {
        self.lobby.creating
    }

    /// Message shown in the lobby.
    pub fn lobby_error(&self) -> Option<&str> {
        self.lobby.error.as_deref()
    }

    /// Surfaces with an action or refresh in progress.
    pub fn busy(&self) -> BitFlags<Surface> {
        self.dispatch.busy()
    }

    /// Last message shown on `surface`.
    pub fn message(&self, surface: Surface) -> Option<&str> {
        self.dispatch.message(surface)
    }

    /// Ships sunk by `shooter` during this session.
    pub fn sunk_by(&self, shooter: Viewer) -> &[ShipType] {
        self.dispatch.sunk().sunk_by(shooter)
    }

    /// Scoreboard line of `shooter`, once both perspectives are known.
    pub fn scoreboard(&self, shooter: Viewer) -> Option<Scoreboard<'_>> {
        let pair = self.sync.perspectives()?;
        Some(Scoreboard {
            name: pair.of(shooter).name_of(shooter),
            stats: pair.stats(shooter),
            sunk: self.sunk_by(shooter),
        })
    }

    /// `<name>'s turn` for the player whose turn it is.
    pub fn turn_banner(&self) -> Option<String> {
        let view = self.phase.view()?;
        let viewer = view.phase().turn()?;
        Some(format!("{}'s turn", view.name_of(viewer)))
    }

    /// Summary of a finished game.
    pub fn game_over(&self) -> Option<GameOverSummary> {
        let view = self.phase.view().filter(|view| view.phase().is_finished())?;
        let winner = match view.winner() {
            Some(winner) => view.name_of(winner).to_string(),
            None => "Unknown".to_string(),
        };
        Some(GameOverSummary {
            winner,
            turns: view.turns(),
            accuracy: view
                .accuracy()
                .map(|accuracy| format!("{:.1}%", accuracy * 100.0)),
        })
    }
}
