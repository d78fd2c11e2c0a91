//! Sends mutating actions to the service, at most one in flight per surface, and tracks
//! each one through the refresh cascade that follows it.
//!
//! A surface is busy from the moment its action is dispatched until the cascade is over:
//! the action's request, then the view fetch, then (during play) the fetch of both
//! perspectives. Attempts to dispatch while busy are dropped, not queued. A failed action
//! releases the surface immediately without refreshing anything.

use std::collections::HashMap;

use enumflags2::BitFlags;
use tracing::{debug, info};

use crate::{
    board::Coordinate,
    game::generation::{Generation, Token},
    service::{GameService, ServiceError, ShipPlacement},
    ships::ShipType,
    view::{FireOutcome, GameId, Viewer},
};

/// Part of the front end that issues actions. Each has its own busy flag.
#[derive(BitFlags, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Surface {
    /// Ship placement, for either player.
    Placement = 0b01,
    /// Firing during play, for either player.
    Play = 0b10,
}

/// A mutating request to the service.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    PlaceShip(ShipPlacement),
    PlaceRandomFleet(Viewer),
    /// Randomize the first player's fleet, then the second's.
    QuickStart,
    FireShot { viewer: Viewer, target: Coordinate },
}

impl Action {
    /// The surface this action belongs to.
    pub fn surface(&self) -> Surface {
        match self {
            Action::PlaceShip(_) | Action::PlaceRandomFleet(_) | Action::QuickStart => {
                Surface::Placement
            }
            Action::FireShot { .. } => Surface::Play,
        }
    }

    /// Perform this action against `service`.
    pub async fn perform<S: GameService + ?Sized>(
        self,
        service: &S,
        game: &GameId,
    ) -> Result<ActionOutcome, ServiceError> {
        match self {
            Action::PlaceShip(placement) => service
                .place_ship(game, placement)
                .await
                .map(|()| ActionOutcome::Placed(placement)),
            Action::PlaceRandomFleet(viewer) => service
                .place_random_fleet(game, viewer)
                .await
                .map(|()| ActionOutcome::Randomized(viewer)),
            Action::QuickStart => {
                for &viewer in &Viewer::BOTH {
                    service.place_random_fleet(game, viewer).await?;
                }
                Ok(ActionOutcome::QuickStarted)
            }
            Action::FireShot { viewer, target } => service
                .fire_shot(game, viewer, target)
                .await
                .map(|outcome| ActionOutcome::Fired {
                    shooter: viewer,
                    target,
                    outcome,
                }),
        }
    }
}

/// Successful result of an [`Action`].
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Placed(ShipPlacement),
    Randomized(Viewer),
    QuickStarted,
    Fired {
        shooter: Viewer,
        target: Coordinate,
        outcome: FireOutcome,
    },
}

impl ActionOutcome {
    /// Message shown on the surface after the action succeeded.
    pub fn message(&self) -> String {
        match self {
            ActionOutcome::Placed(placement) => format!(
                "Placed {} at row {}, col {} ({})",
                placement.ship,
                placement.start.row() + 1,
                placement.start.col() + 1,
                placement.orientation,
            ),
            ActionOutcome::Randomized(_) => "Fleet randomized!".to_string(),
            ActionOutcome::QuickStarted => "Both fleets randomized!".to_string(),
            ActionOutcome::Fired { outcome, .. } => {
                let shot = match outcome.sunk_ship() {
                    Some(ship) => format!("Sunk {}!", ship),
                    None if outcome.hit => "Hit!".to_string(),
                    None => "Miss.".to_string(),
                };
                if outcome.winner.is_some() {
                    format!("{} Game over.", shot)
                } else {
                    shot
                }
            }
        }
    }
}

/// Scope marker for actions.
#[derive(Debug)]
pub enum ActionScope {}

/// An action the caller must perform and report back with [`Dispatcher::finish`].
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub token: Token<ActionScope>,
    pub game_id: GameId,
    pub action: Action,
}

/// Ships each shooter has sunk, in the order the sinks were reported.
///
/// Reconstructed from fire results during this session only. It starts empty on every
/// load regardless of the game's real history and is never reconciled with the service.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SunkLedger {
    p1: Vec<ShipType>,
    p2: Vec<ShipType>,
}

impl SunkLedger {
    /// Ships sunk by `shooter`.
    pub fn sunk_by(&self, shooter: Viewer) -> &[ShipType] {
        match shooter {
            Viewer::P1 => &self.p1,
            Viewer::P2 => &self.p2,
        }
    }

    fn record(&mut self, shooter: Viewer, ship: ShipType) {
        match shooter {
            Viewer::P1 => self.p1.push(ship),
            Viewer::P2 => self.p2.push(ship),
        }
    }
}

/// How far a busy surface has come.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Stage {
    /// The mutating request is outstanding.
    Performing,
    /// Waiting for the view fetch that follows a successful action.
    AwaitingView,
    /// Waiting for both perspectives.
    AwaitingPerspectives,
}

/// What the caller must do after an action completes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Completion {
    /// The action succeeded; start the refresh cascade.
    Refresh,
    /// The action failed; the surface is already released.
    Failed,
}

/// Gatekeeper for mutating actions, and owner of the state reconstructed from their
/// results.
#[derive(Debug)]
pub struct Dispatcher {
    /// Bumped on reset only, so actions on different surfaces don't stale each other.
    generation: Generation<ActionScope>,
    busy: BitFlags<Surface>,
    stages: HashMap<Surface, Stage>,
    messages: HashMap<Surface, String>,
    sunk: SunkLedger,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            generation: Generation::new(),
            busy: BitFlags::empty(),
            stages: HashMap::new(),
            messages: HashMap::new(),
            sunk: SunkLedger::default(),
        }
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self, surface: Surface) -> bool {
        self.busy.contains(surface)
    }

    /// Every busy surface.
    pub fn busy(&self) -> BitFlags<Surface> {
        self.busy
    }

    /// Last message shown on `surface`.
    pub fn message(&self, surface: Surface) -> Option<&str> {
        self.messages.get(&surface).map(String::as_str)
    }

    pub fn sunk(&self) -> &SunkLedger {
        &self.sunk
    }

    /// Dispatch `action`, or return `None` if its surface is busy.
    pub fn begin(&mut self, game_id: &GameId, action: Action) -> Option<ActionRequest> {
        let surface = action.surface();
        if self.is_busy(surface) {
            debug!(?surface, ?action, "surface busy, dropping action");
            return None;
        }
        self.busy.insert(surface);
        self.stages.insert(surface, Stage::Performing);
        self.messages.remove(&surface);
        debug!(?surface, ?action, "dispatching");
        Some(ActionRequest {
            token: self.generation.token(),
            game_id: game_id.clone(),
            action,
        })
    }

    /// Show a message on `surface` without dispatching anything.
    pub fn refuse(&mut self, surface: Surface, message: impl Into<String>) {
        self.messages.insert(surface, message.into());
    }

    /// Apply the result of a dispatched action. Returns `None` if the action was
    /// dispatched before the last reset.
    pub fn finish(
        &mut self,
        token: Token<ActionScope>,
        surface: Surface,
        result: Result<ActionOutcome, ServiceError>,
    ) -> Option<Completion> {
        if !self.generation.is_current(token) {
            debug!(?surface, "discarding action result from before reset");
            return None;
        }
        match result {
            Ok(outcome) => {
                if let ActionOutcome::Fired {
                    shooter,
                    outcome: ref fire,
                    ..
                } = outcome
                {
                    if let Some(ship) = fire.sunk_ship() {
                        info!(%shooter, %ship, "ship sunk");
                        self.sunk.record(shooter, ship);
                    }
                }
                self.messages.insert(surface, outcome.message());
                self.stages.insert(surface, Stage::AwaitingView);
                Some(Completion::Refresh)
            }
            Err(err) => {
                debug!(?surface, %err, "action failed");
                self.messages.insert(surface, err.to_string());
                self.release(surface);
                Some(Completion::Failed)
            }
        }
    }

    /// Whether any surface is waiting for the view fetch of its cascade.
    pub fn awaiting_view(&self) -> bool {
        self.stages.values().any(|&stage| stage == Stage::AwaitingView)
    }

    /// The cascade's view fetch resolved, successfully or not. Surfaces waiting on it
    /// move on to the perspectives if those were requested, otherwise they are released.
    pub fn view_resolved(&mut self, perspectives_requested: bool) {
        for surface in self.surfaces_at(Stage::AwaitingView) {
            if perspectives_requested {
                self.stages.insert(surface, Stage::AwaitingPerspectives);
            } else {
                self.release(surface);
            }
        }
    }

    /// The perspectives resolved, successfully or not. Surfaces waiting on them are
    /// released.
    pub fn perspectives_resolved(&mut self) {
        for surface in self.surfaces_at(Stage::AwaitingPerspectives) {
            self.release(surface);
        }
    }

    /// Forget everything: busy flags, messages and sunk ships. Outstanding actions become
    /// stale.
    pub fn reset(&mut self) {
        self.generation.invalidate();
        self.busy = BitFlags::empty();
        self.stages.clear();
        self.messages.clear();
        self.sunk = SunkLedger::default();
    }

    fn surfaces_at(&self, stage: Stage) -> Vec<Surface> {
        self.stages
            .iter()
            .filter(|&(_, &s)| s == stage)
            .map(|(&surface, _)| surface)
            .collect()
    }

    fn release(&mut self, surface: Surface) {
        self.stages.remove(&surface);
        self.busy.remove(surface);
        debug!(?surface, "released");
    }
}
