//! Data fetched from the game service. Everything here is read-only on the client: a
//! [`GameView`] is replaced wholesale by the next fetch, never patched.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    board::{Board, MaskedBoard},
    ships::ShipType,
};

/// Identifies one of the two players. Selects whose perspective is fetched and
/// rendered; it is never authoritative about the game itself.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Viewer {
    P1,
    P2,
}

impl Viewer {
    /// Both viewers, first player first.
    pub const BOTH: [Viewer; 2] = [Viewer::P1, Viewer::P2];

    /// Get the opponent of this viewer.
    pub fn opponent(self) -> Self {
        match self {
            Viewer::P1 => Viewer::P2,
            Viewer::P2 => Viewer::P1,
        }
    }

    /// Name of the viewer as the service spells it.
    pub fn wire_name(self) -> &'static str {
        match self {
            Viewer::P1 => "P1",
            Viewer::P2 => "P2",
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Viewer::P1
    }
}

impl fmt::Display for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.wire_name())
    }
}

/// Identifier of a game created by the service.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        GameId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Authoritative stage of the game as reported by the service.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    PlacingP1,
    PlacingP2,
    TurnP1,
    TurnP2,
    Finished,
}

impl Phase {
    /// The viewer currently placing ships, if the game is in a placement phase.
    pub fn placing(self) -> Option<Viewer> {
        match self {
            Phase::PlacingP1 => Some(Viewer::P1),
            Phase::PlacingP2 => Some(Viewer::P2),
            _ => None,
        }
    }

    /// The viewer whose turn it is, if the game is in the turn-taking phase.
    pub fn turn(self) -> Option<Viewer> {
        match self {
            Phase::TurnP1 => Some(Viewer::P1),
            Phase::TurnP2 => Some(Viewer::P2),
            _ => None,
        }
    }

    /// Whether the game has ended.
    pub fn is_finished(self) -> bool {
        self == Phase::Finished
    }
}

/// One player's view of the game, as returned by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// Echo of the game id. Older services omit it.
    #[serde(default)]
    game_id: Option<GameId>,

    #[serde(rename = "state", alias = "phase")]
    phase: Phase,

    #[serde(default)]
    winner: Option<Viewer>,

    p1_name: String,
    p2_name: String,

    /// The requesting viewer's own ships, fully revealed.
    #[serde(rename = "yourBoard", alias = "ownFleetBoard")]
    own_fleet_board: Board,

    /// The opponent's board with unshot ships masked as water.
    opponent_board_masked: MaskedBoard,

    /// Present only once the game is finished.
    #[serde(default)]
    turns: Option<u32>,

    /// Present only once the game is finished. A fraction in `[0, 1]`.
    #[serde(default)]
    accuracy: Option<f64>,
}

impl GameView {
    /// Assemble a view from its parts. The service is the normal source of views; this
    /// exists for in-memory services and tests.
    pub fn new(
        phase: Phase,
        names: (&str, &str),
        own_fleet_board: Board,
        opponent_board: Board,
    ) -> Self {
        Self {
            game_id: None,
            phase,
            winner: None,
            p1_name: names.0.to_string(),
            p2_name: names.1.to_string(),
            own_fleet_board,
            opponent_board_masked: opponent_board.into(),
            turns: None,
            accuracy: None,
        }
    }

    /// Builder-style setter for the game id echo.
    pub fn with_game_id(mut self, id: GameId) -> Self {
        self.game_id = Some(id);
        self
    }

    /// Builder-style setter for the winner.
    pub fn with_winner(mut self, winner: Viewer) -> Self {
        self.winner = Some(winner);
        self
    }

    /// Builder-style setter for the end-of-game summary.
    pub fn with_summary(mut self, turns: u32, accuracy: f64) -> Self {
        self.turns = Some(turns);
        self.accuracy = Some(accuracy);
        self
    }

    pub fn game_id(&self) -> Option<&GameId> {
        self.game_id.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn winner(&self) -> Option<Viewer> {
        self.winner
    }

    pub fn p1_name(&self) -> &str {
        &self.p1_name
    }

    pub fn p2_name(&self) -> &str {
        &self.p2_name
    }

    /// Display name of the given viewer.
    pub fn name_of(&self, viewer: Viewer) -> &str {
        match viewer {
            Viewer::P1 => &self.p1_name,
            Viewer::P2 => &self.p2_name,
        }
    }

    pub fn own_fleet_board(&self) -> &Board {
        &self.own_fleet_board
    }

    pub fn opponent_board_masked(&self) -> &MaskedBoard {
        &self.opponent_board_masked
    }

    pub fn turns(&self) -> Option<u32> {
        self.turns
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }
}

/// Result of a shot, as reported by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireOutcome {
    pub hit: bool,
    pub sunk: bool,
    #[serde(default)]
    pub sunk_ship_type: Option<ShipType>,
    /// Phase after the shot.
    #[serde(default)]
    pub next_state: Option<Phase>,
    #[serde(default)]
    pub winner: Option<Viewer>,
}

impl FireOutcome {
    /// A shot that fell into water.
    pub fn miss() -> Self {
        Self {
            hit: false,
            sunk: false,
            sunk_ship_type: None,
            next_state: None,
            winner: None,
        }
    }

    /// A shot that hit, optionally sinking the given ship.
    pub fn hit(sunk: Option<ShipType>) -> Self {
        Self {
            hit: true,
            sunk: sunk.is_some(),
            sunk_ship_type: sunk,
            next_state: None,
            winner: None,
        }
    }

    /// The ship that sank, only when the result explicitly reports both a sink and its
    /// type.
    pub fn sunk_ship(&self) -> Option<ShipType> {
        if self.sunk {
            self.sunk_ship_type
        } else {
            None
        }
    }
}

/// Body returned when a game is created. Services have spelled the id field three
/// different ways.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedGame {
    #[serde(alias = "gameId", alias = "gameID")]
    pub(crate) id: GameId,
}
