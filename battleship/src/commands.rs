//! Parsing of the commands typed at the prompt.
//!
//! Rows and columns are typed 1-based, matching the labels printed around the boards.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use battleship_client::{board::BOARD_SIZE, Coordinate, Orientation, ShipType, Viewer};

/// A command typed by the players.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    /// Create a game. Missing names are sent empty and refused by the lobby.
    New { p1: String, p2: String },
    /// Look at the game as the given player.
    View(Viewer),
    /// Place one ship for whoever is placing.
    Place {
        ship: ShipType,
        start: Coordinate,
        orientation: Orientation,
    },
    /// Randomize the fleet of whoever is placing.
    Random,
    /// Randomize both fleets.
    Quick,
    /// Fire at a cell, as the given player or the current viewer.
    Fire {
        viewer: Option<Viewer>,
        target: Coordinate,
    },
    /// Fire at a random cell that hasn't been shot yet.
    Auto(Option<Viewer>),
    Refresh,
    Reset,
    Show,
    Help,
    Quit,
}

/// Reason a line could not be parsed.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum CommandError {
    #[error("unknown command \"{0}\", use '?' for help")]
    Unknown(String),
    #[error("invalid ship: {0}, choose \"carrier\", \"battleship\", \"cruiser\", \"submarine\", or \"destroyer\"")]
    Ship(String),
    #[error("invalid player: {0}, choose \"p1\" or \"p2\"")]
    Player(String),
    #[error("invalid direction {0}, choose \"horizontal\" or \"vertical\"")]
    Orientation(String),
    #[error("{axis} must be in range [1,{}], got {value}", BOARD_SIZE)]
    OutOfRange { axis: &'static str, value: String },
}

static NEW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:new|create)(?:\s+(?P<p1>\S+))?(?:\s+(?P<p2>\S+))?$").unwrap()
});

static VIEW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:view|as|switch)\s+(?P<player>\w+)$").unwrap());

static PLACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?x)(?:place|put)\s+
        (?P<ship>\w+)\s+
        (?:(?:at|on|to|->|=>)\s+)?
        (?P<row>[0-9]+)(?:\s*,\s*|\s+)(?P<col>[0-9]+)\s+
        (?P<dir>\w+)$",
    )
    .unwrap()
});

static FIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?x)(?:fire|shoot)\s+
        (?:(?P<player>p[0-9])\s+)?
        (?:(?:at|on)\s+)?
        (?P<row>[0-9]+)(?:\s*,\s*|\s+)(?P<col>[0-9]+)$",
    )
    .unwrap()
});

static AUTO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:auto|guess)(?:\s+(?P<player>\w+))?$").unwrap());

/// Parse one line of input. Keywords are case insensitive; player names keep their case.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if let Some(captures) = NEW.captures(line) {
        let name = |key| {
            captures
                .name(key)
                .map_or_else(String::new, |m| m.as_str().to_string())
        };
        return Ok(Command::New {
            p1: name("p1"),
            p2: name("p2"),
        });
    }
    let lower = line.to_ascii_lowercase();
    Ok(match lower.as_str() {
        "?" | "help" | "h" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "random" | "rand" | "randomize" => Command::Random,
        "quick" | "quickstart" | "quick-start" => Command::Quick,
        "refresh" | "r" => Command::Refresh,
        "reset" | "restart" => Command::Reset,
        "show" | "board" | "" => Command::Show,
        other => {
            if let Some(captures) = VIEW.captures(other) {
                Command::View(parse_player(&captures["player"])?)
            } else if let Some(captures) = PLACE.captures(other) {
                Command::Place {
                    ship: parse_ship(&captures["ship"])?,
                    start: parse_coordinate(&captures["row"], &captures["col"])?,
                    orientation: parse_orientation(&captures["dir"])?,
                }
            } else if let Some(captures) = FIRE.captures(other) {
                Command::Fire {
                    viewer: captures
                        .name("player")
                        .map(|m| parse_player(m.as_str()))
                        .transpose()?,
                    target: parse_coordinate(&captures["row"], &captures["col"])?,
                }
            } else if let Some(captures) = AUTO.captures(other) {
                Command::Auto(
                    captures
                        .name("player")
                        .map(|m| parse_player(m.as_str()))
                        .transpose()?,
                )
            } else {
                return Err(CommandError::Unknown(other.to_string()));
            }
        }
    })
}

fn parse_ship(name: &str) -> Result<ShipType, CommandError> {
    Ok(match name {
        "cv" | "carrier" => ShipType::Carrier,
        "bb" | "battleship" => ShipType::Battleship,
        "ca" | "cl" | "cruiser" => ShipType::Cruiser,
        "ss" | "sub" | "submarine" => ShipType::Submarine,
        "dd" | "destroyer" => ShipType::Destroyer,
        other => return Err(CommandError::Ship(other.to_string())),
    })
}

fn parse_player(name: &str) -> Result<Viewer, CommandError> {
    match name {
        "p1" | "1" => Ok(Viewer::P1),
        "p2" | "2" => Ok(Viewer::P2),
        other => Err(CommandError::Player(other.to_string())),
    }
}

fn parse_orientation(name: &str) -> Result<Orientation, CommandError> {
    match name {
        "h" | "horizontal" | "right" | "across" => Ok(Orientation::Horizontal),
        "v" | "vertical" | "down" => Ok(Orientation::Vertical),
        other => Err(CommandError::Orientation(other.to_string())),
    }
}

/// Convert 1-based row and column text into a coordinate.
fn parse_coordinate(row: &str, col: &str) -> Result<Coordinate, CommandError> {
    let index = |axis, text: &str| match text.parse::<usize>() {
        Ok(value) if (1..=BOARD_SIZE).contains(&value) => Ok(value - 1),
        _ => Err(CommandError::OutOfRange {
            axis,
            value: text.to_string(),
        }),
    };
    let (row, col) = (index("row", row)?, index("col", col)?);
    Coordinate::new(row, col).map_err(|err| CommandError::OutOfRange {
        axis: "coordinate",
        value: err.to_string(),
    })
}
