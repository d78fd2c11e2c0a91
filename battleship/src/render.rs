//! Printing of boards and game status to stdout.

use std::fmt;

use battleship_client::{
    board::{visible_board, BoardSide, VisibleBoard, BOARD_SIZE},
    game::Scoreboard,
    CellState, Controller, Mode, ShipType, Surface, Viewer,
};

/// Print everything relevant to the current mode.
pub fn show(ctl: &Controller) {
    println!();
    match ctl.mode() {
        Mode::NoGame => {
            if let Some(err) = ctl.lobby_error() {
                println!("{}", err);
            }
            if ctl.is_creating() {
                println!("Creating game...");
            } else {
                println!("No game. Type \"new <player 1> <player 2>\" to start one.");
            }
        }
        Mode::Loading => println!("Loading game..."),
        Mode::Placing => show_placement(ctl),
        Mode::Turn | Mode::Finished => show_play(ctl),
    }
    if let Some(err) = ctl.error() {
        println!("Error: {}", err);
    }
    if let Some(err) = ctl.perspectives_error() {
        println!("Error: {}", err);
    }
    if ctl.is_loading() {
        println!("(refreshing)");
    }
}

fn show_placement(ctl: &Controller) {
    let view = match ctl.view() {
        Some(view) => view,
        None => return,
    };
    let viewer = ctl.session().viewer();
    match view.phase().placing() {
        Some(placing) if placing == viewer => {
            println!("{} ({}), place your ships.", view.name_of(placing), placing)
        }
        Some(placing) => println!(
            "{} ({}) is placing. You are looking as {}.",
            view.name_of(placing),
            placing,
            viewer
        ),
        None => {}
    }
    println!("Fleet of {}:", view.name_of(viewer));
    show_cells(visible_board(view, BoardSide::OwnFleet));
    if let Some(msg) = ctl.message(Surface::Placement) {
        println!("{}", msg);
    }
}

fn show_play(ctl: &Controller) {
    let view = match ctl.view() {
        Some(view) => view,
        None => return,
    };
    if let Some(summary) = ctl.game_over() {
        println!("Game over! {} wins.", summary.winner);
        if let Some(turns) = summary.turns {
            println!("Turns: {}", turns);
        }
        if let Some(accuracy) = summary.accuracy {
            println!("Accuracy: {}", accuracy);
        }
    } else if let Some(banner) = ctl.turn_banner() {
        println!("{}", banner);
    }

    let viewer = ctl.session().viewer();
    // Prefer the pair while it is available so both boards match the scoreboard.
    let shown = ctl
        .perspectives()
        .map(|pair| pair.of(viewer))
        .unwrap_or(view);
    println!("Targets of {}:", shown.name_of(viewer));
    show_cells(visible_board(shown, BoardSide::Opponent));
    println!("Fleet of {}:", shown.name_of(viewer));
    show_cells(visible_board(shown, BoardSide::OwnFleet));

    for &shooter in &Viewer::BOTH {
        if let Some(score) = ctl.scoreboard(shooter) {
            println!("{}", ScoreLine(&score));
        }
    }
    if let Some(msg) = ctl.message(Surface::Play) {
        println!("{}", msg);
    }
}

/// Print a board, hiding ships unless it is the viewer's own fleet.
fn show_cells(board: VisibleBoard<'_>) {
    let reveal = board.shows_ships();
    show_board(board.board().rows().map(|row| {
        row.iter().map(move |&cell| Cell {
            state: cell,
            reveal,
        })
    }))
}

/// Display helper for one cell.
struct Cell {
    state: CellState,
    reveal: bool,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.state {
            CellState::Ship if self.reveal => f.pad("##"),
            CellState::Empty | CellState::Ship => f.pad("~~"),
            CellState::Miss => f.pad("x"),
            CellState::Hit => f.pad("X"),
            CellState::Sunk => f.pad("XX"),
        }
    }
}

/// Show the board by printing the grid. Takes an iterator over the rows of iterators over
/// the items. Rows and columns are labelled 1-based.
fn show_board(rows: impl Iterator<Item = impl Iterator<Item = impl fmt::Display>>) {
    print!("   ");
    for i in 1..=BOARD_SIZE {
        print!("{:^4}", i);
    }
    println!();
    for (i, row) in rows.enumerate() {
        print!("{:>2} ", i + 1);
        for cell in row {
            print!("{:^4}", cell);
        }
        println!();
    }
}

/// Display helper for one shooter's scoreboard line.
struct ScoreLine<'a, 'b>(&'a Scoreboard<'b>);

impl fmt::Display for ScoreLine<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let score = self.0;
        write!(
            f,
            "{}: {} hits, {} misses",
            score.name, score.stats.hits, score.stats.misses
        )?;
        if !score.sunk.is_empty() {
            write!(f, ", sunk")?;
            for (i, &ship) in score.sunk.iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(f, "{}{}", sep, ShipAbbreviation(ship))?;
            }
        }
        Ok(())
    }
}

/// Display helper that prints the ship's type abbreviation
struct ShipAbbreviation(ShipType);

impl ShipAbbreviation {
    fn abbrev(&self) -> &'static str {
        match self.0 {
            ShipType::Carrier => "cv",
            ShipType::Battleship => "bb",
            ShipType::Cruiser => "cl",
            ShipType::Submarine => "ss",
            ShipType::Destroyer => "dd",
        }
    }
}

impl fmt::Display for ShipAbbreviation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.abbrev())
    }
}
