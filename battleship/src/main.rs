use std::{error::Error, sync::Arc, time::Duration};

use clap::{App, Arg, ArgMatches};
use rand::{seq::IteratorRandom, Rng};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use battleship_client::{
    service::ShipPlacement, Action, ClientConfig, Controller, Driver, HttpGameService, Msg,
    Viewer,
};

use crate::commands::Command;

mod commands;
mod render;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let matches = App::new("Battleship")
        .version("1.0")
        .author("Zachary Stewart <zachary@zstewart.com>")
        .about("Hot-seat battleship for two players, played against a battleship game service.")
        .arg(
            Arg::with_name("api_url")
                .short("u")
                .long("api-url")
                .value_name("URL")
                .help("root URL of the game service [env: BATTLESHIP_API_URL]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("timeout")
                .short("t")
                .long("timeout")
                .value_name("SECONDS")
                .help("request timeout in seconds [env: BATTLESHIP_TIMEOUT_SECS]")
                .takes_value(true)
                .validator(|value| match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(()),
                    _ => Err(format!("expected a positive number of seconds, got {}", value)),
                }),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("log more to stderr; repeat for more detail"),
        )
        .get_matches();

    init_logging(matches.occurrences_of("verbose"));
    let config = config_from(&matches);
    debug!(?config, "starting");

    let service = Arc::new(HttpGameService::new(&config)?);
    let mut driver = Driver::new(service);
    let mut rng = rand::thread_rng();
    let mut lines = BufReader::new(io::stdin()).lines();

    println!("Battleship for two players on one screen. Type help or ? for commands.");
    render::show(driver.controller());
    prompt().await?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                match commands::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => print_help(),
                    Ok(Command::Show) => render::show(driver.controller()),
                    Ok(command) => match to_msg(command, driver.controller(), &mut rng) {
                        Ok(msg) => {
                            driver.send(msg);
                            if driver.is_idle() {
                                render::show(driver.controller());
                            }
                        }
                        Err(reason) => println!("{}", reason),
                    },
                    Err(err) => println!("{}", err),
                }
                prompt().await?;
            }
            progressed = driver.next(), if !driver.is_idle() => {
                if progressed && driver.is_idle() {
                    render::show(driver.controller());
                    prompt().await?;
                }
            }
        }
    }
    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbosity: u64) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration from the environment, overridden by command line flags.
fn config_from(matches: &ArgMatches) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(url) = matches.value_of("api_url") {
        config = config.with_api_root(url);
    }
    if let Some(secs) = matches.value_of("timeout").and_then(|v| v.parse().ok()) {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }
    config
}

/// Turn a command into the message to send, or explain why it can't be sent.
fn to_msg(command: Command, ctl: &Controller, rng: &mut impl Rng) -> Result<Msg, String> {
    let viewer = ctl.session().viewer();
    Ok(match command {
        Command::New { p1, p2 } => Msg::CreateGame { p1, p2 },
        Command::View(viewer) => Msg::SelectViewer(viewer),
        Command::Place {
            ship,
            start,
            orientation,
        } => Msg::Dispatch(Action::PlaceShip(ShipPlacement {
            viewer: placing(ctl)?,
            ship,
            start,
            orientation,
        })),
        Command::Random => Msg::Dispatch(Action::PlaceRandomFleet(placing(ctl)?)),
        Command::Quick => Msg::Dispatch(Action::QuickStart),
        Command::Fire {
            viewer: shooter,
            target,
        } => Msg::Dispatch(Action::FireShot {
            viewer: shooter.unwrap_or(viewer),
            target,
        }),
        Command::Auto(shooter) => {
            let shooter = shooter.unwrap_or(viewer);
            let pair = ctl
                .perspectives()
                .ok_or_else(|| "No boards to fire at yet.".to_string())?;
            let target = pair
                .of(shooter)
                .opponent_board_masked()
                .unshot()
                .choose(rng)
                .ok_or_else(|| "No cells left to fire at.".to_string())?;
            println!("Firing at row {}, col {}", target.row() + 1, target.col() + 1);
            Msg::Dispatch(Action::FireShot {
                viewer: shooter,
                target,
            })
        }
        Command::Refresh => Msg::Refresh,
        Command::Reset => Msg::Reset,
        Command::Show | Command::Help | Command::Quit => {
            return Err("Nothing to send.".to_string())
        }
    })
}

/// The player currently placing ships.
fn placing(ctl: &Controller) -> Result<Viewer, String> {
    ctl.view()
        .and_then(|view| view.phase().placing())
        .ok_or_else(|| "Nobody is placing ships right now.".to_string())
}

async fn prompt() -> std::io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(b"> ").await?;
    stdout.flush().await
}

fn print_help() {
    println!(
        "Available Commands:
    new <p1> <p2>                    create a game for the two named players.
    view <p1|p2>                     look at the game as the given player.
    place <ship> <row>,<col> <h|v>   place a ship for whoever is placing. It extends
        right (h) or down (v) from the given cell. Rows and columns are 1 to 10.
    random                           randomize the fleet of whoever is placing.
    quick                            randomize both fleets and start playing.
    fire [p1|p2] <row>,<col>         fire at the opponent's board, as the current
        viewer unless a player is given.
    auto [p1|p2]                     fire at a random cell not yet fired at.
    refresh                          fetch the game again.
    reset                            forget the game and return to start.
    show                             print the boards again.
    quit                             leave.

Available Ships:
    \"carrier\" (\"cv\")
    \"battleship\" (\"bb\")
    \"cruiser\" (\"cl\")
    \"submarine\" (\"ss\")
    \"destroyer\" (\"dd\")",
    );
}
