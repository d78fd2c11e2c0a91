//! In-memory game service used by the integration tests.
//!
//! Follows the rules of the real service closely enough to drive a whole game: placement
//! phases advance once a fleet is complete, turns alternate after every shot, and a ship
//! turns `Sunk` once every one of its cells is hit. Random placement is deterministic and
//! leaves the top-left cell empty.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use battleship_client::{
    service::ShipPlacement, Board, CellState, Coordinate, FireOutcome, GameId, GameService,
    GameView, Orientation, Phase, ServiceError, ShipType, Viewer,
};

/// Fleet used by random placement: ship, start row, start column.
pub const RANDOM_FLEET: [(ShipType, usize, usize); 5] = [
    (ShipType::Carrier, 2, 0),
    (ShipType::Battleship, 4, 0),
    (ShipType::Cruiser, 6, 0),
    (ShipType::Submarine, 8, 0),
    (ShipType::Destroyer, 9, 5),
];

pub fn coord(row: usize, col: usize) -> Coordinate {
    Coordinate::new(row, col).unwrap()
}

/// Cells occupied by `ship` starting at `start`, or `None` if it leaves the board.
fn cells(ship: ShipType, start: Coordinate, orientation: Orientation) -> Option<Vec<Coordinate>> {
    (0..ship.len())
        .map(|i| match orientation {
            Orientation::Horizontal => Coordinate::new(start.row(), start.col() + i),
            Orientation::Vertical => Coordinate::new(start.row() + i, start.col()),
        })
        .collect::<Result<Vec<_>, _>>()
        .ok()
}

#[derive(Default)]
struct Fleet {
    board: Board,
    ships: Vec<(ShipType, Vec<Coordinate>)>,
}

impl Fleet {
    fn place(&mut self, ship: ShipType, cells: Vec<Coordinate>) -> Result<(), ServiceError> {
        if self.ships.iter().any(|(placed, _)| *placed == ship) {
            return Err(ServiceError::rejected(400, "Ship already placed"));
        }
        if cells.iter().any(|&c| self.board[c] != CellState::Empty) {
            return Err(ServiceError::rejected(
                400,
                "Invalid placement (overlap/touch/out of bounds)",
            ));
        }
        for &c in &cells {
            self.board.set(c, CellState::Ship);
        }
        self.ships.push((ship, cells));
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.ships.len() == ShipType::ALL.len()
    }

    fn all_sunk(&self) -> bool {
        self.board.count(CellState::Ship) == 0 && self.board.count(CellState::Hit) == 0
    }

    /// Board as the opponent may see it.
    fn masked(&self) -> Board {
        let mut masked = self.board.clone();
        for (c, cell) in self.board.cells() {
            if cell == CellState::Ship {
                masked.set(c, CellState::Empty);
            }
        }
        masked
    }
}

struct Game {
    names: (String, String),
    phase: Phase,
    winner: Option<Viewer>,
    fleets: [Fleet; 2],
    turns: u32,
}

impl Game {
    fn fleet(&mut self, viewer: Viewer) -> &mut Fleet {
        &mut self.fleets[index(viewer)]
    }

    fn finish_placement(&mut self, viewer: Viewer) {
        if self.fleets[index(viewer)].is_complete() {
            self.phase = match viewer {
                Viewer::P1 => Phase::PlacingP2,
                Viewer::P2 => Phase::TurnP1,
            };
        }
    }
}

fn index(viewer: Viewer) -> usize {
    match viewer {
        Viewer::P1 => 0,
        Viewer::P2 => 1,
    }
}

#[derive(Default)]
pub struct FakeService {
    games: Mutex<HashMap<GameId, Game>>,
    next_id: AtomicUsize,
    requests: AtomicUsize,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of calls made so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn with_game<T>(
        &self,
        id: &GameId,
        f: impl FnOnce(&mut Game) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let mut games = self.games.lock().unwrap();
        match games.get_mut(id) {
            Some(game) => f(game),
            None => Err(ServiceError::rejected(404, "Game not found")),
        }
    }
}

#[async_trait]
impl GameService for FakeService {
    async fn create_game(&self, p1_name: &str, p2_name: &str) -> Result<GameId, ServiceError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let id = GameId::new(format!("game-{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        self.games.lock().unwrap().insert(
            id.clone(),
            Game {
                names: (p1_name.to_string(), p2_name.to_string()),
                phase: Phase::PlacingP1,
                winner: None,
                fleets: Default::default(),
                turns: 0,
            },
        );
        Ok(id)
    }

    async fn game_view(&self, id: &GameId, viewer: Viewer) -> Result<GameView, ServiceError> {
        self.with_game(id, |game| {
            let own = game.fleets[index(viewer)].board.clone();
            let opponent = game.fleets[index(viewer.opponent())].masked();
            let mut view = GameView::new(
                game.phase,
                (game.names.0.as_str(), game.names.1.as_str()),
                own,
                opponent,
            )
            .with_game_id(id.clone());
            if let Some(winner) = game.winner {
                view = view.with_winner(winner).with_summary(game.turns, 0.5);
            }
            Ok(view)
        })
    }

    async fn place_random_fleet(&self, id: &GameId, viewer: Viewer) -> Result<(), ServiceError> {
        self.with_game(id, |game| {
            if game.phase.placing() != Some(viewer) {
                return Err(ServiceError::AlreadyPlaced);
            }
            let mut fleet = Fleet::default();
            for &(ship, row, col) in &RANDOM_FLEET {
                let cells = cells(ship, coord(row, col), Orientation::Horizontal)
                    .ok_or_else(|| ServiceError::rejected(400, "Random placement failed"))?;
                fleet.place(ship, cells)?;
            }
            *game.fleet(viewer) = fleet;
            game.finish_placement(viewer);
            Ok(())
        })
    }

    async fn place_ship(&self, id: &GameId, placement: ShipPlacement) -> Result<(), ServiceError> {
        self.with_game(id, |game| {
            let viewer = placement.viewer;
            if game.phase.placing() != Some(viewer) {
                return Err(ServiceError::rejected(
                    400,
                    format!("Not in PLACING_{}", viewer),
                ));
            }
            let cells = cells(placement.ship, placement.start, placement.orientation)
                .ok_or_else(|| {
                    ServiceError::rejected(400, "Invalid placement (overlap/touch/out of bounds)")
                })?;
            game.fleet(viewer).place(placement.ship, cells)?;
            game.finish_placement(viewer);
            Ok(())
        })
    }

    async fn fire_shot(
        &self,
        id: &GameId,
        viewer: Viewer,
        target: Coordinate,
    ) -> Result<FireOutcome, ServiceError> {
        self.with_game(id, |game| {
            if game.phase.turn() != Some(viewer) {
                return Err(ServiceError::rejected(400, "Not your turn"));
            }
            let fleet = game.fleet(viewer.opponent());
            let mut outcome = match fleet.board[target] {
                CellState::Ship => {
                    fleet.board.set(target, CellState::Hit);
                    let sunk = fleet
                        .ships
                        .iter()
                        .find(|(_, cells)| cells.contains(&target))
                        .filter(|(_, cells)| {
                            cells.iter().all(|&c| fleet.board[c] == CellState::Hit)
                        })
                        .map(|(ship, cells)| (*ship, cells.clone()));
                    match sunk {
                        Some((ship, cells)) => {
                            for c in cells {
                                fleet.board.set(c, CellState::Sunk);
                            }
                            FireOutcome::hit(Some(ship))
                        }
                        None => FireOutcome::hit(None),
                    }
                }
                CellState::Empty => {
                    fleet.board.set(target, CellState::Miss);
                    FireOutcome::miss()
                }
                _ => return Err(ServiceError::rejected(400, "Cell already targeted")),
            };
            let won = fleet.all_sunk();
            game.turns += 1;
            if won {
                game.phase = Phase::Finished;
                game.winner = Some(viewer);
                outcome.winner = Some(viewer);
            } else {
                game.phase = match viewer {
                    Viewer::P1 => Phase::TurnP2,
                    Viewer::P2 => Phase::TurnP1,
                };
            }
            outcome.next_state = Some(game.phase);
            Ok(outcome)
        })
    }
}
