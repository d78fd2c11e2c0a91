//! A whole hot-seat session, driven through the [`Driver`] against the in-memory service.

use std::sync::Arc;

use battleship_client::{
    game::Scoreboard, Action, CellState, Driver, Mode, Msg, Phase, ShipType, Surface, Viewer,
};

mod common;

use common::{coord, FakeService};

type TestDriver = Driver<FakeService>;

async fn new_game(service: &Arc<FakeService>) -> TestDriver {
    let mut driver = Driver::new(Arc::clone(service));
    driver.send(Msg::CreateGame {
        p1: "Alice".into(),
        p2: "Bob".into(),
    });
    driver.settle().await;
    driver
}

async fn dispatch(driver: &mut TestDriver, action: Action) {
    driver.send(Msg::Dispatch(action));
    driver.settle().await;
}

async fn fire(driver: &mut TestDriver, viewer: Viewer, row: usize, col: usize) {
    dispatch(
        driver,
        Action::FireShot {
            viewer,
            target: coord(row, col),
        },
    )
    .await;
}

fn phase(driver: &TestDriver) -> Option<Phase> {
    driver.controller().view().map(|view| view.phase())
}

fn scoreboard(driver: &TestDriver, shooter: Viewer) -> Scoreboard<'_> {
    driver.controller().scoreboard(shooter).unwrap()
}

#[tokio::test]
async fn created_game_starts_in_placement() {
    let service = Arc::new(FakeService::new());
    let driver = new_game(&service).await;
    let ctl = driver.controller();
    assert_eq!(ctl.mode(), Mode::Placing);
    assert_eq!(phase(&driver), Some(Phase::PlacingP1));
    let view = ctl.view().unwrap();
    assert_eq!(view.p1_name(), "Alice");
    assert_eq!(view.p2_name(), "Bob");
    assert!(ctl.perspectives().is_none());
}

#[tokio::test]
async fn lobby_refuses_blank_names_without_a_request() {
    let service = Arc::new(FakeService::new());
    let mut driver = Driver::new(Arc::clone(&service));
    driver.send(Msg::CreateGame {
        p1: "Alice".into(),
        p2: "   ".into(),
    });
    assert!(driver.is_idle());
    assert_eq!(service.requests(), 0);
    assert_eq!(
        driver.controller().lobby_error(),
        Some("Both player names are required.")
    );
    assert_eq!(driver.controller().mode(), Mode::NoGame);
}

#[tokio::test]
async fn randomized_fleets_reach_turns() {
    let service = Arc::new(FakeService::new());
    let mut driver = new_game(&service).await;

    dispatch(&mut driver, Action::PlaceRandomFleet(Viewer::P1)).await;
    assert_eq!(phase(&driver), Some(Phase::PlacingP2));
    assert_eq!(
        driver.controller().message(Surface::Placement),
        Some("Fleet randomized!")
    );

    // The same fleet cannot be randomized twice.
    dispatch(&mut driver, Action::PlaceRandomFleet(Viewer::P1)).await;
    assert_eq!(
        driver.controller().message(Surface::Placement),
        Some("You have already placed all ships for this player.")
    );
    assert_eq!(phase(&driver), Some(Phase::PlacingP2));
    assert!(driver.controller().busy().is_empty());

    dispatch(&mut driver, Action::PlaceRandomFleet(Viewer::P2)).await;
    let ctl = driver.controller();
    assert_eq!(ctl.mode(), Mode::Turn);
    assert_eq!(phase(&driver), Some(Phase::TurnP1));
    assert!(ctl.perspectives().is_some());
    assert_eq!(ctl.turn_banner().as_deref(), Some("Alice's turn"));
}

#[tokio::test]
async fn quick_start_places_both_fleets() {
    let service = Arc::new(FakeService::new());
    let mut driver = new_game(&service).await;
    driver.send(Msg::Dispatch(Action::QuickStart));
    assert!(driver.controller().busy().contains(Surface::Placement));

    // Both fleets are placed before anything is fetched again, so the first fleet
    // never shows up as a separate phase.
    assert!(driver.next().await);
    assert_eq!(phase(&driver), Some(Phase::PlacingP1));
    assert!(driver.controller().busy().contains(Surface::Placement));

    driver.settle().await;
    assert_eq!(phase(&driver), Some(Phase::TurnP1));
    assert!(driver.controller().busy().is_empty());
    assert_eq!(
        driver.controller().message(Surface::Placement),
        Some("Both fleets randomized!")
    );
}

#[tokio::test]
async fn miss_shows_on_shooters_masked_board() {
    let service = Arc::new(FakeService::new());
    let mut driver = new_game(&service).await;
    dispatch(&mut driver, Action::QuickStart).await;

    fire(&mut driver, Viewer::P1, 0, 0).await;
    let ctl = driver.controller();
    assert_eq!(ctl.message(Surface::Play), Some("Miss."));
    assert_eq!(phase(&driver), Some(Phase::TurnP2));

    let pair = ctl.perspectives().unwrap();
    let target = pair.of(Viewer::P1).opponent_board_masked();
    assert_eq!(target[coord(0, 0)], CellState::Miss);
    // The miss landed on P2's fleet.
    assert_eq!(
        pair.of(Viewer::P2).own_fleet_board()[coord(0, 0)],
        CellState::Miss
    );

    let p1 = scoreboard(&driver, Viewer::P1);
    assert_eq!((p1.stats.hits, p1.stats.misses), (0, 1));
    let p2 = scoreboard(&driver, Viewer::P2);
    assert_eq!(p2.stats.shots(), 0);
}

#[tokio::test]
async fn out_of_turn_fire_is_not_sent() {
    let service = Arc::new(FakeService::new());
    let mut driver = new_game(&service).await;
    dispatch(&mut driver, Action::QuickStart).await;

    let before = service.requests();
    fire(&mut driver, Viewer::P2, 0, 0).await;
    assert_eq!(service.requests(), before);
    assert_eq!(driver.controller().message(Surface::Play), Some("Not your turn"));
}

#[tokio::test]
async fn sinking_counts_for_shooter_only() {
    let service = Arc::new(FakeService::new());
    let mut driver = new_game(&service).await;
    dispatch(&mut driver, Action::QuickStart).await;

    // The destroyer sits at row 9, columns 5 and 6.
    fire(&mut driver, Viewer::P1, 9, 5).await;
    assert_eq!(driver.controller().message(Surface::Play), Some("Hit!"));
    fire(&mut driver, Viewer::P2, 0, 0).await;
    fire(&mut driver, Viewer::P1, 9, 6).await;

    let ctl = driver.controller();
    assert_eq!(ctl.message(Surface::Play), Some("Sunk DESTROYER!"));
    assert_eq!(ctl.sunk_by(Viewer::P1), &[ShipType::Destroyer]);
    assert!(ctl.sunk_by(Viewer::P2).is_empty());

    let p1 = scoreboard(&driver, Viewer::P1);
    assert_eq!(p1.name, "Alice");
    assert_eq!((p1.stats.hits, p1.stats.misses), (2, 0));
    assert_eq!(p1.sunk, &[ShipType::Destroyer]);
    let target = ctl.perspectives().unwrap().of(Viewer::P1).opponent_board_masked();
    assert_eq!(target[coord(9, 5)], CellState::Sunk);
    // Unshot ships never show through the mask.
    assert_eq!(target[coord(2, 0)], CellState::Empty);
}

#[tokio::test]
async fn sinking_every_ship_finishes_the_game() {
    let service = Arc::new(FakeService::new());
    let mut driver = new_game(&service).await;
    dispatch(&mut driver, Action::QuickStart).await;

    let targets: Vec<_> = common::RANDOM_FLEET
        .iter()
        .flat_map(|&(ship, row, col)| (col..col + ship.len()).map(move |c| (row, c)))
        .collect();
    // Rows 0 and 1 are open water on both boards.
    let mut misses = (0..2).flat_map(|row| (0..10).map(move |col| (row, col)));
    for (i, &(row, col)) in targets.iter().enumerate() {
        if i > 0 {
            let (r, c) = misses.next().unwrap();
            fire(&mut driver, Viewer::P2, r, c).await;
        }
        fire(&mut driver, Viewer::P1, row, col).await;
    }

    let ctl = driver.controller();
    assert_eq!(ctl.mode(), Mode::Finished);
    assert!(ctl
        .message(Surface::Play)
        .unwrap()
        .ends_with("Game over."));
    assert_eq!(ctl.sunk_by(Viewer::P1).len(), ShipType::ALL.len());
    let summary = ctl.game_over().unwrap();
    assert_eq!(summary.winner, "Alice");
    assert_eq!(summary.accuracy.as_deref(), Some("50.0%"));
    assert!(ctl.perspectives().is_some());
}

#[tokio::test]
async fn viewer_switch_keeps_game() {
    let service = Arc::new(FakeService::new());
    let mut driver = new_game(&service).await;
    dispatch(&mut driver, Action::PlaceRandomFleet(Viewer::P1)).await;

    driver.send(Msg::SelectViewer(Viewer::P2));
    driver.settle().await;
    let ctl = driver.controller();
    assert_eq!(ctl.session().viewer(), Viewer::P2);
    let view = ctl.view().unwrap();
    // P2 has not placed yet, and sees nothing of P1's fleet.
    assert_eq!(view.own_fleet_board().count(CellState::Ship), 0);
    assert_eq!(view.opponent_board_masked().board().count(CellState::Ship), 0);
}

#[tokio::test]
async fn reset_discards_in_flight_results() {
    let service = Arc::new(FakeService::new());
    let mut driver = new_game(&service).await;
    dispatch(&mut driver, Action::QuickStart).await;
    fire(&mut driver, Viewer::P1, 9, 5).await;
    fire(&mut driver, Viewer::P2, 0, 0).await;

    // The sinking shot is still outstanding when the session is reset.
    driver.send(Msg::Dispatch(Action::FireShot {
        viewer: Viewer::P1,
        target: coord(9, 6),
    }));
    assert!(!driver.is_idle());
    driver.send(Msg::Reset);
    driver.settle().await;

    let ctl = driver.controller();
    assert_eq!(ctl.mode(), Mode::NoGame);
    assert_eq!(ctl.session().viewer(), Viewer::P1);
    assert!(ctl.session().game_id().is_none());
    assert!(ctl.view().is_none());
    assert!(ctl.perspectives().is_none());
    assert!(ctl.sunk_by(Viewer::P1).is_empty());
    assert!(ctl.busy().is_empty());
    assert_eq!(ctl.message(Surface::Play), None);
}
