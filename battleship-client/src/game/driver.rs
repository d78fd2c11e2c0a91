//! Runs a [`Controller`]'s effects against a [`GameService`] on the current tokio runtime.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::trace;

use crate::{
    game::controller::{Controller, Effect, Msg},
    service::GameService,
    view::Viewer,
};

/// Owns a [`Controller`] and performs the requests it asks for.
///
/// Every effect is spawned as its own task, so requests run concurrently. Their results
/// are fed back one at a time through [`Driver::next`], which keeps all state changes on
/// the caller's task.
pub struct Driver<S: ?Sized> {
    service: Arc<S>,
    controller: Controller,
    tx: mpsc::UnboundedSender<Msg>,
    rx: mpsc::UnboundedReceiver<Msg>,
    /// Spawned effects whose completion has not been applied yet.
    in_flight: usize,
}

impl<S: GameService + ?Sized + 'static> Driver<S> {
    pub fn new(service: Arc<S>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            service,
            controller: Controller::new(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Apply `msg` and start every request it produces. Must be called from within a
    /// tokio runtime.
    pub fn send(&mut self, msg: Msg) {
        for effect in self.controller.update(msg) {
            self.spawn(effect);
        }
    }

    /// Whether no request is outstanding.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// Wait for the next request to complete and apply its result. Returns `false`
    /// without waiting when nothing is outstanding.
    ///
    /// Cancel safe: if the future is dropped before completing, no result is lost.
    pub async fn next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(msg) => {
                self.in_flight -= 1;
                self.send(msg);
                true
            }
            // Unreachable while `self.tx` is alive.
            None => false,
        }
    }

    /// Apply completions until nothing is outstanding, including requests started by
    /// the completions themselves.
    pub async fn settle(&mut self) {
        while self.next().await {}
    }

    fn spawn(&mut self, effect: Effect) {
        trace!(?effect, "spawning");
        self.in_flight += 1;
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let msg = run_effect(&*service, effect).await;
            // Fails only if the driver was dropped, in which case nobody wants the result.
            let _ = tx.send(msg);
        });
    }
}

async fn run_effect<S: GameService + ?Sized>(service: &S, effect: Effect) -> Msg {
    match effect {
        Effect::CreateGame { token, p1, p2 } => Msg::GameCreated {
            token,
            result: service.create_game(&p1, &p2).await,
        },
        Effect::FetchView(req) => Msg::ViewFetched {
            token: req.token,
            result: service.game_view(&req.game_id, req.viewer).await,
        },
        Effect::FetchPerspectives(req) => {
            let (p1, p2) = tokio::join!(
                service.game_view(&req.game_id, Viewer::P1),
                service.game_view(&req.game_id, Viewer::P2),
            );
            Msg::PerspectivesFetched {
                token: req.token,
                p1,
                p2,
            }
        }
        Effect::Perform(req) => {
            let surface = req.action.surface();
            Msg::ActionFinished {
                token: req.token,
                surface,
                result: req.action.perform(service, &req.game_id).await,
            }
        }
    }
}
