//! [`GameService`] over the service's JSON/HTTP interface.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{
    board::Coordinate,
    config::ClientConfig,
    service::{GameService, ServiceError, ShipPlacement},
    ships::{Orientation, ShipType},
    view::{CreatedGame, FireOutcome, GameId, GameView, Viewer},
};

/// Talks to the game service at `{api_root}/api/game`.
#[derive(Debug, Clone)]
pub struct HttpGameService {
    client: Client,
    root: Url,
}

#[derive(Serialize)]
struct RandomPlacementRequest {
    player: Viewer,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaceShipRequest {
    player: Viewer,
    ship_type: ShipType,
    row: usize,
    col: usize,
    orientation: Orientation,
}

#[derive(Serialize)]
struct FireRequest {
    player: Viewer,
    row: usize,
    col: usize,
}

impl HttpGameService {
    /// Build a service client from the given configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        let root = Url::parse(config.api_root.trim())
            .map_err(|_| ServiceError::Endpoint(config.api_root.clone()))?;
        if root.cannot_be_a_base() {
            return Err(ServiceError::Endpoint(config.api_root.clone()));
        }
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ServiceError::transport)?;
        Ok(Self { client, root })
    }

    /// Build `{root}/api/game/{segments...}`. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.root.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ServiceError::Endpoint(self.root.to_string()))?;
            path.pop_if_empty().extend(&["api", "game"]).extend(segments);
        }
        Ok(url)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Response, ServiceError> {
        debug!(%url, "POST");
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ServiceError::transport)
    }
}

#[async_trait]
impl GameService for HttpGameService {
    async fn create_game(&self, p1_name: &str, p2_name: &str) -> Result<GameId, ServiceError> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("p1", p1_name)
            .append_pair("p2", p2_name);
        debug!(%url, "POST");
        let res = self
            .client
            .post(url)
            .send()
            .await
            .map_err(ServiceError::transport)?;
        let created: Option<CreatedGame> = read_json(res).await?;
        created
            .map(|created| created.id)
            .ok_or(ServiceError::EmptyResponse("createGame"))
    }

    async fn game_view(&self, game: &GameId, viewer: Viewer) -> Result<GameView, ServiceError> {
        let mut url = self.endpoint(&[game.as_str()])?;
        url.query_pairs_mut()
            .append_pair("viewer", viewer.wire_name());
        debug!(%url, "GET");
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ServiceError::transport)?;
        let view: Option<GameView> = read_json(res).await?;
        view.ok_or(ServiceError::EmptyResponse("getGameView"))
    }

    async fn place_random_fleet(
        &self,
        game: &GameId,
        viewer: Viewer,
    ) -> Result<(), ServiceError> {
        let url = self.endpoint(&[game.as_str(), "random-placement"])?;
        let res = self
            .post_json(url, &RandomPlacementRequest { player: viewer })
            .await?;
        // Any 400 here means the fleet is no longer placeable.
        if res.status() == StatusCode::BAD_REQUEST {
            return Err(ServiceError::AlreadyPlaced);
        }
        read_json::<serde_json::Value>(res).await.map(|_| ())
    }

    async fn place_ship(
        &self,
        game: &GameId,
        placement: ShipPlacement,
    ) -> Result<(), ServiceError> {
        let url = self.endpoint(&[game.as_str(), "place-ship"])?;
        let body = PlaceShipRequest {
            player: placement.viewer,
            ship_type: placement.ship,
            row: placement.start.row(),
            col: placement.start.col(),
            orientation: placement.orientation,
        };
        let res = self.post_json(url, &body).await?;
        read_json::<serde_json::Value>(res).await.map(|_| ())
    }

    async fn fire_shot(
        &self,
        game: &GameId,
        viewer: Viewer,
        target: Coordinate,
    ) -> Result<FireOutcome, ServiceError> {
        let url = self.endpoint(&[game.as_str(), "fire"])?;
        let body = FireRequest {
            player: viewer,
            row: target.row(),
            col: target.col(),
        };
        let res = self.post_json(url, &body).await?;
        let outcome: Option<FireOutcome> = read_json(res).await?;
        outcome.ok_or(ServiceError::EmptyResponse("fireShot"))
    }
}

/// Read the body once and decode it.
async fn read_json<T: DeserializeOwned>(res: Response) -> Result<Option<T>, ServiceError> {
    let status = res.status();
    let text = res.text().await.map_err(ServiceError::transport)?;
    decode_body(status.as_u16(), status.is_success(), &text)
}

/// Decode a response body. A non-success status becomes a rejection carrying the
/// service's message. An empty success body is "no data", not an error.
fn decode_body<T: DeserializeOwned>(
    status: u16,
    success: bool,
    text: &str,
) -> Result<Option<T>, ServiceError> {
    if !success {
        return Err(ServiceError::rejected(status, error_message(status, text)));
    }
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(ServiceError::Malformed)
}

/// Extract the user-facing message from an error body. JSON bodies contribute their
/// `message` field, else their `error` field. Anything else is passed through verbatim.
pub fn error_message(status: u16, text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return format!("HTTP {}", status);
    }
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(text) {
        for key in &["message", "error"] {
            match fields.get(*key) {
                Some(serde_json::Value::String(msg)) if !msg.trim().is_empty() => {
                    return msg.trim().to_string()
                }
                _ => {}
            }
        }
    }
    text.to_string()
}
