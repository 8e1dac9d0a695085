//! Megaverse HTTP client.
//!
//! Async reqwest client implementing both collaborator traits against the
//! challenge API. One method per remote call, no retries: recovery is a
//! full re-run.

use crate::config::MegaverseConfig;
use async_trait::async_trait;
use megaverse_env::{
    ComethDirection, CurrentGrid, EntityMutator, EnvError, GoalGrid, MapKind, MapProvider,
    ObjectKind, SoloonColor,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Megaverse API client scoped to one candidate.
#[derive(Clone)]
pub struct MegaverseClient {
    http: reqwest::Client,
    base_url: String,
    candidate_id: String,
}

/// Body of every create/delete call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CellBody<'a> {
    row: usize,
    column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<SoloonColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<ComethDirection>,
    candidate_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct GoalResponse {
    goal: GoalGrid,
}

/// `_id`, `phase` and friends are ignored.
#[derive(Debug, Deserialize)]
struct CurrentResponse {
    map: CurrentMap,
}

#[derive(Debug, Deserialize)]
struct CurrentMap {
    content: CurrentGrid,
}

impl MegaverseClient {
    /// Creates a client from a run configuration.
    pub fn new(config: &MegaverseConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!("megaverse/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            candidate_id: config.candidate_id.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn body(
        &self,
        row: usize,
        column: usize,
        color: Option<SoloonColor>,
        direction: Option<ComethDirection>,
    ) -> CellBody<'_> {
        CellBody {
            row,
            column,
            color,
            direction,
            candidate_id: &self.candidate_id,
        }
    }

    async fn send(&self, method: Method, kind: ObjectKind, body: &CellBody<'_>) -> reqwest::Result<()> {
        debug!("{} /{} ({}, {})", method, kind.endpoint(), body.row, body.column);
        self.http
            .request(method, self.url(kind.endpoint()))
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn create(&self, kind: ObjectKind, body: CellBody<'_>) -> Result<(), EnvError> {
        self.send(Method::POST, kind, &body)
            .await
            .map_err(|e| EnvError::create(kind, e))
    }

    async fn delete(&self, kind: ObjectKind, row: usize, column: usize) -> Result<(), EnvError> {
        self.send(Method::DELETE, kind, &self.body(row, column, None, None))
            .await
            .map_err(|e| EnvError::delete(kind, e))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> reqwest::Result<T> {
        debug!("GET /{}", path);
        self.http
            .get(self.url(path))
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await
    }
}

#[async_trait]
impl MapProvider for MegaverseClient {
    async fn fetch_goal_grid(&self) -> Result<GoalGrid, EnvError> {
        let path = format!("map/{}/goal", self.candidate_id);
        self.get_json::<GoalResponse>(&path)
            .await
            .map(|r| r.goal)
            .map_err(|e| EnvError::map_fetch(MapKind::Goal, e))
    }

    async fn fetch_current_grid(&self) -> Result<CurrentGrid, EnvError> {
        let path = format!("map/{}", self.candidate_id);
        self.get_json::<CurrentResponse>(&path)
            .await
            .map(|r| r.map.content)
            .map_err(|e| EnvError::map_fetch(MapKind::Current, e))
    }
}

#[async_trait]
impl EntityMutator for MegaverseClient {
    async fn create_polyanet(&self, row: usize, column: usize) -> Result<(), EnvError> {
        self.create(ObjectKind::Polyanet, self.body(row, column, None, None))
            .await
    }

    async fn create_soloon(
        &self,
        row: usize,
        column: usize,
        color: SoloonColor,
    ) -> Result<(), EnvError> {
        self.create(ObjectKind::Soloon, self.body(row, column, Some(color), None))
            .await
    }

    async fn create_cometh(
        &self,
        row: usize,
        column: usize,
        direction: ComethDirection,
    ) -> Result<(), EnvError> {
        self.create(ObjectKind::Cometh, self.body(row, column, None, Some(direction)))
            .await
    }

    async fn delete_polyanet(&self, row: usize, column: usize) -> Result<(), EnvError> {
        self.delete(ObjectKind::Polyanet, row, column).await
    }

    async fn delete_soloon(&self, row: usize, column: usize) -> Result<(), EnvError> {
        self.delete(ObjectKind::Soloon, row, column).await
    }

    async fn delete_cometh(&self, row: usize, column: usize) -> Result<(), EnvError> {
        self.delete(ObjectKind::Cometh, row, column).await
    }
}
