//! HTTP client for the relay server

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::types::*;
use crate::error::{Error, Result};

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3001";

pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness message from `GET /`
    pub async fn status(&self) -> Result<String> {
        let response = self.client.get(format!("{}/", self.base_url)).send().await?;
        let status: StatusResponse = read_json(response).await?;
        Ok(status.message)
    }

    /// Engine move for the position reached by `moves` from the start
    pub async fn best_move(&self, moves: &str) -> Result<String> {
        let response: MoveResponse = self.post("/move", moves).await?;
        Ok(response.best_move)
    }

    /// Engine evaluation, in pawns, of the position reached by `moves`
    pub async fn evaluate(&self, moves: &str) -> Result<f32> {
        let response: EvaluationResponse = self.post("/evaluate", moves).await?;
        Ok(response.evaluation)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, moves: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, moves, "relay request");

        let response = self
            .client
            .post(&url)
            .json(&PositionRequest::new(moves))
            .send()
            .await?;

        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        return Err(Error::Relay(format!("{} - {}", status, message)));
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}
