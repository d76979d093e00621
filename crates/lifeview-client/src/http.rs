//! HTTP implementation of [`SimulationService`] over `reqwest`.
//!
//! Every call is a single JSON request to `{base_url}{endpoint}`. Non-2xx
//! statuses, unreadable bodies and `success: false` replies all surface as
//! [`ClientError`]s; nothing is retried here.

use std::time::Duration;

use lifeview_types::{
    CommandReply, GenerateCenterRequest, GridReply, RandomizeRequest, SpeciesReply,
    ToggleCellRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;
use crate::service::{Endpoint, SimulationService};

/// A [`SimulationService`] reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSimulationService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSimulationService {
    /// Create a client for the service at `base_url`.
    ///
    /// Every request is bounded by `timeout`. A trailing `/` on the base URL
    /// is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Setup`] if the underlying HTTP client cannot be
    /// built (for example when no TLS backend is available).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ClientError> {
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| transport(endpoint, &e))?;
        decode(endpoint, response).await
    }

    async fn post_command<B: Serialize + Sync>(
        &self,
        endpoint: Endpoint,
        body: Option<&B>,
    ) -> Result<(), ClientError> {
        let mut request = self
            .client
            .post(self.url(endpoint))
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|e| transport(endpoint, &e))?;
        let reply: CommandReply = decode(endpoint, response).await?;
        debug!(endpoint = %endpoint, success = reply.success, "command reply");
        if reply.success {
            Ok(())
        } else {
            Err(ClientError::Rejected { endpoint })
        }
    }
}

fn transport(endpoint: Endpoint, error: &reqwest::Error) -> ClientError {
    ClientError::Transport {
        endpoint,
        message: error.to_string(),
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: Endpoint,
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(ClientError::Status {
            endpoint,
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport(endpoint, &e))?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
        endpoint,
        message: e.to_string(),
    })
}

impl SimulationService for HttpSimulationService {
    async fn get_grid(&self) -> Result<GridReply, ClientError> {
        self.get_json(Endpoint::Grid).await
    }

    async fn get_species(&self) -> Result<SpeciesReply, ClientError> {
        self.get_json(Endpoint::Species).await
    }

    async fn evolve(&self) -> Result<(), ClientError> {
        self.post_command::<()>(Endpoint::Evolve, None).await
    }

    async fn reset(&self) -> Result<(), ClientError> {
        self.post_command::<()>(Endpoint::Reset, None).await
    }

    async fn randomize(&self, density: f64) -> Result<(), ClientError> {
        self.post_command(Endpoint::Randomize, Some(&RandomizeRequest { density }))
            .await
    }

    async fn generate_center(&self, request: GenerateCenterRequest) -> Result<(), ClientError> {
        self.post_command(Endpoint::GenerateCenter, Some(&request))
            .await
    }

    async fn toggle_cell(&self, request: ToggleCellRequest) -> Result<(), ClientError> {
        self.post_command(Endpoint::ToggleCell, Some(&request)).await
    }
}
