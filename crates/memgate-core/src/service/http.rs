//! HTTP client for the managed memory service.
//!
//! Implements both service planes over a JSON REST API. All
//! state-machine logic lives above this layer; the client only frames
//! requests and maps transport failures into the crate error taxonomy.

use super::types::{
    CreateEventRequest, CreateResourceRequest, EventPage, EventQuery, EventRecord, MemoryResource,
    SessionPage, UpdateResourceRequest,
};
use super::{MemoryControl, MemoryData};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default request timeout
const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ResourceEnvelope {
    memory: MemoryResource,
}

#[derive(Debug, Deserialize)]
struct ResourceListEnvelope {
    memories: Vec<MemoryResource>,
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    event: EventRecord,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    message: String,
}

/// HTTP implementation of [`MemoryControl`] and [`MemoryData`].
pub struct HttpMemoryService {
    client: Client,
    base_url: String,
}

impl HttpMemoryService {
    /// Create a client for a service base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(HTTP_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success response into the crate error taxonomy.
    async fn into_error(response: Response) -> Error {
        let status = response.status();
        let message = match response.json::<ServiceError>().await {
            Ok(body) if !body.message.is_empty() => body.message,
            _ => format!("service returned status {status}"),
        };

        match status {
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::CONFLICT => Error::AlreadyExists(message),
            _ => Error::Backend(message),
        }
    }

    async fn expect_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Backend(format!("invalid service response: {e}")))
    }

    async fn expect_ok(response: Response) -> Result<()> {
        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }
        Ok(())
    }

    fn network(e: reqwest::Error) -> Error {
        Error::Network(e.to_string())
    }
}

#[async_trait]
impl MemoryControl for HttpMemoryService {
    async fn create_resource(&self, request: &CreateResourceRequest) -> Result<MemoryResource> {
        debug!(name = %request.name, "creating memory resource");
        let response = self
            .client
            .post(self.url("/v1/memories"))
            .json(request)
            .send()
            .await
            .map_err(Self::network)?;

        Ok(Self::expect_json::<ResourceEnvelope>(response).await?.memory)
    }

    async fn get_resource(&self, memory_id: &str) -> Result<MemoryResource> {
        let response = self
            .client
            .get(self.url(&format!("/v1/memories/{memory_id}")))
            .send()
            .await
            .map_err(Self::network)?;

        Ok(Self::expect_json::<ResourceEnvelope>(response).await?.memory)
    }

    async fn update_resource(&self, request: &UpdateResourceRequest) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!("/v1/memories/{}", request.memory_id)))
            .json(request)
            .send()
            .await
            .map_err(Self::network)?;

        Self::expect_ok(response).await
    }

    async fn delete_resource(&self, memory_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/v1/memories/{memory_id}")))
            .send()
            .await
            .map_err(Self::network)?;

        Self::expect_ok(response).await
    }

    async fn list_resources(&self) -> Result<Vec<MemoryResource>> {
        let response = self
            .client
            .get(self.url("/v1/memories"))
            .send()
            .await
            .map_err(Self::network)?;

        Ok(Self::expect_json::<ResourceListEnvelope>(response)
            .await?
            .memories)
    }
}

#[async_trait]
impl MemoryData for HttpMemoryService {
    async fn list_sessions(
        &self,
        memory_id: &str,
        actor_id: &str,
        next_token: Option<&str>,
    ) -> Result<SessionPage> {
        let mut request = self.client.get(self.url(&format!(
            "/v1/memories/{memory_id}/actors/{actor_id}/sessions"
        )));
        if let Some(token) = next_token {
            request = request.query(&[("nextToken", token)]);
        }

        let response = request.send().await.map_err(Self::network)?;
        Self::expect_json(response).await
    }

    async fn list_events(&self, query: &EventQuery) -> Result<EventPage> {
        let mut request = self
            .client
            .get(self.url(&format!(
                "/v1/memories/{}/actors/{}/sessions/{}/events",
                query.memory_id, query.actor_id, query.session_id
            )))
            .query(&[("maxResults", query.max_results.to_string())]);
        if let Some(token) = &query.next_token {
            request = request.query(&[("nextToken", token)]);
        }

        let response = request.send().await.map_err(Self::network)?;
        Self::expect_json(response).await
    }

    async fn create_event(&self, request: &CreateEventRequest) -> Result<EventRecord> {
        let response = self
            .client
            .post(self.url(&format!("/v1/memories/{}/events", request.memory_id)))
            .json(request)
            .send()
            .await
            .map_err(Self::network)?;

        Ok(Self::expect_json::<EventEnvelope>(response).await?.event)
    }
}
