//! API client for the Balances REST backend.

use async_trait::async_trait;
use balances_core::entities::{EntityId, EntityKind};
use balances_core::search::{DetailQuery, SearchFilter};
use balances_core::session::{Credentials, Session, TokenGrant};
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::error::{ApiFailure, ClientError, Result};
use crate::types::{history_params, resource_path, Envelope, PageResult};

/// Calls the store makes against the backend.
///
/// Records come back as raw JSON so the store can normalize them; typed
/// views are read from the entity cache afterwards.
#[async_trait]
pub trait BalancesApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<Session>;

    async fn refresh_token(&self, token: &str) -> Result<TokenGrant>;

    async fn search(&self, token: &str, kind: EntityKind, filter: &SearchFilter)
        -> Result<PageResult>;

    async fn get(
        &self,
        token: &str,
        kind: EntityKind,
        id: &EntityId,
        query: &DetailQuery,
    ) -> Result<Value>;

    async fn create(&self, token: &str, kind: EntityKind, body: Value) -> Result<Value>;

    async fn update(&self, token: &str, kind: EntityKind, id: &EntityId, body: Value)
        -> Result<Value>;

    async fn delete(&self, token: &str, kind: EntityKind, id: &EntityId) -> Result<Value>;
}

/// HTTP client for the Balances backend.
#[derive(Debug, Clone)]
pub struct BalancesClient {
    client: reqwest::Client,
    base_url: String,
}

impl BalancesClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The backend root (e.g., "http://localhost:8080/")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Create headers for an authenticated request.
    fn headers(&self, token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientError::invalid_request("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    /// Parse an enveloped JSON response, returning its `data`.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("API response ({}): {}", status, body);

        if !status.is_success() {
            let failure = parse_failure(status.as_u16(), &body);
            if status.as_u16() == 401 {
                warn!("Backend rejected credentials: {}", failure);
                return Err(ClientError::unauthorized(failure.message));
            }
            return Err(ClientError::api(status.as_u16(), failure));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to deserialize response. Body: {}, Error: {}",
                body, e
            );
            ClientError::from(e)
        })?;
        envelope
            .data
            .ok_or_else(|| ClientError::invalid_response("response has no data"))
    }

    /// Check the backend is up. Returns the status message.
    ///
    /// GET /health
    pub async fn health(&self) -> Result<String> {
        let response = self.client.get(self.url("health")).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let envelope: Envelope<Value> = serde_json::from_str(&body)?;
        if !status.is_success() {
            let message = envelope.message.unwrap_or_else(|| body.clone());
            return Err(ClientError::api(
                status.as_u16(),
                ApiFailure::from_message(status.as_u16(), message),
            ));
        }
        Ok(envelope.message.unwrap_or_else(|| "OK".to_string()))
    }
}

/// Decodes `{error: {code, message, ...}}` or `{error: "message"}`.
fn parse_failure(status: u16, body: &str) -> ApiFailure {
    let envelope = serde_json::from_str::<Envelope<Value>>(body).ok();
    match envelope.and_then(|envelope| envelope.error) {
        Some(Value::String(message)) => ApiFailure::from_message(status, message),
        Some(value @ Value::Object(_)) => serde_json::from_value(value.clone())
            .unwrap_or_else(|_| ApiFailure::from_message(status, value.to_string())),
        _ => ApiFailure::from_message(status, format!("Request failed: {}", body)),
    }
}

#[async_trait]
impl BalancesApi for BalancesClient {
    /// POST /auth/login with basic credentials
    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        debug!("Logging in as {}", credentials.username);
        let response = self
            .client
            .post(self.url("auth/login"))
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// GET /auth/token
    async fn refresh_token(&self, token: &str) -> Result<TokenGrant> {
        let response = self
            .client
            .get(self.url("auth/token"))
            .headers(self.headers(token)?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// POST /{resource}/search
    async fn search(
        &self,
        token: &str,
        kind: EntityKind,
        filter: &SearchFilter,
    ) -> Result<PageResult> {
        let url = self.url(&format!("{}/search", resource_path(kind)));
        debug!("Searching {}: {:?}", kind, filter);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(token)?)
            .json(filter)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// GET /{resource}/{id}
    async fn get(
        &self,
        token: &str,
        kind: EntityKind,
        id: &EntityId,
        query: &DetailQuery,
    ) -> Result<Value> {
        let url = self.url(&format!("{}/{}", resource_path(kind), id));
        let params = history_params(kind)
            .map(|(flag, prefix)| query.to_params(flag, prefix))
            .unwrap_or_default();

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&params)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// POST /{resource}
    async fn create(&self, token: &str, kind: EntityKind, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(self.url(resource_path(kind)))
            .headers(self.headers(token)?)
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// PATCH /{resource}/{id}
    async fn update(
        &self,
        token: &str,
        kind: EntityKind,
        id: &EntityId,
        body: Value,
    ) -> Result<Value> {
        let url = self.url(&format!("{}/{}", resource_path(kind), id));
        let response = self
            .client
            .patch(&url)
            .headers(self.headers(token)?)
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// DELETE /{resource}/{id}
    async fn delete(&self, token: &str, kind: EntityKind, id: &EntityId) -> Result<Value> {
        let url = self.url(&format!("{}/{}", resource_path(kind), id));
        let response = self
            .client
            .delete(&url)
            .headers(self.headers(token)?)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
