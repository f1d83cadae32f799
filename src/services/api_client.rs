use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::Instrument;
use url::Url;

use crate::config::BackendConfig;
use crate::models::ErrorResponse;
use crate::tracing::CorrelationId;

const CORRELATION_HEADER: &str = "x-correlation-id";

/// Backend call error types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered 401: the login session is gone
    #[error("Session expired")]
    Unauthorized,

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// JSON-over-HTTP client for the dashboard backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url().map_err(|e| ApiError::Config(e.to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Config(format!("Invalid endpoint '{}': {}", path, e)))
    }

    /// `collection` followed by `id` as one percent-encoded path segment
    fn resource(&self, collection: &str, id: &str) -> Result<Url, ApiError> {
        if id.is_empty() || id == "." || id == ".." || id.contains('/') {
            return Err(ApiError::InvalidRequest(format!("Invalid resource id '{}'", id)));
        }

        let mut url = self.endpoint(collection)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("Base URL cannot hold path segments: {}", self.base_url)))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// GET `path` with query parameters and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let correlation_id = CorrelationId::new();
        let span = tracing::info_span!("backend_request", method = "GET", %url, %correlation_id);

        async {
            let response = self
                .client
                .get(url)
                .query(query)
                .header(CORRELATION_HEADER, correlation_id.as_str())
                .send()
                .await?;

            let body = Self::check(response).await?.text().await?;
            serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
        }
        .instrument(span)
        .await
    }

    /// POST a JSON body to `path`; returns the raw response text
    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<String, ApiError> {
        let url = self.endpoint(path)?;
        let correlation_id = CorrelationId::new();
        let span = tracing::info_span!("backend_request", method = "POST", %url, %correlation_id);

        async {
            let response = self
                .client
                .post(url)
                .json(body)
                .header(CORRELATION_HEADER, correlation_id.as_str())
                .send()
                .await?;

            Ok::<_, ApiError>(Self::check(response).await?.text().await?)
        }
        .instrument(span)
        .await
    }

    /// DELETE the resource `id` under `collection`
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        let url = self.resource(collection, id)?;
        let correlation_id = CorrelationId::new();
        let span = tracing::info_span!("backend_request", method = "DELETE", %url, %correlation_id);

        async {
            let response = self
                .client
                .delete(url)
                .header(CORRELATION_HEADER, correlation_id.as_str())
                .send()
                .await?;

            Self::check(response).await?;
            Ok::<_, ApiError>(())
        }
        .instrument(span)
        .await
    }

    /// Map 401 to [`ApiError::Unauthorized`] and other non-success statuses to [`ApiError::Status`]
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();

        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "Backend request succeeded");
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Backend session expired");
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let message = ErrorResponse::describe(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

        tracing::error!(status = status.as_u16(), %message, "Backend request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}
