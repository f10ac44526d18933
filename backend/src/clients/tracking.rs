use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("tracking API request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// What the tracking API answers with: either a descriptor naming an
/// artifact it has already placed in blob storage, or the dataset inline.
#[derive(Clone, Debug)]
pub enum TrackingResponse {
    File { file: String },
    Payload(Value),
}

#[async_trait]
pub trait TrackingClient: Send + Sync {
    /// Fetches a dataset. `path_and_query` carries the report path and the
    /// user-supplied filters as a query string.
    async fn fetch(&self, path_and_query: &str) -> Result<TrackingResponse, TrackingError>;
}

/// reqwest-backed client against the configured tracking API base URL.
pub struct HttpTrackingClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTrackingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TrackingClient for HttpTrackingClient {
    async fn fetch(&self, path_and_query: &str) -> Result<TrackingResponse, TrackingError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(classify(body))
    }
}

/// A body shaped `{"file": "<name>"}` is a storage descriptor; anything else
/// is treated as the dataset itself.
fn classify(body: Value) -> TrackingResponse {
    if let Some(file) = body.get("file").and_then(Value::as_str) {
        if !file.is_empty() {
            return TrackingResponse::File {
                file: file.to_string(),
            };
        }
    }
    TrackingResponse::Payload(body)
}
