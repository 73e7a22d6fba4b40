//! Inference service boundary.
//!
//! The pipeline never talks HTTP directly; it goes through the
//! [`InferenceTransport`] trait so the connection is an explicitly
//! constructed, injected object rather than a module-level singleton.
//! `Arc<dyn InferenceTransport>` gives the two clients shared access to
//! one connection pool, and lets tests substitute a mock server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Other(String),
}

/// A single inference invocation: JSON body in, raw response body out.
///
/// The raw bytes are handed to the response normalizer untouched; whatever
/// timeout the underlying call carries is inherited as-is, and failures
/// propagate unchanged with no retry.
#[async_trait]
pub trait InferenceTransport: Send + Sync {
    async fn invoke(&self, model_id: &str, body: &Value) -> Result<Bytes, TransportError>;
}

/// Shared handle to the process-wide transport.
pub type SharedTransport = Arc<dyn InferenceTransport>;

/// reqwest-backed transport posting to the inference runtime's
/// `/model/{id}/invoke` endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl InferenceTransport for HttpTransport {
    async fn invoke(&self, model_id: &str, body: &Value) -> Result<Bytes, TransportError> {
        let url = format!("{}/model/{}/invoke", self.endpoint, model_id);

        let mut req = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(body);

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.bytes().await?)
    }
}
