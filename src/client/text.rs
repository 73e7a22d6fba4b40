use serde_json::{json, Value};

use crate::normalize;
use crate::transport::SharedTransport;
use crate::{Error, Result};

pub const DEFAULT_MAX_TOKENS: u32 = 800;

/// Client for the text (outline) model.
pub struct TextClient {
    transport: SharedTransport,
    model_id: String,
}

impl TextClient {
    pub fn new(transport: SharedTransport, model_id: impl Into<String>) -> Self {
        Self {
            transport,
            model_id: model_id.into(),
        }
    }

    /// Send one chat-style prompt and return the model's text output.
    ///
    /// Invocation failures propagate unchanged; the text normalization
    /// path itself never fails.
    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = Self::build_request(prompt, max_tokens);

        let raw = self
            .transport
            .invoke(&self.model_id, &body)
            .await
            .map_err(|e| Error::invocation(&self.model_id, e))?;

        tracing::debug!(model = %self.model_id, bytes = raw.len(), "text response received");

        Ok(normalize::extract_text(&raw))
    }

    fn build_request(prompt: &str, max_tokens: u32) -> Value {
        json!({
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": max_tokens,
        })
    }
}
