use serde_json::{json, Value};

use crate::normalize;
use crate::transport::SharedTransport;
use crate::{Error, Result};

pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_HEIGHT: u32 = 1024;

/// Fixed style hint appended to every illustration request.
const STYLE_HINT: &str = "flat infographic";

/// Client for the text-to-image model.
pub struct ImageClient {
    transport: SharedTransport,
    model_id: String,
}

impl ImageClient {
    pub fn new(transport: SharedTransport, model_id: impl Into<String>) -> Self {
        Self {
            transport,
            model_id: model_id.into(),
        }
    }

    /// Generate one illustration and return its decoded bytes.
    ///
    /// Invocation failures and decode failures both propagate unchanged;
    /// per-slide degradation is the orchestrator's call, not this one's.
    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        self.generate_sized(prompt, DEFAULT_WIDTH, DEFAULT_HEIGHT, 1)
            .await
    }

    pub async fn generate_sized(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
        num_images: u32,
    ) -> Result<Vec<u8>> {
        let body = Self::build_request(prompt, width, height, num_images);

        let raw = self
            .transport
            .invoke(&self.model_id, &body)
            .await
            .map_err(|e| Error::invocation(&self.model_id, e))?;

        tracing::debug!(model = %self.model_id, bytes = raw.len(), "image response received");

        normalize::extract_image_bytes(&raw)
    }

    /// Request body flexible enough to fit the Titan and Stability
    /// text-to-image dialects.
    fn build_request(prompt: &str, width: u32, height: u32, num_images: u32) -> Value {
        json!({
            "taskType": "TEXT_IMAGE",
            "textToImageParams": {
                "text": prompt,
                "style": STYLE_HINT,
                "negativeText": "",
                "cfgScale": 7.0,
                "seed": 0,
            },
            "imageGenerationConfig": {
                "numberOfImages": num_images,
                "quality": "standard",
                "width": width,
                "height": height,
            },
        })
    }
}
