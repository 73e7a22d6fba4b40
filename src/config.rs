//! Environment-driven configuration with documented defaults.
//!
//! All knobs are read once at process startup; nothing re-reads the
//! environment afterwards. Numeric parse failures are configuration
//! errors, not panics.

use std::env;
use std::path::PathBuf;

use crate::{Error, Result};

pub const DEFAULT_REGION: &str = "ap-south-1";
pub const DEFAULT_TEXT_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1";
pub const DEFAULT_IMAGE_MODEL: &str = "amazon.titan-image-generator-v1";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Process-wide configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Inference service region, used to derive the default endpoint.
    pub region: String,
    /// Model identifier for outline (text) generation.
    pub text_model: String,
    /// Model identifier for illustration (image) generation.
    pub image_model: String,
    /// Base URL of the inference runtime. Overridable so tests can point
    /// at a local mock server.
    pub endpoint: String,
    /// Optional bearer credential. Real credential management is the
    /// hosting environment's concern.
    pub api_key: Option<String>,
    /// Directory receiving image artifacts and finished decks.
    pub output_dir: PathBuf,
    /// Timeout applied to each inference call.
    pub http_timeout_secs: u64,
    /// Server bind address.
    pub bind_addr: String,
}

impl Config {
    /// Load configuration from `DECKGEN_*` environment variables, falling
    /// back to the documented defaults.
    pub fn from_env() -> Result<Self> {
        let region = env::var("DECKGEN_REGION").unwrap_or_else(|_| DEFAULT_REGION.into());

        let endpoint = match env::var("DECKGEN_ENDPOINT") {
            Ok(url) => url.trim_end_matches('/').to_string(),
            Err(_) => format!("https://bedrock-runtime.{region}.amazonaws.com"),
        };

        let http_timeout_secs = match env::var("DECKGEN_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                Error::config(format!(
                    "DECKGEN_HTTP_TIMEOUT_SECS must be an integer, got '{raw}'"
                ))
            })?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            region,
            text_model: env::var("DECKGEN_TEXT_MODEL")
                .unwrap_or_else(|_| DEFAULT_TEXT_MODEL.into()),
            image_model: env::var("DECKGEN_IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.into()),
            endpoint,
            api_key: env::var("DECKGEN_API_KEY").ok().filter(|k| !k.is_empty()),
            output_dir: env::var("DECKGEN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            http_timeout_secs,
            bind_addr: env::var("DECKGEN_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.into(),
            text_model: DEFAULT_TEXT_MODEL.into(),
            image_model: DEFAULT_IMAGE_MODEL.into(),
            endpoint: format!("https://bedrock-runtime.{DEFAULT_REGION}.amazonaws.com"),
            api_key: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            bind_addr: DEFAULT_BIND_ADDR.into(),
        }
    }
}
