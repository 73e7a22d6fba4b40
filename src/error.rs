use crate::transport::TransportError;
use thiserror::Error;

/// Unified error type for the deck generation pipeline.
///
/// Each variant maps to one failure class with a distinct recovery policy:
/// invocation, outline-parse, and assembly failures are fatal for the
/// request; decode failures are recovered per-slide by the orchestrator.
#[derive(Debug, Error)]
pub enum Error {
    /// The inference service call itself failed (network, auth, throttling).
    /// Never retried locally.
    #[error("inference invocation failed for model '{model_id}': {source}")]
    Invocation {
        model_id: String,
        #[source]
        source: TransportError,
    },

    /// Model output for the outline could not be interpreted as a JSON
    /// array, even after best-effort substring extraction.
    #[error("outline parse error: {0}")]
    OutlineParse(String),

    /// An image response could not be reduced to byte content by any
    /// recognized shape or by the recursive base64 scan.
    #[error("image decode error: {0}")]
    Decode(String),

    /// Document construction or save failed outright.
    #[error("deck assembly error: {0}")]
    Assembly(String),

    /// Bad environment configuration.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Wrap a transport failure with the model it was aimed at.
    pub fn invocation(model_id: impl Into<String>, source: TransportError) -> Self {
        Error::Invocation {
            model_id: model_id.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
