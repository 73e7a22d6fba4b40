//! # deckgen
//!
//! Turns a topic string into a slide deck: a text model is asked for a
//! structured outline, an image model for one illustration per slide, and
//! both are assembled into a PPTX document served over HTTP.
//!
//! The interesting part is the response-normalization layer in
//! [`normalize`]: inference runtimes front many model families, and each
//! family (and each vendor version of it) wraps its output in a different
//! JSON envelope. Rather than pin one schema per model, the normalizer
//! runs a priority-ordered cascade of shape rules with a recursive
//! base64 scan as the image path's last resort, so
//! new-but-structurally-similar shapes resolve without a code change.
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`normalize`] | Response normalization: text and image extraction from opaque bodies |
//! | [`client`] | Text and image generation clients over the injected transport |
//! | [`outline`] | Slide records and tolerant outline parsing |
//! | [`deck`] | Per-request orchestration of the generation pipeline |
//! | [`pptx`] | Minimal OOXML presentation writer |
//! | [`transport`] | The inference service boundary (trait + reqwest impl) |
//! | [`server`] | axum HTTP surface |
//! | [`config`] | Environment configuration with documented defaults |

pub mod client;
pub mod config;
pub mod deck;
pub mod error;
pub mod normalize;
pub mod outline;
pub mod pptx;
pub mod server;
pub mod transport;

pub use client::{ImageClient, TextClient};
pub use deck::DeckGenerator;
pub use error::Error;
pub use normalize::NormalizedResponse;
pub use outline::SlideSpec;

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
