//! Generation clients for the two inference model families.
//!
//! Both clients are thin: build the family's request body, invoke the
//! injected transport, run the raw body through the normalizer. They hold
//! no retry or recovery logic; failure policy lives with the caller.

pub mod image;
pub mod text;

pub use image::ImageClient;
pub use text::TextClient;
