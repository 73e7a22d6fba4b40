//! HTTP surface: one form page and one generation endpoint.
//!
//! The surface is deliberately thin; every interesting decision lives in
//! the pipeline. Fatal generation failures surface as 500 with a short
//! diagnostic, a missing topic is the caller's fault (400), and per-slide
//! image failures never reach this layer at all.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::deck::DeckGenerator;
use crate::Error;

pub const DEFAULT_SLIDE_COUNT: usize = 5;

const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

pub struct AppState {
    pub generator: DeckGenerator,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    topic: String,
    slides: Option<usize>,
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn generate(
    State(state): State<Arc<AppState>>,
    Form(form): Form<GenerateForm>,
) -> Response {
    let topic = form.topic.trim();
    if topic.is_empty() {
        return (StatusCode::BAD_REQUEST, "Please provide a topic").into_response();
    }
    let slides = form.slides.unwrap_or(DEFAULT_SLIDE_COUNT);

    let path = match state.generator.generate_document(topic, slides).await {
        Ok(path) => path,
        Err(e) => return failure(e),
    };

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "generated deck unreadable");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read generated deck")
                .into_response();
        }
    };

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "presentation.pptx".into());

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, PPTX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Map a fatal pipeline failure to a plain 500 diagnostic.
fn failure(e: Error) -> Response {
    tracing::error!(error = %e, "deck generation failed");
    let message = match &e {
        Error::OutlineParse(_) => format!("Failed to parse model output as JSON: {e}"),
        Error::Invocation { .. } => format!("Text generation failed: {e}"),
        Error::Assembly(_) => format!("Failed to create presentation: {e}"),
        _ => format!("Deck generation failed: {e}"),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
}

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>deckgen</title></head>
<body>
<h1>Generate a slide deck</h1>
<form action="/generate" method="post">
  <label>Topic: <input type="text" name="topic" required></label>
  <label>Slides: <input type="number" name="slides" value="5" min="1" max="20"></label>
  <button type="submit">Generate</button>
</form>
</body>
</html>"#;
