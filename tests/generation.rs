//! End-to-end pipeline tests against a mock inference runtime.
//!
//! mockito stands in for the inference service; the transport, clients,
//! normalizer, orchestrator, and assembler all run for real.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use deckgen::config::Config;
use deckgen::deck::DeckGenerator;
use deckgen::transport::{HttpTransport, SharedTransport};
use deckgen::Error;
use mockito::Matcher;
use serde_json::json;

const TEXT_MODEL: &str = "outline-model";
const IMAGE_MODEL: &str = "image-model";

fn test_config(endpoint: &str, output_dir: &std::path::Path) -> Config {
    Config {
        endpoint: endpoint.to_string(),
        text_model: TEXT_MODEL.into(),
        image_model: IMAGE_MODEL.into(),
        output_dir: output_dir.to_path_buf(),
        api_key: None,
        ..Config::default()
    }
}

fn generator(endpoint: &str, output_dir: &std::path::Path) -> DeckGenerator {
    let config = test_config(endpoint, output_dir);
    let transport: SharedTransport =
        Arc::new(HttpTransport::new(&config).expect("transport build"));
    DeckGenerator::new(transport, &config)
}

fn fake_png() -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend(std::iter::repeat(0x42).take(64));
    bytes
}

#[tokio::test]
async fn one_failed_image_degrades_only_its_slide() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let outline = json!([
        {"title": "One", "bullets": ["a"], "image_prompt": "first graphic"},
        {"title": "Two", "bullets": ["b"], "image_prompt": "second graphic"},
        {"title": "Three", "bullets": ["c"], "image_prompt": "third graphic"},
    ]);
    let _text_mock = server
        .mock("POST", format!("/model/{TEXT_MODEL}/invoke").as_str())
        .with_body(json!({"content": [{"text": outline.to_string()}]}).to_string())
        .create_async()
        .await;

    let image_path = format!("/model/{IMAGE_MODEL}/invoke");
    let png = fake_png();

    // Slide 1 answers in the images shape, slide 3 in the artifacts
    // shape; slide 2 carries no recoverable payload at all.
    let _img1 = server
        .mock("POST", image_path.as_str())
        .match_body(Matcher::PartialJson(
            json!({"textToImageParams": {"text": "first graphic"}}),
        ))
        .with_body(json!({"images": [BASE64.encode(&png)]}).to_string())
        .create_async()
        .await;
    let _img2 = server
        .mock("POST", image_path.as_str())
        .match_body(Matcher::PartialJson(
            json!({"textToImageParams": {"text": "second graphic"}}),
        ))
        .with_body(json!({"status": "ok"}).to_string())
        .create_async()
        .await;
    let _img3 = server
        .mock("POST", image_path.as_str())
        .match_body(Matcher::PartialJson(
            json!({"textToImageParams": {"text": "third graphic"}}),
        ))
        .with_body(json!({"artifacts": [{"data": BASE64.encode(&png)}]}).to_string())
        .create_async()
        .await;

    let generator = generator(&server.url(), dir.path());
    let deck = generator.generate("testing resilience", 3).await.unwrap();

    assert_eq!(deck.len(), 3);
    assert!(deck[0].image_path.is_some());
    assert!(deck[1].image_path.is_none());
    assert!(deck[2].image_path.is_some());

    // The saved artifacts round-trip back to the mocked image bytes.
    let saved = std::fs::read(deck[0].image_path.as_ref().unwrap()).unwrap();
    assert_eq!(saved, png);

    // Assembly still succeeds with the gap.
    let pptx = deckgen::pptx::write_deck(&deck, dir.path()).unwrap();
    assert!(pptx.exists());
}

#[tokio::test]
async fn blank_image_prompt_falls_back_to_the_title_default() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let outline = json!([{"title": "Ownership", "bullets": ["a"], "image_prompt": ""}]);
    let _text_mock = server
        .mock("POST", format!("/model/{TEXT_MODEL}/invoke").as_str())
        .with_body(json!({"content": [{"text": outline.to_string()}]}).to_string())
        .create_async()
        .await;

    // Only a request carrying the title-derived prompt gets an image.
    let _img = server
        .mock("POST", format!("/model/{IMAGE_MODEL}/invoke").as_str())
        .match_body(Matcher::PartialJson(json!({
            "textToImageParams": {
                "text": "Ownership — educational infographic, flat, simple, labels, no text overlay"
            }
        })))
        .with_body(json!({"images": [BASE64.encode(fake_png())]}).to_string())
        .create_async()
        .await;

    let generator = generator(&server.url(), dir.path());
    let deck = generator.generate("empty prompt handling", 1).await.unwrap();

    assert_eq!(deck.len(), 1);
    assert!(deck[0].image_path.is_some());
}

#[tokio::test]
async fn outline_wrapped_in_prose_still_parses() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let _text_mock = server
        .mock("POST", format!("/model/{TEXT_MODEL}/invoke").as_str())
        .with_body(
            json!({
                "output": "Here you go! [{\"title\":\"Only\",\"bullets\":[\"x\"]}] Enjoy."
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _img = server
        .mock("POST", format!("/model/{IMAGE_MODEL}/invoke").as_str())
        .with_body(json!({"images": [BASE64.encode(fake_png())]}).to_string())
        .create_async()
        .await;

    let generator = generator(&server.url(), dir.path());
    let deck = generator.generate("prose tolerance", 1).await.unwrap();

    assert_eq!(deck.len(), 1);
    assert_eq!(deck[0].title, "Only");
    assert!(deck[0].image_path.is_some());
}

#[tokio::test]
async fn unparseable_outline_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let _text_mock = server
        .mock("POST", format!("/model/{TEXT_MODEL}/invoke").as_str())
        .with_body("I cannot produce an outline right now, sorry.")
        .create_async()
        .await;

    let generator = generator(&server.url(), dir.path());
    let err = generator.generate("doomed", 2).await.unwrap_err();
    assert!(matches!(err, Error::OutlineParse(_)));
}

#[tokio::test]
async fn failed_text_invocation_propagates() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let _text_mock = server
        .mock("POST", format!("/model/{TEXT_MODEL}/invoke").as_str())
        .with_status(503)
        .with_body("throttled")
        .create_async()
        .await;

    let generator = generator(&server.url(), dir.path());
    let err = generator.generate("unavailable", 2).await.unwrap_err();
    match err {
        Error::Invocation { model_id, .. } => assert_eq!(model_id, TEXT_MODEL),
        other => panic!("expected Invocation error, got {other:?}"),
    }
}

#[tokio::test]
async fn count_drift_from_the_model_is_accepted() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    // Five requested, two delivered.
    let outline = json!([
        {"title": "A", "bullets": []},
        {"title": "B", "bullets": []},
    ]);
    let _text_mock = server
        .mock("POST", format!("/model/{TEXT_MODEL}/invoke").as_str())
        .with_body(json!({"content": [{"text": outline.to_string()}]}).to_string())
        .create_async()
        .await;
    let _img = server
        .mock("POST", format!("/model/{IMAGE_MODEL}/invoke").as_str())
        .with_body(json!({"images": [BASE64.encode(fake_png())]}).to_string())
        .expect(2)
        .create_async()
        .await;

    let generator = generator(&server.url(), dir.path());
    let deck = generator.generate("short deck", 5).await.unwrap();
    assert_eq!(deck.len(), 2);
}
