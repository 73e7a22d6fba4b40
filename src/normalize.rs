//! Response normalization — the core of the crate.
//!
//! Inference runtimes front many model families, and the response envelope
//! varies by family and drifts across vendor versions. Rather than pin a
//! strict schema per model, the normalizer runs a priority-ordered cascade
//! of shape rules over the parsed body: each rule inspects the
//! `serde_json::Value` and returns `None` on a miss so the next rule gets
//! its turn. New-but-structurally-similar shapes resolve without a code
//! change.
//!
//! Two public paths:
//! - [`extract_text`] is total — it always produces some string.
//! - [`extract_image_bytes`] is fallible — when no rule and no recursive
//!   scan finds a base64 payload, the slide has no illustration.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

use crate::{Error, Result};

/// A raw service response resolved into exactly one payload kind:
/// [`extract_text`] yields the `Text` payload, [`extract_image_bytes`]
/// the `ImageBytes` payload. Never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedResponse {
    Text(String),
    ImageBytes(Vec<u8>),
}

/// Decode raw response bytes, never failing.
///
/// Returns the decoded string plus a flag reporting whether the lossy
/// fallback fired, so callers can log the degradation instead of
/// swallowing it. Every sentinel key and the whole base64 alphabet are
/// ASCII, so replacement characters never perturb shape matching.
pub fn decode_lossy(raw: &[u8]) -> (String, bool) {
    match std::str::from_utf8(raw) {
        Ok(s) => (s.to_string(), false),
        Err(_) => (String::from_utf8_lossy(raw).into_owned(), true),
    }
}

// ---------- text path ----------

/// Resolve a raw text-model response body into the model's text output.
///
/// Total: a body that matches no known shape comes back re-serialized, and
/// a body that is not JSON at all comes back as-is (the model may have
/// emitted plain text).
pub fn extract_text(raw: &[u8]) -> String {
    let (decoded, lossy) = decode_lossy(raw);
    if lossy {
        tracing::warn!("text response was not valid UTF-8, decoded lossily");
    }

    let parsed: Value = match serde_json::from_str(&decoded) {
        Ok(v) => v,
        Err(_) => return decoded,
    };

    if let Value::Object(_) = parsed {
        let rules: &[fn(&Value) -> Option<String>] = &[
            text_from_content_blocks,
            text_from_output,
            text_from_flat_keys,
        ];
        for rule in rules {
            if let Some(text) = rule(&parsed) {
                return text;
            }
        }
    }

    // No shape matched; hand the caller the JSON itself.
    parsed.to_string()
}

/// Anthropic-style: `{"content": [{"text": "..."}]}`, with a fallback for
/// envelopes nesting a `content` string inside the first block.
fn text_from_content_blocks(body: &Value) -> Option<String> {
    let blocks = body.get("content")?.as_array()?;
    let first = blocks.first()?;
    if let Some(text) = first.get("text").and_then(Value::as_str) {
        return Some(text.to_string());
    }
    first
        .get("content")
        .and_then(Value::as_str)
        .map(String::from)
}

/// Titan-style: `{"output": "..."}`.
fn text_from_output(body: &Value) -> Option<String> {
    body.get("output").and_then(Value::as_str).map(String::from)
}

/// Flat single-key envelopes, checked in a fixed order.
fn text_from_flat_keys(body: &Value) -> Option<String> {
    for key in ["message", "text", "response"] {
        if let Some(s) = body.get(key).and_then(Value::as_str) {
            return Some(s.to_string());
        }
    }
    None
}

// ---------- image path ----------

/// Minimum length for a string to count as a base64 image candidate in the
/// recursive scan. Short strings (ids, enum values) are full of base64
/// alphabet too.
const B64_SCAN_MIN_LEN: usize = 200;

/// Resolve a raw image-model response body into decoded image bytes.
///
/// Fails with [`Error::Decode`] only when no shape rule and no recursive
/// scan turns up a decodable payload.
pub fn extract_image_bytes(raw: &[u8]) -> Result<Vec<u8>> {
    let (decoded, lossy) = decode_lossy(raw);
    if lossy {
        tracing::warn!("image response was not valid UTF-8, decoded lossily");
    }

    let parsed: Value = match serde_json::from_str(&decoded) {
        // Not JSON at all: the body may be one bare base64 blob.
        Err(_) => return decode_base64(decoded.trim()),
        Ok(v) => v,
    };

    if parsed.is_object() {
        if let Some(b64) = image_from_images(&parsed) {
            return decode_base64(&b64);
        }
        if let Some(b64) = image_from_artifacts(&parsed) {
            return decode_base64(&b64);
        }
    }

    // Last resort: hunt the whole structure for anything base64-shaped.
    if let Some(candidate) = find_base64_candidate(&parsed) {
        return decode_base64(candidate);
    }

    Err(Error::Decode("no recoverable image payload".into()))
}

/// Titan-style: `{"images": ["<b64>", ...]}`, where an element may also be
/// an OpenAI-style `{"b64_json": "..."}` object.
fn image_from_images(body: &Value) -> Option<String> {
    let images = body.get("images")?.as_array()?;
    let first = images.first()?;
    match first {
        Value::Object(map) => map.get("b64_json").and_then(Value::as_str).map(String::from),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Stability-style: `{"artifacts": [{"base64": "..."}]}` with several
/// field spellings in the wild.
fn image_from_artifacts(body: &Value) -> Option<String> {
    let artifacts = body.get("artifacts")?.as_array()?;
    let first = artifacts.first()?;
    match first {
        Value::Object(map) => {
            for key in ["b64_json", "base64", "data"] {
                if let Some(s) = map.get(key).and_then(Value::as_str) {
                    return Some(s.to_string());
                }
            }
            None
        }
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Depth-first search for the first string that looks like a base64 image:
/// longer than [`B64_SCAN_MIN_LEN`] and drawn entirely from the base64
/// alphabet plus padding and newlines. Object values are visited in
/// iteration order, then array elements in order.
fn find_base64_candidate(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => {
            if s.len() > B64_SCAN_MIN_LEN && s.chars().all(is_base64_char) {
                Some(s)
            } else {
                None
            }
        }
        Value::Object(map) => map.values().find_map(find_base64_candidate),
        Value::Array(items) => items.iter().find_map(find_base64_candidate),
        _ => None,
    }
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '\n')
}

/// Decode base64 tolerating embedded whitespace (providers wrap long
/// payloads with newlines).
fn decode_base64(s: &str) -> Result<Vec<u8>> {
    let compact: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| Error::Decode(format!("invalid base64 payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn b64(data: &[u8]) -> String {
        BASE64.encode(data)
    }

    #[test]
    fn text_content_block_shape() {
        let body = json!({"content": [{"type": "output_text", "text": "Hello!"}]});
        assert_eq!(extract_text(body.to_string().as_bytes()), "Hello!");
    }

    #[test]
    fn text_nested_content_string() {
        let body = json!({"content": [{"content": "inner"}]});
        assert_eq!(extract_text(body.to_string().as_bytes()), "inner");
    }

    #[test]
    fn text_output_shape() {
        let body = json!({"output": "titan says hi", "latencyMs": 12});
        assert_eq!(extract_text(body.to_string().as_bytes()), "titan says hi");
    }

    #[test]
    fn text_content_takes_priority_over_output() {
        let body = json!({
            "content": [{"text": "from content"}],
            "output": "from output",
        });
        assert_eq!(extract_text(body.to_string().as_bytes()), "from content");
    }

    #[test]
    fn text_flat_key_order() {
        let body = json!({"response": "r", "message": "m"});
        assert_eq!(extract_text(body.to_string().as_bytes()), "m");
    }

    #[test]
    fn text_non_json_passes_through() {
        let raw = b"just some plain model text";
        assert_eq!(extract_text(raw), "just some plain model text");
    }

    #[test]
    fn text_unmatched_json_is_reserialized() {
        let body = json!({"unrecognized": 42});
        let out = extract_text(body.to_string().as_bytes());
        let reparsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(reparsed, body);
    }

    #[test]
    fn text_invalid_utf8_never_panics() {
        let raw = [0x66, 0x6f, 0x6f, 0xff, 0xfe];
        let out = extract_text(&raw);
        assert!(out.starts_with("foo"));
    }

    #[test]
    fn image_images_list_of_strings() {
        let payload = b"\x89PNG fake image bytes";
        let body = json!({"images": [b64(payload)]});
        assert_eq!(
            extract_image_bytes(body.to_string().as_bytes()).unwrap(),
            payload
        );
    }

    #[test]
    fn image_images_b64_json_object() {
        let payload = b"pixels";
        let body = json!({"images": [{"b64_json": b64(payload)}]});
        assert_eq!(
            extract_image_bytes(body.to_string().as_bytes()).unwrap(),
            payload
        );
    }

    #[test]
    fn image_artifacts_data_key() {
        let payload = b"artifact bytes";
        let body = json!({"artifacts": [{"seed": 0, "data": b64(payload)}]});
        assert_eq!(
            extract_image_bytes(body.to_string().as_bytes()).unwrap(),
            payload
        );
    }

    #[test]
    fn image_artifacts_plain_string() {
        let payload = b"raw artifact";
        let body = json!({"artifacts": [b64(payload)]});
        assert_eq!(
            extract_image_bytes(body.to_string().as_bytes()).unwrap(),
            payload
        );
    }

    #[test]
    fn image_bare_base64_body() {
        let payload = b"not json, just base64";
        let raw = b64(payload);
        assert_eq!(extract_image_bytes(raw.as_bytes()).unwrap(), payload);
    }

    #[test]
    fn image_recursive_scan_finds_nested_payload() {
        // > 200 bytes so the encoded form clears the scan threshold.
        let payload = vec![0xabu8; 256];
        let body = json!({
            "result": {
                "metadata": {"model": "img-gen-2"},
                "outputs": [{"blob": b64(&payload)}],
            }
        });
        assert_eq!(
            extract_image_bytes(body.to_string().as_bytes()).unwrap(),
            payload
        );
    }

    #[test]
    fn image_scan_skips_short_strings() {
        let body = json!({"status": "ok", "id": "abc123"});
        let err = extract_image_bytes(body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn image_no_payload_is_decode_error() {
        let body = json!({"error": {"message": "model unavailable"}});
        assert!(matches!(
            extract_image_bytes(body.to_string().as_bytes()),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn image_invalid_base64_is_decode_error() {
        assert!(matches!(
            extract_image_bytes(b"%%% definitely not base64 %%%"),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn base64_round_trip_oracle() {
        let samples: Vec<Vec<u8>> = vec![
            vec![],
            vec![0],
            (0u8..=255).collect(),
            vec![0xff; 1000],
        ];
        for sample in samples {
            assert_eq!(decode_base64(&BASE64.encode(&sample)).unwrap(), sample);
        }
    }

    #[test]
    fn base64_decoder_tolerates_newlines() {
        let payload = vec![7u8; 300];
        let mut wrapped = String::new();
        for chunk in BASE64.encode(&payload).into_bytes().chunks(76) {
            wrapped.push_str(std::str::from_utf8(chunk).unwrap());
            wrapped.push('\n');
        }
        assert_eq!(decode_base64(&wrapped).unwrap(), payload);
    }

    #[test]
    fn extraction_paths_populate_exactly_one_variant() {
        let text = NormalizedResponse::Text(extract_text(br#"{"output":"hi"}"#));
        assert_eq!(text, NormalizedResponse::Text("hi".into()));

        let payload = b"img";
        let body = json!({"images": [b64(payload)]});
        let image = NormalizedResponse::ImageBytes(
            extract_image_bytes(body.to_string().as_bytes()).unwrap(),
        );
        assert_eq!(image, NormalizedResponse::ImageBytes(payload.to_vec()));
        assert_ne!(image, text);
    }

    #[test]
    fn decode_lossy_reports_fallback() {
        let (text, lossy) = decode_lossy(b"clean");
        assert_eq!(text, "clean");
        assert!(!lossy);

        let (_, lossy) = decode_lossy(&[0xf0, 0x28, 0x8c, 0x28]);
        assert!(lossy);
    }
}
