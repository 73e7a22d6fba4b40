//! Outline parsing — turning model text into slide records.
//!
//! The outline prompt demands a bare JSON array, but models decorate their
//! answers with prose and code fences often enough that a direct parse is
//! only the first attempt. The rescue pass re-parses the substring between
//! the first `[` and the last `]`; only when both fail is the request
//! unrecoverable.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// One slide of the requested deck.
///
/// Deserialization is deliberately permissive: elements missing fields get
/// defaults rather than failing the outline, matching how loosely models
/// follow the prompt's schema. `image_path` starts empty and is populated
/// (or left `None` on failure) by the per-slide image step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlideSpec {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub image_prompt: Option<String>,
    #[serde(default)]
    pub image_path: Option<PathBuf>,
}

impl SlideSpec {
    /// The slide's title, or a positional placeholder when the model left
    /// it blank. `index` is zero-based.
    pub fn title_or_placeholder(&self, index: usize) -> String {
        if self.title.trim().is_empty() {
            format!("Slide {}", index + 1)
        } else {
            self.title.clone()
        }
    }
}

/// Parse model output into an ordered slide sequence.
///
/// The delivered count is whatever parses; it is not validated against the
/// requested count. That relaxation is deliberate: a deck with one slide
/// more or fewer beats a hard failure.
pub fn parse_outline(model_text: &str) -> Result<Vec<SlideSpec>> {
    let value = parse_array_value(model_text)?;

    let Value::Array(items) = value else {
        return Err(Error::OutlineParse(
            "model output is not a JSON array of slides".into(),
        ));
    };

    let slides = items
        .into_iter()
        .map(|item| serde_json::from_value::<SlideSpec>(item).unwrap_or_default())
        .collect();

    Ok(slides)
}

fn parse_array_value(model_text: &str) -> Result<Value> {
    if let Ok(v) = serde_json::from_str::<Value>(model_text) {
        return Ok(v);
    }

    // Rescue: the model may have wrapped the array in prose.
    let start = model_text.find('[');
    let end = model_text.rfind(']');
    match (start, end) {
        (Some(start), Some(end)) if end > start => {
            serde_json::from_str::<Value>(&model_text[start..=end]).map_err(|e| {
                Error::OutlineParse(format!("embedded JSON array failed to parse: {e}"))
            })
        }
        _ => Err(Error::OutlineParse(
            "no JSON array found in model output".into(),
        )),
    }
}
