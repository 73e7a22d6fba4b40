//! Deck generation orchestration.
//!
//! One request flows: outline prompt → text model → outline parse →
//! per-slide image generation, strictly in outline order, one call at a
//! time → PPTX assembly. Slides and their artifacts are exclusively owned
//! by the request that created them; the only shared resource is the
//! output directory, and every artifact gets a fresh uuid name.

use std::path::PathBuf;

use crate::client::text::DEFAULT_MAX_TOKENS;
use crate::client::{ImageClient, TextClient};
use crate::config::Config;
use crate::outline::{self, SlideSpec};
use crate::pptx;
use crate::transport::SharedTransport;
use crate::Result;

/// Generates complete decks. One instance serves the whole process; each
/// `generate` call is an independent request.
pub struct DeckGenerator {
    text: TextClient,
    image: ImageClient,
    output_dir: PathBuf,
}

impl DeckGenerator {
    pub fn new(transport: SharedTransport, config: &Config) -> Self {
        Self {
            text: TextClient::new(transport.clone(), config.text_model.clone()),
            image: ImageClient::new(transport, config.image_model.clone()),
            output_dir: config.output_dir.clone(),
        }
    }

    /// Produce the slide sequence for a topic: outline plus one
    /// illustration artifact per slide where image generation succeeded.
    ///
    /// Outline failures are fatal. Image failures degrade the affected
    /// slide to `image_path = None` and generation continues; a single
    /// image failure never aborts the deck.
    pub async fn generate(&self, topic: &str, slides: usize) -> Result<Vec<SlideSpec>> {
        let prompt = outline_prompt(topic, slides);

        tracing::info!(topic, slides, "generating outline");
        let outline_text = self.text.generate(&prompt, DEFAULT_MAX_TOKENS).await?;

        let mut deck = outline::parse_outline(&outline_text)?;
        if deck.len() != slides {
            tracing::info!(
                requested = slides,
                delivered = deck.len(),
                "model delivered a different slide count; accepting it"
            );
        }

        for (idx, slide) in deck.iter_mut().enumerate() {
            slide.image_path = self.illustrate(slide, idx).await;
        }

        Ok(deck)
    }

    /// Generate the whole deck and assemble it into a single document,
    /// returning the finished file's path.
    pub async fn generate_document(&self, topic: &str, slides: usize) -> Result<PathBuf> {
        let deck = self.generate(topic, slides).await?;
        pptx::write_deck(&deck, &self.output_dir)
    }

    /// One slide's illustration: generate, then persist under a fresh
    /// unique name. Any failure along the way leaves the slide without an
    /// image rather than failing the request.
    async fn illustrate(&self, slide: &SlideSpec, idx: usize) -> Option<PathBuf> {
        let title = slide.title_or_placeholder(idx);
        let prompt = illustration_prompt(slide, idx);

        let bytes = match self.image.generate(&prompt).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(slide = %title, error = %e, "image generation failed, continuing without illustration");
                return None;
            }
        };

        let path = self
            .output_dir
            .join(format!("{}.png", uuid::Uuid::new_v4().simple()));
        match tokio::fs::write(&path, &bytes).await {
            Ok(()) => {
                tracing::debug!(slide = %title, path = %path.display(), "illustration saved");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(slide = %title, error = %e, "failed to save illustration, continuing without it");
                None
            }
        }
    }
}

/// The prompt for one slide's illustration: the model's own
/// `image_prompt` when it carries any content, else a default derived
/// from the slide title. Blank and whitespace-only prompts count as
/// absent.
fn illustration_prompt(slide: &SlideSpec, idx: usize) -> String {
    slide
        .image_prompt
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| {
            format!(
                "{} — educational infographic, flat, simple, labels, no text overlay",
                slide.title_or_placeholder(idx)
            )
        })
}

/// The outline prompt: strict JSON-only instruction, requested count, and
/// title/bullet constraints.
fn outline_prompt(topic: &str, slides: usize) -> String {
    format!(
        "You are an expert slide designer. Create exactly {slides} slide objects for the topic below.\n\
         Return ONLY a valid JSON array (no extra text) with this structure:\n\
         \n\
         [\n\
           {{\n\
             \"title\": \"Slide title\",\n\
             \"bullets\": [\"short bullet 1\", \"short bullet 2\"]\n\
           }}\n\
           ...\n\
         ]\n\
         \n\
         Topic: {topic}\n\
         Keep each title short (6-8 words) and each bullets array max 5 items. \
         An optional \"image_prompt\" field per slide may describe a simple flat graphic."
    )
}
