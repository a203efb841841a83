//! Embedder trait and implementations for dense retrieval.
//!
//! - [`HashingEmbedder`]: signed feature hashing of words and character
//!   trigrams (built-in, no model file, deterministic).
//! - `Model2VecEmbedder`: static neural embeddings (feature `model2vec`).

use crate::config::{EmbedderConfig, EmbedderKind};
use crate::lexical::tokenize;
use anyhow::{Result, bail};
#[cfg(feature = "model2vec")]
use anyhow::Context;

/// Embedding model abstraction.
///
/// Implementations must be deterministic for a fixed input and model, and
/// return vectors of exactly [`Embedder::dimension`] elements.
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, preserving input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Get embedding dimension.
    fn dimension(&self) -> usize;

    /// Get model name/identifier.
    fn name(&self) -> &str;
}

// ============================================================================
// Hashing Embedder
// ============================================================================

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing embedder.
///
/// Every word token and every character trigram of `<word>` is hashed with
/// BLAKE3 into a bucket and a sign; the bucket sums are L2-normalized. Texts
/// sharing words land close together, and shared trigrams give partial
/// credit to inflections (`engineer` / `engineering`). Text with no tokens
/// embeds to the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    name: String,
}

impl HashingEmbedder {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            name: format!("hashing-{dimension}"),
        }
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = blake3::hash(feature.as_bytes());
        let mut word = [0_u8; 8];
        word.copy_from_slice(&hash.as_bytes()[..8]);
        let value = u64::from_le_bytes(word);

        let bucket = usize::try_from(value % self.dimension as u64).unwrap_or(0);
        let sign = if hash.as_bytes()[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0_f32; self.dimension];

        for token in tokenize(text) {
            self.add_feature(&mut vector, &format!("w:{token}"), WORD_WEIGHT);

            let padded: Vec<char> = format!("<{token}>").chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, &format!("t:{trigram}"), TRIGRAM_WEIGHT);
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for value in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Model2Vec Embedder
// ============================================================================

/// Model2Vec based embedder.
#[cfg(feature = "model2vec")]
pub struct Model2VecEmbedder {
    model: model2vec::Model2Vec,
    dimension: usize,
    name: String,
}

#[cfg(feature = "model2vec")]
impl Model2VecEmbedder {
    /// Load a model from a local directory or a Hugging Face hub id.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded or produces no output.
    pub fn load(model_id: &str) -> Result<Self> {
        let model = model2vec::Model2Vec::from_pretrained(model_id, None, None)
            .with_context(|| format!("Failed to load Model2Vec: {model_id}"))?;

        let sample = ["dimension check"];
        let embeddings = model.encode(&sample).context("Failed to read model dimension")?;
        let dimension = embeddings.row(0).len();
        if dimension == 0 {
            bail!("Model2Vec {model_id} produced empty embeddings");
        }

        Ok(Self {
            model,
            dimension,
            name: format!("model2vec:{model_id}"),
        })
    }
}

#[cfg(feature = "model2vec")]
impl Embedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text];
        let embeddings = self.model.encode(&texts).context("Failed to encode text")?;
        Ok(embeddings.row(0).to_vec())
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.model.encode(texts).context("Failed to encode texts")?;
        Ok(embeddings.rows().into_iter().map(|r| r.to_vec()).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create embedder based on configuration.
///
/// # Errors
///
/// Returns an error if Model2Vec is requested without a model id, without
/// the `model2vec` feature, or the model fails to load.
pub fn create_embedder(config: &EmbedderConfig) -> Result<Box<dyn Embedder>> {
    match config.kind {
        EmbedderKind::Hashing => Ok(Box::new(HashingEmbedder::new(config.dimension))),
        EmbedderKind::Model2vec => {
            let Some(model_id) = config.model.as_deref() else {
                bail!("embedder.model is required for the model2vec embedder");
            };
            load_model2vec(model_id)
        }
    }
}

#[cfg(feature = "model2vec")]
fn load_model2vec(model_id: &str) -> Result<Box<dyn Embedder>> {
    Ok(Box::new(Model2VecEmbedder::load(model_id)?))
}

#[cfg(not(feature = "model2vec"))]
fn load_model2vec(model_id: &str) -> Result<Box<dyn Embedder>> {
    bail!("cannot load {model_id}: compile vitae-search with the `model2vec` feature")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn hashing_embedder_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed("Senior Rust engineer").expect("embed");
        let b = embedder.embed("Senior Rust engineer").expect("embed");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn case_and_punctuation_do_not_change_embedding() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("Python, Engineer!").expect("embed");
        let b = embedder.embed("python engineer").expect("embed");
        assert_eq!(a, b);
    }

    #[test]
    fn shared_words_are_closer() {
        let embedder = HashingEmbedder::default();
        let query = embedder.embed("python engineer").expect("embed");
        let near = embedder
            .embed("python backend engineer with five years experience")
            .expect("embed");
        let far = embedder
            .embed("frontend designer, no programming background")
            .expect("embed");
        assert!(cosine(&query, &near) > cosine(&query, &far));
    }

    #[test]
    fn inflections_get_partial_credit() {
        let embedder = HashingEmbedder::default();
        let base = embedder.embed("engineering").expect("embed");
        let related = embedder.embed("engineer").expect("embed");
        let unrelated = embedder.embed("gardening").expect("embed");
        assert!(cosine(&base, &related) > cosine(&base, &unrelated));
    }

    #[test]
    fn blank_text_embeds_to_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        let v = embedder.embed("  ... ").expect("embed");
        assert_eq!(v, vec![0.0; 16]);
    }

    #[test]
    fn batch_preserves_order() {
        let embedder = HashingEmbedder::new(32);
        let batch = embedder.embed_batch(&["alpha", "beta"]).expect("batch");
        assert_eq!(batch[0], embedder.embed("alpha").expect("embed"));
        assert_eq!(batch[1], embedder.embed("beta").expect("embed"));
    }

    #[test]
    fn create_embedder_hashing() {
        let config = EmbedderConfig {
            dimension: 128,
            ..EmbedderConfig::default()
        };
        let embedder = create_embedder(&config).expect("hashing embedder");
        assert_eq!(embedder.dimension(), 128);
        assert_eq!(embedder.name(), "hashing-128");
    }

    #[test]
    fn create_embedder_model2vec_requires_model() {
        let config = EmbedderConfig {
            kind: EmbedderKind::Model2vec,
            ..EmbedderConfig::default()
        };
        let err = create_embedder(&config).err().expect("missing model must fail");
        assert!(err.to_string().contains("embedder.model"));
    }

    #[cfg(not(feature = "model2vec"))]
    #[test]
    fn model2vec_unavailable_without_feature() {
        let config = EmbedderConfig {
            kind: EmbedderKind::Model2vec,
            model: Some("minishlab/potion-base-8M".into()),
            ..EmbedderConfig::default()
        };
        let err = create_embedder(&config).err().expect("feature is off");
        assert!(err.to_string().contains("model2vec"));
    }
}
