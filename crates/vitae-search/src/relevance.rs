//! Post-hoc relevance ("match") score between a resume and a job description.
//!
//! Independent of retrieval: cosine similarity of the two embeddings, mapped
//! to a percentage and rounded to two decimals.

use crate::dense::Embedder;
use crate::error::{Result, SearchError};
use crate::result::{FusedResult, RankedResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// How cosine similarity in `[-1, 1]` maps to a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMapping {
    /// `similarity * 100`; opposed texts score below zero.
    #[default]
    Raw,
    /// `(similarity + 1) / 2 * 100`, always within `[0, 100]`.
    Shifted,
}

impl ScoreMapping {
    #[must_use]
    pub fn apply(self, similarity: f64) -> f64 {
        let percent = match self {
            Self::Raw => similarity * 100.0,
            Self::Shifted => (similarity + 1.0) / 2.0 * 100.0,
        };
        round2(percent)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Cosine similarity; `0.0` when either vector has zero norm or a
/// non-finite component.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a <= f64::EPSILON || norm_b <= f64::EPSILON {
        return 0.0;
    }
    let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
    if cosine.is_finite() {
        cosine.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Scores and re-ranks documents against a query.
#[derive(Clone)]
pub struct RelevanceScorer {
    embedder: Arc<dyn Embedder>,
    mapping: ScoreMapping,
}

impl std::fmt::Debug for RelevanceScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelevanceScorer")
            .field("embedder", &self.embedder.name())
            .field("mapping", &self.mapping)
            .finish()
    }
}

impl RelevanceScorer {
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, mapping: ScoreMapping) -> Self {
        Self { embedder, mapping }
    }

    #[must_use]
    pub const fn mapping(&self) -> ScoreMapping {
        self.mapping
    }

    /// Match score of `document` against `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Embedding`] if either text cannot be embedded
    /// and [`SearchError::DimensionMismatch`] if the vectors differ in length.
    pub fn score(&self, document: &str, query: &str) -> Result<f64> {
        let query_vector = self.embed(query)?;
        self.score_against(document, &query_vector)
    }

    /// Annotate each fused result with its match score and re-sort by it.
    ///
    /// The sort is stable, so equal scores keep their fusion order.
    ///
    /// # Errors
    ///
    /// Fails on the first text that cannot be embedded.
    pub fn rank(&self, fused: Vec<FusedResult>, query: &str) -> Result<Vec<RankedResult>> {
        if fused.is_empty() {
            return Ok(Vec::new());
        }
        let query_vector = self.embed(query)?;

        let mut ranked = fused
            .into_iter()
            .map(|result| {
                let relevance = self.score_against(&result.content, &query_vector)?;
                Ok(RankedResult {
                    fused: result,
                    relevance,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        ranked.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        debug!(results = ranked.len(), "re-ranked by relevance");
        Ok(ranked)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.embed(text).map_err(SearchError::Embedding)
    }

    fn score_against(&self, document: &str, query_vector: &[f32]) -> Result<f64> {
        let document_vector = self.embed(document)?;
        if document_vector.len() != query_vector.len() {
            return Err(SearchError::DimensionMismatch {
                expected: query_vector.len(),
                actual: document_vector.len(),
            });
        }
        Ok(self
            .mapping
            .apply(cosine_similarity(&document_vector, query_vector)))
    }
}
