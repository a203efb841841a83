//! Fixed-shape result records produced at each stage of the pipeline.
//!
//! Raw per-source scores ([`ScoredResult`]) live in incomparable ranges; the
//! only place they meet is [`crate::fuse_linear`], which produces
//! [`FusedResult`]s. [`RankedResult`] adds the post-hoc relevance score.

use serde::Serialize;

/// Which index produced a [`ScoredResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// BM25 over tokenized text.
    Lexical,
    /// Inverse squared-L2 distance over embeddings.
    Dense,
}

/// A single hit from one index, carrying that index's raw score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    /// Document identity (e.g. the resume file name).
    pub identity: String,
    /// Document text as indexed.
    pub content: String,
    /// Raw score in the source's own range.
    pub score: f32,
    /// Producing index.
    pub source: ScoreSource,
}

/// A document after linear fusion of both sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedResult {
    pub identity: String,
    pub content: String,
    /// `alpha * dense_score + (1 - alpha) * lexical_score`.
    pub score: f32,
    /// Raw lexical score; `0.0` when the lexical index did not return this identity.
    pub lexical_score: f32,
    /// Raw dense score; `0.0` when the dense index did not return this identity.
    pub dense_score: f32,
}

/// A fused result annotated with its relevance ("match") score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub fused: FusedResult,
    /// Cosine match score scaled by 100 and rounded to two decimals.
    pub relevance: f64,
}

impl RankedResult {
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.fused.identity
    }
}
