//! Exact (flat) nearest-neighbour index over document embeddings.
//!
//! Distance is squared Euclidean; the reported score is `1 / (1 + d)`, so it
//! lies in `(0, 1]` and grows with similarity.
//!
//! A zero vector (a document with no embeddable text) carries no dense
//! evidence. It stays in the corpus but is never indexed, so it can only
//! surface through the lexical layer. Its distance to a unit query would
//! otherwise be 1 and score 0.5, above most genuine matches.

use crate::corpus::{BuildWarning, Corpus};
use crate::dense::embedder::Embedder;
use crate::error::{Result, SearchError};
use crate::result::{ScoreSource, ScoredResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone)]
struct DenseEntry {
    position: usize,
    vector: Vec<f32>,
}

/// Immutable flat-L2 index. Rebuild to change the corpus.
#[derive(Clone)]
pub struct DenseIndex {
    corpus: Arc<Corpus>,
    entries: Vec<DenseEntry>,
    dimension: usize,
    embedder: Arc<dyn Embedder>,
}

impl fmt::Debug for DenseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseIndex")
            .field("documents", &self.entries.len())
            .field("dimension", &self.dimension)
            .field("embedder", &self.embedder.name())
            .finish_non_exhaustive()
    }
}

impl DenseIndex {
    /// Embed every document and index the ones that succeeded.
    ///
    /// Documents whose embedding fails, has the wrong length, or contains
    /// non-finite values are left out of the index and reported as warnings.
    /// Zero vectors are left out silently.
    #[instrument(skip_all, fields(documents = corpus.len(), embedder = embedder.name()))]
    pub fn build(corpus: Arc<Corpus>, embedder: Arc<dyn Embedder>) -> (Self, Vec<BuildWarning>) {
        let (vectors, warnings) = embed_documents(&corpus, embedder.as_ref());
        let entries = vectors
            .into_iter()
            .enumerate()
            .filter_map(|(position, vector)| vector.map(|vector| DenseEntry { position, vector }))
            .filter(DenseEntry::has_signal)
            .collect();

        let index = Self {
            dimension: embedder.dimension(),
            corpus,
            entries,
            embedder,
        };
        debug!(indexed = index.entries.len(), "dense index built");
        (index, warnings)
    }

    /// Index precomputed vectors, one per corpus document in corpus order.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] when the vector count differs
    /// from the corpus size or a vector holds a non-finite value, and
    /// [`SearchError::DimensionMismatch`] when any vector's length differs
    /// from the embedder's dimension.
    pub fn from_vectors(
        corpus: Arc<Corpus>,
        vectors: Vec<Vec<f32>>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        if vectors.len() != corpus.len() {
            return Err(SearchError::InvalidConfig(format!(
                "{} vectors for {} documents",
                vectors.len(),
                corpus.len()
            )));
        }

        let dimension = embedder.dimension();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(SearchError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        if let Some(position) = vectors.iter().position(|v| !is_finite(v)) {
            return Err(SearchError::InvalidConfig(format!(
                "vector {position} contains non-finite values"
            )));
        }

        Ok(Self::from_checked_vectors(corpus, vectors, embedder))
    }

    /// Shape already verified: one finite vector per document, all of
    /// `embedder.dimension()`.
    pub(crate) fn from_checked_vectors(
        corpus: Arc<Corpus>,
        vectors: Vec<Vec<f32>>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let entries = vectors
            .into_iter()
            .enumerate()
            .map(|(position, vector)| DenseEntry { position, vector })
            .filter(DenseEntry::has_signal)
            .collect();

        Self {
            corpus,
            entries,
            dimension: embedder.dimension(),
            embedder,
        }
    }

    /// Embed `query` and return the `top_k` nearest documents.
    ///
    /// A blank query, or one that embeds to the zero vector, carries no
    /// signal and yields no results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Embedding`] if the query cannot be embedded and
    /// [`SearchError::DimensionMismatch`] if the embedder returns a vector of
    /// the wrong length.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredResult>> {
        if top_k == 0 || query.trim().is_empty() || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        let vector = self.embedder.embed(query).map_err(SearchError::Embedding)?;
        self.search_vector(&vector, top_k)
    }

    /// Nearest documents to an already-embedded query.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::DimensionMismatch`] if `query` has the wrong
    /// length and [`SearchError::Embedding`] if it holds non-finite values.
    pub fn search_vector(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredResult>> {
        if query.len() != self.dimension {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if !is_finite(query) {
            return Err(SearchError::Embedding(anyhow::anyhow!(
                "query embedding contains non-finite values"
            )));
        }
        if top_k == 0 || !has_signal(query) {
            return Ok(Vec::new());
        }

        let mut ranked: Vec<(usize, f32)> = self
            .entries
            .iter()
            .map(|entry| {
                let distance = squared_euclidean(query, &entry.vector);
                (entry.position, 1.0 / (1.0 + distance))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(top_k);

        Ok(ranked
            .into_iter()
            .filter_map(|(position, score)| {
                self.corpus.get(position).map(|doc| ScoredResult {
                    identity: doc.identity.clone(),
                    content: doc.content.clone(),
                    score,
                    source: ScoreSource::Dense,
                })
            })
            .collect())
    }

    /// Number of indexed vectors (documents with a non-zero embedding).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub const fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }
}

impl DenseEntry {
    fn has_signal(&self) -> bool {
        has_signal(&self.vector)
    }
}

fn has_signal(vector: &[f32]) -> bool {
    vector.iter().map(|v| v * v).sum::<f32>() > 0.0
}

fn is_finite(vector: &[f32]) -> bool {
    vector.iter().all(|v| v.is_finite())
}

/// Squared Euclidean distance. Slices must have equal length.
#[must_use]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// Embed every corpus document, in corpus order.
///
/// Precomputed embeddings are used as-is. Slot `i` is `None` when document
/// `i` could not be embedded; the reason is in the returned warnings.
pub fn embed_documents(
    corpus: &Corpus,
    embedder: &dyn Embedder,
) -> (Vec<Option<Vec<f32>>>, Vec<BuildWarning>) {
    let pending: Vec<(usize, &str)> = corpus
        .iter()
        .enumerate()
        .filter(|(_, doc)| doc.embedding.is_none())
        .map(|(position, doc)| (position, doc.content.as_str()))
        .collect();

    let computed = embed_pending(&pending, embedder);

    let mut vectors: Vec<Option<Vec<f32>>> = corpus.iter().map(|d| d.embedding.clone()).collect();
    let mut failures: Vec<(usize, String)> = Vec::new();
    for ((position, _), outcome) in pending.iter().zip(computed) {
        match outcome {
            Ok(vector) => vectors[*position] = Some(vector),
            Err(err) => failures.push((*position, format!("{err:#}"))),
        }
    }

    let expected = embedder.dimension();
    let mut warnings = Vec::new();
    for (position, slot) in vectors.iter_mut().enumerate() {
        let Some(doc) = corpus.get(position) else {
            continue;
        };
        if let Some((_, reason)) = failures.iter().find(|(p, _)| *p == position) {
            warn!(identity = %doc.identity, %reason, "embedding failed, excluding document");
            warnings.push(BuildWarning::EmbeddingFailed {
                identity: doc.identity.clone(),
                reason: reason.clone(),
            });
            continue;
        }
        if let Some(actual) = slot.as_ref().map(Vec::len).filter(|len| *len != expected) {
            warn!(identity = %doc.identity, expected, actual, "embedding dimension mismatch, excluding document");
            warnings.push(BuildWarning::DimensionMismatch {
                identity: doc.identity.clone(),
                expected,
                actual,
            });
            *slot = None;
            continue;
        }
        if slot.as_ref().is_some_and(|vector| !is_finite(vector)) {
            warn!(identity = %doc.identity, "embedding has non-finite values, excluding document");
            warnings.push(BuildWarning::NonFiniteEmbedding {
                identity: doc.identity.clone(),
            });
            *slot = None;
        }
    }

    (vectors, warnings)
}

#[cfg(feature = "parallel")]
fn embed_pending(pending: &[(usize, &str)], embedder: &dyn Embedder) -> Vec<anyhow::Result<Vec<f32>>> {
    pending
        .par_iter()
        .map(|(_, text)| embedder.embed(text))
        .collect()
}

/// One batch call; if the batch fails as a whole, retry one document at a
/// time so a single bad document only costs itself.
#[cfg(not(feature = "parallel"))]
fn embed_pending(pending: &[(usize, &str)], embedder: &dyn Embedder) -> Vec<anyhow::Result<Vec<f32>>> {
    if pending.is_empty() {
        return Vec::new();
    }
    let texts: Vec<&str> = pending.iter().map(|(_, text)| *text).collect();
    match embedder.embed_batch(&texts) {
        Ok(batch) if batch.len() == texts.len() => batch.into_iter().map(Ok).collect(),
        Ok(batch) => {
            warn!(
                expected = texts.len(),
                got = batch.len(),
                "embedder returned a short batch, retrying per document"
            );
            texts.iter().map(|text| embedder.embed(text)).collect()
        }
        Err(err) => {
            debug!(error = %err, "batch embedding failed, retrying per document");
            texts.iter().map(|text| embedder.embed(text)).collect()
        }
    }
}
