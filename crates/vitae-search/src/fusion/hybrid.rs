//! Hybrid index: both retrieval layers over one shared corpus.
//!
//! Build never fails because of a single document:
//! - later duplicates of an identity are dropped
//! - documents the embedder cannot handle are removed from *both* layers,
//!   so every identity the engine can return exists in each of them

use crate::config::VitaeConfig;
use crate::corpus::{BuildWarning, Corpus, Document};
use crate::dense::{DenseIndex, Embedder, embed_documents};
use crate::error::Result;
use crate::fusion::linear::{fuse_linear, validate_alpha};
use crate::lexical::LexicalIndex;
use crate::result::FusedResult;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Which signals a query uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Fuse both layers with the configured weight.
    #[default]
    Hybrid,
    /// BM25 only (`alpha = 0`).
    Lexical,
    /// Embeddings only (`alpha = 1`).
    Dense,
}

impl SearchMode {
    /// Fusion weight for this mode; `hybrid_alpha` applies to [`SearchMode::Hybrid`].
    #[must_use]
    pub const fn alpha(self, hybrid_alpha: f32) -> f32 {
        match self {
            Self::Hybrid => hybrid_alpha,
            Self::Lexical => 0.0,
            Self::Dense => 1.0,
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hybrid => "hybrid",
            Self::Lexical => "lexical",
            Self::Dense => "dense",
        })
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "lexical" | "bm25" => Ok(Self::Lexical),
            "dense" | "semantic" => Ok(Self::Dense),
            other => Err(format!(
                "unknown search mode '{other}' (expected hybrid, lexical or dense)"
            )),
        }
    }
}

/// A built index plus every per-document problem found while building it.
#[derive(Debug)]
pub struct BuildReport {
    pub index: HybridIndex,
    pub warnings: Vec<BuildWarning>,
}

/// Lexical and dense indices built from the same corpus.
#[derive(Debug, Clone)]
pub struct HybridIndex {
    corpus: Arc<Corpus>,
    lexical: LexicalIndex,
    dense: DenseIndex,
    config: VitaeConfig,
}

impl HybridIndex {
    /// Build both layers from `documents`, in order.
    #[instrument(skip_all, fields(embedder = embedder.name()))]
    pub fn build(
        documents: impl IntoIterator<Item = Document>,
        embedder: Arc<dyn Embedder>,
        config: &VitaeConfig,
    ) -> BuildReport {
        let (corpus, mut warnings) = Corpus::from_documents(documents);
        let (vectors, embed_warnings) = embed_documents(&corpus, embedder.as_ref());

        let excluded: Vec<String> = embed_warnings
            .iter()
            .map(|w| w.identity().to_owned())
            .collect();
        let excluded_refs: Vec<&str> = excluded.iter().map(String::as_str).collect();
        warnings.extend(embed_warnings);

        let kept_vectors: Vec<Vec<f32>> = vectors.into_iter().flatten().collect();
        let corpus = Arc::new(corpus.without(&excluded_refs));

        let lexical = LexicalIndex::build(Arc::clone(&corpus), &config.lexical);
        let dense = DenseIndex::from_checked_vectors(Arc::clone(&corpus), kept_vectors, embedder);

        info!(
            documents = corpus.len(),
            warnings = warnings.len(),
            vocabulary = lexical.vocabulary_size(),
            dimension = dense.dimension(),
            "hybrid index built"
        );

        BuildReport {
            index: Self {
                corpus,
                lexical,
                dense,
                config: config.clone(),
            },
            warnings,
        }
    }

    /// Query both layers and fuse their scores.
    ///
    /// Each layer is asked for `top_k * fanout` candidates so documents that
    /// rank just outside one layer's top `top_k` can still surface after
    /// fusion. Blank queries and `top_k == 0` return nothing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::InvalidWeight`] if `alpha` is not within
    /// `[0, 1]`, and [`crate::SearchError::Embedding`] if the query cannot be
    /// embedded.
    #[instrument(skip(self), fields(documents = self.corpus.len()))]
    pub fn retrieve(&self, query: &str, top_k: usize, alpha: f32) -> Result<Vec<FusedResult>> {
        if top_k == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let alpha = validate_alpha(alpha)?;

        let candidates = top_k.saturating_mul(self.config.hybrid.fanout.max(1));
        let lexical = self.lexical.search(query, candidates);
        let dense = self.dense.search(query, candidates)?;
        debug!(
            lexical = lexical.len(),
            dense = dense.len(),
            candidates,
            "layer candidates"
        );

        let mut fused = fuse_linear(&lexical, &dense, alpha, |identity| {
            self.corpus.position(identity)
        })?;
        fused.truncate(top_k);
        Ok(fused)
    }

    /// [`HybridIndex::retrieve`] with the configured weight.
    ///
    /// # Errors
    ///
    /// See [`HybridIndex::retrieve`].
    pub fn retrieve_default(&self, query: &str, top_k: usize) -> Result<Vec<FusedResult>> {
        self.retrieve(query, top_k, self.config.hybrid.alpha)
    }

    /// [`HybridIndex::retrieve`] with the weight implied by `mode`.
    ///
    /// # Errors
    ///
    /// See [`HybridIndex::retrieve`].
    pub fn search(&self, query: &str, top_k: usize, mode: SearchMode) -> Result<Vec<FusedResult>> {
        self.retrieve(query, top_k, mode.alpha(self.config.hybrid.alpha))
    }

    #[must_use]
    pub const fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    #[must_use]
    pub const fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    #[must_use]
    pub const fn dense(&self) -> &DenseIndex {
        &self.dense
    }

    #[must_use]
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        self.dense.embedder()
    }

    #[must_use]
    pub const fn config(&self) -> &VitaeConfig {
        &self.config
    }

    /// Number of documents present in both layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::HashingEmbedder;
    use crate::error::SearchError;

    fn build(docs: &[(&str, &str)]) -> BuildReport {
        HybridIndex::build(
            docs.iter().map(|(id, text)| Document::new(*id, *text)),
            Arc::new(HashingEmbedder::default()),
            &VitaeConfig::default(),
        )
    }

    fn ids(results: &[FusedResult]) -> Vec<&str> {
        results.iter().map(|r| r.identity.as_str()).collect()
    }

    #[test]
    fn search_mode_parses_and_maps_to_alpha() {
        assert_eq!("hybrid".parse::<SearchMode>(), Ok(SearchMode::Hybrid));
        assert_eq!("BM25".parse::<SearchMode>(), Ok(SearchMode::Lexical));
        assert_eq!("semantic".parse::<SearchMode>(), Ok(SearchMode::Dense));
        assert!("fuzzy".parse::<SearchMode>().is_err());

        assert!((SearchMode::Hybrid.alpha(0.3) - 0.3).abs() < f32::EPSILON);
        assert!(SearchMode::Lexical.alpha(0.3).abs() < f32::EPSILON);
        assert!((SearchMode::Dense.alpha(0.3) - 1.0).abs() < f32::EPSILON);
        assert_eq!(SearchMode::Dense.to_string(), "dense");
    }

    #[test]
    fn duplicate_identities_are_reported() {
        let report = build(&[("a", "rust"), ("a", "java"), ("b", "go")]);
        assert_eq!(report.index.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].identity(), "a");
        assert_eq!(report.index.lexical().len(), 2);
        assert_eq!(report.index.dense().len(), 2);
    }

    #[test]
    fn retrieve_truncates_to_top_k() {
        let report = build(&[
            ("a", "rust engineer"),
            ("b", "rust developer"),
            ("c", "rust consultant"),
        ]);
        let results = report.index.retrieve("rust", 2, 0.5).expect("retrieve");
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn blank_query_and_zero_k_are_empty() {
        let report = build(&[("a", "rust")]);
        assert!(report.index.retrieve("", 5, 0.5).expect("retrieve").is_empty());
        assert!(report.index.retrieve(" \n", 5, 0.5).expect("retrieve").is_empty());
        assert!(report.index.retrieve("rust", 0, 0.5).expect("retrieve").is_empty());
    }

    #[test]
    fn invalid_alpha_is_an_error() {
        let report = build(&[("a", "rust")]);
        let err = report.index.retrieve("rust", 1, 1.5).expect_err("alpha > 1");
        assert!(matches!(err, SearchError::InvalidWeight(_)));
    }

    #[test]
    fn empty_corpus_returns_nothing() {
        let report = build(&[]);
        assert!(report.index.is_empty());
        assert!(report.warnings.is_empty());
        assert!(report.index.retrieve("rust", 5, 0.5).expect("retrieve").is_empty());
    }

    #[test]
    fn modes_select_layers() {
        let report = build(&[
            ("a", "python backend engineer with five years experience"),
            ("b", "frontend designer, no programming background"),
        ]);
        let lexical = report
            .index
            .search("python engineer", 5, SearchMode::Lexical)
            .expect("lexical");
        assert!(lexical.iter().all(|r| (r.score - r.lexical_score).abs() < 1e-6));

        let dense = report
            .index
            .search("python engineer", 5, SearchMode::Dense)
            .expect("dense");
        assert!(dense.iter().all(|r| (r.score - r.dense_score).abs() < 1e-6));
        assert_eq!(ids(&dense)[0], "a");
    }

    #[test]
    fn retrieve_default_uses_configured_alpha() {
        let report = build(&[("a", "rust engineer"), ("b", "java engineer")]);
        let explicit = report.index.retrieve("rust", 2, 0.5).expect("explicit");
        let default = report.index.retrieve_default("rust", 2).expect("default");
        assert_eq!(explicit, default);
    }
}
