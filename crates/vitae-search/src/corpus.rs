//! Documents, the ordered corpus both indices are built from, and text cleanup.
//!
//! Position in the corpus is the internal join key at build time; identity is
//! the external key every result carries. Identities are unique within a
//! corpus: the first document with a given identity wins and later ones are
//! dropped with a [`BuildWarning::DuplicateIdentity`].

use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// A single resume (or any text) to be indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Stable external key, e.g. the source file name.
    pub identity: String,
    /// Cleaned text.
    pub content: String,
    /// Precomputed embedding; when present the dense index uses it as-is.
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    pub fn new(identity: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            content: content.into(),
            embedding: None,
        }
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Non-fatal problem found while building an index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
    /// A later document reused an identity; it was dropped.
    DuplicateIdentity { identity: String },
    /// The embedder failed for this document; it was excluded.
    EmbeddingFailed { identity: String, reason: String },
    /// The document's vector had the wrong length; it was excluded.
    DimensionMismatch {
        identity: String,
        expected: usize,
        actual: usize,
    },
    /// The document's vector held NaN or infinity; it was excluded.
    NonFiniteEmbedding { identity: String },
}

impl BuildWarning {
    #[must_use]
    pub fn identity(&self) -> &str {
        match self {
            Self::DuplicateIdentity { identity }
            | Self::EmbeddingFailed { identity, .. }
            | Self::DimensionMismatch { identity, .. }
            | Self::NonFiniteEmbedding { identity } => identity,
        }
    }
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateIdentity { identity } => {
                write!(f, "{identity}: duplicate identity, kept the first occurrence")
            }
            Self::EmbeddingFailed { identity, reason } => {
                write!(f, "{identity}: embedding failed, excluded ({reason})")
            }
            Self::DimensionMismatch {
                identity,
                expected,
                actual,
            } => write!(
                f,
                "{identity}: embedding dimension {actual} != {expected}, excluded"
            ),
            Self::NonFiniteEmbedding { identity } => {
                write!(f, "{identity}: embedding has non-finite values, excluded")
            }
        }
    }
}

/// Ordered, identity-unique document collection.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    positions: HashMap<String, usize>,
}

impl Corpus {
    /// Build a corpus, keeping the first document for every identity.
    pub fn from_documents(
        documents: impl IntoIterator<Item = Document>,
    ) -> (Self, Vec<BuildWarning>) {
        let mut corpus = Self::default();
        let mut warnings = Vec::new();

        for doc in documents {
            if corpus.positions.contains_key(&doc.identity) {
                warn!(identity = %doc.identity, "duplicate document identity, dropping later copy");
                warnings.push(BuildWarning::DuplicateIdentity {
                    identity: doc.identity,
                });
                continue;
            }
            corpus
                .positions
                .insert(doc.identity.clone(), corpus.documents.len());
            corpus.documents.push(doc);
        }

        (corpus, warnings)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Document> {
        self.documents.get(position)
    }

    /// Corpus position of `identity`, used as the deterministic tie-breaker.
    #[must_use]
    pub fn position(&self, identity: &str) -> Option<usize> {
        self.positions.get(identity).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Drop every document whose identity is in `excluded`, preserving order.
    #[must_use]
    pub fn without(self, excluded: &[&str]) -> Self {
        if excluded.is_empty() {
            return self;
        }
        let kept = self
            .documents
            .into_iter()
            .filter(|doc| !excluded.contains(&doc.identity.as_str()));
        Self::from_documents(kept).0
    }
}

/// Collapse every whitespace run to one space and trim both ends.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
