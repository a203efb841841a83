#![forbid(unsafe_code)]
//! vitae-search library.
//!
//! Ranks a corpus of resumes against a job-description query by fusing a
//! BM25 lexical signal with a dense embedding signal, then optionally
//! re-ranks the fused list by a cosine "match score".
//!
//! ```
//! use std::sync::Arc;
//! use vitae_search::{Document, HashingEmbedder, HybridIndex, VitaeConfig};
//!
//! let docs = vec![
//!     Document::new("a.txt", "python backend engineer with five years experience"),
//!     Document::new("b.txt", "frontend designer, no programming background"),
//! ];
//! let config = VitaeConfig::default();
//! let report = HybridIndex::build(docs, Arc::new(HashingEmbedder::default()), &config);
//! let hits = report.index.retrieve("python engineer", 1, 0.5).unwrap();
//! assert_eq!(hits[0].identity, "a.txt");
//! ```
//!
//! # Conventions
//!
//! - **Errors**: [`SearchError`] for library failures; per-document build
//!   problems are [`BuildWarning`]s, never errors.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod config;
pub mod corpus;
pub mod dense;
pub mod error;
pub mod fusion;
pub mod lexical;
pub mod relevance;
pub mod result;

pub use config::{
    Bm25Config, EmbedderConfig, EmbedderKind, HybridConfig, RelevanceConfig, VitaeConfig,
    load_config,
};
pub use corpus::{BuildWarning, Corpus, Document, clean_text};
pub use dense::{DenseIndex, Embedder, HashingEmbedder, create_embedder};
pub use error::{Result, SearchError};
pub use fusion::{BuildReport, HybridIndex, SearchMode, fuse_linear};
pub use lexical::LexicalIndex;
pub use relevance::{RelevanceScorer, ScoreMapping};
pub use result::{FusedResult, RankedResult, ScoreSource, ScoredResult};
