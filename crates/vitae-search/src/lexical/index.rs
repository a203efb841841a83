//! BM25 Okapi inverted index over the corpus.
//!
//! ```text
//! idf(t)     = ln((N - df + 0.5) / (df + 0.5) + 1)
//! score(d,q) = sum over query tokens t of
//!              idf(t) * tf * (k1 + 1) / (tf + k1 * (1 - b + b * |d| / avgdl))
//! ```
//!
//! The `+ 1` inside the logarithm keeps idf positive even when a term occurs
//! in half the corpus or more, so small corpora still produce a signal.
//! Repeated query tokens count once per occurrence.

use crate::config::Bm25Config;
use crate::corpus::Corpus;
use crate::lexical::tokenizer::tokenize;
use crate::result::{ScoreSource, ScoredResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Posting {
    position: usize,
    term_frequency: u32,
}

/// Immutable BM25 index. Rebuild to change the corpus.
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    corpus: Arc<Corpus>,
    postings: HashMap<String, Vec<Posting>>,
    doc_lengths: Vec<u32>,
    avgdl: f32,
    config: Bm25Config,
}

impl LexicalIndex {
    /// Tokenize every document and build postings, in corpus order.
    #[instrument(skip_all, fields(documents = corpus.len()))]
    pub fn build(corpus: Arc<Corpus>, config: &Bm25Config) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(corpus.len());

        for (position, doc) in corpus.iter().enumerate() {
            let tokens = tokenize(&doc.content);
            doc_lengths.push(u32::try_from(tokens.len()).unwrap_or(u32::MAX));

            let mut counts: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *counts.entry(token).or_insert(0) += 1;
            }
            for (term, term_frequency) in counts {
                postings.entry(term).or_default().push(Posting {
                    position,
                    term_frequency,
                });
            }
        }

        let total: u64 = doc_lengths.iter().map(|&len| u64::from(len)).sum();
        let avgdl = if doc_lengths.is_empty() {
            0.0
        } else {
            total as f32 / doc_lengths.len() as f32
        };

        debug!(terms = postings.len(), avgdl, "lexical index built");

        Self {
            corpus,
            postings,
            doc_lengths,
            avgdl,
            config: config.clone(),
        }
    }

    /// Score every document against `query` and return the best `top_k`.
    ///
    /// Only documents sharing at least one token with the query are returned.
    /// Ties keep corpus order.
    #[must_use]
    pub fn search(&self, query: &str, top_k: usize) -> Vec<ScoredResult> {
        let scores = self.scores(query);
        if top_k == 0 || scores.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(usize, f32)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(top_k);

        ranked
            .into_iter()
            .filter_map(|(position, score)| {
                self.corpus.get(position).map(|doc| ScoredResult {
                    identity: doc.identity.clone(),
                    content: doc.content.clone(),
                    score,
                    source: ScoreSource::Lexical,
                })
            })
            .collect()
    }

    /// Raw BM25 score for every document, indexed by corpus position.
    ///
    /// Empty when the query has no tokens or the corpus is empty.
    #[must_use]
    pub fn scores(&self, query: &str) -> Vec<f32> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || self.doc_lengths.is_empty() {
            return Vec::new();
        }

        let n = self.doc_lengths.len() as f32;
        let Bm25Config { k1, b } = self.config;
        let mut scores = vec![0.0_f32; self.doc_lengths.len()];

        for token in &query_tokens {
            let Some(postings) = self.postings.get(token) else {
                continue;
            };
            let df = postings.len() as f32;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for posting in postings {
                let dl = self.doc_lengths[posting.position] as f32;
                let length_ratio = if self.avgdl > 0.0 { dl / self.avgdl } else { 1.0 };
                let tf = posting.term_frequency as f32;
                let tf_norm = (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * length_ratio));
                scores[posting.position] += idf * tf_norm;
            }
        }

        scores
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.doc_lengths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doc_lengths.is_empty()
    }

    /// Number of distinct terms.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }

    #[must_use]
    pub const fn average_doc_length(&self) -> f32 {
        self.avgdl
    }

    #[must_use]
    pub const fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }
}
