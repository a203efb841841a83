//! Build a small hybrid index from fuzzer-chosen resumes and query it.
//!
//! Retrieval must never panic, must respect `top_k`, must return each
//! identity at most once, and must order results by descending fused score.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;
use std::sync::Arc;
use vitae_search::{Document, HashingEmbedder, HybridIndex, VitaeConfig};

#[derive(Debug, Arbitrary)]
struct Input {
    resumes: Vec<(String, String)>,
    query: String,
    top_k: u8,
    alpha: u8,
}

fuzz_target!(|input: Input| {
    let docs = input
        .resumes
        .into_iter()
        .take(16)
        .map(|(identity, content)| Document::new(identity, content));
    let report = HybridIndex::build(docs, Arc::new(HashingEmbedder::new(16)), &VitaeConfig::default());

    let top_k = usize::from(input.top_k % 20);
    let alpha = f32::from(input.alpha) / 255.0;
    let results = report
        .index
        .retrieve(&input.query, top_k, alpha)
        .expect("alpha in [0, 1] and hashing embedder cannot fail");

    assert!(results.len() <= top_k);
    assert!(results.len() <= report.index.len());

    let mut seen = HashSet::new();
    for result in &results {
        assert!(seen.insert(result.identity.as_str()), "duplicate {}", result.identity);
    }
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
});
