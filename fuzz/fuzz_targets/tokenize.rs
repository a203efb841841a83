//! Arbitrary text through the tokenizer and the hashing embedder.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vitae_search::Embedder;
use vitae_search::HashingEmbedder;
use vitae_search::lexical::tokenize;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    for token in tokenize(&text) {
        assert!(!token.is_empty());
        assert!(token.chars().all(char::is_alphanumeric), "token {token:?}");
    }

    let embedder = HashingEmbedder::new(32);
    let vector = embedder.embed(&text).expect("hashing embedder is infallible");
    assert_eq!(vector.len(), 32);
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-3, "norm {norm}");
});
