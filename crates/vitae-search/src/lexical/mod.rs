//! Sparse lexical retrieval (BM25 over case-folded word tokens).

mod index;
pub mod tokenizer;

pub use index::LexicalIndex;
pub use tokenizer::tokenize;
