//! Dense retrieval: embedders and the flat-L2 vector index.

mod embedder;
mod index;

#[cfg(feature = "model2vec")]
pub use embedder::Model2VecEmbedder;
pub use embedder::{Embedder, HashingEmbedder, create_embedder};
pub use index::{DenseIndex, embed_documents, squared_euclidean};
