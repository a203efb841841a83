//! Fusion of lexical and dense retrieval into one ranking.
//!
//! [`linear`] holds the pure weighted-sum fusion; [`hybrid`] owns both
//! indices and drives a query through them.

pub mod hybrid;
pub mod linear;

pub use hybrid::{BuildReport, HybridIndex, SearchMode};
pub use linear::{fuse_linear, validate_alpha};
