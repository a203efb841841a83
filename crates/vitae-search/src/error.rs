//! Error type for the retrieval engine.
//!
//! Per-document problems during index build are not errors; they surface as
//! [`crate::BuildWarning`]s so one bad resume never aborts the whole build.

/// Library result alias.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Retrieval engine error.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The embedder could not produce a vector.
    #[error("embedding failed: {0:#}")]
    Embedding(anyhow::Error),

    /// A vector's length differs from the index dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Fusion weight outside `[0, 1]` or not finite.
    #[error("fusion weight must be within [0, 1], got {0}")]
    InvalidWeight(f32),

    /// A configuration value is out of range or the file could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SearchError {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Embedding(_) => "E6002",
            Self::DimensionMismatch { .. } => "E6003",
            Self::InvalidWeight(_) => "E2005",
            Self::InvalidConfig(_) => "E1002",
        }
    }

    /// Optional remediation hint surfaced by the CLI.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Embedding(_) => {
                Some("Verify the embedding model files are present, or use the hashing embedder.")
            }
            Self::DimensionMismatch { .. } => {
                Some("Rebuild the index with the same embedder used for queries.")
            }
            Self::InvalidWeight(_) => Some("Pass --alpha with a value between 0 and 1."),
            Self::InvalidConfig(_) => Some("Fix the offending key in vitae.toml and retry."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique_and_machine_friendly() {
        let all = [
            SearchError::Embedding(anyhow::anyhow!("boom")),
            SearchError::DimensionMismatch {
                expected: 4,
                actual: 3,
            },
            SearchError::InvalidWeight(1.5),
            SearchError::InvalidConfig("k1".into()),
        ];

        let mut seen = HashSet::new();
        for err in &all {
            let code = err.code();
            assert!(seen.insert(code), "duplicate code {code}");
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(err.hint().is_some());
        }
    }

    #[test]
    fn display_includes_details() {
        let err = SearchError::DimensionMismatch {
            expected: 384,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "embedding dimension mismatch: expected 384, got 12"
        );
    }
}
