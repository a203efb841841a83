//! Linear weighted fusion of lexical and dense scores.
//!
//! ```text
//! fused(d) = alpha * dense(d) + (1 - alpha) * lexical(d)
//! ```
//!
//! Where:
//! - `alpha` in `[0, 1]` is the dense weight; `0` is pure lexical, `1` pure dense.
//! - A document absent from one source contributes an explicit `0.0` for it.
//! - Raw scores are fused as-is. BM25 is unbounded while the dense score is
//!   in `(0, 1]`, so at `alpha = 0.5` lexical matches dominate whenever BM25
//!   is large.
//!
//! Results are sorted by fused score descending; equal scores keep corpus
//! order.

use crate::error::{Result, SearchError};
use crate::result::{FusedResult, ScoredResult};
use std::collections::HashMap;

/// Reject weights outside `[0, 1]`, NaN and infinities included.
///
/// # Errors
///
/// Returns [`SearchError::InvalidWeight`] for an unusable `alpha`.
pub fn validate_alpha(alpha: f32) -> Result<f32> {
    if alpha.is_finite() && (0.0..=1.0).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(SearchError::InvalidWeight(alpha))
    }
}

#[derive(Debug, Default)]
struct Candidate<'a> {
    content: Option<&'a str>,
    lexical: f32,
    dense: f32,
}

/// Join both result lists by identity and combine their scores.
///
/// `position_of` maps an identity to its corpus position for tie-breaking;
/// unknown identities sort after known ones, then by identity.
///
/// # Errors
///
/// Returns [`SearchError::InvalidWeight`] if `alpha` is not within `[0, 1]`.
pub fn fuse_linear(
    lexical: &[ScoredResult],
    dense: &[ScoredResult],
    alpha: f32,
    position_of: impl Fn(&str) -> Option<usize>,
) -> Result<Vec<FusedResult>> {
    let alpha = validate_alpha(alpha)?;

    let mut order: Vec<&str> = Vec::with_capacity(lexical.len() + dense.len());
    let mut candidates: HashMap<&str, Candidate<'_>> = HashMap::new();

    for hit in lexical {
        let entry = candidates.entry(hit.identity.as_str()).or_insert_with(|| {
            order.push(hit.identity.as_str());
            Candidate::default()
        });
        entry.content = Some(hit.content.as_str());
        entry.lexical = hit.score;
    }

    for hit in dense {
        let entry = candidates.entry(hit.identity.as_str()).or_insert_with(|| {
            order.push(hit.identity.as_str());
            Candidate::default()
        });
        if entry.content.is_none() {
            entry.content = Some(hit.content.as_str());
        }
        entry.dense = hit.score;
    }

    let mut fused: Vec<(Option<usize>, FusedResult)> = order
        .into_iter()
        .filter_map(|identity| {
            let candidate = candidates.remove(identity)?;
            Some((
                position_of(identity),
                FusedResult {
                    identity: identity.to_owned(),
                    content: candidate.content.unwrap_or_default().to_owned(),
                    score: alpha.mul_add(candidate.dense, (1.0 - alpha) * candidate.lexical),
                    lexical_score: candidate.lexical,
                    dense_score: candidate.dense,
                },
            ))
        })
        .collect();

    fused.sort_by(|(pos_a, a), (pos_b, b)| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| pos_a.unwrap_or(usize::MAX).cmp(&pos_b.unwrap_or(usize::MAX)))
            .then_with(|| a.identity.cmp(&b.identity))
    });

    Ok(fused.into_iter().map(|(_, result)| result).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ScoreSource;

    fn hit(identity: &str, score: f32, source: ScoreSource) -> ScoredResult {
        ScoredResult {
            identity: identity.into(),
            content: format!("{identity} via {source:?}"),
            score,
            source,
        }
    }

    fn lex(identity: &str, score: f32) -> ScoredResult {
        hit(identity, score, ScoreSource::Lexical)
    }

    fn dense(identity: &str, score: f32) -> ScoredResult {
        hit(identity, score, ScoreSource::Dense)
    }

    fn by_name(identity: &str) -> Option<usize> {
        ["A", "B", "C"].iter().position(|id| *id == identity)
    }

    #[test]
    fn weighted_sum_of_both_sources() {
        let fused =
            fuse_linear(&[lex("A", 2.0)], &[dense("A", 0.5)], 0.25, by_name).expect("fuse");
        assert_eq!(fused.len(), 1);
        assert!((fused[0].score - (0.25 * 0.5 + 0.75 * 2.0)).abs() < 1e-6);
        assert!((fused[0].lexical_score - 2.0).abs() < f32::EPSILON);
        assert!((fused[0].dense_score - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_source_contributes_zero() {
        let fused =
            fuse_linear(&[lex("A", 1.0)], &[dense("B", 0.8)], 0.5, by_name).expect("fuse");
        let a = fused.iter().find(|r| r.identity == "A").expect("A present");
        let b = fused.iter().find(|r| r.identity == "B").expect("B present");
        assert!((a.score - 0.5).abs() < 1e-6);
        assert!(a.dense_score.abs() < f32::EPSILON);
        assert!((b.score - 0.4).abs() < 1e-6);
        assert!(b.lexical_score.abs() < f32::EPSILON);
    }

    #[test]
    fn union_has_no_duplicates() {
        let fused = fuse_linear(
            &[lex("A", 1.0), lex("B", 0.5)],
            &[dense("B", 0.9), dense("C", 0.1)],
            0.5,
            by_name,
        )
        .expect("fuse");
        let mut ids: Vec<&str> = fused.iter().map(|r| r.identity.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn content_prefers_lexical_hit() {
        let fused = fuse_linear(&[lex("A", 1.0)], &[dense("A", 1.0), dense("B", 1.0)], 0.5, by_name)
            .expect("fuse");
        let a = fused.iter().find(|r| r.identity == "A").expect("A present");
        let b = fused.iter().find(|r| r.identity == "B").expect("B present");
        assert_eq!(a.content, "A via Lexical");
        assert_eq!(b.content, "B via Dense");
    }

    #[test]
    fn extreme_weights_select_a_single_source() {
        let lexical = [lex("A", 3.0), lex("B", 1.0)];
        let dense_hits = [dense("B", 0.9), dense("A", 0.2)];

        let pure_lexical = fuse_linear(&lexical, &dense_hits, 0.0, by_name).expect("fuse");
        assert_eq!(pure_lexical[0].identity, "A");
        assert!((pure_lexical[0].score - 3.0).abs() < f32::EPSILON);

        let pure_dense = fuse_linear(&lexical, &dense_hits, 1.0, by_name).expect("fuse");
        assert_eq!(pure_dense[0].identity, "B");
        assert!((pure_dense[0].score - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn ties_follow_corpus_position() {
        let fused = fuse_linear(
            &[lex("C", 1.0), lex("A", 1.0), lex("B", 1.0)],
            &[],
            0.0,
            by_name,
        )
        .expect("fuse");
        let ids: Vec<&str> = fused.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn unknown_positions_sort_last_then_by_identity() {
        let fused = fuse_linear(&[lex("Y", 1.0), lex("X", 1.0), lex("A", 1.0)], &[], 0.0, by_name)
            .expect("fuse");
        let ids: Vec<&str> = fused.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["A", "X", "Y"]);
    }

    #[test]
    fn empty_inputs_fuse_to_nothing() {
        assert!(fuse_linear(&[], &[], 0.5, by_name).expect("fuse").is_empty());
    }

    #[test]
    fn invalid_weights_are_rejected() {
        for alpha in [-0.1, 1.01, f32::NAN, f32::INFINITY] {
            let err = fuse_linear(&[], &[], alpha, by_name).expect_err("out of range");
            assert!(matches!(err, SearchError::InvalidWeight(_)));
        }
        assert!(validate_alpha(0.0).is_ok());
        assert!(validate_alpha(1.0).is_ok());
    }
}
