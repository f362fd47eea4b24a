//! Closest-match ranking over a whole corpus
//!
//! Every record is scored against the query (linear scan), then ranked by
//! score descending with ties broken by ascending corpus position. The
//! ordering is total, so results are reproducible across runs and a smaller
//! `k` always yields a prefix of a larger one.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{QaError, Result};
use crate::record::Corpus;
use crate::search::scorer::{tokenize, Scorer};
use crate::search::Match;

/// Ranks corpus records against a query using a bound scorer
#[derive(Clone)]
pub struct ClosestMatch {
    scorer: Arc<dyn Scorer>,
}

impl ClosestMatch {
    pub fn new(scorer: Arc<dyn Scorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    /// Return the top `k` matches for `query`
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `k` is zero.
    ///
    /// An empty query (after normalization) or an empty corpus yields an
    /// empty result. Otherwise exactly `min(k, corpus.len())` matches are
    /// returned, including zero-score ones.
    pub fn retrieve(&self, query: &str, corpus: &Corpus, k: usize) -> Result<Vec<Match>> {
        self.retrieve_tokens(&tokenize(query), corpus, k)
    }

    /// [`ClosestMatch::retrieve`] for a query that is already tokenized
    pub fn retrieve_tokens(
        &self,
        query_tokens: &[String],
        corpus: &Corpus,
        k: usize,
    ) -> Result<Vec<Match>> {
        if k == 0 {
            return Err(QaError::InvalidArgument(
                "match count must be at least 1".to_string(),
            ));
        }

        if query_tokens.is_empty() || corpus.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = corpus
            .all_records()
            .iter()
            .zip(corpus.question_tokens())
            .map(|(record, tokens)| {
                let score = self.scorer.score_tokens(query_tokens, tokens);
                (record.id, clamp_score(score))
            })
            .collect();

        // Only the first k positions need a full sort
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, rank_order);
            scored.truncate(k);
        }
        scored.sort_unstable_by(rank_order);

        let matches = scored
            .into_iter()
            .filter_map(|(id, score)| corpus.get(id).map(|record| Match::new(record.clone(), score)))
            .collect::<Vec<_>>();

        tracing::debug!(
            "Ranked {} records with {}, returning {}",
            corpus.len(),
            self.scorer.name(),
            matches.len()
        );

        Ok(matches)
    }
}

fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Score descending, then corpus position ascending
fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{JaccardScorer, MatchType};

    fn engine() -> ClosestMatch {
        ClosestMatch::new(Arc::new(JaccardScorer))
    }

    fn answers(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.content()).collect()
    }

    #[test]
    fn test_exact_match_first() {
        let corpus = Corpus::from_pairs([("hello", "hi there"), ("bye", "goodbye")]).unwrap();
        let matches = engine().retrieve("hello", &corpus, 1).unwrap();

        assert_eq!(answers(&matches), vec!["hi there"]);
        assert_eq!(matches[0].score, 1.0);
        assert_eq!(matches[0].confidence, MatchType::DirectMatch);
    }

    #[test]
    fn test_exact_text_ranked_above_partial() {
        let corpus =
            Corpus::from_pairs([("hello there", "hey!"), ("hello", "hi there")]).unwrap();
        let matches = engine().retrieve("hello", &corpus, 2).unwrap();

        assert_eq!(answers(&matches), vec!["hi there", "hey!"]);
        assert!(matches[0].score > matches[1].score);
    }

    #[test]
    fn test_ties_break_by_corpus_order() {
        let corpus = Corpus::from_pairs([
            ("alpha", "first"),
            ("beta", "second"),
            ("gamma", "third"),
        ])
        .unwrap();

        // Nothing overlaps: all zero, so corpus order decides
        let matches = engine().retrieve("delta", &corpus, 3).unwrap();
        assert_eq!(answers(&matches), vec!["first", "second", "third"]);
        assert!(matches.iter().all(|m| m.score == 0.0));
    }

    #[test]
    fn test_zero_scores_fill_up_to_k() {
        let corpus = Corpus::from_pairs([("hello", "hi"), ("bye", "goodbye"), ("thanks", "np")])
            .unwrap();
        let matches = engine().retrieve("hello", &corpus, 5).unwrap();

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].content(), "hi");
        assert_eq!(answers(&matches[1..]), vec!["goodbye", "np"]);
    }

    #[test]
    fn test_zero_k_rejected() {
        let corpus = Corpus::from_pairs([("hello", "hi")]).unwrap();
        let err = engine().retrieve("hello", &corpus, 0).unwrap_err();
        assert!(matches!(err, QaError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_corpus_returns_nothing() {
        let matches = engine().retrieve("anything", &Corpus::empty(), 5).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_blank_query_returns_nothing() {
        let corpus = Corpus::from_pairs([("hello", "hi")]).unwrap();
        assert!(engine().retrieve("", &corpus, 3).unwrap().is_empty());
        assert!(engine().retrieve(" ?! ", &corpus, 3).unwrap().is_empty());
    }

    #[test]
    fn test_match_carries_record_identity() {
        let corpus = Corpus::from_pairs([("bye", "goodbye"), ("hello", "hi")]).unwrap();
        let matches = engine().retrieve("hello", &corpus, 1).unwrap();
        assert_eq!(matches[0].record.id, 1);
        assert_eq!(matches[0].record.question, "hello");
    }

    struct NanScorer;

    impl Scorer for NanScorer {
        fn score_tokens(&self, _query: &[String], candidate: &[String]) -> f32 {
            if candidate == ["broken"] {
                f32::NAN
            } else {
                2.0
            }
        }

        fn name(&self) -> &str {
            "nan"
        }
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let corpus = Corpus::from_pairs([("broken", "a"), ("fine", "b")]).unwrap();
        let matches = ClosestMatch::new(Arc::new(NanScorer))
            .retrieve("query", &corpus, 2)
            .unwrap();

        assert_eq!(answers(&matches), vec!["b", "a"]);
        assert_eq!(matches[0].score, 1.0);
        assert_eq!(matches[1].score, 0.0);
    }
}
