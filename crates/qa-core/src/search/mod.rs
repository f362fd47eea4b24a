//! Search module - similarity scoring and closest-match ranking
//!
//! This module provides:
//! - Query/question normalization and tokenization
//! - Pluggable similarity scorers (token Jaccard, token edit distance)
//! - The closest-match engine that ranks a whole corpus for a query
//! - Confidence bands for ranked matches

pub mod engine;
pub mod scorer;

pub use engine::ClosestMatch;
pub use scorer::{normalize, tokenize, EditDistanceScorer, JaccardScorer, Scorer, ScorerKind};

use serde::{Deserialize, Serialize};

use crate::record::Record;

// Match confidence thresholds
pub const HIGH_CONFIDENCE_THRESHOLD: f32 = 0.85;
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// A record ranked against a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub record: Record,
    pub score: f32,
    pub confidence: MatchType,
}

impl Match {
    pub fn new(record: Record, score: f32) -> Self {
        Self {
            record,
            score,
            confidence: MatchType::from(score),
        }
    }

    /// Answer text of the matched record
    pub fn content(&self) -> &str {
        &self.record.answer
    }
}

/// Type of match based on confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    DirectMatch,   // score >= 0.85
    SimilarMatch,  // 0.5 <= score < 0.85
    WeakMatch,     // score < 0.5
}

impl From<f32> for MatchType {
    fn from(score: f32) -> Self {
        if score >= HIGH_CONFIDENCE_THRESHOLD {
            MatchType::DirectMatch
        } else if score >= LOW_CONFIDENCE_THRESHOLD {
            MatchType::SimilarMatch
        } else {
            MatchType::WeakMatch
        }
    }
}
