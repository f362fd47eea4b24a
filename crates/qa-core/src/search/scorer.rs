use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

lazy_static! {
    /// Han ideographs and kana are single-character tokens since those scripts
    /// don't separate words with spaces; everything else tokenizes into runs
    /// of letters, marks and digits.
    static ref TOKEN_RE: Regex = Regex::new(
        r"[\p{Han}\p{Hiragana}\p{Katakana}]|[[\p{L}\p{M}\p{N}]--[\p{Han}\p{Hiragana}\p{Katakana}]]+"
    )
    .expect("token pattern is valid");
}

/// Lower-case `text` and split it into word tokens
///
/// Punctuation and whitespace only separate tokens, so `"Hello,  World!"`
/// yields `["hello", "world"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Canonical form of `text`: its tokens joined by single spaces
pub fn normalize(text: &str) -> String {
    tokenize(text).join(" ")
}

/// Similarity between a query and a stored question
///
/// Implementations must be pure and deterministic, return a value in
/// `[0.0, 1.0]` (never NaN), give 1.0 for inputs that normalize to the same
/// non-empty text, 0.0 for inputs sharing no token, and 0.0 for an empty query.
///
/// Scoring works on pre-tokenized input so the engine tokenizes a query once
/// per retrieval and each stored question once per load.
pub trait Scorer: Send + Sync {
    fn score_tokens(&self, query: &[String], candidate: &[String]) -> f32;

    /// Score raw text, tokenizing both sides
    fn score(&self, query: &str, candidate: &str) -> f32 {
        self.score_tokens(&tokenize(query), &tokenize(candidate))
    }

    /// Get the name of this scorer
    fn name(&self) -> &str;
}

/// Jaccard index over token sets
#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardScorer;

impl Scorer for JaccardScorer {
    fn score_tokens(&self, query: &[String], candidate: &[String]) -> f32 {
        let query_tokens: HashSet<&str> = query.iter().map(String::as_str).collect();
        if query_tokens.is_empty() {
            return 0.0;
        }
        let candidate_tokens: HashSet<&str> = candidate.iter().map(String::as_str).collect();

        let shared = query_tokens.intersection(&candidate_tokens).count();
        let union = query_tokens.len() + candidate_tokens.len() - shared;

        shared as f32 / union as f32
    }

    fn name(&self) -> &str {
        "jaccard"
    }
}

/// Word-level Levenshtein distance normalized by the longer token sequence
///
/// Sensitive to word order, unlike [`JaccardScorer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EditDistanceScorer;

impl EditDistanceScorer {
    fn distance(a: &[String], b: &[String]) -> usize {
        let mut previous: Vec<usize> = (0..=b.len()).collect();
        let mut current = vec![0; b.len() + 1];

        for (i, left) in a.iter().enumerate() {
            current[0] = i + 1;
            for (j, right) in b.iter().enumerate() {
                let substitution = previous[j] + usize::from(left != right);
                current[j + 1] = substitution
                    .min(previous[j + 1] + 1)
                    .min(current[j] + 1);
            }
            std::mem::swap(&mut previous, &mut current);
        }

        previous[b.len()]
    }
}

impl Scorer for EditDistanceScorer {
    fn score_tokens(&self, query: &[String], candidate: &[String]) -> f32 {
        if query.is_empty() {
            return 0.0;
        }

        let longest = query.len().max(candidate.len());
        let distance = Self::distance(query, candidate);

        (1.0 - distance as f32 / longest as f32).clamp(0.0, 1.0)
    }

    fn name(&self) -> &str {
        "edit_distance"
    }
}

/// Scorer selection, as named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorerKind {
    #[default]
    Jaccard,
    EditDistance,
}

impl ScorerKind {
    pub fn build(self) -> Arc<dyn Scorer> {
        match self {
            ScorerKind::Jaccard => Arc::new(JaccardScorer),
            ScorerKind::EditDistance => Arc::new(EditDistanceScorer),
        }
    }
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jaccard" => Ok(ScorerKind::Jaccard),
            "edit_distance" | "edit-distance" | "levenshtein" => Ok(ScorerKind::EditDistance),
            other => Err(format!("Unknown scorer: {}", other)),
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScorerKind::Jaccard => write!(f, "jaccard"),
            ScorerKind::EditDistance => write!(f, "edit_distance"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tokenize_folds_case_and_strips_punctuation() {
        assert_eq!(tokenize("  Hello,   WORLD!  "), vec!["hello", "world"]);
        assert_eq!(normalize("What's\tup?"), "what s up");
        assert!(tokenize("?! ... ").is_empty());
    }

    #[test]
    fn test_tokenize_splits_cjk_per_character() {
        assert_eq!(tokenize("你好吗"), vec!["你", "好", "吗"]);
        assert_eq!(tokenize("rust语言"), vec!["rust", "语", "言"]);
    }

    #[test]
    fn test_jaccard_identical_and_disjoint() {
        let scorer = JaccardScorer;
        assert_eq!(scorer.score("Hello there", "hello   THERE!"), 1.0);
        assert_eq!(scorer.score("hello", "goodbye"), 0.0);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let scorer = JaccardScorer;
        // {hello} vs {hello, there}
        assert!((scorer.score("hello", "hello there") - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        assert_eq!(JaccardScorer.score("", "hello"), 0.0);
        assert_eq!(JaccardScorer.score("", ""), 0.0);
        assert_eq!(EditDistanceScorer.score("   ", "hello"), 0.0);
        assert_eq!(EditDistanceScorer.score("", ""), 0.0);
    }

    #[test]
    fn test_edit_distance_scores() {
        let scorer = EditDistanceScorer;
        assert_eq!(scorer.score("how are you", "How are you?"), 1.0);
        assert_eq!(scorer.score("a b", "c d"), 0.0);
        // one substitution out of three words
        assert!((scorer.score("how are you", "how old you") - 2.0 / 3.0).abs() < 1e-6);
        // word order matters
        assert!(scorer.score("are you how", "how are you") < 1.0);
    }

    #[test]
    fn test_token_and_text_scoring_agree() {
        let query = tokenize("How are you?");
        let candidate = tokenize("how old are you");
        for scorer in [ScorerKind::Jaccard.build(), ScorerKind::EditDistance.build()] {
            assert_eq!(
                scorer.score_tokens(&query, &candidate),
                scorer.score("How are you?", "how old are you")
            );
        }
    }

    #[test]
    fn test_scorer_kind_parse_and_display() {
        assert_eq!("jaccard".parse::<ScorerKind>().unwrap(), ScorerKind::Jaccard);
        assert_eq!("Levenshtein".parse::<ScorerKind>().unwrap(), ScorerKind::EditDistance);
        assert!("cosine".parse::<ScorerKind>().is_err());
        assert_eq!(ScorerKind::EditDistance.to_string(), "edit_distance");
        assert_eq!(ScorerKind::Jaccard.build().name(), "jaccard");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn scores_stay_in_unit_range(a in ".{0,40}", b in ".{0,40}") {
            for scorer in [ScorerKind::Jaccard.build(), ScorerKind::EditDistance.build()] {
                let s = scorer.score(&a, &b);
                prop_assert!(!s.is_nan());
                prop_assert!((0.0..=1.0).contains(&s));
            }
        }

        #[test]
        fn identical_text_scores_one(text in "[a-zA-Z]{1,8}( [a-zA-Z]{1,8}){0,5}") {
            prop_assert_eq!(JaccardScorer.score(&text, &text), 1.0);
            prop_assert_eq!(EditDistanceScorer.score(&text, &text), 1.0);
        }

        #[test]
        fn scoring_is_deterministic(a in "[a-z ]{0,30}", b in "[a-z ]{0,30}") {
            prop_assert_eq!(JaccardScorer.score(&a, &b), JaccardScorer.score(&a, &b));
            prop_assert_eq!(EditDistanceScorer.score(&a, &b), EditDistanceScorer.score(&a, &b));
        }
    }
}
