//! Single entry point for answering questions
//!
//! A [`ChatBot`] binds a corpus store, a scorer and a fixed match count. It is
//! constructed once at startup and shared by reference with every request
//! handler.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{QaError, Result};
use crate::search::{tokenize, ClosestMatch, Match, Scorer};
use crate::storage::CorpusStore;

pub struct ChatBot {
    store: Arc<CorpusStore>,
    engine: ClosestMatch,
    match_count: usize,
}

impl ChatBot {
    /// Create a chatbot answering with up to `match_count` answers per query
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `match_count` is zero.
    pub fn new(store: Arc<CorpusStore>, scorer: Arc<dyn Scorer>, match_count: usize) -> Result<Self> {
        if match_count == 0 {
            return Err(QaError::InvalidArgument(
                "match count must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            store,
            engine: ClosestMatch::new(scorer),
            match_count,
        })
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn store(&self) -> &Arc<CorpusStore> {
        &self.store
    }

    pub fn scorer_name(&self) -> &str {
        self.engine.scorer().name()
    }

    /// Ranked answer texts for `text`
    ///
    /// Repeated answer texts collapse onto their highest-ranked occurrence.
    /// An empty result means the corpus had nothing to offer; the caller
    /// decides how to report it.
    pub fn answer_question(&self, text: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::new();

        Ok(self
            .ask(text)?
            .into_iter()
            .map(|m| m.record.answer)
            .filter(|answer| seen.insert(answer.clone()))
            .collect())
    }

    /// Ranked matches for `text` using the configured match count
    pub fn ask(&self, text: &str) -> Result<Vec<Match>> {
        self.ask_with_limit(text, self.match_count)
    }

    /// Ranked matches for `text`, at most `limit` (capped at the match count)
    pub fn ask_with_limit(&self, text: &str, limit: usize) -> Result<Vec<Match>> {
        if limit == 0 {
            return Err(QaError::InvalidArgument("limit must be at least 1".to_string()));
        }
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(QaError::InvalidArgument("question is empty".to_string()));
        }

        let started = Instant::now();
        let corpus = self.store.snapshot();
        let matches = self
            .engine
            .retrieve_tokens(&tokens, &corpus, limit.min(self.match_count))?;

        tracing::debug!(
            elapsed_us = started.elapsed().as_micros() as u64,
            results = matches.len(),
            "Answered question"
        );

        Ok(matches)
    }
}
