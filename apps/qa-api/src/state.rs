//! Application state for the QA server
//!
//! Holds the configured chatbot shared by every request handler.

use anyhow::{Context, Result};
use qa_core::{ChatBot, CorpusStore, ServiceConfig};
use std::sync::Arc;
use tracing::info;

/// Shared application state
pub struct AppState {
    /// Configured question answering facade
    pub bot: Arc<ChatBot>,
}

impl AppState {
    /// Load the corpus and build the chatbot from configuration
    ///
    /// Any failure here aborts startup; the server never runs with a partial
    /// or missing corpus.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        info!("Loading corpus from {}", config.corpus_path.display());

        let store = CorpusStore::open(&config.corpus_path)
            .with_context(|| format!("Failed to initialize storage at {}", config.corpus_path.display()))?;

        let bot = ChatBot::new(Arc::new(store), config.scorer.build(), config.match_count)
            .context("Invalid match count")?;

        info!(
            "Chatbot ready: {} records, match_count={}, scorer={}",
            bot.store().len(),
            bot.match_count(),
            bot.scorer_name()
        );

        Ok(Self::from_bot(bot))
    }

    pub fn from_bot(bot: ChatBot) -> Self {
        Self { bot: Arc::new(bot) }
    }
}
