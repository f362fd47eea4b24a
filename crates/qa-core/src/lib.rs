//! QA Core - Corpus store and closest-match engine for question answering
//!
//! This crate provides:
//! - Record and Corpus types
//! - The persisted corpus file format and a snapshot-publishing store
//! - Similarity scorers and the closest-match ranking engine
//! - The `ChatBot` facade that request handlers call
//! - An offline corpus builder for conversation files
//! - Configuration management

pub mod builder;
pub mod config;
pub mod error;
pub mod facade;
pub mod record;
pub mod search;
pub mod storage;

// Re-export commonly used types
pub use builder::CorpusBuilder;
pub use config::ServiceConfig;
pub use error::{QaError, Result, StorageError};
pub use facade::ChatBot;
pub use record::{Corpus, Record};
pub use search::{ClosestMatch, Match, MatchType, Scorer, ScorerKind};
pub use storage::{CorpusFile, CorpusStore, RecordEntry};
