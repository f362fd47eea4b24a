//! Offline corpus builder
//!
//! Turns conversation files into a corpus file. A conversation file looks like
//!
//! ```json
//! {
//!   "categories": ["greetings"],
//!   "conversations": [
//!     ["Hello", "Hi there"],
//!     ["How are you?", "Fine, thanks.", "Glad to hear it."]
//!   ]
//! }
//! ```
//!
//! Each consecutive pair of utterances in a conversation becomes one record,
//! so the second conversation above yields two records.
//!
//! # Example
//!
//! ```no_run
//! use qa_core::builder::CorpusBuilder;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), qa_core::StorageError> {
//! let mut builder = CorpusBuilder::new();
//! builder.add_source(Path::new("./conversations"))?;
//! builder.build().write(Path::new("./corpus.json"))?;
//! # Ok(())
//! # }
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::storage::{CorpusFile, RecordEntry};

/// A conversation source file
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationFile {
    #[serde(default)]
    pub categories: Vec<String>,
    pub conversations: Vec<Vec<String>>,
}

/// Accumulates unique question/answer pairs in insertion order
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    entries: Vec<RecordEntry>,
    seen: HashSet<RecordEntry>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the records of an existing corpus file (append mode)
    pub fn from_corpus_file(file: CorpusFile) -> Self {
        let mut builder = Self::new();
        for entry in file.records {
            builder.add_pair(entry.question, entry.answer);
        }
        builder
    }

    /// Add one pair; returns false if it was blank or already present
    pub fn add_pair(&mut self, question: impl Into<String>, answer: impl Into<String>) -> bool {
        let entry = RecordEntry {
            question: question.into().trim().to_string(),
            answer: answer.into().trim().to_string(),
        };

        if entry.question.is_empty() || entry.answer.is_empty() {
            return false;
        }
        if !self.seen.insert(entry.clone()) {
            return false;
        }

        self.entries.push(entry);
        true
    }

    /// Add every consecutive utterance pair; returns how many were new
    pub fn add_conversation(&mut self, utterances: &[String]) -> usize {
        utterances
            .windows(2)
            .filter(|pair| self.add_pair(pair[0].as_str(), pair[1].as_str()))
            .count()
    }

    /// Add a conversation file, or every `*.json` file below a directory
    ///
    /// Directory entries are visited in sorted path order so rebuilding from
    /// the same sources always produces the same corpus.
    pub fn add_source(&mut self, path: &Path) -> Result<usize, StorageError> {
        if path.is_dir() {
            let mut added = 0;
            for file in collect_json_files(path)? {
                added += self.add_file(&file)?;
            }
            Ok(added)
        } else {
            self.add_file(path)
        }
    }

    fn add_file(&mut self, path: &Path) -> Result<usize, StorageError> {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.to_path_buf())
            } else {
                StorageError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let file: ConversationFile =
            serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;

        let added: usize = file
            .conversations
            .iter()
            .map(|conversation| self.add_conversation(conversation))
            .sum();

        tracing::info!(
            "Added {} pairs from {} (categories: {:?})",
            added,
            path.display(),
            file.categories
        );

        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(self) -> CorpusFile {
        CorpusFile::new(self.entries)
    }
}

fn collect_json_files(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let io_err = |source| StorageError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            files.extend(collect_json_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
