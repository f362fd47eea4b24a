use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::search::tokenize;

/// A stored question/answer pair
///
/// `id` is the record's position in the corpus it was loaded into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: usize,
    pub question: String,
    pub answer: String,
}

/// Ordered, immutable collection of records
///
/// Question tokens are computed once when the corpus is built and kept
/// alongside the records, indexed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    records: Vec<Record>,
    question_tokens: Vec<Vec<String>>,
}

impl Corpus {
    /// Create an empty corpus
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a corpus from question/answer pairs, assigning ids in order
    ///
    /// Fails on the first pair whose question or answer is blank, so a
    /// partially valid input never yields a corpus.
    pub fn from_pairs<I, Q, A>(pairs: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: Into<String>,
        A: Into<String>,
    {
        let mut records = Vec::new();
        let mut question_tokens = Vec::new();

        for (index, (question, answer)) in pairs.into_iter().enumerate() {
            let question = question.into();
            let answer = answer.into();

            if question.trim().is_empty() {
                return Err(StorageError::InvalidRecord {
                    index,
                    reason: "question is empty".to_string(),
                });
            }
            if answer.trim().is_empty() {
                return Err(StorageError::InvalidRecord {
                    index,
                    reason: "answer is empty".to_string(),
                });
            }

            question_tokens.push(tokenize(&question));
            records.push(Record {
                id: index,
                question,
                answer,
            });
        }

        Ok(Self {
            records,
            question_tokens,
        })
    }

    /// Every record, in load order
    pub fn all_records(&self) -> &[Record] {
        &self.records
    }

    /// Tokenized questions, parallel to [`Corpus::all_records`]
    pub fn question_tokens(&self) -> &[Vec<String>] {
        &self.question_tokens
    }

    pub fn get(&self, id: usize) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
