//! Corpus storage layer
//!
//! The corpus lives on disk as a versioned JSON document and in memory as an
//! immutable [`Corpus`] published behind a reference-counted snapshot.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StorageError;
use crate::record::Corpus;

/// Current on-disk corpus format version
pub const CORPUS_FORMAT_VERSION: u32 = 1;

/// A question/answer pair as persisted in the corpus file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordEntry {
    pub question: String,
    pub answer: String,
}

/// Serialized form of the corpus file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusFile {
    pub version: u32,
    pub records: Vec<RecordEntry>,
}

impl CorpusFile {
    pub fn new(records: Vec<RecordEntry>) -> Self {
        Self {
            version: CORPUS_FORMAT_VERSION,
            records,
        }
    }

    /// Read and decode a corpus file
    ///
    /// The version is checked here but record contents are validated by
    /// [`CorpusFile::into_corpus`].
    pub fn read(path: &Path) -> Result<Self, StorageError> {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                StorageError::NotFound(path.to_path_buf())
            } else {
                StorageError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let file: CorpusFile =
            serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;

        if file.version != CORPUS_FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: file.version,
                expected: CORPUS_FORMAT_VERSION,
            });
        }

        Ok(file)
    }

    /// Write the corpus file, replacing any existing file atomically
    ///
    /// Content goes to a uniquely named temp file in the target directory and
    /// is renamed into place, so a concurrent reader sees either the old or the
    /// new corpus. The temp file is removed if the rename fails.
    pub fn write(&self, path: &Path) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_vec_pretty(self).map_err(|source| StorageError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

        let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(io_err)?;
                parent
            }
            None => Path::new("."),
        };

        let mut temp_file = tempfile::Builder::new()
            .prefix(".corpus-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(io_err)?;
        temp_file.write_all(&json).map_err(io_err)?;
        temp_file.flush().map_err(io_err)?;

        // On failure the returned handle is dropped, deleting the temp file
        temp_file.persist(path).map_err(|e| io_err(e.error))?;

        tracing::info!("Wrote {} records to {}", self.records.len(), path.display());
        Ok(())
    }

    /// Validate every record and build an in-memory corpus
    pub fn into_corpus(self) -> Result<Corpus, StorageError> {
        Corpus::from_pairs(
            self.records
                .into_iter()
                .map(|entry| (entry.question, entry.answer)),
        )
    }
}

impl From<&Corpus> for CorpusFile {
    fn from(corpus: &Corpus) -> Self {
        Self::new(
            corpus
                .all_records()
                .iter()
                .map(|record| RecordEntry {
                    question: record.question.clone(),
                    answer: record.answer.clone(),
                })
                .collect(),
        )
    }
}

/// Load a corpus file in full
///
/// All-or-nothing: any I/O, decoding or validation failure returns an error
/// and no partial corpus.
pub fn load(path: &Path) -> Result<Corpus, StorageError> {
    CorpusFile::read(path)?.into_corpus()
}

/// Owner of the in-memory corpus
///
/// Readers take an `Arc<Corpus>` snapshot and score against it without holding
/// any lock. [`CorpusStore::reload`] builds a complete new corpus before
/// swapping the published snapshot, so in-flight queries finish against the
/// snapshot they started with.
pub struct CorpusStore {
    path: Option<PathBuf>,
    current: RwLock<Arc<Corpus>>,
}

impl CorpusStore {
    /// Load the corpus file at `path` and publish it
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let corpus = load(&path)?;

        tracing::info!("Loaded {} records from {}", corpus.len(), path.display());

        Ok(Self {
            path: Some(path),
            current: RwLock::new(Arc::new(corpus)),
        })
    }

    /// Wrap an already-built corpus (no backing file)
    pub fn from_corpus(corpus: Corpus) -> Self {
        Self {
            path: None,
            current: RwLock::new(Arc::new(corpus)),
        }
    }

    /// The currently published corpus
    pub fn snapshot(&self) -> Arc<Corpus> {
        Arc::clone(&*self.current.read())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    /// Re-read the backing file and swap in the new corpus
    ///
    /// On failure the previous snapshot stays published.
    pub fn reload(&self) -> Result<usize, StorageError> {
        let path = self.path.as_ref().ok_or(StorageError::NoBackingFile)?;

        let corpus = match load(path) {
            Ok(corpus) => Arc::new(corpus),
            Err(e) => {
                tracing::warn!("Reload of {} failed, keeping current corpus: {}", path.display(), e);
                return Err(e);
            }
        };
        let count = corpus.len();

        *self.current.write() = corpus;

        tracing::info!("Reloaded {} records from {}", count, path.display());
        Ok(count)
    }
}
