use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or persisting the corpus
#[derive(Debug, Error)]
pub enum StorageError {
    /// The corpus file does not exist
    #[error("Corpus file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The corpus file exists but could not be read or written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is truncated or is not a valid corpus document
    #[error("Corrupt corpus file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file was written by an incompatible format version
    #[error("Unsupported corpus format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// A record violates the non-empty question/answer invariant
    #[error("Invalid record at position {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    /// The store was built in memory and has no file to reload from
    #[error("Corpus store has no backing file")]
    NoBackingFile,
}

/// Errors surfaced by the matching engine and the facade
#[derive(Debug, Error)]
pub enum QaError {
    /// Blank query text or a non-positive match count
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, QaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_messages() {
        let err = StorageError::NotFound(PathBuf::from("/tmp/missing.json"));
        assert_eq!(err.to_string(), "Corpus file not found: /tmp/missing.json");

        let err = StorageError::InvalidRecord {
            index: 3,
            reason: "question is empty".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid record at position 3: question is empty");
    }

    #[test]
    fn test_storage_error_converts_into_qa_error() {
        let err: QaError = StorageError::NoBackingFile.into();
        assert!(matches!(err, QaError::Storage(StorageError::NoBackingFile)));
        assert_eq!(err.to_string(), "Corpus store has no backing file");
    }
}
