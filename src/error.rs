//! Error types for the record store and aggregation engine.
//!
//! Every failure of a store mutation or an aggregation query is a named
//! outcome; front ends translate these into user-visible messages.

use crate::models::StudentId;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of record store operations and aggregation queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The referenced student does not exist.
    #[error("student {0} not found")]
    StudentNotFound(StudentId),

    /// The student exists but has no score for the subject.
    #[error("subject '{subject}' not found for student {id}")]
    SubjectNotFound { id: StudentId, subject: String },

    /// The query ran over an empty score set.
    #[error("no score data")]
    NoData,

    /// Input failed validation before reaching the store.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Every identifier has been handed out.
    #[error("identifier space exhausted")]
    IdsExhausted,
}

impl RecordError {
    /// Returns `true` for either kind of missing-record error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RecordError::StudentNotFound(_) | RecordError::SubjectNotFound { .. }
        )
    }
}

/// Failures reading or writing the backing data file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode dataset: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
