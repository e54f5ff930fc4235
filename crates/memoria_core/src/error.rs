//! Error taxonomy for the paste engine and its storage collaborator.
use thiserror::Error;

/// Failures reported by a [`crate::db::PasteStore`] implementation.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Access token already in use")]
    DuplicateAccessToken,

    #[error("Paste '{id}' changed concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        id: String,
        expected: u64,
        found: u64,
    },

    #[error("Storage error: {0}")]
    Message(String),
}

impl From<redb::DatabaseError> for StorageError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TransactionError> for StorageError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TableError> for StorageError {
    fn from(value: redb::TableError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::StorageError> for StorageError {
    fn from(value: redb::StorageError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::CommitError> for StorageError {
    fn from(value: redb::CommitError) -> Self {
        Self::Database(value.into())
    }
}

/// Coarse classification of [`AppError`] for callers mapping to transport codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Conflict,
    StorageFailure,
    InternalFailure,
    Cancelled,
}

/// Top-level error returned by every paste directory operation.
///
/// Expired and privacy-forbidden pastes both surface as [`AppError::NotFound`],
/// and a missing password is indistinguishable from a wrong one. Only logs
/// carry the underlying reason.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    Validation(String),

    #[error("Not found")]
    NotFound,

    #[error("Password required or invalid")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    Storage(StorageError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Request deadline exceeded")]
    DeadlineExceeded,
}

impl AppError {
    /// Classify this error for transport mapping and retry decisions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound => ErrorKind::NotFound,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::StorageFailure,
            Self::Internal(_) => ErrorKind::InternalFailure,
            Self::Cancelled | Self::DeadlineExceeded => ErrorKind::Cancelled,
        }
    }

    /// Whether a caller may reasonably retry the same request unchanged.
    ///
    /// The engine itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::StorageFailure | ErrorKind::Conflict)
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::VersionConflict { .. } => Self::Conflict(value.to_string()),
            other => Self::Storage(other),
        }
    }
}
