use thiserror::Error;

use crate::token::MINIMUM_TOKEN_LENGTH;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error(
        "Token requires a minimum length of {minimum} characters ('{attribute}' declared with {length})",
        minimum = MINIMUM_TOKEN_LENGTH
    )]
    MinimumLength { attribute: String, length: usize },

    #[error("Record type '{type_name}' has no attribute '{attribute}'")]
    UnknownAttribute { type_name: String, attribute: String },

    #[error("Attribute '{attribute}' is not a declared token field of '{type_name}'")]
    UnknownTokenField { type_name: String, attribute: String },

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Secure random source failed: {0}")]
    RandomSource(String),

    #[error("Invalid token configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors reported by a [`RecordStore`](crate::storage::RecordStore).
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Record '{persist_id}' of type '{type_name}' not found")]
    NotFound { type_name: String, persist_id: String },

    #[error("Record of type '{type_name}' has not been persisted")]
    NotPersisted { type_name: String },

    #[error("Record '{persist_id}' of type '{type_name}' already exists")]
    Duplicate { type_name: String, persist_id: String },

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, TokenError>;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}
