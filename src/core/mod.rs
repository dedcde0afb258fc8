pub mod error;

pub use error::{Result, StorageError, StorageResult, TokenError};
