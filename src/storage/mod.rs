//! Storage collaborator boundary.
//!
//! Records reach storage as [`RecordState`] snapshots; any backend that can
//! insert, update, fetch and delete them implements [`RecordStore`].

pub mod memory;

pub use memory::InMemoryRecordStore;

use crate::core::{Result, StorageError, StorageResult};
use crate::record::{Record, RecordMetadata};
use serde::{Deserialize, Serialize};

/// Raw state of a record as handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordState {
    pub persist_id: String,
    pub type_name: String,
    pub metadata: RecordMetadata,
    pub fields: serde_json::Value,
}

impl RecordState {
    /// Serializes `record` together with the metadata it will be stored under.
    pub fn capture<R: Record>(record: &R, metadata: RecordMetadata) -> Result<Self> {
        let persist_id = metadata.persist_id.clone().ok_or_else(|| {
            StorageError::Backend(format!(
                "cannot store a {} without a persist id",
                R::type_name()
            ))
        })?;

        Ok(Self {
            persist_id,
            type_name: R::type_name().to_string(),
            metadata,
            fields: serde_json::to_value(record)?,
        })
    }

    /// Rebuilds a record from its stored state.
    pub fn into_record<R: Record>(self) -> Result<R> {
        let mut record: R = serde_json::from_value(self.fields)?;
        *record.metadata_mut() = self.metadata;
        Ok(record)
    }

    /// Returns a string field of the stored state.
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(serde_json::Value::as_str)
    }
}

/// Persistence backend for record states.
pub trait RecordStore: Send + Sync {
    /// Stores a state that does not exist yet.
    fn insert(&self, state: RecordState) -> StorageResult<()>;
    /// Overwrites an existing state.
    fn update(&self, state: RecordState) -> StorageResult<()>;
    fn fetch(&self, type_name: &str, persist_id: &str) -> StorageResult<RecordState>;
    fn delete(&self, type_name: &str, persist_id: &str) -> StorageResult<()>;
}
