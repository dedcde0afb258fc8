use super::{RecordState, RecordStore};
use crate::core::{StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

type StateKey = (String, String);

/// Record store that keeps every state in a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    states: RwLock<HashMap<StateKey, RecordState>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records of `type_name`.
    pub fn count(&self, type_name: &str) -> StorageResult<usize> {
        let states = self.states.read()?;
        Ok(states.keys().filter(|(ty, _)| ty == type_name).count())
    }

    /// Number of stored records across all types.
    pub fn len(&self) -> StorageResult<usize> {
        Ok(self.states.read()?.len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    fn key(type_name: &str, persist_id: &str) -> StateKey {
        (type_name.to_string(), persist_id.to_string())
    }

    fn not_found(type_name: &str, persist_id: &str) -> StorageError {
        StorageError::NotFound {
            type_name: type_name.to_string(),
            persist_id: persist_id.to_string(),
        }
    }
}

impl RecordStore for InMemoryRecordStore {
    fn insert(&self, state: RecordState) -> StorageResult<()> {
        let mut states = self.states.write()?;
        let key = Self::key(&state.type_name, &state.persist_id);

        if states.contains_key(&key) {
            return Err(StorageError::Duplicate {
                type_name: state.type_name,
                persist_id: state.persist_id,
            });
        }

        states.insert(key, state);
        Ok(())
    }

    fn update(&self, state: RecordState) -> StorageResult<()> {
        let mut states = self.states.write()?;
        let key = Self::key(&state.type_name, &state.persist_id);

        match states.get_mut(&key) {
            Some(existing) => {
                *existing = state;
                Ok(())
            }
            None => Err(Self::not_found(&state.type_name, &state.persist_id)),
        }
    }

    fn fetch(&self, type_name: &str, persist_id: &str) -> StorageResult<RecordState> {
        let states = self.states.read()?;
        states
            .get(&Self::key(type_name, persist_id))
            .cloned()
            .ok_or_else(|| Self::not_found(type_name, persist_id))
    }

    fn delete(&self, type_name: &str, persist_id: &str) -> StorageResult<()> {
        let mut states = self.states.write()?;
        states
            .remove(&Self::key(type_name, persist_id))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(type_name, persist_id))
    }
}
