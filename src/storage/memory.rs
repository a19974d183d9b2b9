use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::errors::PersistenceError;

use super::{Result, SnapshotStore};

/// In-process slots, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `key` with a raw payload, bypassing serialization.
    pub fn with_slot(self, key: &str, payload: impl Into<String>) -> Self {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(key.to_string(), payload.into());
        }
        self
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| PersistenceError::Corrupt("memory store lock poisoned".into()))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| PersistenceError::Corrupt("memory store lock poisoned".into()))?;
        slots.insert(key.to_string(), payload.to_string());
        Ok(())
    }
}
