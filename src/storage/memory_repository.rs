use std::collections::HashMap;
use std::sync::Mutex;

use super::{DocumentRepository, StorageKey};
use crate::error::{Error, Result};
use crate::models::quiz::QuizDocument;

/// Serialized documents kept in process memory, keyed like browser local storage.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, as it would appear in local storage.
    pub fn raw(&self, key: &StorageKey) -> Option<String> {
        self.lock().ok()?.get(key.as_str()).cloned()
    }

    pub fn insert_raw(&self, key: &StorageKey, value: impl Into<String>) -> Result<()> {
        self.lock()?.insert(key.as_str().to_string(), value.into());
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Internal("memory repository mutex poisoned".to_string()))
    }
}

impl DocumentRepository for MemoryRepository {
    fn load(&self, key: &StorageKey) -> Result<Option<QuizDocument>> {
        let raw = match self.lock()?.get(key.as_str()) {
            Some(raw) => raw.clone(),
            None => return Ok(None),
        };
        let document = serde_json::from_str(&raw)
            .map_err(|e| Error::Format(format!("stored document {} is unreadable: {}", key, e)))?;
        Ok(Some(document))
    }

    fn save(&self, key: &StorageKey, document: &QuizDocument) -> Result<()> {
        let raw = serde_json::to_string(document)?;
        self.lock()?.insert(key.as_str().to_string(), raw);
        Ok(())
    }
}
