use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::store::{ListingStore, StoreError};

/// Map-backed store for tests and local demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryListingStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store mutex poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ListingStore for InMemoryListingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
