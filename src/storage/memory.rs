use super::store::{Cluster, ConditionalStore, StoreError};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// In-process conditional store.
///
/// Every primitive goes through the DashMap entry API, which holds the
/// shard lock for the duration of the compare and the write, so each key
/// sees a single total order of operations.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_local(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|value| value.clone())
    }

    pub fn create_local(&self, key: &str, value: String) -> Option<String> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(current) => Some(current.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(value);
                None
            }
        }
    }

    pub fn replace_local(&self, key: &str, expected: &str, value: String) -> bool {
        match self.entries.get_mut(key) {
            Some(mut current) if current.as_str() == expected => {
                *current = value;
                true
            }
            _ => false,
        }
    }

    pub fn remove_local(&self, key: &str, expected: &str) -> bool {
        self.entries
            .remove_if(key, |_, current| current.as_str() == expected)
            .is_some()
    }
}

#[async_trait]
impl ConditionalStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_local(key))
    }

    async fn create_if_absent(
        &self,
        key: &str,
        value: String,
    ) -> Result<Option<String>, StoreError> {
        Ok(self.create_local(key, value))
    }

    async fn replace_if_matches(
        &self,
        key: &str,
        expected: &str,
        value: String,
    ) -> Result<bool, StoreError> {
        Ok(self.replace_local(key, expected, value))
    }

    async fn remove_if_matches(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        Ok(self.remove_local(key, expected))
    }
}

/// A set of named [`MemoryStore`]s, created on first use.
#[derive(Default)]
pub struct MemoryCluster {
    maps: DashMap<String, Arc<MemoryStore>>,
}

impl MemoryCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn map(&self, name: &str) -> Arc<MemoryStore> {
        self.maps
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::info!("Created shared map {}", name);
                Arc::new(MemoryStore::new())
            })
            .clone()
    }

    pub fn map_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.maps.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }
}

#[async_trait]
impl Cluster for MemoryCluster {
    async fn shared_map(&self, name: &str) -> Result<Arc<dyn ConditionalStore>, StoreError> {
        let store: Arc<dyn ConditionalStore> = self.map(name);
        Ok(store)
    }
}
