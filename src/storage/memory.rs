//! In-memory object store

use super::ObjectStore;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Object store held entirely in process memory
///
/// Useful for tests and dry runs; contents vanish when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    containers: Mutex<HashMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, creating its container when needed
    pub fn insert(&self, container: &str, name: &str, data: impl Into<Vec<u8>>) {
        let mut containers = self.lock();
        containers
            .entry(container.to_string())
            .or_default()
            .insert(name.to_string(), data.into());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, BTreeMap<String, Vec<u8>>>> {
        self.containers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_objects(&self, container: &str, prefix: &str) -> Result<Vec<String>> {
        let containers = self.lock();
        Ok(containers
            .get(container)
            .map(|objects| {
                objects
                    .keys()
                    .filter(|name| name.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn read_object(&self, container: &str, name: &str) -> Result<Vec<u8>> {
        let containers = self.lock();
        containers
            .get(container)
            .and_then(|objects| objects.get(name))
            .cloned()
            .ok_or_else(|| PipelineError::ObjectNotFound {
                container: container.to_string(),
                name: name.to_string(),
            })
    }

    async fn ensure_container(&self, container: &str) -> Result<()> {
        self.lock().entry(container.to_string()).or_default();
        Ok(())
    }

    async fn write_object(&self, container: &str, name: &str, data: Vec<u8>) -> Result<()> {
        let mut containers = self.lock();
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| PipelineError::ContainerNotFound(container.to_string()))?;
        objects.insert(name.to_string(), data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_requires_container() {
        let store = MemoryObjectStore::new();
        let err = store
            .write_object("processed", "x", b"1".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ContainerNotFound(_)));

        store.ensure_container("processed").await.unwrap();
        store.ensure_container("processed").await.unwrap();
        store
            .write_object("processed", "x", b"1".to_vec())
            .await
            .unwrap();
        assert_eq!(store.read_object("processed", "x").await.unwrap(), b"1");
    }

    #[tokio::test]
    async fn test_prefix_listing() {
        let store = MemoryObjectStore::new();
        store.insert("raw", "task_events_b.json", "[]");
        store.insert("raw", "task_events_a.json", "[]");
        store.insert("raw", "users.json", "[]");

        let names = store.list_objects("raw", "task_events").await.unwrap();
        assert_eq!(names, vec!["task_events_a.json", "task_events_b.json"]);
    }
}
