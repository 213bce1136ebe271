//! Raw events extractor
//!
//! Reads every landing object whose name starts with the configured prefix.
//! Each object is a UTF-8 JSON array of flat record mappings.

use crate::error::{PipelineError, Result};
use crate::etl::Extractor;
use crate::model::RawEvent;
use crate::storage::ObjectStore;
use std::sync::Arc;

/// Extractor for the bronze layer
///
/// # Example
/// ```no_run
/// use medallion_etl::bronze::RawEventsExtractor;
/// use medallion_etl::etl::Extractor;
/// use medallion_etl::storage::LocalObjectStore;
/// use std::sync::Arc;
///
/// # async fn example() -> medallion_etl::error::Result<()> {
/// let store = Arc::new(LocalObjectStore::new("/data/lake"));
/// let extractor = RawEventsExtractor::new(store, "raw", "task_events");
/// let events = extractor.extract().await?;
/// # Ok(())
/// # }
/// ```
pub struct RawEventsExtractor {
    store: Arc<dyn ObjectStore>,
    container: String,
    prefix: String,
}

impl RawEventsExtractor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        container: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            container: container.into(),
            prefix: prefix.into(),
        }
    }

    /// Read every matching object and concatenate their records
    ///
    /// Fails with [`PipelineError::EmptySource`] when no records are found at
    /// all, which points at a misconfigured prefix or an empty landing zone.
    pub async fn read_raw_events(&self) -> Result<Vec<RawEvent>> {
        let names = self
            .store
            .list_objects(&self.container, &self.prefix)
            .await?;
        log::debug!(
            "Found {} raw object(s) in '{}' matching '{}'",
            names.len(),
            self.container,
            self.prefix
        );

        let mut events = Vec::new();
        for name in names {
            let data = self.store.read_object(&self.container, &name).await?;
            let records: Vec<RawEvent> = serde_json::from_slice(&data)
                .map_err(|e| PipelineError::json(format!("raw object '{}'", name), e))?;
            log::debug!("Read {} record(s) from {}", records.len(), name);
            events.extend(records);
        }

        if events.is_empty() {
            return Err(PipelineError::EmptySource {
                container: self.container.clone(),
                prefix: self.prefix.clone(),
            });
        }

        Ok(events)
    }
}

impl Extractor for RawEventsExtractor {
    type Item = RawEvent;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let events = self.read_raw_events().await?;

        log::info!("Extracted {} raw event(s)", events.len());

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStore;
    use serde_json::json;

    fn extractor(store: MemoryObjectStore) -> RawEventsExtractor {
        RawEventsExtractor::new(Arc::new(store), "raw", "task_events")
    }

    #[tokio::test]
    async fn test_concatenates_matching_objects() {
        let store = MemoryObjectStore::new();
        store.insert(
            "raw",
            "task_events_1.json",
            r#"[{"event_id": 1, "task_id": "t1"}, {"event_id": 2, "task_id": "t2"}]"#,
        );
        store.insert(
            "raw",
            "task_events_2.json",
            r#"[{"event_id": 3, "extra": true}]"#,
        );
        store.insert("raw", "users.json", r#"[{"user": "x"}]"#);

        let events = extractor(store).extract().await.unwrap();

        assert_eq!(events.len(), 3);
        // No projection at this stage
        assert_eq!(events[2].get("extra"), Some(&json!(true)));
        assert!(events.iter().all(|e| !e.contains_key("user")));
    }

    #[tokio::test]
    async fn test_empty_arrays_are_an_empty_source() {
        let store = MemoryObjectStore::new();
        store.insert("raw", "task_events_1.json", "[]");

        let err = extractor(store).extract().await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptySource { .. }));
    }

    #[tokio::test]
    async fn test_no_matching_objects_is_an_empty_source() {
        let store = MemoryObjectStore::new();
        store.insert("raw", "orders.json", r#"[{"event_id": 1}]"#);

        let err = extractor(store).extract().await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptySource { .. }));
    }

    #[tokio::test]
    async fn test_non_array_object_fails() {
        let store = MemoryObjectStore::new();
        store.insert("raw", "task_events_1.json", r#"{"event_id": 1}"#);

        let err = extractor(store).extract().await.unwrap_err();
        assert!(matches!(err, PipelineError::Json { .. }));
    }
}
