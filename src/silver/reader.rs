//! Silver layer reader

use crate::error::Result;
use crate::etl::Extractor;
use crate::model::TaskEvent;
use crate::storage::{ObjectStore, parquet_util};
use std::sync::Arc;

/// Extractor reading the silver Parquet object back into events
pub struct SilverReader {
    store: Arc<dyn ObjectStore>,
    container: String,
    object: String,
}

impl SilverReader {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        container: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            store,
            container: container.into(),
            object: object.into(),
        }
    }
}

impl Extractor for SilverReader {
    type Item = TaskEvent;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let data = self.store.read_object(&self.container, &self.object).await?;
        let events = parquet_util::decode_events(data)?;

        log::info!(
            "Read {} silver event(s) from {}/{}",
            events.len(),
            self.container,
            self.object
        );

        Ok(events)
    }
}
