//! Silver layer writer

use crate::error::Result;
use crate::etl::Loader;
use crate::model::TaskEvent;
use crate::storage::{ObjectStore, parquet_util};
use std::sync::Arc;

/// Loader that stores the clean record set as one Parquet object
///
/// Each run replaces the previous object. The container is created on first
/// use.
pub struct SilverWriter {
    store: Arc<dyn ObjectStore>,
    container: String,
    object: String,
}

impl SilverWriter {
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

    /// Encode and upload the record set
    pub async fn write_silver(&self, events: &[TaskEvent]) -> Result<()> {
        self.store.ensure_container(&self.container).await?;

        let data = parquet_util::encode_events(events)?;
        log::debug!(
            "Encoded {} event(s) into {} byte(s) of Parquet",
            events.len(),
            data.len()
        );

        self.store
            .write_object(&self.container, &self.object, data)
            .await
    }
}

impl Loader for SilverWriter {
    type Item = TaskEvent;
    type Report = usize;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        self.write_silver(&items).await?;

        log::info!(
            "Wrote {} silver event(s) to {}/{}",
            items.len(),
            self.container,
            self.object
        );
        Ok(items.len())
    }
}
