//! Incremental gold loader

use super::{EventSink, WatermarkStore};
use crate::error::Result;
use crate::etl::Loader;
use crate::model::{GoldRow, TaskEvent};
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Outcome of one incremental load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResult {
    /// Nothing newer than the watermark; sink and watermark were left alone
    UpToDate { watermark: NaiveDateTime },
    /// `rows` events were appended and the watermark advanced
    Loaded {
        rows: usize,
        watermark: NaiveDateTime,
    },
}

impl LoadResult {
    pub fn rows_loaded(&self) -> usize {
        match self {
            Self::UpToDate { .. } => 0,
            Self::Loaded { rows, .. } => *rows,
        }
    }

    /// Watermark in effect after the run
    pub fn watermark(&self) -> NaiveDateTime {
        match self {
            Self::UpToDate { watermark } | Self::Loaded { watermark, .. } => *watermark,
        }
    }
}

/// Loader appending only events newer than the pipeline's watermark
///
/// Per run:
/// 1. Read the watermark (fails if the pipeline was never initialized)
/// 2. Keep events with `event_time` strictly after it
/// 3. Stop with [`LoadResult::UpToDate`] when nothing is left
/// 4. Append the remaining events to the sink
/// 5. Set the watermark to the newest `event_time` appended
///
/// Step 5 never runs unless step 4 returned successfully. Concurrent runs
/// against the same pipeline name are not coordinated here and must be
/// serialized by the caller.
///
/// # Example
/// ```no_run
/// use medallion_etl::gold::{IncrementalLoader, NdjsonSink, JsonWatermarkStore};
/// use std::sync::Arc;
///
/// # async fn example(events: Vec<medallion_etl::model::TaskEvent>) -> medallion_etl::error::Result<()> {
/// let loader = IncrementalLoader::new(
///     Arc::new(NdjsonSink::new("/data/warehouse")),
///     Arc::new(JsonWatermarkStore::new("/data/warehouse/etl_watermark.json")),
///     "gold_task_events",
///     "task_events_gold",
/// );
/// let result = loader.load_incremental(events).await?;
/// println!("loaded {} row(s)", result.rows_loaded());
/// # Ok(())
/// # }
/// ```
pub struct IncrementalLoader {
    sink: Arc<dyn EventSink>,
    watermarks: Arc<dyn WatermarkStore>,
    pipeline_name: String,
    table: String,
}

impl IncrementalLoader {
    pub fn new(
        sink: Arc<dyn EventSink>,
        watermarks: Arc<dyn WatermarkStore>,
        pipeline_name: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            watermarks,
            pipeline_name: pipeline_name.into(),
            table: table.into(),
        }
    }

    /// Run one incremental load of the clean record set
    ///
    /// # Errors
    /// - [`WatermarkNotFound`](crate::error::PipelineError::WatermarkNotFound)
    ///   when the pipeline has no watermark row
    /// - Any sink error, in which case the watermark is untouched
    /// - Any watermark write error after a successful append; the next run
    ///   reloads the same window
    pub async fn load_incremental(&self, clean: Vec<TaskEvent>) -> Result<LoadResult> {
        let watermark = self.watermarks.get(&self.pipeline_name).await?;
        log::info!(
            "Last processed event_time for '{}': {}",
            self.pipeline_name,
            watermark
        );

        let pending: Vec<TaskEvent> = clean
            .into_iter()
            .filter(|event| event.event_time > watermark)
            .collect();

        let Some(new_watermark) = pending.iter().map(|event| event.event_time).max() else {
            log::info!("No new events to load into '{}'", self.table);
            return Ok(LoadResult::UpToDate { watermark });
        };

        log::info!("{} new row(s) to load into '{}'", pending.len(), self.table);
        let rows: Vec<GoldRow> = pending.iter().map(TaskEvent::to_gold_row).collect();
        let appended = self.sink.append(&self.table, &rows).await?;

        self.watermarks
            .set(&self.pipeline_name, new_watermark)
            .await?;
        log::info!(
            "Watermark for '{}' advanced to {}",
            self.pipeline_name,
            new_watermark
        );

        Ok(LoadResult::Loaded {
            rows: appended,
            watermark: new_watermark,
        })
    }
}

impl Loader for IncrementalLoader {
    type Item = TaskEvent;
    type Report = LoadResult;

    async fn load(&self, items: Vec<Self::Item>) -> Result<LoadResult> {
        self.load_incremental(items).await
    }
}
