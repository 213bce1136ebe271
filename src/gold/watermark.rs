//! Watermark persistence
//!
//! One row per pipeline, keyed by pipeline name, holding the `event_time`
//! of the newest event already loaded into the sink.

use crate::error::{PipelineError, Result};
use crate::storage::sync_dir;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Keyed store of per-pipeline watermarks
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Fetch the watermark, failing with [`PipelineError::WatermarkNotFound`]
    /// when the pipeline was never initialized
    async fn get(&self, pipeline: &str) -> Result<NaiveDateTime>;

    /// Overwrite the watermark; must be durable before returning `Ok`
    async fn set(&self, pipeline: &str, watermark: NaiveDateTime) -> Result<()>;
}

/// Row of the watermark table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkRow {
    pub last_event_time: NaiveDateTime,
}

/// Watermark table kept as a JSON file
///
/// ```json
/// {
///   "gold_task_events": { "last_event_time": "2024-01-01T10:00:00" }
/// }
/// ```
///
/// Updates rewrite the table through a temporary file and a rename, and
/// fsync the containing directory before returning, so a crash mid-write
/// leaves the previous table intact.
pub struct JsonWatermarkStore {
    path: PathBuf,
}

impl JsonWatermarkStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_table(&self) -> Result<BTreeMap<String, WatermarkRow>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(PipelineError::io(&self.path, e)),
        };

        serde_json::from_str(&content).map_err(|e| {
            PipelineError::json(format!("watermark table {}", self.path.display()), e)
        })
    }

    fn write_table(&self, table: &BTreeMap<String, WatermarkRow>) -> Result<()> {
        let json = serde_json::to_string_pretty(table).map_err(|e| {
            PipelineError::json(format!("watermark table {}", self.path.display()), e)
        })?;

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);

        let mut file = std::fs::File::create(&tmp).map_err(|e| PipelineError::io(&tmp, e))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .and_then(|_| file.sync_all())
            .map_err(|e| PipelineError::io(&tmp, e))?;
        drop(file);

        std::fs::rename(&tmp, &self.path).map_err(|e| PipelineError::io(&self.path, e))?;
        sync_dir(parent)
    }
}

#[async_trait]
impl WatermarkStore for JsonWatermarkStore {
    async fn get(&self, pipeline: &str) -> Result<NaiveDateTime> {
        self.read_table()?
            .get(pipeline)
            .map(|row| row.last_event_time)
            .ok_or_else(|| PipelineError::WatermarkNotFound(pipeline.to_string()))
    }

    async fn set(&self, pipeline: &str, watermark: NaiveDateTime) -> Result<()> {
        let mut table = self.read_table()?;
        table.insert(
            pipeline.to_string(),
            WatermarkRow {
                last_event_time: watermark,
            },
        );
        self.write_table(&table)?;

        log::debug!(
            "Stored watermark {} for '{}' in {}",
            watermark,
            pipeline,
            self.path.display()
        );
        Ok(())
    }
}

/// In-memory watermark store
///
/// `fail_writes` makes every `set` fail, which simulates a crash between
/// the sink append and the watermark update.
#[derive(Debug, Default)]
pub struct MemoryWatermarkStore {
    rows: Mutex<HashMap<String, NaiveDateTime>>,
    fail_writes: bool,
}

impl MemoryWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with `pipeline` already bootstrapped at `watermark`
    pub fn with_watermark(pipeline: &str, watermark: NaiveDateTime) -> Self {
        let store = Self::default();
        store.lock().insert(pipeline.to_string(), watermark);
        store
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Current value without going through the async trait
    pub fn current(&self, pipeline: &str) -> Option<NaiveDateTime> {
        self.lock().get(pipeline).copied()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, NaiveDateTime>> {
        self.rows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WatermarkStore for MemoryWatermarkStore {
    async fn get(&self, pipeline: &str) -> Result<NaiveDateTime> {
        self.current(pipeline)
            .ok_or_else(|| PipelineError::WatermarkNotFound(pipeline.to_string()))
    }

    async fn set(&self, pipeline: &str, watermark: NaiveDateTime) -> Result<()> {
        if self.fail_writes {
            return Err(PipelineError::io(
                "memory://watermarks",
                std::io::Error::other("watermark write rejected"),
            ));
        }
        self.lock().insert(pipeline.to_string(), watermark);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[tokio::test]
    async fn test_missing_table_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = JsonWatermarkStore::new(temp.path().join("etl_watermark.json"));

        let err = store.get("gold_task_events").await.unwrap_err();
        assert!(matches!(err, PipelineError::WatermarkNotFound(name) if name == "gold_task_events"));
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("warehouse").join("etl_watermark.json");
        let store = JsonWatermarkStore::new(&path);

        store.set("gold_task_events", at("2024-01-01T10:00:00")).await.unwrap();
        store.set("other", at("2023-06-01T00:00:00")).await.unwrap();
        store.set("gold_task_events", at("2024-01-02T08:00:00")).await.unwrap();

        assert_eq!(
            store.get("gold_task_events").await.unwrap(),
            at("2024-01-02T08:00:00")
        );
        assert_eq!(store.get("other").await.unwrap(), at("2023-06-01T00:00:00"));

        // A fresh handle sees the persisted table
        let reopened = JsonWatermarkStore::new(&path);
        assert_eq!(
            reopened.get("gold_task_events").await.unwrap(),
            at("2024-01-02T08:00:00")
        );
        assert!(!temp.path().join("warehouse").join("etl_watermark.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_table_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("etl_watermark.json");
        std::fs::write(
            &path,
            r#"{"gold_task_events": {"last_event_time": "2023-12-31T00:00:00"}}"#,
        )
        .unwrap();

        let store = JsonWatermarkStore::new(&path);
        assert_eq!(
            store.get("gold_task_events").await.unwrap(),
            at("2023-12-31T00:00:00")
        );
    }

    #[tokio::test]
    async fn test_corrupt_table_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("etl_watermark.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonWatermarkStore::new(&path);
        assert!(matches!(
            store.get("gold_task_events").await.unwrap_err(),
            PipelineError::Json { .. }
        ));
    }

    #[tokio::test]
    async fn test_memory_store_failing_writes() {
        let store = MemoryWatermarkStore::with_watermark("p", at("2024-01-01T00:00:00"))
            .failing_writes();

        assert!(store.set("p", at("2024-02-01T00:00:00")).await.is_err());
        assert_eq!(store.current("p"), Some(at("2024-01-01T00:00:00")));
    }
}
