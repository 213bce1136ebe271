//! Analytical sink
//!
//! The sink only ever appends: it never merges or upserts, and relies on the
//! watermark filter to keep already-loaded events out.

use crate::error::{PipelineError, Result};
use crate::model::GoldRow;
use crate::storage::{NdjsonReader, NdjsonWriter};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Bulk-append capability over named tables
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Append rows to `table`, returning how many were appended
    ///
    /// Must only return `Ok` once the rows are durable.
    async fn append(&self, table: &str, rows: &[GoldRow]) -> Result<usize>;
}

/// Sink storing each table as an NDJSON file under a warehouse directory
pub struct NdjsonSink {
    root: PathBuf,
}

impl NdjsonSink {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.ndjson", table))
    }

    /// Read a table back, mostly for inspection and tests
    pub fn read_table(&self, table: &str) -> Result<Vec<GoldRow>> {
        NdjsonReader::new(self.table_path(table)).read()
    }
}

#[async_trait]
impl EventSink for NdjsonSink {
    async fn append(&self, table: &str, rows: &[GoldRow]) -> Result<usize> {
        if table.is_empty() || table.contains(['/', '\\']) || table.starts_with('.') {
            return Err(PipelineError::Config(format!("invalid table name '{}'", table)));
        }

        let writer = NdjsonWriter::new(self.table_path(table));
        writer.append(rows).map_err(|e| PipelineError::Sink {
            table: table.to_string(),
            rows: rows.len(),
            reason: e.to_string(),
        })
    }
}

/// In-memory sink
///
/// `failing` makes every append fail before anything is stored.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Mutex<HashMap<String, Vec<GoldRow>>>,
    failing: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    /// Snapshot of a table's rows in append order
    pub fn rows(&self, table: &str) -> Vec<GoldRow> {
        self.lock().get(table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<GoldRow>>> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn append(&self, table: &str, rows: &[GoldRow]) -> Result<usize> {
        if self.failing {
            return Err(PipelineError::Sink {
                table: table.to_string(),
                rows: rows.len(),
                reason: "connection refused".to_string(),
            });
        }
        self.lock()
            .entry(table.to_string())
            .or_default()
            .extend_from_slice(rows);
        Ok(rows.len())
    }
}
