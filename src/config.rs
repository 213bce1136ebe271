//! Pipeline configuration from the process environment
//!
//! Expected environment variables:
//! - `STORAGE_URL`: root of the object containers (required, `file://` URL or path)
//! - `WAREHOUSE_URL`: root of the gold tables and watermark table (required)
//! - `PIPELINE_NAME`: watermark key (default `gold_task_events`)
//! - `RAW_CONTAINER`: landing container (default `raw`)
//! - `RAW_PREFIX`: file name prefix of raw objects, no path separators (default `task_events`)
//! - `SILVER_CONTAINER`: intermediate container (default `processed`)
//! - `SILVER_OBJECT`: silver object name (default `task_events_silver.parquet`)
//! - `GOLD_TABLE`: sink table (default `task_events_gold`)
//! - `WATERMARK_TABLE`: watermark table (default `etl_watermark`)

use crate::error::{PipelineError, Result};
use crate::storage::resolve_location;
use std::path::PathBuf;

pub const DEFAULT_PIPELINE_NAME: &str = "gold_task_events";
pub const DEFAULT_RAW_CONTAINER: &str = "raw";
pub const DEFAULT_RAW_PREFIX: &str = "task_events";
pub const DEFAULT_SILVER_CONTAINER: &str = "processed";
pub const DEFAULT_SILVER_OBJECT: &str = "task_events_silver.parquet";
pub const DEFAULT_GOLD_TABLE: &str = "task_events_gold";
pub const DEFAULT_WATERMARK_TABLE: &str = "etl_watermark";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub pipeline_name: String,
    pub storage_root: PathBuf,
    pub raw_container: String,
    pub raw_prefix: String,
    pub silver_container: String,
    pub silver_object: String,
    pub warehouse_root: PathBuf,
    pub gold_table: String,
    pub watermark_table: String,
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                PipelineError::Config(format!("{} environment variable not set", key))
            })
        };

        // Objects are matched on their bare name inside the raw container
        let raw_prefix = or_default("RAW_PREFIX", DEFAULT_RAW_PREFIX);
        if raw_prefix.contains(['/', '\\']) {
            return Err(PipelineError::Config(format!(
                "RAW_PREFIX '{}' must not contain a path separator",
                raw_prefix
            )));
        }

        Ok(Self {
            pipeline_name: or_default("PIPELINE_NAME", DEFAULT_PIPELINE_NAME),
            storage_root: resolve_location(&required("STORAGE_URL")?)?,
            raw_container: or_default("RAW_CONTAINER", DEFAULT_RAW_CONTAINER),
            raw_prefix,
            silver_container: or_default("SILVER_CONTAINER", DEFAULT_SILVER_CONTAINER),
            silver_object: or_default("SILVER_OBJECT", DEFAULT_SILVER_OBJECT),
            warehouse_root: resolve_location(&required("WAREHOUSE_URL")?)?,
            gold_table: or_default("GOLD_TABLE", DEFAULT_GOLD_TABLE),
            watermark_table: or_default("WATERMARK_TABLE", DEFAULT_WATERMARK_TABLE),
        })
    }

    /// Location of the watermark table file
    pub fn watermark_path(&self) -> PathBuf {
        self.warehouse_root
            .join(format!("{}.json", self.watermark_table))
    }
}
