//! Medallion ETL
//!
//! An incremental bronze → silver → gold batch pipeline for task events,
//! guarded by a persisted per-pipeline watermark.

pub mod bronze;
pub mod cli;
pub mod config;
pub mod error;
pub mod etl;
pub mod gold;
pub mod model;
pub mod silver;
pub mod storage;

// Re-exports for convenience
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use etl::{Extractor, IdentityTransformer, Loader, Pipeline, Transformer};
pub use gold::{IncrementalLoader, LoadResult};
pub use model::{GoldRow, RawEvent, TaskEvent};
