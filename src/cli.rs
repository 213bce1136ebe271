//! CLI helper functions
//!
//! The silver job refreshes the intermediate layer from the landing zone;
//! the gold job loads it incrementally into the analytical sink. The
//! watermark helpers cover the operational side: inspecting a pipeline's
//! watermark and bootstrapping it before the first gold load.

use crate::bronze::RawEventsExtractor;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::etl::{IdentityTransformer, Pipeline};
use crate::gold::{
    EventSink, IncrementalLoader, JsonWatermarkStore, LoadResult, NdjsonSink, WatermarkStore,
};
use crate::model::TaskEvent;
use crate::silver::{SilverReader, SilverTransformer, SilverWriter};
use crate::storage::{LocalObjectStore, ObjectStore};
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Store handles for one pipeline run
///
/// Built once at startup, passed to each job and dropped when the run ends.
#[derive(Clone)]
pub struct Stores {
    pub objects: Arc<dyn ObjectStore>,
    pub sink: Arc<dyn EventSink>,
    pub watermarks: Arc<dyn WatermarkStore>,
}

impl Stores {
    /// Local filesystem stores rooted at the configured locations
    pub fn local(config: &PipelineConfig) -> Self {
        Self {
            objects: Arc::new(LocalObjectStore::new(&config.storage_root)),
            sink: Arc::new(NdjsonSink::new(&config.warehouse_root)),
            watermarks: Arc::new(JsonWatermarkStore::new(config.watermark_path())),
        }
    }
}

/// Bronze → silver: extract raw events, clean them and overwrite the silver object
///
/// Returns the number of silver events written.
pub async fn run_silver(config: &PipelineConfig, stores: &Stores) -> Result<usize> {
    log::info!("Building silver layer for '{}'", config.pipeline_name);

    let pipeline = Pipeline::new(
        RawEventsExtractor::new(
            stores.objects.clone(),
            &config.raw_container,
            &config.raw_prefix,
        ),
        SilverTransformer::new(),
        SilverWriter::new(
            stores.objects.clone(),
            &config.silver_container,
            &config.silver_object,
        ),
    );

    pipeline.run().await
}

/// Silver → gold: load events newer than the watermark and advance it
pub async fn run_gold(config: &PipelineConfig, stores: &Stores) -> Result<LoadResult> {
    log::info!("Loading gold layer for '{}'", config.pipeline_name);

    let pipeline = Pipeline::new(
        SilverReader::new(
            stores.objects.clone(),
            &config.silver_container,
            &config.silver_object,
        ),
        IdentityTransformer::<TaskEvent>::new(),
        IncrementalLoader::new(
            stores.sink.clone(),
            stores.watermarks.clone(),
            &config.pipeline_name,
            &config.gold_table,
        ),
    );

    pipeline.run().await
}

/// Current watermark of the configured pipeline, `None` if never initialized
pub async fn show_watermark(
    config: &PipelineConfig,
    stores: &Stores,
) -> Result<Option<NaiveDateTime>> {
    match stores.watermarks.get(&config.pipeline_name).await {
        Ok(watermark) => Ok(Some(watermark)),
        Err(PipelineError::WatermarkNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Bootstrap the watermark row of the configured pipeline
///
/// Refuses to overwrite an existing row.
pub async fn init_watermark(
    config: &PipelineConfig,
    stores: &Stores,
    watermark: NaiveDateTime,
) -> Result<()> {
    if let Some(existing) = show_watermark(config, stores).await? {
        return Err(PipelineError::Config(format!(
            "pipeline '{}' already has watermark {}",
            config.pipeline_name, existing
        )));
    }

    stores
        .watermarks
        .set(&config.pipeline_name, watermark)
        .await?;
    log::info!(
        "Initialized watermark for '{}' at {}",
        config.pipeline_name,
        watermark
    );
    Ok(())
}
