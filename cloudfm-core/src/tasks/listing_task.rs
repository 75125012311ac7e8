//! ``src/tasks/listing_task.rs``
//! ============================================================================
//! # Listing Pipeline
//!
//! Enumerates the objects under a prefix, fetches metadata and a download URL
//! for every object concurrently, and folds the results into `FileEntry`s in
//! enumeration order. The first failure anywhere aborts the whole refresh; no
//! partial listing is ever returned.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use futures::{TryStreamExt, stream};
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::ListingConfig,
    controller::event_loop::TaskResult,
    error::AppError,
    model::file_entry::FileEntry,
    storage::gateway::{ObjectRef, StorageGateway},
};

pub struct ListingPipeline {
    gateway: Arc<dyn StorageGateway>,
    config: ListingConfig,
}

impl ListingPipeline {
    #[must_use]
    pub fn new(gateway: Arc<dyn StorageGateway>, config: ListingConfig) -> Self {
        Self { gateway, config }
    }

    /// Build the listing for `prefix`.
    ///
    /// Fails with a listing error if enumeration or any per-object fetch
    /// fails, and with `AppError::Cancelled` as soon as `cancel` fires.
    #[instrument(level = "debug", skip(self, cancel), fields(operation_type = "refresh_listing"))]
    pub async fn refresh_listing(
        &self,
        prefix: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileEntry>, AppError> {
        let start: Instant = Instant::now();

        let objects: Vec<ObjectRef> = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(AppError::Cancelled),
            listed = self.gateway.list(prefix) => {
                listed.map_err(|e| AppError::listing(prefix, &e))?
            }
        };

        let total = objects.len();
        let width = match self.config.max_concurrent_fetches {
            0 => total.max(1),
            n => n,
        };

        debug!(objects = total, fan_out = width, "Enumerated objects, fetching details");

        let fetches = stream::iter(
            objects
                .into_iter()
                .map(|object| Ok::<_, AppError>(self.fetch_entry(object))),
        )
        .try_buffered(width)
        .try_collect::<Vec<FileEntry>>();

        let entries: Vec<FileEntry> = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(AppError::Cancelled),
            collected = fetches => collected?,
        };

        let duration: Duration = start.elapsed();
        info!(
            marker = "LISTING_REFRESH",
            operation_type = "refresh_listing",
            prefix = prefix,
            entries = entries.len(),
            duration_us = duration.as_micros() as u64,
            "Listing refreshed in {:?}",
            duration
        );

        Ok(entries)
    }

    async fn fetch_entry(&self, object: ObjectRef) -> Result<FileEntry, AppError> {
        let metadata = async {
            self.gateway
                .metadata(&object)
                .await
                .map_err(|e| AppError::object_metadata(object.key.as_str(), &e))
        };
        let url = async {
            self.gateway
                .download_url(&object)
                .await
                .map_err(|e| AppError::download_url(object.key.as_str(), &e))
        };

        let (meta, url) = tokio::try_join!(metadata, url)?;

        Ok(FileEntry::from_object(
            &object,
            &meta,
            Some(url),
            &self.config.date_format,
        ))
    }
}

/// Run one refresh in the background and report it on `task_tx`, tagged
/// with `generation` so the receiver can drop superseded results.
pub fn spawn_listing_refresh(
    pipeline: Arc<ListingPipeline>,
    prefix: String,
    generation: u64,
    cancel: CancellationToken,
    task_tx: UnboundedSender<TaskResult>,
) -> JoinHandle<()> {
    let task_id = format!("refresh_{}", nanoid::nanoid!(8));

    tokio::spawn(async move {
        debug!(%task_id, generation, "Listing refresh started");
        let result = pipeline.refresh_listing(&prefix, &cancel).await;

        if let Err(e) = &result
            && !matches!(e, AppError::Cancelled)
        {
            warn!(%task_id, generation, error = %e, "Listing refresh failed");
        }

        if task_tx
            .send(TaskResult::ListingLoaded { generation, result })
            .is_err()
        {
            debug!(generation, "Listing result dropped, event loop is gone");
        }
    })
}
