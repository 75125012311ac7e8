//! ``src/tasks/upload_task.rs``
//! ============================================================================
//! # Upload Submission
//!
//! Hands every staged blob to the gateway. All blobs are attempted, so the
//! outcome can report how many made it; the batch itself is only cleared by
//! the controller once every blob succeeded.

use std::{sync::Arc, time::Instant};

use futures::future::join_all;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

use crate::{
    controller::event_loop::TaskResult,
    error::AppError,
    model::upload_batch::StagedBlob,
    storage::gateway::{ObjectRef, StorageGateway},
};

async fn upload_one(
    gateway: &dyn StorageGateway,
    prefix: &str,
    staged: &StagedBlob,
) -> Result<ObjectRef, String> {
    let blob = staged
        .load()
        .await
        .map_err(|e| format!("{}: {e}", staged.name))?;

    gateway
        .upload(prefix, &blob)
        .await
        .map_err(|e| format!("{}: {e}", staged.name))
}

/// Upload `items` under `prefix`. Returns the stored objects in batch order,
/// or an upload error carrying the success and failure counts.
#[instrument(level = "info", skip(gateway, items), fields(operation_type = "submit_upload", blobs = items.len()))]
pub async fn submit_batch(
    gateway: &dyn StorageGateway,
    prefix: &str,
    items: &[StagedBlob],
) -> Result<Vec<ObjectRef>, AppError> {
    let start = Instant::now();

    let results = join_all(items.iter().map(|staged| upload_one(gateway, prefix, staged))).await;

    let mut stored = Vec::with_capacity(results.len());
    let mut first_failure: Option<String> = None;
    let mut failed = 0usize;

    for result in results {
        match result {
            Ok(object) => stored.push(object),
            Err(e) => {
                warn!(error = %e, "Blob upload failed");
                failed += 1;
                first_failure.get_or_insert(e);
            }
        }
    }

    if let Some(reason) = first_failure {
        return Err(AppError::upload(stored.len(), failed, reason));
    }

    info!(
        marker = "UPLOAD_COMPLETE",
        operation_type = "submit_upload",
        uploaded = stored.len(),
        duration_us = start.elapsed().as_micros() as u64,
        "Uploaded {} blob(s)",
        stored.len()
    );

    Ok(stored)
}

/// Submit a batch in the background and report on `task_tx`.
pub fn spawn_upload(
    gateway: Arc<dyn StorageGateway>,
    prefix: String,
    items: Vec<StagedBlob>,
    session: u64,
    task_tx: UnboundedSender<TaskResult>,
) -> JoinHandle<()> {
    let task_id = format!("upload_{}", nanoid::nanoid!(8));

    tokio::spawn(async move {
        debug!(%task_id, session, blobs = items.len(), "Upload started");
        let result = submit_batch(gateway.as_ref(), &prefix, &items).await;

        if task_tx.send(TaskResult::UploadFinished { session, result }).is_err() {
            debug!(%task_id, "Upload result dropped, event loop is gone");
        }
    })
}
